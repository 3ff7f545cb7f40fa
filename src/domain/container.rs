use std::fmt;
use std::path::PathBuf;

/// Lifecycle state reported by the engine for the pet container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    /// The engine has no container with that name.
    Absent,
    Configured,
    Running,
    Exited,
    Stopped,
    /// Anything the engine reported that we do not know how to handle.
    Unknown(String),
}

impl ContainerState {
    /// Parses the output of `podman container inspect --format {{.State.Status}}`.
    ///
    /// Older podman releases report `configured` for a container that was
    /// never started, newer ones report `created`; both map to `Configured`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "configured" | "created" => Self::Configured,
            "running" => Self::Running,
            "exited" => Self::Exited,
            "stopped" => Self::Stopped,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// States from which a plain `podman start` brings the container up.
    pub fn is_startable(&self) -> bool {
        matches!(self, Self::Configured | Self::Exited | Self::Stopped)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Configured => write!(f, "configured"),
            Self::Running => write!(f, "running"),
            Self::Exited => write!(f, "exited"),
            Self::Stopped => write!(f, "stopped"),
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    pub name: String,
    pub state: ContainerState,
}

impl Container {
    pub fn new(name: String, state: ContainerState) -> Self {
        Self { name, state }
    }
}

/// Host paths every pet container gets: the host root, the device tree and
/// the machine identity.
pub const PET_VOLUMES: &[&str] = &[
    "/:/media/root:rslave",
    "/dev:/dev:rslave",
    "/etc/machine-id:/etc/machine-id:ro",
];

#[derive(Debug, Clone)]
pub struct ContainerSpec<'a> {
    pub name: &'a str,
    pub image: &'a str,
    pub hostname: &'a str,
    pub network: Option<&'a str>,
    pub privileged: bool,
    pub security_opt: Option<&'a str>,
    pub tty: bool,
    pub userns: Option<&'a str>,
    pub pid: Option<&'a str>,
    pub ipc: Option<&'a str>,
    pub volumes: &'a [&'a str],
}

impl<'a> ContainerSpec<'a> {
    /// Spec for a container run as the container's own root.
    pub fn system(name: &'a str, image: &'a str) -> Self {
        Self {
            name,
            image,
            hostname: "petbox",
            network: Some("host"),
            privileged: true,
            security_opt: Some("label=disable"),
            tty: true,
            userns: None,
            pid: None,
            ipc: None,
            volumes: PET_VOLUMES,
        }
    }

    /// Spec for a rootless container sharing the host user, PID and IPC
    /// namespaces.
    pub fn user(name: &'a str, image: &'a str) -> Self {
        Self {
            userns: Some("keep-id"),
            pid: Some("host"),
            ipc: Some("host"),
            ..Self::system(name, image)
        }
    }

    /// Arguments for `podman create`, image last.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "create".into(),
            "--hostname".into(),
            self.hostname.into(),
            "--name".into(),
            self.name.into(),
        ];

        if let Some(net) = self.network {
            args.push("--network".into());
            args.push(net.into());
        }
        if self.privileged {
            args.push("--privileged".into());
        }
        if let Some(sec) = self.security_opt {
            args.push("--security-opt".into());
            args.push(sec.into());
        }
        if self.tty {
            args.push("--tty".into());
        }
        if let Some(userns) = self.userns {
            args.push("--userns".into());
            args.push(userns.into());
        }
        if let Some(pid) = self.pid {
            args.push("--pid".into());
            args.push(pid.into());
        }
        if let Some(ipc) = self.ipc {
            args.push("--ipc".into());
            args.push(ipc.into());
        }

        for volume in self.volumes {
            args.push("--volume".into());
            args.push((*volume).into());
        }

        args.push(self.image.into());
        args
    }
}

/// A command to run inside the pet container with a terminal attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    pub container: String,
    /// `uid:gid` to impersonate; `None` keeps the container's default identity.
    pub user: Option<String>,
    pub workdir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub command: Vec<String>,
    pub tty: bool,
}

impl ExecSpec {
    /// Arguments for `podman exec`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["exec".into(), "--interactive".into()];

        if self.tty {
            args.push("--tty".into());
        }
        if let Some(user) = &self.user {
            args.push("--user".into());
            args.push(user.clone());
        }
        if let Some(dir) = &self.workdir {
            args.push("--workdir".into());
            args.push(dir.to_string_lossy().into_owned());
        }
        for (key, value) in &self.env {
            args.push("--env".into());
            args.push(format!("{key}={value}"));
        }

        args.push(self.container.clone());
        args.extend(self.command.iter().cloned());
        args
    }
}
