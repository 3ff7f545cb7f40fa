use anyhow::{Context, Result};
use nix::unistd::{Group, User, getgid, getuid};
use std::env;
use std::path::PathBuf;

/// Host variables forwarded into user-mode sessions when they are set.
pub const FORWARDED_ENV: &[&str] = &[
    "LANG",
    "LC_ALL",
    "TERM",
    "COLORTERM",
    "DISPLAY",
    "WAYLAND_DISPLAY",
    "XDG_RUNTIME_DIR",
    "XDG_SESSION_TYPE",
    "DBUS_SESSION_BUS_ADDRESS",
    "SSH_AUTH_SOCK",
    "HOME",
    "USER",
    "SHELL",
];

/// The subset forwarded when running as the container's own root.
pub const SYSTEM_ENV: &[&str] = &["LANG", "TERM"];

/// Who invoked petbox on the host, captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub uid: u32,
    pub gid: u32,
    pub user: String,
    pub group: String,
    pub home: PathBuf,
    pub cwd: PathBuf,
    /// Values of [`FORWARDED_ENV`] present on the host, in allow-list order.
    pub env: Vec<(String, String)>,
}

impl HostIdentity {
    pub fn capture() -> Result<Self> {
        let uid = getuid();
        let gid = getgid();

        let account = User::from_uid(uid).ok().flatten();
        let user = match &account {
            Some(account) => account.name.clone(),
            None => env::var("USER").context("não foi possível descobrir o usuário do host")?,
        };
        let group = Group::from_gid(gid)
            .ok()
            .flatten()
            .map(|g| g.name)
            .unwrap_or_else(|| user.clone());
        let home = env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(|| account.as_ref().map(|a| a.dir.clone()))
            .context("HOME não definido e usuário sem diretório home")?;
        let cwd = env::current_dir().context("lendo diretório atual")?;

        let env = FORWARDED_ENV
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();

        Ok(Self {
            uid: uid.as_raw(),
            gid: gid.as_raw(),
            user,
            group,
            home,
            cwd,
            env,
        })
    }

    pub fn is_root(&self) -> bool {
        self.uid == 0
    }

    /// Environment for a session impersonating this identity. `SHELL` always
    /// points at the shell the session runs.
    pub fn user_env(&self, shell: &str) -> Vec<(String, String)> {
        let mut env: Vec<(String, String)> = self
            .env
            .iter()
            .filter(|(key, _)| key != "SHELL")
            .cloned()
            .collect();
        env.push(("SHELL".to_string(), shell.to_string()));
        env
    }

    /// Environment for a session running as the container's default identity.
    pub fn system_env(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .filter(|(key, _)| SYSTEM_ENV.contains(&key.as_str()))
            .cloned()
            .collect()
    }
}
