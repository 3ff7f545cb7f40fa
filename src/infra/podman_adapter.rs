use crate::domain::{
    Container, ContainerRuntime, ContainerSpec, ContainerState, ExecSpec, PrivilegeMode,
};
use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};
use tracing::debug;

/// Overrides the engine binary (defaults to `podman`).
pub const ENGINE_ENV: &str = "PETBOX_ENGINE";

#[derive(Debug, Clone)]
pub struct PodmanAdapter {
    engine: OsString,
    sudo: bool,
}

impl PodmanAdapter {
    pub fn new() -> Self {
        Self {
            engine: std::env::var_os(ENGINE_ENV).unwrap_or_else(|| OsString::from("podman")),
            sudo: false,
        }
    }

    /// System mode talks to the root engine, going through `sudo` unless we
    /// already are root.
    pub fn for_mode(mode: PrivilegeMode, is_root: bool) -> Self {
        Self {
            sudo: mode == PrivilegeMode::System && !is_root,
            ..Self::new()
        }
    }

    fn command(&self) -> Command {
        if self.sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.engine);
            cmd
        } else {
            Command::new(&self.engine)
        }
    }

    fn podman<I, S>(&self, args: I, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let status = self.podman_status(args, context)?;
        ensure_success(status, context)
    }

    fn podman_status<I, S>(&self, args: I, context: &str) -> Result<ExitStatus>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command()
            .args(args)
            .status()
            .with_context(|| context.to_string())
    }

    /// Runs quietly and hands back stdout; stderr is discarded.
    fn podman_output<I, S>(&self, args: I, context: &str) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command()
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .with_context(|| context.to_string())
    }
}

impl Default for PodmanAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for PodmanAdapter {
    fn image_exists(&self, image: &str) -> Result<bool> {
        Ok(self
            .podman_output(
                ["image", "inspect", image],
                &format!("checando existência da imagem {image}"),
            )?
            .status
            .success())
    }

    fn pull_image(&self, image: &str) -> Result<()> {
        self.podman(["pull", image], &format!("baixando imagem {image}"))
    }

    fn image_runlabel(&self, image: &str) -> Result<Option<String>> {
        let output = self.podman_output(
            ["container", "runlabel", "--display", "RUN", image],
            &format!("lendo label RUN de {image}"),
        )?;

        if !output.status.success() {
            return Ok(None);
        }

        Ok(parse_runlabel(&String::from_utf8_lossy(&output.stdout)))
    }

    fn get_container(&self, name: &str) -> Result<Container> {
        let output = self.podman_output(
            ["container", "inspect", name, "--format", "{{.State.Status}}"],
            &format!("checando estado do container {name}"),
        )?;

        let state = if output.status.success() {
            ContainerState::parse(&String::from_utf8_lossy(&output.stdout))
        } else {
            ContainerState::Absent
        };

        Ok(Container::new(name.to_string(), state))
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<()> {
        self.podman(spec.to_args(), &format!("criando container {}", spec.name))
    }

    fn runlabel_container(&self, name: &str, image: &str) -> Result<()> {
        self.podman(
            ["container", "runlabel", "--name", name, "RUN", image],
            &format!("executando label RUN de {image}"),
        )
    }

    fn start_container(&self, name: &str) -> Result<()> {
        self.podman(["start", name], &format!("iniciando container {name}"))
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        let output = self.podman_output(["stop", name], &format!("parando container {name}"))?;
        ensure_success(output.status, &format!("parando container {name}"))
    }

    fn copy_into(&self, container: &str, source: &Path, dest: &str) -> Result<()> {
        let target = format!("{container}:{dest}");
        self.podman(
            [OsStr::new("cp"), source.as_os_str(), OsStr::new(&target)],
            &format!("copiando {:?} para {target}", source),
        )
    }

    fn exec_as_root(&self, container: &str, command: &[&str]) -> Result<()> {
        let mut args = vec!["exec", "--user", "root", container];
        args.extend_from_slice(command);
        self.podman(args, &format!("executando {:?} em {container}", command))
    }

    fn exec_interactive(&self, spec: &ExecSpec) -> Result<i32> {
        let status = self
            .podman_status(spec.to_args(), &format!("abrindo sessão em {}", spec.container))?;

        let code = exit_code(status);
        debug!("sessão em {} terminou com código {code}", spec.container);
        Ok(code)
    }

    fn list_containers(&self, filter: &str) -> Result<String> {
        let filter = format!("name={filter}");
        let output = self
            .command()
            .args(["ps", "--all", "--filter", filter.as_str()])
            .stdin(Stdio::null())
            .output()
            .context("listando containers")?;

        ensure_success(output.status, "listando containers")?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// `podman container runlabel --display` prints `<no value>` (or nothing)
/// when the image has no RUN label.
fn parse_runlabel(raw: &str) -> Option<String> {
    let label = raw.trim();
    if label.is_empty() || label.contains("<no value>") {
        None
    } else {
        Some(label.to_string())
    }
}

/// Shell convention: a child killed by a signal reports `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

fn ensure_success(status: ExitStatus, context: &str) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    bail!("podman retornou status {:?} ({context})", status)
}
