use crate::domain::{
    ContainerRuntime, ContainerSpec, ContainerState, ExecSpec, HostIdentity, PrivilegeMode,
    Target,
};
use crate::services::provisioner::ProvisionScript;
use anyhow::{Context, Result, bail};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{info, warn};

/// How the container came to exist in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// It was already there.
    Existing,
    /// Created by us with `podman create`.
    Created,
    /// Created by `podman container runlabel` from the image's RUN label.
    RunLabel,
}

pub struct ContainerService {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerService {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn ensure_image(&self, image: &str) -> Result<()> {
        if self.runtime.image_exists(image)? {
            return Ok(());
        }

        info!("Baixando imagem {image}...");
        self.runtime
            .pull_image(image)
            .with_context(|| format!("falha ao baixar a imagem '{image}'"))
    }

    pub fn ensure_container(&self, target: &Target) -> Result<Presence> {
        let container = self.runtime.get_container(&target.name)?;

        if container.state != ContainerState::Absent {
            info!("Container '{}' já existe. Tentando iniciar...", target.name);
            info!(
                "(Para recomeçar do zero, remova-o com: podman rm '{}')",
                target.name
            );
            return Ok(Presence::Existing);
        }

        info!(
            "Criando container '{}' com a imagem '{}'",
            target.name, target.image
        );

        if self.runtime.image_runlabel(&target.image)?.is_some() {
            info!("Label RUN detectada na imagem, usando-a como padrão...");
            self.runtime
                .runlabel_container(&target.name, &target.image)
                .with_context(|| format!("falha no runlabel da imagem '{}'", target.image))?;
            return Ok(Presence::RunLabel);
        }

        let spec = match target.mode {
            PrivilegeMode::User => ContainerSpec::user(&target.name, &target.image),
            PrivilegeMode::System => ContainerSpec::system(&target.name, &target.image),
        };
        self.runtime
            .create_container(&spec)
            .with_context(|| format!("falha ao criar o container '{}'", target.name))?;

        Ok(Presence::Created)
    }

    pub fn ensure_running(&self, name: &str) -> Result<()> {
        let container = self.runtime.get_container(name)?;

        match container.state {
            ContainerState::Running => Ok(()),
            state if state.is_startable() => {
                info!("Iniciando {name}...");
                self.runtime
                    .start_container(name)
                    .with_context(|| format!("falha ao iniciar o container '{name}'"))
            }
            state => bail!("Container '{name}' em estado inesperado: '{state}'"),
        }
    }

    /// Makes the host user exist inside the container with passwordless sudo.
    pub fn provision_user(&self, name: &str, host: &HostIdentity, shell: &str) -> Result<()> {
        info!("Configurando usuário {} dentro de {name}...", host.user);

        let script = ProvisionScript::write(host, shell)?;
        let dest = script.container_path();

        self.runtime.copy_into(name, script.host_path(), dest)?;
        let result = self.runtime.exec_as_root(name, &["sh", dest]);

        if let Err(e) = self.runtime.exec_as_root(name, &["rm", "-f", dest]) {
            warn!("Não foi possível remover {dest} de {name}: {e:#}");
        }

        result.with_context(|| format!("falha ao provisionar o usuário {} em '{name}'", host.user))
    }

    /// Image, container, running state and first-run provisioning, in order.
    pub fn prepare(&self, target: &Target, host: &HostIdentity) -> Result<Presence> {
        self.ensure_image(&target.image)?;

        let presence = self.ensure_container(target)?;
        self.ensure_running(&target.name)?;

        if presence == Presence::Created && target.mode == PrivilegeMode::User {
            self.provision_user(&target.name, host, &target.shell)?;
        }

        Ok(presence)
    }

    /// Runs `command` (the configured shell when empty) in the container and
    /// returns its exit code.
    pub fn exec(&self, target: &Target, host: &HostIdentity, command: &[String]) -> Result<i32> {
        let spec = exec_spec(target, host, command, std::io::stdin().is_terminal());
        self.runtime.exec_interactive(&spec)
    }

    pub fn list(&self, filter: &str) -> Result<String> {
        self.runtime.list_containers(filter)
    }
}

fn exec_spec(target: &Target, host: &HostIdentity, command: &[String], tty: bool) -> ExecSpec {
    let command = if command.is_empty() {
        vec![target.shell.clone()]
    } else {
        command.to_vec()
    };

    match target.mode {
        PrivilegeMode::User => ExecSpec {
            container: target.name.clone(),
            user: Some(format!("{}:{}", host.uid, host.gid)),
            workdir: Some(host.cwd.clone()),
            env: host.user_env(&target.shell),
            command,
            tty,
        },
        PrivilegeMode::System => ExecSpec {
            container: target.name.clone(),
            user: None,
            workdir: None,
            env: host.system_env(),
            command,
            tty,
        },
    }
}
