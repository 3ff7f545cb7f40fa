use crate::cli::args::{Action, Cli};
use crate::domain::{ContainerRuntime, HostIdentity, Target, UsageError};
use crate::infra::PodmanAdapter;
use crate::infra::config::load_settings;
use crate::services::{ContainerService, SessionGuard, install_interrupt_handler};
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Set by images or wrappers to mark a petbox session.
pub const CONTAINER_ENV: &str = "PETBOX_CONTAINER";

/// Resolves the configuration for `cli` and drives the engine. Returns the
/// process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    if inside_container() {
        return Err(UsageError::new(
            "petbox precisa rodar no host, não dentro de um container",
        )
        .into());
    }

    let host = HostIdentity::capture()?;
    let settings = load_settings(&cli.config_dir, &host.user)?;
    let target = settings.resolve(&cli.overrides(), cli.default_mode())?;
    debug!("alvo resolvido: {:?}", target);

    install_interrupt_handler()?;

    let runtime = Arc::new(PodmanAdapter::for_mode(target.mode, host.is_root()));
    execute(runtime, &target, &host, cli.action())
}

/// No engine to drive from inside a container: trust `PETBOX_CONTAINER`,
/// then the marker files podman and docker leave behind.
fn inside_container() -> bool {
    std::env::var_os(CONTAINER_ENV).is_some()
        || Path::new("/run/.containerenv").exists()
        || Path::new("/.dockerenv").exists()
}

/// One petbox session against `runtime`.
pub fn execute(
    runtime: Arc<dyn ContainerRuntime>,
    target: &Target,
    host: &HostIdentity,
    action: Action,
) -> Result<i32> {
    let service = ContainerService::new(runtime.clone());

    if action == Action::List {
        let listing = service.list(&target.family)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(listing.as_bytes())?;
        stdout.flush()?;
        return Ok(0);
    }

    let _guard = SessionGuard::arm(runtime, &target.name);
    service.prepare(target, host)?;

    match action {
        Action::Run(command) => {
            info!("Container iniciado. Para sair, digite 'exit'.");
            service.exec(target, host, &command)
        }
        _ => Ok(0),
    }
}
