use crate::domain::ContainerRuntime;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Stops the pet container when dropped, whatever path the session takes
/// out (normal return, error, interrupted shell).
pub struct SessionGuard {
    runtime: Arc<dyn ContainerRuntime>,
    name: String,
}

impl SessionGuard {
    pub fn arm(runtime: Arc<dyn ContainerRuntime>, name: &str) -> Self {
        Self {
            runtime,
            name: name.to_string(),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // Best effort: the container may never have been created.
        match self.runtime.stop_container(&self.name) {
            Ok(()) => debug!("container {} parado", self.name),
            Err(e) => debug!("ignorando falha ao parar {}: {e:#}", self.name),
        }
    }
}

/// Keeps petbox alive on Ctrl+C. The terminal delivers the interrupt to the
/// engine child as well, which then exits on its own; surviving it lets the
/// [`SessionGuard`] stop the container on the way out.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| debug!("interrupção recebida, aguardando o podman encerrar"))
        .map_err(|e| anyhow::anyhow!("falha ao registrar handler de Ctrl+C: {e}"))
}
