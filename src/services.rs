mod container_service;
mod provisioner;
mod session;

pub use container_service::{ContainerService, Presence};
pub use provisioner::{ProvisionScript, render_script};
pub use session::{SessionGuard, install_interrupt_handler};
