pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Public so the integration tests under tests/ can drive the mock engine
pub mod test_support;

pub use domain::{
    Container, ContainerRuntime, ContainerSpec, ContainerState, HostIdentity, PrivilegeMode,
    Settings, Target, UsageError,
};
pub use infra::PodmanAdapter;
pub use services::{ContainerService, SessionGuard};
