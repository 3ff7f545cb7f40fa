mod container;
pub mod identity;
pub mod settings;
pub mod traits;

pub use container::{Container, ContainerSpec, ContainerState, ExecSpec, PET_VOLUMES};
pub use identity::HostIdentity;
pub use settings::{FlagOverrides, PrivilegeMode, Settings, Target, UsageError};
pub use traits::ContainerRuntime;
