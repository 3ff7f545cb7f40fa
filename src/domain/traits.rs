use super::{Container, ContainerSpec, ExecSpec};
use anyhow::Result;
use std::fmt::Debug;
use std::path::Path;

/// Trait for container engine operations
pub trait ContainerRuntime: Send + Sync + Debug {
    /// Whether the image is already in local storage
    fn image_exists(&self, image: &str) -> Result<bool>;

    /// Pull an image from its registry
    fn pull_image(&self, image: &str) -> Result<()>;

    /// The image's RUN label, if it carries one
    fn image_runlabel(&self, image: &str) -> Result<Option<String>>;

    /// Get the current state of a container
    fn get_container(&self, name: &str) -> Result<Container>;

    /// Create a new container from a spec
    fn create_container(&self, spec: &ContainerSpec) -> Result<()>;

    /// Create the container through the image's RUN label
    fn runlabel_container(&self, name: &str, image: &str) -> Result<()>;

    /// Start a container
    fn start_container(&self, name: &str) -> Result<()>;

    /// Stop a container
    fn stop_container(&self, name: &str) -> Result<()>;

    /// Copy a host file into a container
    fn copy_into(&self, container: &str, source: &Path, dest: &str) -> Result<()>;

    /// Run a non-interactive command as the container's root
    fn exec_as_root(&self, container: &str, command: &[&str]) -> Result<()>;

    /// Run an interactive command and return its exit code
    fn exec_interactive(&self, spec: &ExecSpec) -> Result<i32>;

    /// Engine listing of containers whose name matches `filter`
    fn list_containers(&self, filter: &str) -> Result<String>;
}
