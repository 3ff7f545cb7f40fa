pub mod config;
pub mod podman_adapter;

pub use podman_adapter::PodmanAdapter;
