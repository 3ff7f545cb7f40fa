pub mod args;
pub mod run;

pub use args::{Action, Cli, Command};
