/// Shared helpers for running external commands
pub mod command;
pub mod polling;

pub use command::{CommandSpec, Shell, ShellExecutor};
pub use polling::PollingConfig;
