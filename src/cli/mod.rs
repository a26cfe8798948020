pub mod commands;

pub use commands::{Cli, Commands, is_broken_pipe, run};
