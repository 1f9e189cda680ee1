//! Command implementations.

pub mod config;
pub mod run;

pub use self::config::execute_config;
pub use self::run::{collect_inputs, execute_run, ConsoleReporter};
