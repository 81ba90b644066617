//! Command implementations

pub mod ask;
pub mod config;
pub mod run;

pub use ask::{run_ask, AskOptions};
pub use config::run_config;
pub use run::{run_program, RunOptions};
