//! # llmpipe
//!
//! Runs a local text-generation program and hands its output to a consumer
//! one line at a time, as soon as each line is complete.
//!
//! ## Usage
//!
//! ```bash
//! llmpipe ask "Why is the sky blue?" [--model llama3.2] [--show-stderr]
//! llmpipe run [--input TEXT] [--json] <PROGRAM> [ARGS...]
//! ```
//!
//! ## Modules
//!
//! - `app` - Verbosity, logging setup and fatal error reporting for the binary
//! - `chat` - Turns a prompt into a model invocation and streams the answer
//! - `cli` - Argument parsing and command handlers
//! - `config` - Model program settings loaded from TOML and the environment
//! - `error` - Crate-wide error type with numeric codes
//! - `subprocess` - Process spawning behind a trait, plus the line-streaming layer
pub mod app;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod subprocess;

pub use chat::ChatClient;
pub use error::{LlmpipeError, Result};
pub use subprocess::streaming::{
    ExitOutcome, InvocationReport, LineSplitter, StreamProcessor, StreamingCommandRunner,
};
