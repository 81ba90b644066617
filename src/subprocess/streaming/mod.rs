//! Real-time streaming of subprocess output
//!
//! This module turns the raw, arbitrarily chunked output of a child process
//! into lines and hands each one to a [`StreamProcessor`] as soon as it is
//! complete. Stderr is captured separately as diagnostics and never mixed
//! into the line sequence.

pub mod processor;
pub mod runner;
pub mod splitter;
pub mod types;


pub use processor::{
    CallbackProcessor, ChannelProcessor, CollectingProcessor, FanOutProcessor, JsonLinesProcessor,
    LoggingProcessor, StreamProcessor, WriterProcessor,
};
pub use runner::StreamingCommandRunner;
pub use splitter::LineSplitter;
pub use types::{ExitOutcome, InvocationReport, StreamEvent, StreamSource};
