//! Process execution behind a small trait so the streaming layer can be
//! driven by a real OS process or by scripted in-memory output.

pub mod builder;
pub mod error;
pub mod mock;
pub mod runner;
pub mod streaming;


pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{
    write_input, ChunkStream, ExitStatus, InputWriter, ProcessCommand, ProcessHandle,
    ProcessRunner, StatusFuture, TokioProcessRunner,
};

use streaming::StreamingCommandRunner;
use std::sync::Arc;

#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(TokioProcessRunner))
    }

    pub fn mock() -> (Self, MockProcessRunner) {
        let mock = MockProcessRunner::new();
        let runner = Arc::new(mock.clone()) as Arc<dyn ProcessRunner>;
        (Self::new(runner), mock)
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    pub fn streaming(&self) -> StreamingCommandRunner {
        StreamingCommandRunner::new(Arc::clone(&self.runner))
    }
}
