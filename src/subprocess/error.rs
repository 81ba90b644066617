use crate::error::{ErrorCode, LlmpipeError};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process exited with code {0}")]
    ExitCode(i32),

    #[error("Process terminated by signal {0}")]
    Signal(i32),

    #[error("IO error on {channel}: {source}")]
    Io {
        channel: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

impl ProcessError {
    /// True when the process never started.
    pub fn is_spawn_failure(&self) -> bool {
        matches!(
            self,
            ProcessError::CommandNotFound(_) | ProcessError::SpawnFailed { .. }
        )
    }

    /// Exit code carried by a non-zero exit, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::ExitCode(code) => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn io(channel: &'static str, source: std::io::Error) -> Self {
        ProcessError::Io { channel, source }
    }
}

/// Convert ProcessError to LlmpipeError
impl From<ProcessError> for LlmpipeError {
    fn from(err: ProcessError) -> Self {
        let (code, command, exit_code) = match &err {
            ProcessError::CommandNotFound(cmd) => {
                (ErrorCode::EXEC_COMMAND_NOT_FOUND, Some(cmd.clone()), None)
            }
            ProcessError::SpawnFailed { command, .. } => {
                (ErrorCode::EXEC_SPAWN_FAILED, Some(command.clone()), None)
            }
            ProcessError::ExitCode(code) => (ErrorCode::EXEC_SUBPROCESS_FAILED, None, Some(*code)),
            ProcessError::Signal(_) => (ErrorCode::EXEC_SIGNAL_RECEIVED, None, None),
            ProcessError::Io { .. } => (ErrorCode::EXEC_OUTPUT_ERROR, None, None),
            ProcessError::InternalError { .. } | ProcessError::MockExpectationNotMet(_) => {
                (ErrorCode::EXEC_GENERIC, None, None)
            }
        };

        LlmpipeError::Execution {
            code,
            message: err.to_string(),
            command,
            exit_code,
            source: Some(Box::new(err)),
        }
    }
}
