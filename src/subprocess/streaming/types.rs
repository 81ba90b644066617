//! Core types for streaming infrastructure

use crate::subprocess::{ExitStatus, ProcessError};
use serde::Serialize;
use std::time::Duration;

/// Stream source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// Terminal result of one invocation
#[derive(Debug)]
pub enum ExitOutcome {
    Success,
    Failure(ProcessError),
}

impl ExitOutcome {
    /// Map an exit status onto an outcome; zero is the only success.
    pub fn from_status(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitOutcome::Success,
            ExitStatus::Error(code) => ExitOutcome::Failure(ProcessError::ExitCode(code)),
            ExitStatus::Signal(signal) => ExitOutcome::Failure(ProcessError::Signal(signal)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }

    /// True when the process could not be started at all
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, ExitOutcome::Failure(err) if err.is_spawn_failure())
    }

    /// Exit code of the process, when it ran and exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExitOutcome::Success => Some(0),
            ExitOutcome::Failure(err) => err.exit_code(),
        }
    }

    pub fn error(&self) -> Option<&ProcessError> {
        match self {
            ExitOutcome::Success => None,
            ExitOutcome::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<(), ProcessError> {
        match self {
            ExitOutcome::Success => Ok(()),
            ExitOutcome::Failure(err) => Err(err),
        }
    }
}

/// Everything a consumer is told about an invocation, in delivery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Line {
        text: String,
    },
    Diagnostic {
        text: String,
    },
    Completed {
        success: bool,
        exit_code: Option<i32>,
        error: Option<String>,
    },
}

impl StreamEvent {
    pub fn completed(outcome: &ExitOutcome) -> Self {
        StreamEvent::Completed {
            success: outcome.is_success(),
            exit_code: outcome.exit_code(),
            error: outcome.error().map(|e| e.to_string()),
        }
    }
}

/// Summary returned once an invocation has finished
#[derive(Debug)]
pub struct InvocationReport {
    /// Terminal outcome
    pub outcome: ExitOutcome,
    /// Number of stdout lines delivered to the processor
    pub lines_delivered: usize,
    /// Captured stderr, one entry per line
    pub diagnostics: Vec<String>,
    /// Wall-clock time from spawn request to outcome
    pub duration: Duration,
}

impl InvocationReport {
    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Diagnostic output joined back into text
    pub fn diagnostic_text(&self) -> String {
        self.diagnostics.join("\n")
    }
}
