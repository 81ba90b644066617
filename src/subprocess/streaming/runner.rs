//! Streaming command runner implementation

use super::processor::StreamProcessor;
use super::splitter::LineSplitter;
use super::types::{ExitOutcome, InvocationReport, StreamSource};
use crate::subprocess::{
    write_input, ChunkStream, ExitStatus, ProcessCommand, ProcessError, ProcessHandle,
    ProcessRunner, TokioProcessRunner,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs one process per call and streams its stdout to a processor line by
/// line.
///
/// Holds no per-invocation state, so one runner can drive any number of
/// concurrent invocations.
#[derive(Clone)]
pub struct StreamingCommandRunner {
    inner: Arc<dyn ProcessRunner>,
}

struct DrainSummary {
    lines_delivered: usize,
    diagnostics: Vec<String>,
    read_error: Option<ProcessError>,
}

impl StreamingCommandRunner {
    /// Create a new streaming command runner
    pub fn new(inner: Arc<dyn ProcessRunner>) -> Self {
        Self { inner }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(TokioProcessRunner))
    }

    /// Run a command, delivering each stdout line to `processor` as soon as
    /// it is complete.
    ///
    /// Spawn failures are reported as the outcome without any line being
    /// delivered. Otherwise both output channels are drained and flushed
    /// before the exit status is turned into the outcome.
    pub async fn run(
        &self,
        command: ProcessCommand,
        processor: &mut dyn StreamProcessor,
    ) -> InvocationReport {
        let start = Instant::now();

        let handle = match self.inner.spawn(&command).await {
            Ok(handle) => handle,
            Err(err) => {
                tracing::debug!("Could not start {}: {}", command.display(), err);
                let outcome = ExitOutcome::Failure(err);
                notify_complete(processor, &outcome);
                return InvocationReport {
                    outcome,
                    lines_delivered: 0,
                    diagnostics: Vec::new(),
                    duration: start.elapsed(),
                };
            }
        };

        let ProcessHandle {
            program,
            stdin,
            stdout,
            stderr,
            status,
        } = handle;

        // Input is written while output is drained so a child that answers
        // before reading all of its input cannot wedge on a full pipe.
        let (input_result, drained) = tokio::join!(
            write_input(stdin, command.stdin.as_deref()),
            drain_output(stdout, stderr, processor)
        );

        let status = status.await;
        let duration = start.elapsed();
        log_result(&program, &status, drained.lines_delivered, duration);

        let outcome = resolve_outcome(status, drained.read_error, input_result.err());
        notify_complete(processor, &outcome);

        InvocationReport {
            outcome,
            lines_delivered: drained.lines_delivered,
            diagnostics: drained.diagnostics,
            duration,
        }
    }
}

/// Read both channels until each reaches end of output, then flush.
async fn drain_output(
    mut stdout: ChunkStream,
    mut stderr: ChunkStream,
    processor: &mut dyn StreamProcessor,
) -> DrainSummary {
    let mut lines = LineSplitter::new();
    let mut diagnostic_lines = LineSplitter::new();
    let mut diagnostics = Vec::new();
    let mut read_error = None;
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        tokio::select! {
            chunk = stdout.next(), if stdout_open => match chunk {
                Some(Ok(bytes)) => {
                    tracing::trace!("stdout chunk: {} bytes", bytes.len());
                    lines.feed(&bytes, |line| deliver(&mut *processor, StreamSource::Stdout, line));
                }
                Some(Err(err)) => {
                    tracing::warn!("Stopped reading stdout: {}", err);
                    read_error.get_or_insert(err);
                    stdout_open = false;
                }
                None => stdout_open = false,
            },
            chunk = stderr.next(), if stderr_open => match chunk {
                Some(Ok(bytes)) => {
                    diagnostic_lines.feed(&bytes, |line| {
                        diagnostics.push(line.to_string());
                        deliver(&mut *processor, StreamSource::Stderr, line);
                    });
                }
                Some(Err(err)) => {
                    tracing::warn!("Stopped reading stderr: {}", err);
                    read_error.get_or_insert(err);
                    stderr_open = false;
                }
                None => stderr_open = false,
            },
        }
    }

    let lines_delivered =
        lines.flush(|line| deliver(&mut *processor, StreamSource::Stdout, line));
    diagnostic_lines.flush(|line| {
        diagnostics.push(line.to_string());
        deliver(&mut *processor, StreamSource::Stderr, line);
    });

    DrainSummary {
        lines_delivered,
        diagnostics,
        read_error,
    }
}

fn deliver(processor: &mut dyn StreamProcessor, source: StreamSource, line: &str) {
    let result = match source {
        StreamSource::Stdout => processor.process_line(line),
        StreamSource::Stderr => processor.process_diagnostic(line),
    };

    if let Err(e) = result {
        // Continue with later lines even if the processor fails
        tracing::warn!("Processor failed to handle line from {:?}: {}", source, e);
    }
}

fn notify_complete(processor: &mut dyn StreamProcessor, outcome: &ExitOutcome) {
    if let Err(e) = processor.on_complete(outcome) {
        tracing::warn!("Processor failed to handle completion: {}", e);
    }
}

/// The exit status decides; pipe errors only matter when the process
/// otherwise succeeded.
fn resolve_outcome(
    status: Result<ExitStatus, ProcessError>,
    read_error: Option<ProcessError>,
    input_error: Option<ProcessError>,
) -> ExitOutcome {
    match status {
        Err(err) => ExitOutcome::Failure(err),
        Ok(ExitStatus::Success) => match read_error.or(input_error) {
            Some(err) => ExitOutcome::Failure(err),
            None => ExitOutcome::Success,
        },
        Ok(status) => ExitOutcome::from_status(status),
    }
}

/// Log the process execution result
fn log_result(
    program: &str,
    status: &Result<ExitStatus, ProcessError>,
    lines: usize,
    duration: Duration,
) {
    match status {
        Ok(ExitStatus::Success) => {
            tracing::debug!(
                "'{}' completed successfully in {:?} ({} lines)",
                program,
                duration,
                lines
            );
        }
        Ok(ExitStatus::Error(code)) => {
            tracing::debug!(
                "'{}' failed with exit code {} in {:?} ({} lines)",
                program,
                code,
                duration,
                lines
            );
        }
        Ok(ExitStatus::Signal(signal)) => {
            tracing::warn!(
                "'{}' terminated by signal {} in {:?}",
                program,
                signal,
                duration
            );
        }
        Err(err) => tracing::warn!("'{}' exit status unavailable: {}", program, err),
    }
}
