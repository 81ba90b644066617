use async_trait::async_trait;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

use super::error::ProcessError;
use super::runner::{
    ExitStatus, InputWriter, ProcessCommand, ProcessHandle, ProcessRunner,
};

/// In-memory process runner that replays scripted output chunks.
#[derive(Clone)]
pub struct MockProcessRunner {
    expectations: Arc<Mutex<Vec<MockExpectation>>>,
    call_history: Arc<Mutex<Vec<ProcessCommand>>>,
    inputs: Arc<Mutex<Vec<Vec<u8>>>>,
}

struct MockExpectation {
    program: String,
    #[allow(clippy::type_complexity)]
    args_matcher: Option<Box<dyn Fn(&[String]) -> bool + Send + Sync>>,
    response: MockResponse,
    times_called: usize,
    expected_times: Option<usize>,
}

#[derive(Clone)]
enum MockResponse {
    Spawned {
        stdout: Vec<Vec<u8>>,
        stderr: Vec<Vec<u8>>,
        stdout_error: Option<io::ErrorKind>,
        status: ExitStatus,
    },
    SpawnError(io::ErrorKind),
}

pub struct MockCommandConfig {
    runner: MockProcessRunner,
    expectation: MockExpectation,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn expect_command(&mut self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            expectation: MockExpectation {
                program: program.to_string(),
                args_matcher: None,
                response: MockResponse::Spawned {
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    stdout_error: None,
                    status: ExitStatus::Success,
                },
                times_called: 0,
                expected_times: None,
            },
        }
    }

    pub fn verify_called(&self, program: &str, times: usize) -> bool {
        let history = self.call_history.lock().unwrap();
        let count = history.iter().filter(|cmd| cmd.program == program).count();
        count == times
    }

    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        self.call_history.lock().unwrap().clone()
    }

    /// Bytes written to stdin of every spawned process with a payload, in
    /// spawn order.
    pub fn received_inputs(&self) -> Vec<String> {
        self.inputs
            .lock()
            .unwrap()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    pub fn reset(&mut self) {
        self.expectations.lock().unwrap().clear();
        self.call_history.lock().unwrap().clear();
        self.inputs.lock().unwrap().clear();
    }

    fn recording_writer(&self) -> InputWriter {
        let mut inputs = self.inputs.lock().unwrap();
        inputs.push(Vec::new());
        Box::new(RecordingWriter {
            inputs: Arc::clone(&self.inputs),
            index: inputs.len() - 1,
        })
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn spawn(&self, command: &ProcessCommand) -> Result<ProcessHandle, ProcessError> {
        self.call_history.lock().unwrap().push(command.clone());

        let response = {
            let mut expectations = self.expectations.lock().unwrap();
            let mut matched = None;

            for expectation in expectations.iter_mut() {
                if expectation.program != command.program {
                    continue;
                }

                if let Some(ref args_matcher) = expectation.args_matcher {
                    if !(args_matcher)(&command.args) {
                        continue;
                    }
                }

                expectation.times_called += 1;

                if let Some(expected) = expectation.expected_times {
                    if expectation.times_called > expected {
                        return Err(ProcessError::MockExpectationNotMet(format!(
                            "Command '{}' called {} times, expected {}",
                            command.program, expectation.times_called, expected
                        )));
                    }
                }

                matched = Some(expectation.response.clone());
                break;
            }

            matched.ok_or_else(|| {
                ProcessError::MockExpectationNotMet(format!(
                    "No expectation found for command: {} {:?}",
                    command.program, command.args
                ))
            })?
        };

        match response {
            MockResponse::SpawnError(io::ErrorKind::NotFound) => {
                Err(ProcessError::CommandNotFound(command.program.clone()))
            }
            MockResponse::SpawnError(kind) => Err(ProcessError::SpawnFailed {
                command: command.display(),
                source: io::Error::from(kind),
            }),
            MockResponse::Spawned {
                stdout,
                stderr,
                stdout_error,
                status,
            } => Ok(ProcessHandle {
                program: command.program.clone(),
                stdin: command.stdin.as_ref().map(|_| self.recording_writer()),
                stdout: Box::pin(futures::stream::iter(
                    stdout.into_iter().map(Ok).chain(
                        stdout_error
                            .map(|kind| Err(ProcessError::io("stdout", io::Error::from(kind)))),
                    ),
                )),
                stderr: Box::pin(futures::stream::iter(stderr.into_iter().map(Ok))),
                status: Box::pin(futures::future::ready(Ok(status))),
            }),
        }
    }
}

impl MockCommandConfig {
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.expectation.args_matcher = Some(Box::new(matcher));
        self
    }

    /// Deliver stdout as exactly these chunks, in order
    pub fn returns_stdout_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        if let MockResponse::Spawned { stdout, .. } = &mut self.expectation.response {
            *stdout = chunks.into_iter().map(|c| c.as_ref().to_vec()).collect();
        }
        self
    }

    pub fn returns_stdout(self, stdout: &str) -> Self {
        self.returns_stdout_chunks([stdout])
    }

    /// Fail the stdout pipe with `kind` after the scripted chunks
    pub fn returns_stdout_error(mut self, kind: io::ErrorKind) -> Self {
        if let MockResponse::Spawned { stdout_error, .. } = &mut self.expectation.response {
            *stdout_error = Some(kind);
        }
        self
    }

    pub fn returns_stderr(mut self, text: &str) -> Self {
        if let MockResponse::Spawned { stderr, .. } = &mut self.expectation.response {
            *stderr = vec![text.as_bytes().to_vec()];
        }
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        if let MockResponse::Spawned { status, .. } = &mut self.expectation.response {
            *status = if code == 0 {
                ExitStatus::Success
            } else {
                ExitStatus::Error(code)
            };
        }
        self
    }

    pub fn returns_signal(mut self, signal: i32) -> Self {
        if let MockResponse::Spawned { status, .. } = &mut self.expectation.response {
            *status = ExitStatus::Signal(signal);
        }
        self
    }

    pub fn fails_to_spawn(mut self, kind: io::ErrorKind) -> Self {
        self.expectation.response = MockResponse::SpawnError(kind);
        self
    }

    pub fn times(mut self, n: usize) -> Self {
        self.expectation.expected_times = Some(n);
        self
    }

    pub fn finish(self) {
        self.runner
            .expectations
            .lock()
            .unwrap()
            .push(self.expectation);
    }
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Stdin stand-in that appends everything written to the runner's log
struct RecordingWriter {
    inputs: Arc<Mutex<Vec<Vec<u8>>>>,
    index: usize,
}

impl AsyncWrite for RecordingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut inputs = self
            .inputs
            .lock()
            .map_err(|_| io::Error::other("input log poisoned"))?;
        inputs[self.index].extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
