use async_trait::async_trait;
use futures::stream::Stream;
use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::ProcessError;

/// Size of a single read from a child's output pipe.
pub const READ_CHUNK_SIZE: usize = 8_192;

#[derive(Debug, Clone, Default)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub stdin: Option<String>,
}

impl ProcessCommand {
    /// Program and arguments joined for log output
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

pub type ChunkStreamItem = Result<Vec<u8>, ProcessError>;
pub type ChunkStream = Pin<Box<dyn Stream<Item = ChunkStreamItem> + Send>>;
pub type StatusFuture = Pin<Box<dyn Future<Output = Result<ExitStatus, ProcessError>> + Send>>;
pub type InputWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A running child process.
///
/// Owns the input writer, the raw output channels and the exit status. The
/// output streams yield chunks exactly as the pipe delivers them; chunk
/// boundaries carry no meaning.
pub struct ProcessHandle {
    pub program: String,
    pub stdin: Option<InputWriter>,
    pub stdout: ChunkStream,
    pub stderr: ChunkStream,
    pub status: StatusFuture,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Start the process. Fails only when the OS refuses to launch it.
    async fn spawn(&self, command: &ProcessCommand) -> Result<ProcessHandle, ProcessError>;
}

/// Write the input payload, terminated by a newline, then close the channel.
///
/// A child that exits without reading its input closes the pipe under us;
/// that is reported through its exit status, not here.
pub async fn write_input(
    stdin: Option<InputWriter>,
    payload: Option<&str>,
) -> Result<(), ProcessError> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };

    if let Some(payload) = payload {
        let written = async {
            stdin.write_all(payload.as_bytes()).await?;
            if !payload.ends_with('\n') {
                stdin.write_all(b"\n").await?;
            }
            stdin.flush().await
        }
        .await;

        match written {
            Ok(()) => tracing::trace!("Wrote {} bytes to stdin", payload.len()),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("Process closed stdin before reading the whole payload");
                return Ok(());
            }
            Err(e) => return Err(ProcessError::io("stdin", e)),
        }
    }

    match stdin.shutdown().await {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(ProcessError::io("stdin", e)),
        _ => Ok(()),
    }
}

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Create a chunk stream from a raw pipe
    fn create_chunk_stream<R>(reader: R, channel: &'static str) -> ChunkStream
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Box::pin(futures::stream::unfold(
            Some(reader),
            move |state| async move {
                let mut reader = state?;
                let mut buf = vec![0u8; READ_CHUNK_SIZE];
                loop {
                    match reader.read(&mut buf).await {
                        Ok(0) => return None,
                        Ok(n) => {
                            buf.truncate(n);
                            return Some((Ok(buf), Some(reader)));
                        }
                        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                        // Yield the error once, then end the stream.
                        Err(e) => return Some((Err(ProcessError::io(channel, e)), None)),
                    }
                }
            },
        ))
    }

    /// Create a status future that resolves when the child exits
    fn create_status_future(mut child: tokio::process::Child, command: String) -> StatusFuture {
        Box::pin(async move {
            match child.wait().await {
                Ok(status) => Ok(Self::parse_exit_status(status)),
                Err(e) => {
                    tracing::error!("Failed to wait for '{}': {}", command, e);
                    Err(ProcessError::io("wait", e))
                }
            }
        })
    }

    /// Convert process exit status to our ExitStatus enum
    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    /// Parse signal status on Unix systems
    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            ExitStatus::Signal(signal)
        } else {
            ExitStatus::Error(1)
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    /// Log command execution details
    fn log_command_start(command: &ProcessCommand) {
        tracing::debug!("Executing subprocess: {}", command.display());

        if !command.env.is_empty() {
            tracing::trace!("Environment overrides: {:?}", command.env.keys());
        }

        if let Some(ref dir) = command.working_dir {
            tracing::trace!("Working directory: {:?}", dir);
        }

        if let Some(ref stdin) = command.stdin {
            tracing::trace!("Stdin provided: {} bytes", stdin.len());
        }
    }

    /// Configure the command with environment, working directory and pipes
    fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);

        for (key, value) in &command.env {
            cmd.env(key, value);
        }

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        if command.stdin.is_some() {
            cmd.stdin(std::process::Stdio::piped());
        } else {
            cmd.stdin(std::process::Stdio::null());
        }
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        // Dropping an in-flight invocation must not leak the child.
        cmd.kill_on_drop(true);
        cmd
    }

    /// Map spawn error to ProcessError
    fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
        tracing::debug!(
            "Failed to spawn '{}': {} (kind: {:?})",
            command.program,
            error,
            error.kind()
        );

        if error.kind() == ErrorKind::NotFound {
            ProcessError::CommandNotFound(command.program.clone())
        } else {
            ProcessError::SpawnFailed {
                command: command.display(),
                source: error,
            }
        }
    }

    /// Extract a stream from a child process, converting None to error
    fn extract_stream<T>(stream: Option<T>, stream_name: &str) -> Result<T, ProcessError> {
        stream.ok_or_else(|| ProcessError::InternalError {
            message: format!("Failed to capture {}", stream_name),
        })
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn spawn(&self, command: &ProcessCommand) -> Result<ProcessHandle, ProcessError> {
        Self::log_command_start(command);

        let mut child = Self::configure_command(command)
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, command))?;

        tracing::debug!("Spawned '{}' (pid {:?})", command.program, child.id());

        let stdin = child
            .stdin
            .take()
            .map(|stdin| Box::new(stdin) as InputWriter);
        let stdout = Self::extract_stream(child.stdout.take(), "stdout")?;
        let stderr = Self::extract_stream(child.stderr.take(), "stderr")?;

        Ok(ProcessHandle {
            program: command.program.clone(),
            stdin,
            stdout: Self::create_chunk_stream(stdout, "stdout"),
            stderr: Self::create_chunk_stream(stderr, "stderr"),
            status: Self::create_status_future(child, command.display()),
        })
    }
}
