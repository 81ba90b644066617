//! Stream processor trait and implementations

use super::types::{ExitOutcome, StreamEvent, StreamSource};
use anyhow::Result;
use std::io::Write;
use tokio::sync::mpsc;

/// Consumer of an invocation's output.
///
/// Calls happen synchronously on the task that reads the process pipes, so
/// an implementation that blocks stalls delivery of later output. Every
/// `process_line` call happens before `on_complete`, which is called exactly
/// once.
pub trait StreamProcessor: Send {
    /// Handle one completed stdout line, terminator stripped
    fn process_line(&mut self, line: &str) -> Result<()>;

    /// Handle one line of stderr output
    fn process_diagnostic(&mut self, _line: &str) -> Result<()> {
        Ok(())
    }

    /// Handle the terminal outcome
    fn on_complete(&mut self, _outcome: &ExitOutcome) -> Result<()> {
        Ok(())
    }
}

/// Adapts a plain line callback
pub struct CallbackProcessor<F> {
    callback: F,
}

impl<F> CallbackProcessor<F>
where
    F: FnMut(&str) + Send,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> StreamProcessor for CallbackProcessor<F>
where
    F: FnMut(&str) + Send,
{
    fn process_line(&mut self, line: &str) -> Result<()> {
        (self.callback)(line);
        Ok(())
    }
}

/// Simple logging processor for debugging
pub struct LoggingProcessor {
    prefix: String,
}

impl LoggingProcessor {
    /// Create a new logging processor
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl StreamProcessor for LoggingProcessor {
    fn process_line(&mut self, line: &str) -> Result<()> {
        tracing::debug!("[{} stdout]: {}", self.prefix, line);
        Ok(())
    }

    fn process_diagnostic(&mut self, line: &str) -> Result<()> {
        tracing::debug!("[{} stderr]: {}", self.prefix, line);
        Ok(())
    }

    fn on_complete(&mut self, outcome: &ExitOutcome) -> Result<()> {
        match outcome {
            ExitOutcome::Success => tracing::debug!("[{}] completed successfully", self.prefix),
            ExitOutcome::Failure(err) => tracing::warn!("[{}] failed: {}", self.prefix, err),
        }
        Ok(())
    }
}

/// Keeps everything in memory
#[derive(Debug, Default)]
pub struct CollectingProcessor {
    pub lines: Vec<String>,
    pub diagnostics: Vec<String>,
    pub completions: usize,
}

impl CollectingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected answer, joined and trimmed
    pub fn text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }
}

impl StreamProcessor for CollectingProcessor {
    fn process_line(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn process_diagnostic(&mut self, line: &str) -> Result<()> {
        self.diagnostics.push(line.to_string());
        Ok(())
    }

    fn on_complete(&mut self, _outcome: &ExitOutcome) -> Result<()> {
        self.completions += 1;
        Ok(())
    }
}

/// Forwards events to an async consumer
pub struct ChannelProcessor {
    event_sender: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelProcessor {
    pub fn new(event_sender: mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self { event_sender }
    }

    fn send(&self, event: StreamEvent) -> Result<()> {
        self.event_sender
            .send(event)
            .map_err(|e| anyhow::anyhow!("Failed to send stream event: {}", e))
    }
}

impl StreamProcessor for ChannelProcessor {
    fn process_line(&mut self, line: &str) -> Result<()> {
        self.send(StreamEvent::Line {
            text: line.to_string(),
        })
    }

    fn process_diagnostic(&mut self, line: &str) -> Result<()> {
        self.send(StreamEvent::Diagnostic {
            text: line.to_string(),
        })
    }

    fn on_complete(&mut self, outcome: &ExitOutcome) -> Result<()> {
        self.send(StreamEvent::completed(outcome))
    }
}

/// Writes one channel's lines to a writer as they arrive
pub struct WriterProcessor<W> {
    writer: W,
    source: StreamSource,
    prefix: Option<String>,
}

impl<W: Write + Send> WriterProcessor<W> {
    pub fn new(writer: W, source: StreamSource) -> Self {
        Self {
            writer,
            source,
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        if let Some(prefix) = &self.prefix {
            write!(self.writer, "{}", prefix)?;
        }
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> StreamProcessor for WriterProcessor<W> {
    fn process_line(&mut self, line: &str) -> Result<()> {
        if self.source == StreamSource::Stdout {
            self.write_line(line)?;
        }
        Ok(())
    }

    fn process_diagnostic(&mut self, line: &str) -> Result<()> {
        if self.source == StreamSource::Stderr {
            self.write_line(line)?;
        }
        Ok(())
    }
}

/// Writes every event as one JSON object per line
pub struct JsonLinesProcessor<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesProcessor<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, event: &StreamEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> StreamProcessor for JsonLinesProcessor<W> {
    fn process_line(&mut self, line: &str) -> Result<()> {
        self.emit(&StreamEvent::Line {
            text: line.to_string(),
        })
    }

    fn process_diagnostic(&mut self, line: &str) -> Result<()> {
        self.emit(&StreamEvent::Diagnostic {
            text: line.to_string(),
        })
    }

    fn on_complete(&mut self, outcome: &ExitOutcome) -> Result<()> {
        self.emit(&StreamEvent::completed(outcome))
    }
}

/// Hands every call to each inner processor in turn
///
/// A failing processor does not stop the others; the first error is
/// returned after all have been called.
#[derive(Default)]
pub struct FanOutProcessor<'a> {
    processors: Vec<&'a mut dyn StreamProcessor>,
}

impl<'a> FanOutProcessor<'a> {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    pub fn with(mut self, processor: &'a mut dyn StreamProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    fn each<F>(&mut self, mut call: F) -> Result<()>
    where
        F: FnMut(&mut dyn StreamProcessor) -> Result<()>,
    {
        let mut first_error = None;
        for processor in self.processors.iter_mut() {
            if let Err(e) = call(&mut **processor) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl StreamProcessor for FanOutProcessor<'_> {
    fn process_line(&mut self, line: &str) -> Result<()> {
        self.each(|p| p.process_line(line))
    }

    fn process_diagnostic(&mut self, line: &str) -> Result<()> {
        self.each(|p| p.process_diagnostic(line))
    }

    fn on_complete(&mut self, outcome: &ExitOutcome) -> Result<()> {
        self.each(|p| p.on_complete(outcome))
    }
}
