//! Prompt-to-answer front-end over the streaming runner
//!
//! A `ChatClient` renders the configured argument template for one prompt,
//! runs the model program and streams its answer into a processor.

use crate::config::{ModelConfig, MODEL_PLACEHOLDER, PROMPT_PLACEHOLDER};
use crate::error::{LlmpipeError, Result};
use crate::subprocess::streaming::{
    CollectingProcessor, InvocationReport, StreamProcessor, StreamingCommandRunner,
};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder};

/// Shown to the user whenever a prompt could not be answered
pub const FALLBACK_MESSAGE: &str = "Error processing your request.";

#[derive(Clone)]
pub struct ChatClient {
    model: ModelConfig,
    runner: StreamingCommandRunner,
}

impl ChatClient {
    pub fn new(model: ModelConfig, runner: StreamingCommandRunner) -> Self {
        Self { model, runner }
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Build the invocation for `prompt`
    ///
    /// The prompt goes into every `{prompt}` placeholder; when the template
    /// has none it is sent on stdin instead.
    pub fn build_command(&self, prompt: &str) -> Result<ProcessCommand> {
        if prompt.trim().is_empty() {
            return Err(LlmpipeError::validation(
                "prompt must not be empty",
                Some("prompt".to_string()),
            ));
        }

        if self.model.program.trim().is_empty() {
            return Err(LlmpipeError::config("model program must not be empty"));
        }

        let args = self
            .model
            .args
            .iter()
            .map(|arg| render_arg(arg, &self.model.model, prompt));

        let builder = ProcessCommandBuilder::new(&self.model.program).args(args);
        let builder = if self.model.prompt_in_args() {
            builder
        } else {
            builder.stdin(prompt)
        };

        Ok(builder.build())
    }

    /// Stream the answer to `prompt` into `processor`
    ///
    /// Lines reach the processor as they arrive. A launch failure or a
    /// failing exit becomes an error; the last diagnostic line, if any, is
    /// attached as context.
    pub async fn ask(
        &self,
        prompt: &str,
        processor: &mut dyn StreamProcessor,
    ) -> Result<InvocationReport> {
        let command = self.build_command(prompt)?;
        tracing::debug!("Asking {} via {}", self.model.model, command.display());

        let report = self.runner.run(command, processor).await;
        if report.success() {
            return Ok(report);
        }

        let diagnostics = report.diagnostics.last().cloned();
        let err = match report.outcome.into_result() {
            Ok(()) => return Err(LlmpipeError::other("invocation failed without a cause")),
            Err(e) => LlmpipeError::from(e),
        };

        Err(match diagnostics {
            Some(last) if !last.trim().is_empty() => err.with_context(last.trim()),
            _ => err,
        })
    }

    /// Ask and return the whole answer once the program has finished
    pub async fn answer(&self, prompt: &str) -> Result<String> {
        let mut collector = CollectingProcessor::new();
        self.ask(prompt, &mut collector).await?;
        Ok(collector.text())
    }
}

fn render_arg(template: &str, model: &str, prompt: &str) -> String {
    template
        .replace(MODEL_PLACEHOLDER, model)
        .replace(PROMPT_PLACEHOLDER, prompt)
}
