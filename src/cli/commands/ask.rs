//! `llmpipe ask`: stream a model's answer to stdout

use crate::chat::{ChatClient, FALLBACK_MESSAGE};
use crate::config::{Config, ConfigLoader};
use crate::error::LlmpipeError;
use crate::subprocess::streaming::{
    FanOutProcessor, LoggingProcessor, StreamSource, StreamingCommandRunner, WriterProcessor,
};
use anyhow::Result;
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    pub prompt: String,
    pub model: Option<String>,
    pub program: Option<String>,
    pub show_stderr: bool,
    pub config_path: Option<PathBuf>,
}

impl AskOptions {
    /// Command-line flags win over file and environment settings
    fn apply_to(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model.model = model.clone();
        }
        if let Some(program) = &self.program {
            config.model.program = program.clone();
        }
        if self.show_stderr {
            config.stream.show_diagnostics = true;
        }
    }
}

pub async fn run_ask(options: AskOptions) -> Result<()> {
    let mut config = ConfigLoader::new()
        .load(options.config_path.as_deref())
        .await?;
    options.apply_to(&mut config);

    let client = ChatClient::new(config.model, StreamingCommandRunner::production());

    let mut display = WriterProcessor::new(io::stdout(), StreamSource::Stdout);
    if let Some(prefix) = config.stream.prefix {
        display = display.with_prefix(prefix);
    }
    let mut logging = LoggingProcessor::new(client.model().model.clone());
    let mut echo = config
        .stream
        .show_diagnostics
        .then(|| WriterProcessor::new(io::stderr(), StreamSource::Stderr));

    let mut processor = FanOutProcessor::new().with(&mut display).with(&mut logging);
    if let Some(echo) = echo.as_mut() {
        processor = processor.with(echo);
    }

    match client.ask(&options.prompt, &mut processor).await {
        Ok(report) => {
            debug!(
                "Answer complete: {} lines in {:?}",
                report.lines_delivered, report.duration
            );
            Ok(())
        }
        Err(e) => {
            if !matches!(e, LlmpipeError::Validation { .. }) {
                eprintln!("{}", FALLBACK_MESSAGE);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::new();
        let options = AskOptions {
            model: Some("llama3.2".to_string()),
            program: Some("./fake-model".to_string()),
            show_stderr: true,
            ..Default::default()
        };

        options.apply_to(&mut config);
        assert_eq!(config.model.model, "llama3.2");
        assert_eq!(config.model.program, "./fake-model");
        assert!(config.stream.show_diagnostics);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = Config::new();
        AskOptions::default().apply_to(&mut config);
        assert_eq!(config, Config::new());
    }
}
