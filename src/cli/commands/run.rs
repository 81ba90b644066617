//! `llmpipe run`: stream any program's output line by line

use crate::error::LlmpipeError;
use crate::subprocess::streaming::{
    FanOutProcessor, JsonLinesProcessor, StreamSource, StreamingCommandRunner, WriterProcessor,
};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder};
use anyhow::Result;
use std::io;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub program: String,
    pub args: Vec<String>,
    pub input: Option<String>,
    pub json: bool,
}

impl RunOptions {
    fn command(&self) -> ProcessCommand {
        let builder = ProcessCommandBuilder::new(&self.program).args(&self.args);
        let builder = match &self.input {
            Some(input) => builder.stdin(input.as_str()),
            None => builder,
        };
        builder.build()
    }
}

pub async fn run_program(options: RunOptions) -> Result<()> {
    let runner = StreamingCommandRunner::production();
    let command = options.command();

    let report = if options.json {
        let mut events = JsonLinesProcessor::new(io::stdout());
        runner.run(command, &mut events).await
    } else {
        let mut stdout = WriterProcessor::new(io::stdout(), StreamSource::Stdout);
        let mut stderr = WriterProcessor::new(io::stderr(), StreamSource::Stderr);
        let mut processor = FanOutProcessor::new().with(&mut stdout).with(&mut stderr);
        runner.run(command, &mut processor).await
    };

    debug!(
        "'{}' finished: {} lines in {:?}",
        options.program, report.lines_delivered, report.duration
    );

    report
        .outcome
        .into_result()
        .map_err(|e| LlmpipeError::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_carries_input() {
        let options = RunOptions {
            program: "cat".to_string(),
            input: Some("hello".to_string()),
            ..Default::default()
        };
        let command = options.command();
        assert_eq!(command.program, "cat");
        assert!(command.args.is_empty());
        assert_eq!(command.stdin.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_failing_program_keeps_exit_code() {
        let err = run_program(RunOptions {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 7".to_string()],
            ..Default::default()
        })
        .await
        .unwrap_err();

        assert_eq!(crate::app::exit_code_for(&err), 7);
    }
}
