//! Streaming through the public API against real processes

use llmpipe::subprocess::streaming::{ChannelProcessor, StreamEvent};
use llmpipe::subprocess::ProcessCommandBuilder;
use llmpipe::{ExitOutcome, StreamProcessor, StreamingCommandRunner};
use std::time::{Duration, Instant};

/// Records when each line arrived relative to the start of the run
struct Timestamped {
    start: Instant,
    arrivals: Vec<(String, Duration)>,
    outcome: Option<bool>,
}

impl StreamProcessor for Timestamped {
    fn process_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.arrivals.push((line.to_string(), self.start.elapsed()));
        Ok(())
    }

    fn on_complete(&mut self, outcome: &ExitOutcome) -> anyhow::Result<()> {
        self.outcome = Some(outcome.is_success());
        Ok(())
    }
}

#[tokio::test]
async fn test_lines_arrive_before_process_exits() {
    let runner = StreamingCommandRunner::production();
    let mut processor = Timestamped {
        start: Instant::now(),
        arrivals: Vec::new(),
        outcome: None,
    };

    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo early; sleep 1; echo late"])
        .build();
    let report = runner.run(command, &mut processor).await;

    assert!(report.success());
    assert_eq!(processor.outcome, Some(true));
    let lines: Vec<_> = processor.arrivals.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(lines, vec!["early", "late"]);
    assert!(processor.arrivals[0].1 < processor.arrivals[1].1);
    assert!(processor.arrivals[0].1 < report.duration);
}

#[tokio::test]
async fn test_channel_processor_delivers_events_in_order() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let runner = StreamingCommandRunner::production();

    let handle = tokio::spawn(async move {
        let mut processor = ChannelProcessor::new(tx);
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "printf 'a\\nb'; exit 4"])
            .build();
        runner.run(command, &mut processor).await
    });

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    let report = handle.await.unwrap();

    assert_eq!(report.outcome.exit_code(), Some(4));
    assert_eq!(
        events,
        vec![
            StreamEvent::Line {
                text: "a".to_string()
            },
            StreamEvent::Line {
                text: "b".to_string()
            },
            StreamEvent::Completed {
                success: false,
                exit_code: Some(4),
                error: Some("Process exited with code 4".to_string()),
            },
        ]
    );
}

#[tokio::test]
async fn test_multibyte_characters_survive_chunking() {
    let runner = StreamingCommandRunner::production();
    let mut lines = Vec::new();
    let mut processor = llmpipe::subprocess::streaming::CallbackProcessor::new(|line: &str| {
        lines.push(line.to_string())
    });

    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "printf '\\342\\200'; sleep 0.2; printf '\\224 done\\n'"])
        .build();
    let report = runner.run(command, &mut processor).await;

    assert!(report.success());
    drop(processor);
    assert_eq!(lines, vec!["\u{2014} done"]);
}
