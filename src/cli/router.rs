//! Command routing and execution

use crate::cli::args::{Cli, Commands};
use crate::cli::commands::{run_ask, run_config, run_program, AskOptions, RunOptions};
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(cli: Cli) -> Result<()> {
    let config_path = cli.config;

    match cli.command {
        Commands::Ask {
            prompt,
            model,
            program,
            show_stderr,
        } => {
            run_ask(AskOptions {
                prompt: prompt.join(" "),
                model,
                program,
                show_stderr,
                config_path,
            })
            .await
        }
        Commands::Run {
            program,
            args,
            input,
            json,
        } => {
            run_program(RunOptions {
                program,
                args,
                input,
                json,
            })
            .await
        }
        Commands::Config { path } => run_config(config_path, path).await,
    }
}
