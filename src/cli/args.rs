//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stream a local model's answer line by line
#[derive(Parser, Debug)]
#[command(name = "llmpipe")]
#[command(about = "llmpipe - Stream the output of a local model program line by line", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt to the configured model and stream the answer
    #[command(name = "ask")]
    Ask {
        /// Prompt text; multiple words are joined with spaces
        #[arg(required = true, value_name = "PROMPT")]
        prompt: Vec<String>,

        /// Model identifier substituted for {model}
        #[arg(short, long)]
        model: Option<String>,

        /// Model program to invoke instead of the configured one
        #[arg(short, long)]
        program: Option<String>,

        /// Echo the program's stderr while streaming
        #[arg(long)]
        show_stderr: bool,
    },

    /// Run any program and stream its output line by line
    #[command(name = "run")]
    Run {
        /// Text written to the program's stdin, followed by a newline
        #[arg(long, value_name = "TEXT")]
        input: Option<String>,

        /// Emit one JSON event per line instead of plain text
        #[arg(long)]
        json: bool,

        /// Program to execute
        program: String,

        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the resolved configuration as TOML
    #[command(name = "config")]
    Config {
        /// Print the default configuration file location instead
        #[arg(long)]
        path: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["llmpipe", "-vv", "ask", "why", "is", "the", "sky", "blue"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { prompt, model, .. } => {
                assert_eq!(prompt.join(" "), "why is the sky blue");
                assert!(model.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_keeps_program_flags() {
        let cli = Cli::parse_from(["llmpipe", "run", "--input", "hi", "sh", "-c", "cat -n"]);
        match cli.command {
            Commands::Run {
                program,
                args,
                input,
                json,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(args, vec!["-c", "cat -n"]);
                assert_eq!(input.as_deref(), Some("hi"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["llmpipe", "ask"]).is_err());
    }
}
