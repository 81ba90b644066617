use clap::Parser;
use llmpipe::app::{handle_fatal_error, init_logging, AppConfig};
use llmpipe::cli::{execute_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app_config = AppConfig::new(cli.verbose);
    init_logging(&app_config);

    if let Err(e) = execute_command(cli).await {
        handle_fatal_error(e, app_config.verbose);
    }
}
