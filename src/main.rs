use clap::Parser;
use color_eyre::eyre::Result;
use dotenv::dotenv;
use teewatch_monitor::config::MonitorConfig;
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = MonitorConfig::from_env()?;

    // Initialize logging; stdout is left to command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    App::new(config).run(cli.command).await
}
