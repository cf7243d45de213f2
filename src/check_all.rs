use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use teewatch_monitor::{
    build_runner, config::MonitorConfig, runner::RunSummary, status::StatusBoard,
};
use teewatch_store::create_store;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = MonitorConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(data_file = %config.data_file.display(), "Starting scheduled check run");

    let store = create_store(config.data_file.clone());
    let board = StatusBoard::new();
    let runner = build_runner(&config, store, Arc::new(board.clone()))?;

    let results = runner.check_all_active().await;
    for (id, _) in &results {
        if let Some(status) = board.latest(id) {
            info!(request_id = %id, kind = ?status.kind, "{}", status.message);
        }
    }

    let summary = RunSummary::from_results(&results);
    if summary.errored > 0 {
        warn!(errored = summary.errored, "Some checks did not complete");
    }
    info!(
        checked = summary.checked,
        with_matches = summary.with_matches,
        errored = summary.errored,
        skipped = summary.skipped,
        "Scheduled check run finished"
    );

    Ok(())
}
