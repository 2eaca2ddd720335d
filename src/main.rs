use phaws_core::{BotConfig, CoreError, ErrorReporter, PostResult};
use post_service::{build_selector, load_pool, PostService, STARTUP_DELAY};
use reddit_client::RedditConnector;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "phaws_reddit_bot=info,post_service=info,reddit_client=info,phaws_core=info";

#[tokio::main]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tokio::time::sleep(STARTUP_DELAY).await;

    tracing::info!("[bot] Starting Phaws Reddit bot run...");
    match run().await {
        Ok(_) => {
            tracing::info!("[bot] Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            ErrorReporter::new().report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<PostResult, CoreError> {
    let config = BotConfig::from_env()?;
    let pool = load_pool(&config)?;
    let mut selector = build_selector(&config, pool)?;

    PostService::new(RedditConnector::new())
        .run(&config, &mut selector)
        .await
}
