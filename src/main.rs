mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use content_api::ContentApi;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv(); // load .env if present

    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match commands::build_config(&cli, commands::Env::load()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        endpoint = %config.endpoint,
        role = ?config.role,
        authenticated = config.bearer_token.is_some(),
        "content-api starting"
    );

    let api = match ContentApi::new(config) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "failed to build client");
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = commands::run(&cli, &api, &mut out).await {
        tracing::error!(error = %e, "request failed");
        std::process::exit(1);
    }
}
