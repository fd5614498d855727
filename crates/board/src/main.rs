use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripboard_board::{BoardConfig, BoardController};
use tripboard_core::SystemClock;
use tripboard_remote::HttpPointsApi;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripboard_board=debug,tripboard_remote=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(api_url = %config.api_url, "Loaded board configuration");

    // --- Backend client ---
    let api = match HttpPointsApi::new(
        config.api_url.clone(),
        config.authorization.clone(),
        config.request_timeout,
    ) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build backend client");
            return ExitCode::FAILURE;
        }
    };

    // --- Board ---
    let board = BoardController::from_config(Arc::new(api), &config, &SystemClock);
    board.load().await;

    let snapshot = board.snapshot().await;
    tracing::info!(
        items = snapshot.items.len(),
        message = snapshot.message.unwrap_or_default(),
        trip = snapshot.trip.as_ref().map(|t| t.title.as_str()).unwrap_or_default(),
        "Board loaded",
    );

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize board snapshot");
            ExitCode::FAILURE
        }
    }
}
