pub mod api;
pub mod config;
pub mod feedback;
pub mod pipeline;
pub mod secrets;
pub mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::Settings;
use crate::feedback::WebhookReporter;
use crate::pipeline::{OpenAiClient, Simplifier, WhatlangDetector};
use crate::secrets::ApiKeyResolver;
use crate::session::SessionStore;

/// Load variables from a `.env` file into the process environment.
///
/// `None` searches the working directory and its parents. Variables already
/// set in the environment are left alone. Returns the file that was loaded.
pub fn load_dotenv(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

pub fn run() -> anyhow::Result<()> {
    // Before parsing, so `.env` can carry SIMPLIFIER_* settings as well as the key
    let dotenv = load_dotenv(None);
    let settings = Settings::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    if let Some(path) = &dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    // Blocking HTTP clients own a runtime internally; build them before ours starts.
    let completion = OpenAiClient::new(&settings.provider_url, settings.provider_timeout_secs)
        .context("building completion client")?;
    let reporter = WebhookReporter::new(&settings.feedback_url);
    let keys = ApiKeyResolver::from_env_and_file(settings.secrets_file.clone());
    if keys.resolve().is_err() {
        tracing::warn!(
            secrets_file = %settings.secrets_file.display(),
            "{} not configured; submissions will fail until it is set",
            config::API_KEY_NAME
        );
    }

    let state = AppState::new(
        SessionStore::new(
            Duration::from_secs(settings.session_idle_secs),
            settings.max_sessions,
        ),
        Simplifier::new(Arc::new(completion), Arc::new(WhatlangDetector), keys),
        Arc::new(reporter),
    );

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(async move {
        let mut server = api::start_server(settings.bind, state)
            .await
            .map_err(anyhow::Error::msg)?;
        tracing::info!(addr = %server.addr, "Open http://{} in a browser", server.addr);

        tokio::signal::ctrl_c()
            .await
            .context("waiting for shutdown signal")?;
        tracing::info!("Shutdown requested");
        server.shutdown();
        server.wait().await;
        Ok(())
    })
}
