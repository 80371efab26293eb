use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use focusflow_core::{ExtractOnly, Settings};
use focusflow_core::config_file;
use focusflow_pdf_mupdf::MupdfBackend;

mod error;
mod handlers;
mod routes;
mod state;
mod upload;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::resolve(&config_file::load_config(), |key| std::env::var(key).ok());

    let state = Arc::new(AppState {
        backend: Arc::new(MupdfBackend::new()),
        chunker: Arc::new(ExtractOnly),
        extraction_timeout: settings.extraction_timeout,
    });

    let cors = routes::cors_layer(&settings.allowed_origins)?;
    let app = routes::build_router(state, cors, settings.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        origins = ?settings.allowed_origins,
        timeout = ?settings.extraction_timeout,
        "FocusFlow API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
