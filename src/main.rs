use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use helpai::infrastructure::llm::create_gemini_client;
use helpai::infrastructure::observability::{TracingConfig, init_tracing};
use helpai::infrastructure::persistence::InMemorySessionStore;
use helpai::infrastructure::text_processing::default_file_loader;
use helpai::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::new(&settings.logging, environment));

    let llm_client = Arc::new(
        create_gemini_client(&settings.llm)
            .context("Gemini client could not be configured (set llm.api_key or GOOGLE_API_KEY)")?,
    );
    tracing::info!(model = %llm_client.model(), "Gemini client ready");

    let host: std::net::IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server host: {}", settings.server.host))?;
    let addr = SocketAddr::new(host, settings.server.port);

    let session_store = Arc::new(InMemorySessionStore::with_max_sessions(
        settings.sessions.max_sessions,
    ));
    let state = AppState::new(
        llm_client,
        Arc::new(default_file_loader()),
        session_store,
        settings,
    );
    let shutdown = state.shutdown.clone();
    let router = create_router(state);

    tracing::info!(%addr, environment = %environment, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
