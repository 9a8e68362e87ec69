use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medtrack::api::{create_router, AppState};
use medtrack::config::Config;
use medtrack::db::{Database, LibSqlBackend};
use medtrack::llm::LlmProvider;
use medtrack::notify::{MessageTransport, TelegramTransport};

#[derive(Parser)]
#[command(name = "medtrack")]
#[command(about = "Self-hostable medication course tracker")]
struct Args {
    /// Overrides MEDTRACK_HOST
    #[arg(long)]
    host: Option<String>,

    /// Overrides MEDTRACK_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medtrack=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.server.api_keys.is_empty() {
        tracing::warn!("MEDTRACK_API_KEYS is not set, protected endpoints are locked.");
    }

    tracing::info!("Initializing database...");
    let db = Database::new(&config.database).await?;
    let backend = Arc::new(LibSqlBackend::new(db.clone()));

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - prescription scans and generated drug info are disabled");
    }

    if config.drug_registry.is_none() {
        tracing::warn!("DRUG_REGISTRY_API_KEY is not set - registry lookups are disabled");
    }

    let transport = TelegramTransport::from_config(&config.notifications)?
        .map(|t| Arc::new(t) as Arc<dyn MessageTransport>);
    if transport.is_none() {
        tracing::info!("Push delivery disabled - notifications go to the inbox only");
    }

    let state = AppState::new(config.clone(), backend, llm, transport)?;

    let cancel_token = CancellationToken::new();

    if config.database.is_replica() {
        let interval = Duration::from_secs(config.database.sync_interval_secs.max(1));
        tracing::info!("Starting replica sync every {}s...", interval.as_secs());
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Replica sync shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if let Err(e) = db.sync().await {
                            tracing::error!("Replica sync error: {}", e);
                        }
                    }
                }
            }
        });
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Medtrack starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI document: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
