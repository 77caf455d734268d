use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use civic_server::config::Config;
use civic_server::seed::seed_if_empty;
use civic_server::session::SessionSettings;
use civic_server::{app_router, AppState, CivicRepository, SqliteRepository};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

fn cors_layer(client_url: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(client_url)
        .with_context(|| format!("CLIENT_URL is not a valid origin: {}", client_url))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Delete expired sessions once an hour.
async fn session_purge_loop(repository: Arc<dyn CivicRepository>) {
    let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
    loop {
        interval.tick().await;
        match repository.purge_expired_sessions(Utc::now()).await {
            Ok(0) => {}
            Ok(purged) => info!("Purged {} expired sessions", purged),
            Err(e) => error!("Failed to purge expired sessions: {}", e),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting CivicMoncho API {}", civic_server::get_server_version());

    let config = Config::from_env().context("Failed to load configuration from environment")?;

    let db_path = config.database_path();
    info!("Using state database: {}", db_path.display());
    let repository: Arc<dyn CivicRepository> = Arc::new(
        SqliteRepository::new(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?,
    );

    if config.seed_on_start {
        seed_if_empty(repository.as_ref())
            .await
            .context("Failed to seed database")?;
    }

    info!(
        client_url = %config.client_url,
        session_ttl_hours = config.session_ttl_hours,
        cookie_secure = config.cookie_secure,
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(
        repository.clone(),
        SessionSettings::new(config.session_ttl_hours, config.cookie_secure),
    ));

    let app = app_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.client_url)?),
    );

    tokio::spawn(session_purge_loop(repository));

    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
