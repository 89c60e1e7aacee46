mod apidoc;
mod config;
mod credential;
mod error;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod testutils;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use config::Config;
use credential::{EnvToken, TokenSource};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub http: reqwest::Client,
    pub tokens: Arc<dyn TokenSource>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env first, so RUST_LOG from it reaches the filter
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env().inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    let tokens: Arc<dyn TokenSource> = Arc::new(EnvToken::new(cfg.token_var.clone()));
    if credential::present(tokens.token()).is_none() {
        warn!("{} is not set; /query will fail until it is", cfg.token_var);
    }

    // Compute before moving state anywhere
    let addr = format!("{}:{}", cfg.app_host, cfg.app_port);
    info!(
        langflow_id = %cfg.langflow_id,
        flow_id = %cfg.flow_id,
        timeout = ?cfg.timeout,
        "Configuration loaded"
    );

    let state = AppState {
        cfg,
        http: reqwest::Client::new(),
        tokens,
    };
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Langflow relay listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cfg.cors_allowed_origins);
    Router::new()
        .route("/", get(routes::health::health))
        .route("/query", post(routes::query::query))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", apidoc::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
