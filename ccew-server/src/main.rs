//! CCEW relay server — HTTP shell around the `ccew-core` engine.

use axum::routing::{get, post};
use axum::Router;
use ccew_core::{CcewEngine, CertificateDispatcher, MemoryStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod mail;
mod pdf;
mod render;
mod routes;

use config::ServerConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ccew_server=info,ccew_core=info,tower_http=info".into()),
        )
        .init();
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    let dispatcher: Arc<dyn CertificateDispatcher> = match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, "dispatching certificates via SMTP");
            Arc::new(mail::SmtpCertificateDispatcher::new(smtp)?)
        }
        None => {
            info!("no SMTP relay configured, using log-only dispatch");
            Arc::new(mail::LogOnlyDispatcher)
        }
    };

    let engine = Arc::new(CcewEngine::new(
        Arc::new(MemoryStore::new()),
        Arc::new(pdf::PdfCertificateRenderer),
        dispatcher,
    ));

    let state = AppState {
        engine,
        public_base_url: config.public_base_url.clone(),
    };
    let app = create_router(state);

    info!(addr = %config.bind_addr, "starting CCEW relay server");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::status))
        .route("/api/ccew/generate", post(routes::generate))
        .route("/form/:session_id", get(routes::show_form))
        .route("/api/ccew/submit/:session_id", post(routes::submit))
        .route("/success", get(routes::success))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
