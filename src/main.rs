mod batch;
mod certificate;
mod config;
mod fonts;
mod pdf;
mod routes;
mod state;
mod storage;
mod templates;
mod workbook;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certgen=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    crate::storage::ensure_dirs(&config.upload_folder, &config.results_folder)?;
    tracing::info!(
        regular = %config.fonts.regular_path.display(),
        bold = %config.fonts.bold_path.display(),
        "using certificate fonts"
    );

    let state = Arc::new(state::AppState {
        config: config.clone(),
    });

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/generate", post(routes::generate_handler))
        .route("/api/generate", post(routes::api_generate))
        .route("/download/:job_id", get(routes::download_all))
        .route("/download/:job_id/:filename", get(routes::download_file))
        .nest_service(
            "/static",
            tower_http::services::ServeDir::new(&config.template_folder),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("certgen listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
