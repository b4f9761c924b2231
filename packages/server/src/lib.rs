#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web dashboard server for the resilience map.
//!
//! Serves the three dashboard pages (intro, treatment exploration,
//! centrality overview) from `/`, standalone map documents from `/map`,
//! and a JSON API from `/api`. Every request recomputes its view
//! synchronously from the shared [`DataCache`]; nothing else is shared
//! between requests.

mod handlers;
pub mod interactive;
pub mod pages;
pub mod views;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::http::StatusCode;
use actix_web::{App, HttpServer, middleware, web};
use resilience_map_config::DashboardConfig;
use resilience_map_network_models::InvalidTreatmentError;
use resilience_map_render::RenderError;
use resilience_map_store::progress::ProgressCallback;
use resilience_map_store::{DataCache, DataPaths, LoadError};

/// Shared application state.
pub struct AppState {
    /// Load-once cache of the graph and facility layers.
    pub cache: DataCache,
    /// Dashboard configuration.
    pub config: DashboardConfig,
}

impl AppState {
    /// Creates state with an empty cache reading from the configured
    /// asset paths.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DataCache::new(DataPaths::from_assets(&config.assets));
        Self { cache, config }
    }
}

/// Errors that can occur while serving a view.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A required dataset could not be loaded.
    #[error("Data unavailable: {0}")]
    Data(#[from] LoadError),

    /// The map document could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The request named a treatment outside 0-40.
    #[error("Invalid request: {0}")]
    InvalidTreatment(#[from] InvalidTreatmentError),
}

impl ServerError {
    /// HTTP status reported for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Data(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidTreatment(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Registers every dashboard, map, and API route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(handlers::query_error))
        .route("/", web::get().to(handlers::page))
        .service(
            web::scope("/map")
                .route("/treatment", web::get().to(handlers::treatment_map))
                .route("/centrality", web::get().to(handlers::centrality_map)),
        )
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/ranking", web::get().to(handlers::ranking))
                .route("/proximity", web::get().to(handlers::proximity))
                .route("/centrality", web::get().to(handlers::centrality)),
        );
}

/// Starts the dashboard server with the given configuration.
///
/// When `server.preload` is set, every dataset is loaded before binding;
/// a failed preload is logged and the pages report it on request. The
/// caller provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(
    config: DashboardConfig,
    progress: &dyn ProgressCallback,
) -> std::io::Result<()> {
    let state = AppState::new(config);

    if state.config.server.preload {
        log::info!("Preloading datasets...");
        if let Err(e) = state.cache.preload(progress) {
            log::error!("Failed to preload datasets: {e}");
        }
    }
    progress.finish_and_clear();

    serve(state).await
}

/// Binds and runs the HTTP server around prepared state.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let bind_addr = state.config.server.bind_addr.clone();
    let port = state.config.server.port;
    let assets_dir = state.config.assets.dir.clone();
    let state = web::Data::new(state);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
            // Intro page illustration and any other static assets
            .service(Files::new("/assets", assets_dir.clone()))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
