#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for `GeoSpy`.
//!
//! Exposes the location pipeline over JSON: clients either submit a raw
//! inference result for processing (`/api/report`) or an image to be
//! geolocated by the configured vision provider (`/api/locate`). The server
//! is stateless; the caller carries its [`AnalysisSession`] between
//! requests.
//!
//! [`AnalysisSession`]: geospy_server_models::AnalysisSession

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use geospy_ai::providers::{LocationProvider, create_provider_from_env};
use geospy_pipeline::config::PipelineConfig;

/// Largest accepted JSON body. Uploads arrive base64-encoded.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    /// Vision provider, absent when no credentials are configured.
    pub provider: Option<Arc<dyn LocationProvider>>,
    /// Presentation settings for the pipeline.
    pub config: Arc<PipelineConfig>,
    /// Client used to fetch images by URL.
    pub http: reqwest::Client,
}

impl AppState {
    /// Builds state from the environment.
    ///
    /// A missing or misconfigured provider is logged and leaves
    /// `/api/locate` unavailable; the remaining routes still work.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline config file named by
    /// `GEOSPY_PIPELINE_CONFIG` cannot be read or parsed.
    pub fn from_env() -> std::io::Result<Self> {
        let config = PipelineConfig::from_env().map_err(std::io::Error::other)?;

        let provider: Option<Arc<dyn LocationProvider>> = match create_provider_from_env() {
            Ok(provider) => {
                log::info!("Using {}", provider.name());
                Some(Arc::from(provider))
            }
            Err(e) => {
                log::warn!("Image geolocation disabled: {e}");
                None
            }
        };

        Ok(Self {
            provider,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        })
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().limit(MAX_BODY_BYTES))
            .route("/health", web::get().to(handlers::health))
            .route("/report", web::post().to(handlers::report))
            .route("/report/geojson", web::post().to(handlers::report_geojson))
            .route("/locate", web::post().to(handlers::locate)),
    );
}

/// Starts the `GeoSpy` API server.
///
/// Reads `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
/// The caller initializes logging and provides the async runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration cannot be
/// loaded, or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_env()?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
