use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod repositories;
pub mod routes;

use config::AppConfig;
use error::AppError;

/// Shared handler state. The connection pool is opened by the caller and
/// injected here; it is never held in a global.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Service is healthy")
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orphanages API",
        version = "0.1.0",
        description = "List and register orphanages on a map"
    ),
    paths(
        health_check,
        routes::create_orphanage,
        routes::list_orphanages,
        routes::show_orphanage
    ),
    components(schemas(
        entities::orphanage::Model,
        routes::CreateOrphanageRequest
    ))
)]
pub struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // --- Define API routes separately ---
    let mut api_routes = Router::new()
        .route(
            "/orphanages",
            post(routes::create_orphanage)
                .layer(DefaultBodyLimit::max(config.max_upload_bytes))
                .get(routes::list_orphanages),
        )
        .route("/orphanages/{id}", get(routes::show_orphanage))
        .route("/health", get(health_check));

    // --- Rate limiting, when configured ---
    if let Some(limit) = config.rate_limit {
        let period = Duration::from_millis((60_000 / u64::from(limit.per_minute)).max(1));
        let governor_conf = GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .period(period)
            .burst_size(limit.burst)
            .finish();

        match governor_conf {
            Some(conf) => {
                api_routes = api_routes.layer(GovernorLayer {
                    config: Arc::new(conf),
                });
            }
            None => tracing::warn!(?limit, "Invalid rate limit; continuing without one"),
        }
    }

    // --- Documentation routes (not rate-limited) ---
    let docs_router: Router<AppState> = if config.enable_docs {
        Router::new().merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
    } else {
        Router::new()
    };

    // --- Build the final application router ---
    Router::new()
        .merge(api_routes)
        .merge(docs_router)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
