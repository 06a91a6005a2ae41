use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::{self, DatabaseError, QueryExecutor};
use crate::database::models::Catalog;
use crate::filter::FilterOptions;
use crate::handlers::{listing, public};

/// Shared by every request: the collections on offer, the store behind them
/// and the builder options.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub executor: Arc<dyn QueryExecutor>,
    pub options: FilterOptions,
}

impl AppState {
    pub fn new(catalog: Catalog, executor: Arc<dyn QueryExecutor>, options: FilterOptions) -> Self {
        Self { catalog: Arc::new(catalog), executor, options }
    }

    /// Built-in catalog plus the executor selected by configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        let executor = database::connect(&config.database).await?;
        Ok(Self::new(Catalog::builtin(), executor, FilterOptions::from_config(&config.filter)))
    }
}

pub fn app(state: AppState, request_logging: bool) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Listings
        .route("/api/collections", get(listing::collections_get))
        .route("/api/:collection", get(listing::collection_get))
        .with_state(state);

    let router = if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
