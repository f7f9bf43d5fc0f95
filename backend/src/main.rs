//! Pharmacy Admin Dashboard - Backend Server
//!
//! Purchase entry, product search and inventory browsing for a retail
//! pharmacy back office.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod entry;
mod error;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use entry::{ProductCatalog, ProductSearch};
use services::{CatalogService, InventoryService, PendingOrderQueue, PurchaseService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogService>,
    pub purchases: Arc<PurchaseService>,
    pub inventory: Arc<InventoryService>,
    pub search: Arc<ProductSearch<dyn ProductCatalog>>,
    pub orders: Arc<PendingOrderQueue>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let catalog = Arc::new(CatalogService::new(db.clone()));
        let search_catalog: Arc<dyn ProductCatalog> = catalog.clone();
        let search = ProductSearch::new(
            search_catalog,
            config.purchase.search_debounce(),
            config.purchase.suggestion_limit,
        );

        Self {
            purchases: Arc::new(PurchaseService::new(db.clone())),
            inventory: Arc::new(InventoryService::new(db.clone())),
            catalog,
            search: Arc::new(search),
            orders: Arc::new(PendingOrderQueue::new()),
            config: Arc::new(config),
            db,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharmacy_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Pharmacy Admin Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(db_pool, config);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Pharmacy Admin API v1.0"
}
