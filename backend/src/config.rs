//! Configuration management for the pharmacy admin backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PHARMA_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{ExpiryYearRange, NearExpiryWindow};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Purchase entry behaviour
    pub purchase: PurchaseConfig,

    /// Inventory browsing behaviour
    pub inventory: InventoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PurchaseConfig {
    /// Months ahead at which an entered expiry is flagged as near
    pub near_expiry_months: u32,

    /// Quiet period before a product search is sent
    pub search_debounce_ms: u64,

    /// Maximum suggestions returned per query
    pub suggestion_limit: usize,

    /// Earliest accepted expiry year
    pub min_expiry_year: i32,

    /// Latest accepted expiry year
    pub max_expiry_year: i32,
}

impl PurchaseConfig {
    pub fn near_expiry_window(&self) -> NearExpiryWindow {
        NearExpiryWindow::new(self.near_expiry_months)
    }

    pub fn expiry_years(&self) -> ExpiryYearRange {
        ExpiryYearRange::new(self.min_expiry_year, self.max_expiry_year)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            near_expiry_months: NearExpiryWindow::PURCHASE_ENTRY.months,
            search_debounce_ms: 250,
            suggestion_limit: shared::DEFAULT_SUGGESTION_LIMIT,
            min_expiry_year: 2023,
            max_expiry_year: 2050,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Months ahead at which a stored batch is flagged as near expiry
    pub near_expiry_months: u32,
}

impl InventoryConfig {
    pub fn near_expiry_window(&self) -> NearExpiryWindow {
        NearExpiryWindow::new(self.near_expiry_months)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("PHARMA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("purchase.near_expiry_months", 6)?
            .set_default("purchase.search_debounce_ms", 250)?
            .set_default("purchase.suggestion_limit", 15)?
            .set_default("purchase.min_expiry_year", 2023)?
            .set_default("purchase.max_expiry_year", 2050)?
            .set_default("inventory.near_expiry_months", 3)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PHARMA_ prefix)
            .add_source(
                Environment::with_prefix("PHARMA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
