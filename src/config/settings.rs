//! Store settings and catalog seed loading from config.toml
//!
//! The file carries the `[store]` table (cart retention) and an optional list of
//! `[[products]]` used to seed the catalog on first run. Environment variables
//! override individual settings after the file is read.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Days an inactive cart is kept when nothing else is configured.
pub const DEFAULT_SESSION_COOKIE_DAYS: i64 = 90;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// General store settings
    #[serde(default)]
    pub store: StoreSettings,
    /// Products to seed into the catalog
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// The `[store]` table
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Session cookie lifetime in days, also the cart retention window
    #[serde(default = "default_session_cookie_days")]
    pub session_cookie_days: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            session_cookie_days: DEFAULT_SESSION_COOKIE_DAYS,
        }
    }
}

const fn default_session_cookie_days() -> i64 {
    DEFAULT_SESSION_COOKIE_DAYS
}

/// Configuration for a single catalog product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Display name
    pub name: String,
    /// Unique URL key
    pub slug: String,
    /// Stock keeping unit
    pub sku: String,
    /// Unit price, written as a string or number in TOML (e.g. `"9.99"`)
    pub price: Decimal,
}

/// Parses a config.toml document.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML syntax is invalid or a required field is missing.
pub fn parse_config(contents: &str) -> Result<StoreConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads store configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or does not parse.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Path of the config file: `STOREFRONT_CONFIG` or `./config.toml`.
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var("STOREFRONT_CONFIG").map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from)
}

/// Loads the configuration the binary runs with.
///
/// A missing file yields defaults. `SESSION_COOKIE_DAYS` overrides the file value.
///
/// # Errors
/// Returns an error if the file exists but is invalid, or the override is not a
/// positive whole number.
pub fn load_app_configuration() -> Result<StoreConfig> {
    let path = config_path();
    let mut config = if path.exists() {
        load_config(&path)?
    } else {
        info!("No config file at {}, using defaults.", path.display());
        StoreConfig::default()
    };

    if let Ok(raw) = std::env::var("SESSION_COOKIE_DAYS") {
        config.store.session_cookie_days = parse_retention_days(&raw)?;
    }
    if config.store.session_cookie_days <= 0 {
        return Err(Error::Config {
            message: format!(
                "session_cookie_days must be positive, got {}",
                config.store.session_cookie_days
            ),
        });
    }

    Ok(config)
}

fn parse_retention_days(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(Error::Config {
            message: format!("SESSION_COOKIE_DAYS must be a positive whole number, got {raw:?}"),
        }),
    }
}
