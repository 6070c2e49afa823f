/// Database configuration and connection management
pub mod database;

/// Store settings and catalog seed loading from config.toml
pub mod settings;
