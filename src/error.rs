use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KisaanError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    DatabaseLock,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A single provider failed or returned something unusable.
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// Neither current-conditions provider answered.
    #[error("Unable to fetch weather data from any API")]
    NoWeatherData,

    #[error("Crop catalog not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("Invalid crop catalog: {0}")]
    InvalidCatalog(String),
}

pub type Result<T> = std::result::Result<T, KisaanError>;
