//! CLI error types and conversions

use crate::config::ConfigError;
use crate::ingest::IngestError;
use crate::store::StoreError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ingestion error
    #[error("ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Metrics exporter could not be installed
    #[error("metrics error: {0}")]
    Metrics(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
