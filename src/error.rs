//! Error types for the swatch_gradient library
//!
//! Nothing in this crate is fatal to the caller. Catalog errors are
//! produced internally, logged, and folded into a boolean outcome by
//! [`SwatchCatalog::load`](crate::catalog::SwatchCatalog::load); color
//! errors are returned as explicit values from parsing functions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failures while fetching, parsing, or persisting the swatch catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport failure: timeout, refused connection, broken body
    #[error("Request to {url} failed: {message}")]
    Network {
        url: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The endpoint answered with something other than 200
    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The catalog document as a whole could not be parsed
    #[error("Malformed catalog document: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A single record was rejected; the rest of the load continues
    #[error("Invalid record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    /// Snapshot read or write failed
    #[error("Snapshot I/O failed for {}: {message}", .path.display())]
    Persistence {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No snapshot has been written yet
    #[error("No snapshot at {}", .path.display())]
    MissingSnapshot { path: PathBuf },
}

impl CatalogError {
    /// Create a network error with context
    pub fn network<E>(url: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            url: url.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a persistence error with context
    pub fn persistence<E>(path: impl Into<PathBuf>, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            path: path.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a per-record rejection
    pub fn invalid_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Check if retrying the same request could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogError::Network { .. } | CatalogError::Status { .. }
        )
    }
}

/// Malformed color input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Not exactly six hexadecimal digits (an optional leading `#` is allowed)
    #[error("Invalid hex color '{input}': expected 6 hex digits")]
    InvalidHex { input: String },
}

/// Failures loading or saving an [`EngineConfig`](crate::config::EngineConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
