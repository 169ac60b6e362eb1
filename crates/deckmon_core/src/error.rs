//! Error types for the detection engine.
//!
//! Errors only travel between the inner seams of the engine (file reads,
//! cache flushes, HTTP calls, config loading). The public detection surface
//! converts every one of them into a logged fallback, so callers of
//! [`GameDetector::detect`](crate::GameDetector::detect) never see them.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while indexing, caching or looking up titles.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading manifests, writing the cache, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON (title cache, online responses).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine configuration file is not valid TOML.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The engine configuration could not be serialized.
    #[error("Config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A network request to a title lookup service failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A lookup service answered with a non-success status.
    #[error("Lookup service returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The temporary file could not be renamed over its destination.
    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shortcut registry ended in the middle of a record.
    #[error("Truncated shortcut registry at byte {offset}")]
    TruncatedShortcuts { offset: usize },

    /// The configuration is structurally valid but unusable.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
