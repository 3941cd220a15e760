//! Crane: an authenticated lesson scraper
//!
//! This crate crawls an authenticated lesson console, extracts phrase-level
//! records from each lesson page, and serializes them as tabular data in
//! several formats. All navigation runs through a session gate so that login
//! happens exactly once per run.

pub mod config;
pub mod crawler;
pub mod export;
pub mod extract;
pub mod order;
pub mod page;
pub mod session;
pub mod store;

use thiserror::Error;

/// Main error type for crane operations
#[derive(Debug, Error)]
pub enum CraneError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Page error: {0}")]
    Page(#[from] page::PageError),

    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crane operations
pub type Result<T> = std::result::Result<T, CraneError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlOutcome};
pub use page::{PageCapability, RenderedPage};
pub use session::{LoginStrategy, SessionGate, SessionState};
pub use store::{PhraseRecord, ResultStore};
