//! Configuration loading and validation
//!
//! Configuration lives in a TOML file with kebab-case keys. Loading always
//! validates; a config hash is available for change detection.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    Config, CrawlerConfig, LoginConfig, LoginMode, OutputConfig, SiteConfig, SlideNumbering,
};
pub use validation::validate;
