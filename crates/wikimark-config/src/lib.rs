//! Configuration loading and validation for wikimark.
pub mod config;
pub mod error;
pub mod templates;

pub use config::{Config, validate_value};
pub use error::ConfigError;
