use std::io;

use thiserror::Error;
use wikimark_commonmark::utils::UtilError;

/// Error type for wikimark-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Configuration key '{0}' is missing.")]
  MissingKey(String),

  #[error("'{key}' is missing or not {expected}.")]
  InvalidType {
    key:      String,
    expected: &'static str,
  },

  #[error("Invalid slug options: {0}")]
  Slug(#[from] UtilError),

  #[error("Template error: {0}")]
  Template(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),
}
