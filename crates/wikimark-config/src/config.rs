use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wikimark_commonmark::{MarkdownOptions, MarkdownProcessor};

use crate::error::ConfigError;

/// Names looked up in the working directory when no config file is given.
const CONFIG_FILENAMES: [&str; 4] = [
  "wikimark.toml",
  "wikimark.json",
  ".config/wikimark.toml",
  ".config/wikimark.json",
];

/// Configuration for the wikimark renderer.
///
/// Fields are loaded from a TOML or JSON config file and can be overridden
/// from the command line. Every field has a default, but a config file must
/// contain the `markdown.wiki` group with an `allowed_external_domains`
/// array; see [`validate_value`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Markdown file or directory of markdown files to render.
  pub input_dir: Option<PathBuf>,

  /// Output directory for rendered HTML.
  pub output_dir: Option<PathBuf>,

  /// Number of threads to use for parallel rendering.
  pub jobs: Option<usize>,

  /// Renderer options.
  pub markdown: MarkdownOptions,
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, if the format is
  /// unsupported, or if the document fails validation.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let ext = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);

    match ext.as_deref() {
      Some("json") => Self::from_json_str(&content),
      Some("toml") => Self::from_toml_str(&content),
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Parse and validate a TOML config document.
  ///
  /// # Errors
  ///
  /// Returns an error if the document is not valid TOML or fails validation.
  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    let value: Value = toml::from_str(content)?;
    Self::from_value(value)
  }

  /// Parse and validate a JSON config document.
  ///
  /// # Errors
  ///
  /// Returns an error if the document is not valid JSON or fails validation.
  pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
    let value: Value = serde_json::from_str(content)?;
    Self::from_value(value)
  }

  fn from_value(value: Value) -> Result<Self, ConfigError> {
    validate_value(&value)?;
    let config: Self = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
  }

  /// Load configuration from `path`, or from the first config file found in
  /// the working directory. Falls back to defaults when there is none.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file exists but cannot be loaded.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = path {
      return Self::from_file(path);
    }

    match Self::find_config_file() {
      Some(found) => {
        log::debug!("Using config file {}", found.display());
        Self::from_file(found)
      },
      None => {
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
      },
    }
  }

  /// Search for config files in the working directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    Self::find_config_file_in(&current_dir)
  }

  fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  /// Validate the typed configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if `jobs` is zero or a slug `remove` pattern does not
  /// compile.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.jobs == Some(0) {
      return Err(ConfigError::Config(
        "'jobs' must be at least 1".to_string(),
      ));
    }

    MarkdownProcessor::try_new(self.markdown.clone())?;
    Ok(())
  }

  /// Build a processor from the renderer options.
  ///
  /// # Errors
  ///
  /// Returns an error if a slug `remove` pattern does not compile.
  pub fn processor(&self) -> Result<MarkdownProcessor, ConfigError> {
    Ok(MarkdownProcessor::try_new(self.markdown.clone())?)
  }

  /// Write a commented default configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

/// Check the shape of a raw config document before deserializing it.
///
/// The `markdown` and `markdown.wiki` groups must be present and the
/// allow-list must be an array. Both the snake case and the camelCase key
/// spellings are accepted.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_value(value: &Value) -> Result<(), ConfigError> {
  let markdown = value
    .get("markdown")
    .filter(|v| v.is_object())
    .ok_or_else(|| ConfigError::MissingKey("markdown".to_string()))?;

  let wiki = markdown
    .get("wiki")
    .filter(|v| v.is_object())
    .ok_or_else(|| ConfigError::MissingKey("markdown.wiki".to_string()))?;

  let domains = wiki
    .get("allowed_external_domains")
    .or_else(|| wiki.get("allowedExternalDomains"));
  if !domains.is_some_and(Value::is_array) {
    return Err(ConfigError::InvalidType {
      key:      "markdown.wiki.allowed_external_domains".to_string(),
      expected: "an array",
    });
  }

  Ok(())
}
