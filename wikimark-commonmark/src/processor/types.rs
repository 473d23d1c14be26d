//! Type definitions for the Markdown processor.
//!
//! Contains the configuration types (`MarkdownOptions` and the wiki option
//! groups) and the processor struct itself.
//!
//! # Examples
//!
//! ```
//! use wikimark_commonmark::{MarkdownOptions, MarkdownProcessor};
//!
//! let mut options = MarkdownOptions::default();
//! options.wiki.base_url = "/wiki".to_string();
//! options.wiki.allowed_external_domains.insert("example.org".to_string());
//!
//! let processor = MarkdownProcessor::new(options);
//! ```
use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{
  engine::{Engine, EngineOptions},
  utils::SlugifyOptions,
};

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct MarkdownOptions {
  /// Pass raw HTML in the source through to the output.
  pub html: bool,

  /// Use `/` to close void tags (`<br />`).
  #[serde(alias = "xhtmlOut")]
  pub xhtml_out: bool,

  /// Convert soft line breaks in paragraphs into `<br>`.
  pub breaks: bool,

  /// CSS class prefix for fenced code block languages.
  #[serde(alias = "langPrefix")]
  pub lang_prefix: String,

  /// Turn bare URLs into links.
  pub linkify: bool,

  /// Smart quotes and dashes.
  pub typographer: bool,

  /// Enable GitHub Flavored Markdown tables and strikethrough.
  pub gfm: bool,

  /// Wiki behaviour: wikilinks, table of contents and link policy.
  pub wiki: WikiOptions,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    let engine = EngineOptions::default();
    Self {
      html:        engine.html,
      xhtml_out:   engine.xhtml_out,
      breaks:      engine.breaks,
      lang_prefix: engine.lang_prefix,
      linkify:     engine.linkify,
      typographer: engine.typographer,
      gfm:         engine.gfm,
      wiki:        WikiOptions::default(),
    }
  }
}

impl MarkdownOptions {
  /// Engine-level flags for these options.
  #[must_use]
  pub fn engine_options(&self) -> EngineOptions {
    EngineOptions {
      html:        self.html,
      xhtml_out:   self.xhtml_out,
      breaks:      self.breaks,
      lang_prefix: self.lang_prefix.clone(),
      linkify:     self.linkify,
      typographer: self.typographer,
      gfm:         self.gfm,
    }
  }
}

/// Wiki-specific behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiOptions {
  /// Prefix for relative link targets. Empty disables prefixing.
  #[serde(alias = "baseUrl")]
  pub base_url: String,

  /// Hosts whose links are followed by search engines.
  #[serde(alias = "allowedExternalDomains")]
  pub allowed_external_domains: IndexSet<String>,

  /// Open external links in a new window.
  #[serde(alias = "openNewWindow")]
  pub open_new_window: bool,

  /// Table of contents.
  pub toc: TocOptions,

  /// `[[target|label]]` links.
  pub wikilinks: WikilinkOptions,
}

impl Default for WikiOptions {
  fn default() -> Self {
    Self {
      base_url:                 String::new(),
      allowed_external_domains: IndexSet::new(),
      open_new_window:          true,
      toc:                      TocOptions::default(),
      wikilinks:                WikilinkOptions::default(),
    }
  }
}

/// Table of contents markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocOptions {
  /// Markup emitted before the list.
  #[serde(alias = "openingTag")]
  pub opening_tag: String,

  /// Markup emitted after the list.
  #[serde(alias = "closingTag")]
  pub closing_tag: String,

  /// Class prefix for nested lists; each list gets `{list_class}-h{level}`.
  #[serde(alias = "listClass")]
  pub list_class: String,

  /// Slug options for heading anchors.
  pub slugify: SlugifyOptions,
}

impl Default for TocOptions {
  fn default() -> Self {
    Self {
      opening_tag: r#"<nav class="table-of-contents">"#.to_string(),
      closing_tag: "</nav>".to_string(),
      list_class:  "table-of-contents".to_string(),
      slugify:     SlugifyOptions::lowercase(),
    }
  }
}

/// Wikilink options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikilinkOptions {
  /// Slug options for link targets.
  pub slugify: SlugifyOptions,
}

impl Default for WikilinkOptions {
  fn default() -> Self {
    Self {
      slugify: SlugifyOptions::lowercase(),
    }
  }
}

/// Main Markdown processor.
///
/// Immutable once built. Can be cheaply cloned and shared across threads;
/// every render allocates its own state.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
  pub(crate) options: MarkdownOptions,
  pub(crate) engine:  Arc<Engine>,
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable raw HTML passthrough.
  #[must_use]
  pub const fn html(mut self, enabled: bool) -> Self {
    self.options.html = enabled;
    self
  }

  /// Enable or disable XHTML-style void tags.
  #[must_use]
  pub const fn xhtml_out(mut self, enabled: bool) -> Self {
    self.options.xhtml_out = enabled;
    self
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Set the base URL for relative links.
  #[must_use]
  pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
    self.options.wiki.base_url = base_url.into();
    self
  }

  /// Set the hosts allowed to receive followed links.
  #[must_use]
  pub fn allowed_external_domains<I, S>(mut self, domains: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.options.wiki.allowed_external_domains =
      domains.into_iter().map(Into::into).collect();
    self
  }

  /// Open external links in a new window.
  #[must_use]
  pub const fn open_new_window(mut self, enabled: bool) -> Self {
    self.options.wiki.open_new_window = enabled;
    self
  }

  /// Set the markup wrapped around the table of contents.
  #[must_use]
  pub fn toc_tags<S: Into<String>>(mut self, opening: S, closing: S) -> Self {
    self.options.wiki.toc.opening_tag = opening.into();
    self.options.wiki.toc.closing_tag = closing.into();
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}
