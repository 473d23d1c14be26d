//! Types for wikimark-commonmark public API and internal use.
use serde::{Deserialize, Serialize};

/// A heading collected from a rendered document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
  /// Raw inline source of the heading, markers stripped.
  pub content: String,
  /// 0-based source line of the heading. Used to keep anchors unique.
  pub index:   usize,
  /// Heading level (1-6).
  pub level:   u8,
  /// Slug of `content`, without the line suffix.
  pub slug:    String,
}

impl Heading {
  /// Anchor id rendered on the heading tag and linked from the TOC.
  #[must_use]
  pub fn anchor(&self) -> String {
    format!("{}-{}", self.slug, self.index)
  }
}

/// Result of Markdown processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML output, trimmed.
  pub html: String,

  /// Every heading of the document, in document order.
  pub headings: Vec<Heading>,

  /// Title of the document, if found (first H1).
  pub title: Option<String>,
}
