pub mod slug;

use comrak::nodes::{AstNode, NodeValue};
use regex::Regex;

pub use self::slug::{Slugifier, SlugifyOptions, slugify};

/// Error type for utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
  #[error("Regex compilation failed: {0}")]
  RegexError(#[from] regex::Error),
}

/// Result type for utility operations.
pub type UtilResult<T> = Result<T, UtilError>;

/// Extract the plain inline text below `node`, dropping markup.
///
/// Soft and hard breaks become a single space.
#[must_use]
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      NodeValue::HtmlInline(_) => {},
      _ => text.push_str(&extract_inline_text(child)),
    }
  }
  text
}

/// Create a regex that never matches anything.
///
/// Used as a fallback when a pattern fails to compile.
#[must_use]
pub fn never_matching_regex() -> Regex {
  #[allow(
    clippy::expect_used,
    reason = "This pattern is guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}
