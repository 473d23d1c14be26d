//! High-level processing functions with error recovery.
use std::{
  io::Error,
  path::{Path, PathBuf},
};

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{MarkdownOptions, MarkdownProcessor};
use crate::types::MarkdownResult;

/// Render `content` with `options` to a trimmed HTML string.
///
/// Builds a processor for the call. Reuse a [`MarkdownProcessor`] when
/// rendering many documents with the same options.
#[must_use]
pub fn render(content: &str, options: &MarkdownOptions) -> String {
  MarkdownProcessor::new(options.clone()).render_html(content)
}

/// A document of a collection. Only `html` is read and replaced; every other
/// field is carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
  /// Markdown source before rendering, HTML afterwards.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub html: Option<String>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Document {
  /// A document holding only Markdown source.
  #[must_use]
  pub fn new<S: Into<String>>(html: S) -> Self {
    Self {
      html:  Some(html.into()),
      extra: Map::new(),
    }
  }
}

/// Render the `html` field of every document. A missing field renders as
/// an empty string.
#[must_use]
pub fn render_collection(
  documents: Vec<Document>,
  options: &MarkdownOptions,
) -> Vec<Document> {
  let processor = MarkdownProcessor::new(options.clone());
  documents
    .into_iter()
    .map(|mut document| {
      let source = document.html.take().unwrap_or_default();
      document.html = Some(processor.render_html(&source));
      document
    })
    .collect()
}

/// Process markdown content with error recovery.
///
/// A panic inside the pipeline is logged and replaced by an error fragment.
#[must_use]
pub fn process_with_recovery(
  processor: &MarkdownProcessor,
  content: &str,
) -> MarkdownResult {
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor.render(content)
  })) {
    Ok(result) => result,
    Err(panic_err) => {
      error!("Panic during markdown processing: {panic_err:?}");
      MarkdownResult {
        html: "<div class=\"error\">Critical error processing markdown \
               content</div>"
          .to_string(),
        ..MarkdownResult::default()
      }
    },
  }
}

/// Process a batch of markdown files with one processor.
///
/// Returns `(path, result)` pairs in input order; read failures are reported
/// per file.
pub fn process_batch<I, F>(
  processor: &MarkdownProcessor,
  files: I,
  read_file_fn: F,
) -> Vec<(PathBuf, Result<MarkdownResult, String>)>
where
  I: Iterator<Item = PathBuf>,
  F: Fn(&Path) -> Result<String, Error>,
{
  files
    .map(|path| {
      let result = match read_file_fn(&path) {
        Ok(content) => Ok(process_with_recovery(processor, &content)),
        Err(e) => Err(format!("Failed to read file: {e}")),
      };
      (path, result)
    })
    .collect()
}
