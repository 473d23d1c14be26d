//! Core implementation of the Markdown processor.
//!
//! Builds the engine with the wiki extensions in their fixed order and runs
//! the render pipeline: missing-link normalization, parsing with the source
//! and inline rules, whole-document passes, then rendering with the overrides.
use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use log::{debug, trace};
use walkdir::WalkDir;

use super::types::{MarkdownOptions, MarkdownProcessor};
use crate::{
  engine::Engine,
  extensions::{
    HeadingAnchors,
    HeadingCollector,
    LinkPolicy,
    TocRenderer,
    TocRule,
    WikilinkRule,
    normalize_missing_links,
  },
  types::MarkdownResult,
  utils::{Slugifier, UtilResult},
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  ///
  /// Invalid slug `remove` patterns are logged and ignored. Use
  /// [`MarkdownProcessor::try_new`] to reject them instead.
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    let toc_slug = Slugifier::new_lossy(options.wiki.toc.slugify.clone());
    let link_slug = Slugifier::new_lossy(options.wiki.wikilinks.slugify.clone());
    Self::assemble(options, toc_slug, link_slug)
  }

  /// Create a processor, failing on invalid slug options.
  ///
  /// # Errors
  ///
  /// Returns an error if a `remove` pattern in the TOC or wikilink slug
  /// options does not compile.
  pub fn try_new(options: MarkdownOptions) -> UtilResult<Self> {
    let toc_slug = Slugifier::new(options.wiki.toc.slugify.clone())?;
    let link_slug = Slugifier::new(options.wiki.wikilinks.slugify.clone())?;
    Ok(Self::assemble(options, toc_slug, link_slug))
  }

  fn assemble(
    options: MarkdownOptions,
    toc_slug: Slugifier,
    link_slug: Slugifier,
  ) -> Self {
    let [toc_open, toc_body, toc_close] =
      TocRenderer::overrides(&options.wiki.toc);

    let engine = Engine::new(options.engine_options())
      .with_source_rule(WikilinkRule::new(link_slug))
      .with_inline_rule(TocRule)
      .with_core_pass(HeadingCollector::new(toc_slug.clone()))
      .with_core_pass(LinkPolicy::new(&options.wiki))
      .with_override(HeadingAnchors::new(toc_slug))
      .with_override(toc_open)
      .with_override(toc_body)
      .with_override(toc_close);
    trace!("Built engine: {engine:?}");

    Self {
      options,
      engine: Arc::new(engine),
    }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Check if a specific feature is enabled.
  #[must_use]
  pub const fn has_feature(&self, feature: ProcessorFeature) -> bool {
    match feature {
      ProcessorFeature::Gfm => self.options.gfm,
      ProcessorFeature::RawHtml => self.options.html,
      ProcessorFeature::BaseUrl => !self.options.wiki.base_url.is_empty(),
      ProcessorFeature::NewWindow => self.options.wiki.open_new_window,
    }
  }

  /// Render Markdown to HTML, collecting headings and title.
  ///
  /// Empty or whitespace-only input yields an empty result.
  #[must_use]
  pub fn render(&self, markdown: &str) -> MarkdownResult {
    if markdown.trim().is_empty() {
      debug!("Skipping render of empty content");
      return MarkdownResult::default();
    }

    let normalized = normalize_missing_links(markdown);
    let (html, ctx) = self.engine.render(&normalized);

    let title = ctx
      .headings
      .iter()
      .find(|h| h.level == 1 && !h.content.is_empty())
      .map(|h| h.content.clone());

    MarkdownResult {
      html: html.trim().to_string(),
      headings: ctx.headings,
      title,
    }
  }

  /// Render Markdown to a trimmed HTML string.
  #[must_use]
  pub fn render_html(&self, markdown: &str) -> String {
    self.render(markdown).html
  }
}

/// Collect all markdown files from the input directory
#[must_use]
pub fn collect_markdown_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files = Vec::with_capacity(100);

  for entry in WalkDir::new(input_dir)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
  {
    let path = entry.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
      files.push(path.to_owned());
    }
  }

  trace!("Found {} markdown files to process", files.len());
  files
}

/// Features that can be queried on a processor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorFeature {
  /// GitHub Flavored Markdown tables and strikethrough
  Gfm,
  /// Raw HTML passthrough
  RawHtml,
  /// Base URL prefixing of relative links
  BaseUrl,
  /// `target="_blank"` on external links
  NewWindow,
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::utils::SlugifyOptions;

  #[test]
  fn test_empty_input() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    assert_eq!(processor.render(""), MarkdownResult::default());
    assert_eq!(processor.render_html("  \n\t\n"), "");
  }

  #[test]
  fn test_output_is_trimmed() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    assert_eq!(processor.render_html("\n\nHello\n\n"), "<p>Hello</p>");
  }

  #[test]
  fn test_title_is_first_h1() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = processor.render("## Intro\n\n#\n\n# Main\n\n# Other\n");
    assert_eq!(result.title.as_deref(), Some("Main"));
    assert_eq!(result.headings.len(), 4);

    let result = processor.render("## Only a section\n");
    assert_eq!(result.title, None);
  }

  #[test]
  fn test_heading_records() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = processor.render("# First Heading\n\ntext\n\n## Second\n");
    let records: Vec<(&str, usize, u8, &str)> = result
      .headings
      .iter()
      .map(|h| (h.content.as_str(), h.index, h.level, h.slug.as_str()))
      .collect();
    assert_eq!(records, vec![
      ("First Heading", 0, 1, "first-heading"),
      ("Second", 4, 2, "second"),
    ]);
    assert!(result.html.contains("<h1 id=\"first-heading-0\">"));
    assert!(result.html.contains("<h2 id=\"second-4\">"));
  }

  #[test]
  fn test_duplicate_headings_get_unique_ids() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let html = processor.render_html("## Same\n\n## Same\n");
    assert_eq!(html, "<h2 id=\"same-0\">Same</h2>\n<h2 id=\"same-2\">Same</h2>");
  }

  #[test]
  fn test_renders_do_not_share_headings() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let first = processor.render("# One\n\n## Two\n");
    let second = processor.render("# Three\n");
    assert_eq!(first.headings.len(), 2);
    assert_eq!(second.headings.len(), 1);
    assert_eq!(second.headings[0].content, "Three");
  }

  #[test]
  fn test_try_new_rejects_bad_patterns() {
    let mut options = MarkdownOptions::default();
    options.wiki.wikilinks.slugify = SlugifyOptions {
      remove: Some("[unclosed".to_string()),
      ..SlugifyOptions::lowercase()
    };
    assert!(MarkdownProcessor::try_new(options.clone()).is_err());

    // The lossy constructor still produces a working processor.
    let processor = MarkdownProcessor::new(options);
    assert_eq!(processor.render_html("[[A B]]"), "<p><a href=\"a-b\">A B</a></p>");
  }

  #[test]
  fn test_has_feature() {
    let mut options = MarkdownOptions::default();
    options.wiki.base_url = "/wiki".to_string();
    options.html = true;
    let processor = MarkdownProcessor::new(options);
    assert!(processor.has_feature(ProcessorFeature::BaseUrl));
    assert!(processor.has_feature(ProcessorFeature::RawHtml));
    assert!(processor.has_feature(ProcessorFeature::NewWindow));
  }

  #[test]
  fn test_collect_markdown_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("a.md"), "# A").unwrap();
    std::fs::write(dir.path().join("sub/b.md"), "# B").unwrap();
    std::fs::write(dir.path().join("c.txt"), "C").unwrap();

    let files = collect_markdown_files(dir.path());
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "md")));
  }
}
