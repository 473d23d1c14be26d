use std::sync::Arc;

use rayon::prelude::*;
use wikimark_commonmark::{
  Document,
  MarkdownOptions,
  MarkdownProcessor,
  render,
  render_collection,
};

fn xhtml() -> MarkdownOptions {
  MarkdownOptions {
    xhtml_out: true,
    ..MarkdownOptions::default()
  }
}

#[test]
fn test_empty_values() {
  let options = MarkdownOptions::default();
  assert_eq!(render("", &options), "");
  assert_eq!(render(" ", &options), "");
  assert_eq!(render("\n\n\t", &options), "");
}

#[test]
fn test_missing_links() {
  let options = MarkdownOptions::default();
  assert_eq!(render("[Test]", &options), "<p>[Test]</p>");
  assert_eq!(
    render("[Test]()", &options),
    r#"<p><a href="/test">Test</a></p>"#
  );
  assert_eq!(
    render("[CrAzY CaSe SpAcEd]()", &options),
    r#"<p><a href="/crazy-case-spaced">CrAzY CaSe SpAcEd</a></p>"#
  );
}

#[test]
fn test_xhtml_image() {
  assert_eq!(
    render("![test](/test.png)", &xhtml()),
    r#"<p><img src="/test.png" alt="test" /></p>"#
  );
}

#[test]
fn test_render_collection() {
  let documents = vec![Document::new("![test](/test.png)")];
  let rendered = render_collection(documents, &xhtml());
  assert_eq!(rendered, vec![Document::new(
    r#"<p><img src="/test.png" alt="test" /></p>"#
  )]);
}

#[test]
fn test_render_collection_missing_html() {
  let rendered = render_collection(vec![Document::default()], &xhtml());
  assert_eq!(rendered[0].html.as_deref(), Some(""));
}

#[test]
fn test_raw_html_is_escaped_by_default() {
  let options = MarkdownOptions::default();
  assert_eq!(
    render("<b>bold</b> text", &options),
    "<p>&lt;b&gt;bold&lt;/b&gt; text</p>"
  );

  let options = MarkdownOptions {
    html: true,
    ..MarkdownOptions::default()
  };
  assert_eq!(render("<b>bold</b> text", &options), "<p><b>bold</b> text</p>");
}

#[test]
fn test_gfm_can_be_disabled() {
  let table = "| a |\n|---|\n| 1 |\n";
  let html = render(table, &MarkdownOptions::default());
  assert!(html.starts_with("<table>"));

  let options = MarkdownOptions {
    gfm: false,
    ..MarkdownOptions::default()
  };
  assert!(render(table, &options).starts_with("<p>"));
}

#[test]
fn test_concurrent_renders_are_isolated() {
  let processor = Arc::new(MarkdownProcessor::new(MarkdownOptions::default()));

  let results: Vec<(usize, usize, String)> = (0..64usize)
    .into_par_iter()
    .map(|i| {
      let headings = i % 5 + 1;
      let markdown: String = (0..headings)
        .map(|h| format!("## Doc {i} section {h}\n\n"))
        .chain(std::iter::once("[toc]\n".to_string()))
        .collect();
      let result = processor.render(&markdown);
      (i, result.headings.len(), result.html)
    })
    .collect();

  for (i, count, html) in results {
    assert_eq!(count, i % 5 + 1);
    assert_eq!(html.matches("<li>").count(), count);
    assert!(html.contains(&format!("doc-{i}-section-0")));
  }
}
