use wikimark_commonmark::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownProcessor};

fn processor(open_new_window: bool) -> MarkdownProcessor {
  MarkdownProcessor::new(
    MarkdownOptionsBuilder::new()
      .allowed_external_domains(["example.org"])
      .open_new_window(open_new_window)
      .build(),
  )
}

#[test]
fn test_unknown_domains_are_nofollow() {
  let processor = processor(false);
  let cases = [
    ("[Test]", "<p>[Test]</p>"),
    ("[Test]()", r#"<p><a href="/test">Test</a></p>"#),
    (
      "[Test](http://example.org/wiki/test)",
      r#"<p><a href="http://example.org/wiki/test" rel="external noopener noreferrer">Test</a></p>"#,
    ),
    (
      "[Test](https://example.org/wiki/test)",
      r#"<p><a href="https://example.org/wiki/test" rel="external noopener noreferrer">Test</a></p>"#,
    ),
    (
      "[Test](http://evil.org/wiki/test)",
      r#"<p><a href="http://evil.org/wiki/test" rel="external nofollow noopener noreferrer">Test</a></p>"#,
    ),
    (
      "[Test](https://evil.org/wiki/test)",
      r#"<p><a href="https://evil.org/wiki/test" rel="external nofollow noopener noreferrer">Test</a></p>"#,
    ),
  ];

  for (markdown, expected) in cases {
    assert_eq!(processor.render_html(markdown), expected, "input: {markdown}");
  }
}

#[test]
fn test_open_new_window() {
  let processor = processor(true);
  let cases = [
    ("[Test]", "<p>[Test]</p>"),
    ("[Test]()", r#"<p><a href="/test">Test</a></p>"#),
    ("[Test](/wiki/test)", r#"<p><a href="/wiki/test">Test</a></p>"#),
    (
      "[Test](http://example.org/wiki/test)",
      r#"<p><a href="http://example.org/wiki/test" rel="external noopener noreferrer" target="_blank">Test</a></p>"#,
    ),
    (
      "[Test](https://example.org/wiki/test)",
      r#"<p><a href="https://example.org/wiki/test" rel="external noopener noreferrer" target="_blank">Test</a></p>"#,
    ),
    (
      "[Test](http://evil.org/wiki/test)",
      r#"<p><a href="http://evil.org/wiki/test" rel="external nofollow noopener noreferrer" target="_blank">Test</a></p>"#,
    ),
    (
      "[Test](https://evil.org/wiki/test)",
      r#"<p><a href="https://evil.org/wiki/test" rel="external nofollow noopener noreferrer" target="_blank">Test</a></p>"#,
    ),
  ];

  for (markdown, expected) in cases {
    assert_eq!(processor.render_html(markdown), expected, "input: {markdown}");
  }
}

#[test]
fn test_base_url() {
  let processor =
    MarkdownProcessor::new(MarkdownOptionsBuilder::new().base_url("/wiki").build());

  assert_eq!(processor.render_html("[Test]"), "<p>[Test]</p>");
  assert_eq!(
    processor.render_html("[Test]()"),
    r#"<p><a href="/wiki/test">Test</a></p>"#
  );
  assert_eq!(
    processor.render_html("[CrAzY CaSe SpAcEd]()"),
    r#"<p><a href="/wiki/crazy-case-spaced">CrAzY CaSe SpAcEd</a></p>"#
  );
  assert_eq!(
    processor.render_html("[Page](page)"),
    r#"<p><a href="/wiki/page">Page</a></p>"#
  );
}

#[test]
fn test_base_url_prefixes_fragments() {
  let processor =
    MarkdownProcessor::new(MarkdownOptionsBuilder::new().base_url("/wiki").build());
  assert_eq!(
    processor.render_html("[Anchor](#top) and [Section](page#top)"),
    r##"<p><a href="/wiki/#top">Anchor</a> and <a href="/wiki/page#top">Section</a></p>"##
  );

  // Table of contents entries are not links in the source and stay local.
  let html = processor.render_html("# Top\n\n[toc]\n");
  assert!(html.contains(r##"<a href="#top-0" title="Top">Top</a>"##));
}

#[test]
fn test_base_url_is_not_applied_twice() {
  let processor =
    MarkdownProcessor::new(MarkdownOptionsBuilder::new().base_url("/wiki").build());
  assert_eq!(
    processor.render_html("[Test](/wiki/test)"),
    r#"<p><a href="/wiki/test">Test</a></p>"#
  );
}

#[test]
fn test_base_url_leaves_external_links() {
  let processor = MarkdownProcessor::new(
    MarkdownOptionsBuilder::new()
      .base_url("/wiki")
      .open_new_window(false)
      .build(),
  );
  assert_eq!(
    processor.render_html("[Mail](mailto:someone@example.org)"),
    r#"<p><a href="mailto:someone@example.org">Mail</a></p>"#
  );
  assert_eq!(
    processor.render_html("[Out](https://evil.org)"),
    r#"<p><a href="https://evil.org" rel="external nofollow noopener noreferrer">Out</a></p>"#
  );
}

#[test]
fn test_links_in_headings_and_tables() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let html = processor.render_html(
    "# [Out](http://evil.org)\n\n| a |\n|---|\n| [In](http://evil.org) |\n",
  );
  assert_eq!(
    html.matches(r#"rel="external nofollow noopener noreferrer" target="_blank""#).count(),
    2
  );
}

#[test]
fn test_link_titles_are_kept() {
  let processor = processor(false);
  assert_eq!(
    processor.render_html(r#"[Test](http://example.org "Example")"#),
    r#"<p><a href="http://example.org" title="Example" rel="external noopener noreferrer">Test</a></p>"#
  );
}
