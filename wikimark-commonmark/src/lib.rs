//! # wikimark-commonmark
//!
//! A `CommonMark` processor for wiki content, built on `comrak`, adding
//! bracketed wikilinks, a `[toc]` table of contents generated from the
//! document's own headings, and domain-based rewriting of link attributes.
//!
//! ## Quick Start
//!
//! ```rust
//! use wikimark_commonmark::{MarkdownOptions, MarkdownProcessor};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let result = processor.render("# Hello World\n\n[toc]\n\nSee [[Other Page]].");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello World"));
//! assert!(result.html.contains(r#"<a href="other-page">Other Page</a>"#));
//! assert!(result.html.contains(r##"<a href="#hello-world-0""##));
//! ```
//!
//! ## Features
//!
//! - **Wikilinks**: `[[Target]]` and `[[Target|label]]` become slugged links
//! - **Table of contents**: a `[toc]` line expands into nested lists of every
//!   heading, linked to line-indexed heading anchors
//! - **Link policy**: `rel`/`target` for external links based on an
//!   allow-list of hosts, base URL prefixing for relative links
//! - **Missing links**: `[Title]()` links to `/title`
//!
//! ## Configuration
//!
//! ```rust
//! use wikimark_commonmark::{MarkdownOptionsBuilder, MarkdownProcessor};
//!
//! let options = MarkdownOptionsBuilder::new()
//!   .base_url("/wiki")
//!   .allowed_external_domains(["example.org"])
//!   .build();
//!
//! let processor = MarkdownProcessor::new(options);
//! assert_eq!(
//!   processor.render_html("[Test]()"),
//!   r#"<p><a href="/wiki/test">Test</a></p>"#
//! );
//! ```
//!
//! ## Extending the engine
//!
//! The [`engine`] module exposes the token stream, the inline rule driver and
//! the renderer the wiki extensions are built on; see [`engine::Engine`].

pub mod engine;
pub mod extensions;
pub mod processor;
pub mod token;
mod types;
pub mod utils;

pub use crate::{
  processor::{
    Document,
    MarkdownOptions,
    MarkdownOptionsBuilder,
    MarkdownProcessor,
    render,
    render_collection,
  },
  types::{Heading, MarkdownResult},
};
