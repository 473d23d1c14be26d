//! Wiki extensions registered on the engine.
//!
//! - [`missing_links`]: text rewrite run before parsing
//! - [`wikilink`]: `[[target|label]]` inline rule
//! - [`toc`]: `[toc]` inline rule and its render overrides
//! - [`headings`]: heading collection pass and anchor override
//! - [`link_policy`]: `rel`/`target`/base URL rewriting pass
pub mod headings;
pub mod link_policy;
pub mod missing_links;
pub mod toc;
pub mod wikilink;

pub use self::{
  headings::{HeadingAnchors, HeadingCollector},
  link_policy::{LinkPolicy, REL_ALLOWED, REL_NOFOLLOW},
  missing_links::normalize_missing_links,
  toc::{TocRenderer, TocRule, build_toc, render_toc},
  wikilink::WikilinkRule,
};
