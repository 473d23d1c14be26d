//! Markdown processing with the wiki extensions.
//!
//! The processor module is organized into focused submodules:
//!
//! - [`core`]: processor construction and the render pipeline
//! - [`process`]: convenience functions, collections and error recovery
//! - [`types`]: configuration structures and the processor type
pub mod core;
pub mod process;
pub mod types;

pub use self::core::{ProcessorFeature, collect_markdown_files};

pub use self::process::{
  Document,
  process_batch,
  process_with_recovery,
  render,
  render_collection,
};
pub use self::types::{
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  TocOptions,
  WikiOptions,
  WikilinkOptions,
};
