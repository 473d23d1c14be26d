//! Expose wikimark's command implementations for use in integration tests.
//! The stable library API lives in `wikimark-commonmark`.
pub mod cli;
pub mod commands;
