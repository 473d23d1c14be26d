//! Token-stream engine built on top of comrak.
//!
//! comrak parses the block and inline grammar into an arena AST. The engine
//! lowers that AST into a flat token stream. Extensions hook in at four
//! points, in order:
//!
//! 1. source rules, [`InlineRule`]s run over the raw lines before comrak
//!    parses them, so comrak's inline syntax cannot split the spans they
//!    claim (see [`mask`]);
//! 2. inline rules, tried at every position of the plain-text runs inside
//!    each `inline` token, which may replace spans with their own tokens;
//! 3. [`CorePass`]es, run once over the finished token stream;
//! 4. [`RenderOverride`]s, which take over rendering of a single
//!    [`TokenKind`].
//!
//! Extensions are registered at construction and never change afterwards, so
//! an [`Engine`] can be shared freely between threads. Everything that
//! belongs to one render lives in a [`RenderContext`].
pub mod inline;
pub mod lower;
pub mod mask;
pub mod render;

use std::{collections::HashMap, fmt};

use comrak::{Arena, options::Options, parse_document};
use log::trace;

pub use self::{inline::InlineState, mask::Masked, render::Renderer};
use crate::{
  token::{Token, TokenKind},
  types::Heading,
};

/// Engine-level flags, independent of any wiki behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct EngineOptions {
  /// Pass raw HTML through instead of escaping it.
  pub html:        bool,
  /// Close void elements XHTML style (`<br />`).
  pub xhtml_out:   bool,
  /// Render soft line breaks as `<br>`.
  pub breaks:      bool,
  /// Class prefix for fenced code block languages.
  pub lang_prefix: String,
  /// Turn bare URLs into links.
  pub linkify:     bool,
  /// Smart quotes and dashes.
  pub typographer: bool,
  /// GitHub tables and strikethrough.
  pub gfm:         bool,
}

impl Default for EngineOptions {
  fn default() -> Self {
    Self {
      html:        false,
      xhtml_out:   false,
      breaks:      false,
      lang_prefix: "language-".to_string(),
      linkify:     false,
      typographer: false,
      gfm:         cfg!(feature = "gfm"),
    }
  }
}

impl EngineOptions {
  /// Build comrak options matching these flags.
  #[must_use]
  pub fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.gfm {
      options.extension.table = true;
      options.extension.strikethrough = true;
    }
    options.extension.autolink = self.linkify;
    options.parse.smart = self.typographer;
    options.render.r#unsafe = self.html;
    options.render.escaped_char_spans = true;
    options
  }
}

/// State scoped to a single render call.
#[derive(Debug, Default, Clone)]
pub struct RenderContext {
  /// Every heading of the document, in document order.
  pub headings: Vec<Heading>,
}

/// An inline syntax extension.
pub trait InlineRule: Send + Sync {
  /// Name used in debug logs.
  fn name(&self) -> &'static str;

  /// Try to recognize custom syntax at `state.pos()`.
  ///
  /// Returns `true` after emitting tokens and advancing the state, or `false`
  /// without touching the state when the rule does not apply.
  fn try_lex(&self, state: &mut InlineState<'_>) -> bool;
}

/// A pass over the complete token stream, run after inline rules.
pub trait CorePass: Send + Sync {
  fn name(&self) -> &'static str;

  fn run(&self, tokens: &mut Vec<Token>, ctx: &mut RenderContext);
}

/// Custom rendering for one kind of token.
pub trait RenderOverride: Send + Sync {
  /// Token kind this override renders.
  fn kind(&self) -> TokenKind;

  /// Render `tokens[idx]` into `out`.
  fn render(
    &self,
    tokens: &[Token],
    idx: usize,
    renderer: &Renderer<'_>,
    out: &mut String,
  );
}

/// A configured parse/transform/render pipeline.
pub struct Engine {
  options:      EngineOptions,
  source_rules: Vec<Box<dyn InlineRule>>,
  inline_rules: Vec<Box<dyn InlineRule>>,
  core_passes:  Vec<Box<dyn CorePass>>,
  overrides:    HashMap<TokenKind, Box<dyn RenderOverride>>,
}

impl Engine {
  /// Create an engine without any extensions.
  #[must_use]
  pub fn new(options: EngineOptions) -> Self {
    Self {
      options,
      source_rules: Vec::new(),
      inline_rules: Vec::new(),
      core_passes: Vec::new(),
      overrides: HashMap::new(),
    }
  }

  /// Register a rule run over the raw source lines before parsing. Rules are
  /// tried in registration order.
  #[must_use]
  pub fn with_source_rule(mut self, rule: impl InlineRule + 'static) -> Self {
    self.source_rules.push(Box::new(rule));
    self
  }

  /// Register an inline rule. Rules are tried in registration order.
  #[must_use]
  pub fn with_inline_rule(mut self, rule: impl InlineRule + 'static) -> Self {
    self.inline_rules.push(Box::new(rule));
    self
  }

  /// Register a core pass. Passes run in registration order.
  #[must_use]
  pub fn with_core_pass(mut self, pass: impl CorePass + 'static) -> Self {
    self.core_passes.push(Box::new(pass));
    self
  }

  /// Register a render override, replacing any earlier one for the same
  /// token kind.
  #[must_use]
  pub fn with_override(mut self, over: impl RenderOverride + 'static) -> Self {
    let kind = over.kind();
    if self.overrides.insert(kind, Box::new(over)).is_some() {
      log::warn!("Replacing existing render override for {}", kind.name());
    }
    self
  }

  #[must_use]
  pub const fn options(&self) -> &EngineOptions {
    &self.options
  }

  /// Parse `source` into a token stream and run the rules and core passes
  /// over it.
  #[must_use]
  pub fn parse(&self, source: &str, ctx: &mut RenderContext) -> Vec<Token> {
    let masked = Masked::new(source, &self.source_rules);

    let arena = Arena::new();
    let options = self.options.comrak_options();
    let root = parse_document(&arena, masked.source(), &options);

    let mut tokens = lower::lower(root, source, &masked, &options);
    trace!("Lowered document into {} block tokens", tokens.len());

    if !self.inline_rules.is_empty() {
      for token in &mut tokens {
        if token.kind == TokenKind::Inline {
          let children = std::mem::take(&mut token.children);
          token.children = inline::apply_rules(&self.inline_rules, children);
        }
      }
    }

    for pass in &self.core_passes {
      trace!("Running core pass {}", pass.name());
      pass.run(&mut tokens, ctx);
    }

    tokens
  }

  /// Render a token stream to HTML.
  #[must_use]
  pub fn render_tokens(&self, tokens: &[Token], ctx: &RenderContext) -> String {
    Renderer::new(&self.options, &self.overrides, ctx).render(tokens)
  }

  /// Parse and render `source` with a fresh context.
  #[must_use]
  pub fn render(&self, source: &str) -> (String, RenderContext) {
    let mut ctx = RenderContext::default();
    let tokens = self.parse(source, &mut ctx);
    let html = self.render_tokens(&tokens, &ctx);
    (html, ctx)
  }
}

impl fmt::Debug for Engine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut overrides: Vec<&str> =
      self.overrides.keys().map(|kind| kind.name()).collect();
    overrides.sort_unstable();

    f.debug_struct("Engine")
      .field("options", &self.options)
      .field(
        "source_rules",
        &self.source_rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
      )
      .field(
        "inline_rules",
        &self.inline_rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
      )
      .field(
        "core_passes",
        &self.core_passes.iter().map(|p| p.name()).collect::<Vec<_>>(),
      )
      .field("overrides", &overrides)
      .finish()
  }
}
