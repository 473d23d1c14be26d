//! HTML renderer for token streams.
//!
//! Output layout follows the common Markdown token renderer convention: block
//! tags are followed by a newline unless the next token is inline content or
//! the matching closing tag, and hidden tokens (paragraphs in tight lists)
//! produce no markup of their own.
use std::collections::HashMap;

use super::{EngineOptions, RenderContext, RenderOverride};
use crate::token::{Token, TokenKind};

/// Escape text for HTML content and double-quoted attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
  html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Renderer for a single document, bound to its [`RenderContext`].
pub struct Renderer<'e> {
  options:   &'e EngineOptions,
  overrides: &'e HashMap<TokenKind, Box<dyn RenderOverride>>,
  ctx:       &'e RenderContext,
}

impl<'e> Renderer<'e> {
  #[must_use]
  pub const fn new(
    options: &'e EngineOptions,
    overrides: &'e HashMap<TokenKind, Box<dyn RenderOverride>>,
    ctx: &'e RenderContext,
  ) -> Self {
    Self {
      options,
      overrides,
      ctx,
    }
  }

  #[must_use]
  pub const fn options(&self) -> &EngineOptions {
    self.options
  }

  /// Per-render state collected by the core passes.
  #[must_use]
  pub const fn ctx(&self) -> &RenderContext {
    self.ctx
  }

  /// Render a block token stream.
  #[must_use]
  pub fn render(&self, tokens: &[Token]) -> String {
    let mut out = String::new();
    for (idx, token) in tokens.iter().enumerate() {
      if token.kind == TokenKind::Inline {
        self.render_inline(&token.children, &mut out);
      } else {
        self.render_one(tokens, idx, token, &mut out);
      }
    }
    out
  }

  /// Render a list of inline tokens.
  pub fn render_inline(&self, tokens: &[Token], out: &mut String) {
    for (idx, token) in tokens.iter().enumerate() {
      self.render_one(tokens, idx, token, out);
    }
  }

  fn render_one(
    &self,
    tokens: &[Token],
    idx: usize,
    token: &Token,
    out: &mut String,
  ) {
    if let Some(over) = self.overrides.get(&token.kind) {
      over.render(tokens, idx, self, out);
    } else {
      self.render_default(tokens, idx, out);
    }
  }

  /// Built-in rendering for `tokens[idx]`, ignoring overrides.
  pub fn render_default(&self, tokens: &[Token], idx: usize, out: &mut String) {
    let token = &tokens[idx];
    match token.kind {
      TokenKind::Text | TokenKind::TextSpecial => {
        out.push_str(&escape_html(&token.content));
      },
      TokenKind::Softbreak => {
        if self.options.breaks {
          out.push_str(self.br());
        } else {
          out.push('\n');
        }
      },
      TokenKind::Hardbreak => out.push_str(self.br()),
      TokenKind::CodeInline => {
        out.push_str("<code");
        self.render_attrs(token, out);
        out.push('>');
        out.push_str(&escape_html(&token.content));
        out.push_str("</code>");
      },
      TokenKind::CodeBlock => {
        out.push_str("<pre");
        self.render_attrs(token, out);
        out.push_str("><code>");
        out.push_str(&escape_html(&token.content));
        out.push_str("</code></pre>\n");
      },
      TokenKind::Fence => self.render_fence(token, out),
      TokenKind::HtmlBlock => {
        if self.options.html {
          out.push_str(&token.content);
        } else {
          out.push_str("<p>");
          out.push_str(&escape_html(token.content.trim_end()));
          out.push_str("</p>\n");
        }
      },
      TokenKind::HtmlInline => {
        if self.options.html {
          out.push_str(&token.content);
        } else {
          out.push_str(&escape_html(&token.content));
        }
      },
      TokenKind::Raw => out.push_str(&token.content),
      TokenKind::Inline => self.render_inline(&token.children, out),
      TokenKind::TocOpen | TokenKind::TocBody | TokenKind::TocClose => {},
      _ => self.render_token(tokens, idx, out),
    }
  }

  /// Render `tokens[idx]` as a plain tag with its attributes.
  pub fn render_token(&self, tokens: &[Token], idx: usize, out: &mut String) {
    let previous = idx.checked_sub(1).and_then(|i| tokens.get(i));
    self.render_tag(&tokens[idx], previous, tokens.get(idx + 1), out);
  }

  /// Render `token` as a plain tag, given its stream neighbours.
  ///
  /// Overrides use this to emit a modified copy of a token.
  pub fn render_tag(
    &self,
    token: &Token,
    previous: Option<&Token>,
    next: Option<&Token>,
    out: &mut String,
  ) {
    if token.hidden {
      return;
    }

    if token.block && token.nesting != -1 && previous.is_some_and(|p| p.hidden)
    {
      out.push('\n');
    }

    out.push_str(if token.nesting == -1 { "</" } else { "<" });
    out.push_str(&token.tag);
    self.render_attrs(token, out);

    if token.nesting == 0 && self.options.xhtml_out {
      out.push_str(" /");
    }

    let mut need_lf = token.block;
    if token.block && token.nesting == 1 {
      if let Some(next) = next {
        if next.kind == TokenKind::Inline
          || next.hidden
          || (next.nesting == -1 && next.tag == token.tag)
        {
          need_lf = false;
        }
      }
    }

    out.push_str(if need_lf { ">\n" } else { ">" });
  }

  /// Render ` key="value"` pairs for every attribute of `token`.
  pub fn render_attrs(&self, token: &Token, out: &mut String) {
    for (key, value) in &token.attrs {
      out.push(' ');
      out.push_str(&escape_html(key));
      out.push_str("=\"");
      out.push_str(&escape_html(value));
      out.push('"');
    }
  }

  fn render_fence(&self, token: &Token, out: &mut String) {
    let info = token.info.trim();
    let lang = info.split_whitespace().next().unwrap_or_default();

    out.push_str("<pre><code");
    if !lang.is_empty() {
      out.push_str(" class=\"");
      out.push_str(&escape_html(&self.options.lang_prefix));
      out.push_str(&escape_html(lang));
      out.push('"');
    }
    out.push('>');
    out.push_str(&escape_html(&token.content));
    out.push_str("</code></pre>\n");
  }

  const fn br(&self) -> &'static str {
    if self.options.xhtml_out {
      "<br />\n"
    } else {
      "<br>\n"
    }
  }
}
