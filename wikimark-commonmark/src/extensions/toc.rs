//! `[toc]` placeholder and table of contents rendering.
//!
//! A line consisting of `[toc]` (any case) is replaced by three tokens. The
//! open and close tokens render the configured wrapper markup; the body
//! renders nested lists from the headings collected for the whole document,
//! so every placeholder shows the same table.
use crate::{
  engine::{InlineRule, InlineState, RenderOverride, Renderer, render::escape_html},
  processor::TocOptions,
  token::{Token, TokenKind},
  types::Heading,
};

const MARKER: &str = "[toc]";

/// Inline rule recognizing a `[toc]` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TocRule;

impl InlineRule for TocRule {
  fn name(&self) -> &'static str {
    "toc"
  }

  fn try_lex(&self, state: &mut InlineState<'_>) -> bool {
    if !state.at_line_start() || !state.line_is_complete() {
      return false;
    }

    let line = state.current_line();
    if !line.trim().eq_ignore_ascii_case(MARKER) {
      return false;
    }

    for kind in [TokenKind::TocOpen, TokenKind::TocBody, TokenKind::TocClose] {
      let mut token = Token::new(kind, "", 0);
      token.markup = MARKER.to_string();
      state.push(token);
    }
    state.advance(line.len());
    true
  }
}

/// Which of the three TOC tokens a [`TocRenderer`] handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TocPart {
  Open,
  Body,
  Close,
}

/// Render override for one of the TOC tokens.
#[derive(Debug, Clone)]
pub struct TocRenderer {
  part:   TocPart,
  markup: String,
}

impl TocRenderer {
  /// The three overrides rendering a table of contents with `options`.
  #[must_use]
  pub fn overrides(options: &TocOptions) -> [Self; 3] {
    [
      Self {
        part:   TocPart::Open,
        markup: options.opening_tag.clone(),
      },
      Self {
        part:   TocPart::Body,
        markup: options.list_class.clone(),
      },
      Self {
        part:   TocPart::Close,
        markup: options.closing_tag.clone(),
      },
    ]
  }
}

impl RenderOverride for TocRenderer {
  fn kind(&self) -> TokenKind {
    match self.part {
      TocPart::Open => TokenKind::TocOpen,
      TocPart::Body => TokenKind::TocBody,
      TocPart::Close => TokenKind::TocClose,
    }
  }

  fn render(
    &self,
    _tokens: &[Token],
    _idx: usize,
    renderer: &Renderer<'_>,
    out: &mut String,
  ) {
    match self.part {
      TocPart::Open | TocPart::Close => out.push_str(&self.markup),
      TocPart::Body => {
        render_toc(&renderer.ctx().headings, &self.markup, out);
      },
    }
  }
}

/// A node of the table of contents.
#[derive(Debug, PartialEq, Eq)]
pub enum TocEntry<'h> {
  Item(&'h Heading),
  List { level: u8, entries: Vec<Self> },
}

/// Build the nested table of contents for `headings`.
///
/// Headings without content are left out. A list is opened for every level
/// between the current one and the next heading; lists that end up holding
/// no headings of their own are then dissolved into their parent, so skipped
/// levels produce no empty wrappers.
#[must_use]
pub fn build_toc(headings: &[Heading]) -> Vec<TocEntry<'_>> {
  // (level, entries) of every open list; the bottom one is the root.
  let mut stack: Vec<(u8, Vec<TocEntry<'_>>)> = vec![(0, Vec::new())];

  for heading in headings.iter().filter(|h| !h.content.is_empty()) {
    while stack.len() > 1 && stack.last().is_some_and(|(l, _)| *l > heading.level)
    {
      close_list(&mut stack);
    }
    while let Some(&(level, _)) = stack.last() {
      if level >= heading.level {
        break;
      }
      stack.push((level + 1, Vec::new()));
    }
    if let Some((_, entries)) = stack.last_mut() {
      entries.push(TocEntry::Item(heading));
    }
  }

  while stack.len() > 1 {
    close_list(&mut stack);
  }

  stack
    .pop()
    .map(|(_, entries)| collapse(entries))
    .unwrap_or_default()
}

fn close_list(stack: &mut Vec<(u8, Vec<TocEntry<'_>>)>) {
  if let Some((level, entries)) = stack.pop() {
    if let Some((_, parent)) = stack.last_mut() {
      parent.push(TocEntry::List { level, entries });
    }
  }
}

fn collapse(entries: Vec<TocEntry<'_>>) -> Vec<TocEntry<'_>> {
  let mut out = Vec::with_capacity(entries.len());
  for entry in entries {
    match entry {
      TocEntry::Item(heading) => out.push(TocEntry::Item(heading)),
      TocEntry::List { level, entries } => {
        let has_items = entries.iter().any(|e| matches!(e, TocEntry::Item(_)));
        let entries = collapse(entries);
        if has_items {
          out.push(TocEntry::List { level, entries });
        } else {
          out.extend(entries);
        }
      },
    }
  }
  out
}

/// Render the table of contents lists for `headings`.
pub fn render_toc(headings: &[Heading], list_class: &str, out: &mut String) {
  render_entries(&build_toc(headings), list_class, out);
}

fn render_entries(entries: &[TocEntry<'_>], list_class: &str, out: &mut String) {
  for entry in entries {
    match entry {
      TocEntry::Item(heading) => {
        let content = escape_html(&heading.content);
        out.push_str("<li><a href=\"#");
        out.push_str(&escape_html(&heading.anchor()));
        out.push_str("\" title=\"");
        out.push_str(&content);
        out.push_str("\">");
        out.push_str(&content);
        out.push_str("</a></li>");
      },
      TocEntry::List { level, entries } => {
        out.push_str("<ul class=\"");
        out.push_str(&escape_html(list_class));
        out.push_str("-h");
        out.push_str(&level.to_string());
        out.push_str("\">");
        render_entries(entries, list_class, out);
        out.push_str("</ul>");
      },
    }
  }
}
