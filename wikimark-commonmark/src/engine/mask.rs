//! Source rules, applied to the raw text before comrak parses it.
//!
//! A span claimed by a source rule must not be taken apart by comrak's own
//! inline syntax (emphasis, code spans, reference links). Every claimed span
//! is therefore swapped for a placeholder that comrak reads as plain text.
//! Lowering turns placeholders found in text back into the rule's tokens and
//! puts the raw span back everywhere else: code, HTML and link destinations.
//!
//! Spans never cross a line break. Within a line the scan steps over
//! backslash escapes, code spans, autolinks and inline HTML tags, which claim
//! their text before a source rule could.
use std::{borrow::Cow, sync::LazyLock};

use log::{debug, error, warn};
use regex::Regex;

use super::{
  InlineRule,
  inline::{InlineState, try_rules},
};
use crate::{
  token::{Token, TokenKind},
  utils::never_matching_regex,
};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Autolinks, email autolinks, HTML tags and comments at the start of the
/// input.
static ANGLE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r#"^<(?:[A-Za-z][A-Za-z0-9.+-]{1,31}:[^<>\x00-\x20]*|[A-Za-z0-9.!#$%\&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*|/?[A-Za-z][A-Za-z0-9-]*(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*(?:\s*=\s*(?:[^\s"'=<>`]+|'[^']*'|"[^"]*"))?)*\s*/?|!--.*?--)>"#,
  )
  .unwrap_or_else(|e| {
    error!(
      "Failed to compile ANGLE_SPAN_RE regex: {e}\n Falling back to never \
       matching regex."
    );
    never_matching_regex()
  })
});

/// A span claimed by a source rule.
#[derive(Debug, Clone)]
struct MaskedSpan {
  raw:    String,
  tokens: Vec<Token>,
}

enum Segment<'m, 't> {
  Text(&'t str),
  Span(&'m MaskedSpan),
}

/// A document with its claimed spans replaced by placeholders.
#[derive(Debug)]
pub struct Masked<'s> {
  source: Cow<'s, str>,
  spans:  Vec<MaskedSpan>,
}

impl<'s> Masked<'s> {
  /// Run `rules` over every line of `source`.
  #[must_use]
  pub fn new(source: &'s str, rules: &[Box<dyn InlineRule>]) -> Self {
    let unmasked = Self {
      source: Cow::Borrowed(source),
      spans:  Vec::new(),
    };
    if rules.is_empty() {
      return unmasked;
    }
    if source.contains([OPEN, CLOSE]) {
      warn!("Document contains placeholder characters, source rules skipped");
      return unmasked;
    }

    let mut masked = String::with_capacity(source.len());
    let mut spans = Vec::new();
    for line in source.split_inclusive('\n') {
      let (body, newline) = line
        .strip_suffix('\n')
        .map_or((line, ""), |body| (body, "\n"));
      mask_line(body, rules, &mut masked, &mut spans);
      masked.push_str(newline);
    }

    if spans.is_empty() {
      return unmasked;
    }
    debug!("Source rules claimed {} spans", spans.len());
    Self {
      source: Cow::Owned(masked),
      spans,
    }
  }

  /// The text handed to the parser.
  #[must_use]
  pub fn source(&self) -> &str {
    &self.source
  }

  /// Whether any span was claimed.
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.spans.is_empty()
  }

  /// Put the raw text of every claimed span back into `text`.
  #[must_use]
  pub fn restore<'t>(&self, text: &'t str) -> Cow<'t, str> {
    self.replace(text, |span| Cow::Borrowed(span.raw.as_str()))
  }

  /// Replace placeholders in `text` with the plain text of the span tokens.
  #[must_use]
  pub fn restore_plain<'t>(&self, text: &'t str) -> Cow<'t, str> {
    self.replace(text, |span| {
      Cow::Owned(
        span
          .tokens
          .iter()
          .filter(|t| t.kind == TokenKind::Text)
          .map(|t| t.content.as_str())
          .collect(),
      )
    })
  }

  /// Put the escaped raw text of every claimed span back into rendered HTML.
  #[must_use]
  pub fn restore_html<'t>(&self, html: &'t str) -> Cow<'t, str> {
    self.replace(html, |span| html_escape::encode_text(&span.raw))
  }

  /// Lower a text node, splicing in the tokens of the spans it contains.
  pub fn expand_text(&self, text: &str, out: &mut Vec<Token>) {
    if !self.holds_placeholder(text) {
      out.push(Token::text(text));
      return;
    }

    for segment in self.segments(text) {
      match segment {
        Segment::Text(text) => out.push(Token::text(text)),
        Segment::Span(span) => out.extend(span.tokens.iter().cloned()),
      }
    }
  }

  fn holds_placeholder(&self, text: &str) -> bool {
    !self.spans.is_empty() && text.contains(OPEN)
  }

  fn replace<'m, 't, F>(&'m self, text: &'t str, with: F) -> Cow<'t, str>
  where
    F: Fn(&'m MaskedSpan) -> Cow<'m, str>,
  {
    if !self.holds_placeholder(text) {
      return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for segment in self.segments(text) {
      match segment {
        Segment::Text(text) => out.push_str(text),
        Segment::Span(span) => out.push_str(&with(span)),
      }
    }
    Cow::Owned(out)
  }

  fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'_, 't>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(OPEN) {
      let after = &rest[open + OPEN.len_utf8()..];
      let span = after.find(CLOSE).and_then(|close| {
        after[..close]
          .parse::<usize>()
          .ok()
          .and_then(|index| self.spans.get(index))
          .map(|span| (span, close))
      });

      if let Some((span, close)) = span {
        if open > 0 {
          segments.push(Segment::Text(&rest[..open]));
        }
        segments.push(Segment::Span(span));
        rest = &after[close + CLOSE.len_utf8()..];
      } else {
        let keep = open + OPEN.len_utf8();
        segments.push(Segment::Text(&rest[..keep]));
        rest = &rest[keep..];
      }
    }

    if !rest.is_empty() {
      segments.push(Segment::Text(rest));
    }
    segments
  }
}

fn mask_line(
  line: &str,
  rules: &[Box<dyn InlineRule>],
  out: &mut String,
  spans: &mut Vec<MaskedSpan>,
) {
  let mut state = InlineState::new(line, true, true);
  let mut copied = 0;

  while state.pos() < line.len() {
    if let Some(skip) = literal_span(state.rest()) {
      state.advance(skip);
      continue;
    }

    let start = state.pos();
    if let Some(tokens) = try_rules(rules, &mut state) {
      let end = state.pos().min(line.len());
      out.push_str(&line[copied..start]);
      out.push(OPEN);
      out.push_str(&spans.len().to_string());
      out.push(CLOSE);
      spans.push(MaskedSpan {
        raw: line[start..end].to_string(),
        tokens,
      });
      copied = end;
      continue;
    }

    let step = state.rest().chars().next().map_or(1, char::len_utf8);
    state.advance(step);
  }

  out.push_str(line.get(copied..).unwrap_or_default());
}

/// Length of a construct at the start of `src` that keeps its text away from
/// source rules.
fn literal_span(src: &str) -> Option<usize> {
  let bytes = src.as_bytes();
  match bytes.first()? {
    b'\\' => {
      bytes
        .get(1)
        .filter(|b| b.is_ascii_punctuation())
        .map(|_| 2)
    },
    b'`' => Some(code_span_len(bytes)),
    b'<' => ANGLE_SPAN_RE.find(src).map(|m| m.end()),
    _ => None,
  }
}

/// Length of the code span opening at the start of `bytes`, or of the bare
/// backtick run when it is never closed on this line.
fn code_span_len(bytes: &[u8]) -> usize {
  let run = |from: usize| {
    bytes
      .get(from..)
      .map_or(0, |rest| rest.iter().take_while(|&&b| b == b'`').count())
  };

  let opening = run(0);
  let mut i = opening;
  while i < bytes.len() {
    if bytes[i] == b'`' {
      let closing = run(i);
      if closing == opening {
        return i + closing;
      }
      i += closing;
    } else {
      i += 1;
    }
  }
  opening
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Claims `{{...}}` on one line.
  struct Braces;

  impl InlineRule for Braces {
    fn name(&self) -> &'static str {
      "braces"
    }

    fn try_lex(&self, state: &mut InlineState<'_>) -> bool {
      let rest = state.rest();
      if !rest.starts_with("{{") {
        return false;
      }
      let Some(end) = rest.find("}}") else {
        return false;
      };
      state.push(Token::new(TokenKind::LinkOpen, "a", 1));
      state.push(Token::text(&rest[2..end]));
      state.push(Token::new(TokenKind::LinkClose, "a", -1));
      state.advance(end + 2);
      true
    }
  }

  fn rules() -> Vec<Box<dyn InlineRule>> {
    vec![Box::new(Braces)]
  }

  #[test]
  fn test_spans_become_placeholders() {
    let masked = Masked::new("a {{x *y*}} b\n{{z}}\n", &rules());
    assert_eq!(
      masked.source(),
      "a \u{E000}0\u{E001} b\n\u{E000}1\u{E001}\n"
    );
    assert_eq!(masked.restore(masked.source()), "a {{x *y*}} b\n{{z}}\n");
    assert_eq!(masked.restore_plain(masked.source()), "a x *y* b\nz\n");
  }

  #[test]
  fn test_expand_text_splices_tokens() {
    let masked = Masked::new("a {{x}} b", &rules());
    let mut out = Vec::new();
    masked.expand_text(masked.source(), &mut out);

    let kinds: Vec<TokenKind> = out.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![
      TokenKind::Text,
      TokenKind::LinkOpen,
      TokenKind::Text,
      TokenKind::LinkClose,
      TokenKind::Text,
    ]);
    assert_eq!(out[0].content, "a ");
    assert_eq!(out[2].content, "x");
    assert_eq!(out[4].content, " b");
  }

  #[test]
  fn test_literal_constructs_are_skipped() {
    for source in [
      "`{{x}}`",
      "``a ` {{x}}``",
      r"\{{x}}",
      "<http://a.org/{{x}}>",
      r#"<span title="{{x}}">"#,
    ] {
      let masked = Masked::new(source, &rules());
      assert!(masked.is_empty(), "source: {source}");
      assert_eq!(masked.source(), source);
    }

    // An unclosed backtick run is plain text.
    let masked = Masked::new("` {{x}}", &rules());
    assert_eq!(masked.source(), "` \u{E000}0\u{E001}");
  }

  #[test]
  fn test_spans_do_not_cross_lines() {
    let masked = Masked::new("{{x\n}}", &rules());
    assert!(masked.is_empty());
  }

  #[test]
  fn test_placeholder_characters_disable_masking() {
    let source = "\u{E000}0\u{E001} {{x}}";
    let masked = Masked::new(source, &rules());
    assert!(masked.is_empty());
    assert_eq!(masked.source(), source);
  }

  #[test]
  fn test_restore_html_escapes_raw_text() {
    let masked = Masked::new("{{a<b}}", &rules());
    assert_eq!(masked.restore_html(masked.source()), "{{a&lt;b}}");
  }

  #[test]
  fn test_code_span_len() {
    assert_eq!(code_span_len(b"`a` b"), 3);
    assert_eq!(code_span_len(b"``a`b`` c"), 7);
    assert_eq!(code_span_len(b"``a` b"), 2);
  }
}
