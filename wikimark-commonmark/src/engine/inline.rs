//! Inline rule driver.
//!
//! comrak has already split inline content into text, emphasis, links and so
//! on. Custom syntax can only live in the plain parts, so the driver joins
//! every maximal run of `text`, `text_special`, `softbreak` and `hardbreak`
//! children into one scan string and offers each position of it to the
//! registered rules. Escapes appear in the scan string as their original `\x`
//! markup and are never split; line breaks appear as `\n`.
use log::debug;

use super::InlineRule;
use crate::token::{Token, TokenKind};

/// Cursor over one scan string, handed to [`InlineRule::try_lex`].
#[derive(Debug)]
pub struct InlineState<'s> {
  src:         &'s str,
  pos:         usize,
  starts_line: bool,
  ends_line:   bool,
  emitted:     Vec<Token>,
}

impl<'s> InlineState<'s> {
  pub(super) fn new(src: &'s str, starts_line: bool, ends_line: bool) -> Self {
    Self {
      src,
      pos: 0,
      starts_line,
      ends_line,
      emitted: Vec::new(),
    }
  }

  /// The whole scan string.
  #[must_use]
  pub const fn src(&self) -> &'s str {
    self.src
  }

  /// Current byte offset into the scan string.
  #[must_use]
  pub const fn pos(&self) -> usize {
    self.pos
  }

  /// Text from the current position to the end of the scan string.
  #[must_use]
  pub fn rest(&self) -> &'s str {
    self.src.get(self.pos..).unwrap_or_default()
  }

  /// Whether the current position is the first column of a source line.
  #[must_use]
  pub fn at_line_start(&self) -> bool {
    if self.pos == 0 {
      self.starts_line
    } else {
      self.src.get(..self.pos).is_some_and(|s| s.ends_with('\n'))
    }
  }

  /// Text from the current position up to, not including, the next line
  /// break.
  #[must_use]
  pub fn current_line(&self) -> &'s str {
    let rest = self.rest();
    rest.find('\n').map_or(rest, |end| &rest[..end])
  }

  /// Whether the current line ends inside this scan string, either with a
  /// line break or because the run closes the block.
  #[must_use]
  pub fn line_is_complete(&self) -> bool {
    self.rest().contains('\n') || self.ends_line
  }

  /// Emit a token in place of the consumed span.
  pub fn push(&mut self, token: Token) {
    self.emitted.push(token);
  }

  /// Consume `len` bytes.
  pub const fn advance(&mut self, len: usize) {
    self.pos += len;
  }
}

/// A child token mapped onto its byte range of the scan string.
struct Piece {
  start: usize,
  end:   usize,
  index: usize,
}

/// A span of the scan string replaced by rule output.
struct Replacement {
  start:  usize,
  end:    usize,
  tokens: Vec<Token>,
}

const fn is_plain(kind: TokenKind) -> bool {
  matches!(
    kind,
    TokenKind::Text
      | TokenKind::TextSpecial
      | TokenKind::Softbreak
      | TokenKind::Hardbreak
  )
}

/// Run `rules` over the plain-text runs of an inline token's children.
#[must_use]
pub fn apply_rules(rules: &[Box<dyn InlineRule>], children: Vec<Token>) -> Vec<Token> {
  let total = children.len();
  let mut out = Vec::with_capacity(total);
  let mut iter = children.into_iter().enumerate().peekable();

  while let Some((index, token)) = iter.next() {
    if !is_plain(token.kind) {
      out.push(token);
      continue;
    }

    let mut run = vec![token];
    while let Some((_, next)) = iter.next_if(|(_, t)| is_plain(t.kind)) {
      run.push(next);
    }
    let starts_line = index == 0;
    let ends_line = index + run.len() == total;

    out.extend(apply_to_run(rules, run, starts_line, ends_line));
  }

  out
}

fn apply_to_run(
  rules: &[Box<dyn InlineRule>],
  run: Vec<Token>,
  starts_line: bool,
  ends_line: bool,
) -> Vec<Token> {
  let mut src = String::new();
  let mut pieces = Vec::with_capacity(run.len());
  for (index, token) in run.iter().enumerate() {
    let start = src.len();
    match token.kind {
      TokenKind::Text => src.push_str(&token.content),
      TokenKind::TextSpecial => src.push_str(&token.markup),
      _ => src.push('\n'),
    }
    pieces.push(Piece {
      start,
      end: src.len(),
      index,
    });
  }

  let replacements = scan(rules, &src, &run, &pieces, starts_line, ends_line);
  if replacements.is_empty() {
    return run;
  }

  let mut out = Vec::with_capacity(run.len() + replacements.len() * 3);
  let mut cursor = 0;
  for replacement in replacements {
    emit_range(&src, &run, &pieces, cursor, replacement.start, &mut out);
    out.extend(replacement.tokens);
    cursor = replacement.end;
  }
  emit_range(&src, &run, &pieces, cursor, src.len(), &mut out);
  out
}

fn scan(
  rules: &[Box<dyn InlineRule>],
  src: &str,
  run: &[Token],
  pieces: &[Piece],
  starts_line: bool,
  ends_line: bool,
) -> Vec<Replacement> {
  let mut replacements = Vec::new();
  let mut state = InlineState::new(src, starts_line, ends_line);

  while state.pos < src.len() {
    let inside_escape = pieces.iter().any(|piece| {
      run[piece.index].kind == TokenKind::TextSpecial
        && piece.start < state.pos
        && state.pos < piece.end
    });

    if !inside_escape {
      let start = state.pos;
      if let Some(tokens) = try_rules(rules, &mut state) {
        debug!(
          "Inline rule matched {:?}",
          src.get(start..state.pos).unwrap_or_default()
        );
        replacements.push(Replacement {
          start,
          end: state.pos.min(src.len()),
          tokens,
        });
        continue;
      }
    }

    let step = state.rest().chars().next().map_or(1, char::len_utf8);
    state.pos += step;
  }

  replacements
}

/// Offer the current position to each rule in turn.
///
/// Returns the tokens of the first rule that consumed input. The state is
/// left where that rule stopped, or unchanged when no rule matched.
pub(super) fn try_rules(
  rules: &[Box<dyn InlineRule>],
  state: &mut InlineState<'_>,
) -> Option<Vec<Token>> {
  let start = state.pos;
  for rule in rules {
    if rule.try_lex(state) && state.pos > start {
      return Some(std::mem::take(&mut state.emitted));
    }
    state.pos = start;
    state.emitted.clear();
  }
  None
}

/// Emit the original children covering `[from, to)` of the scan string,
/// splitting text children at the range edges.
fn emit_range(
  src: &str,
  run: &[Token],
  pieces: &[Piece],
  from: usize,
  to: usize,
  out: &mut Vec<Token>,
) {
  if from >= to {
    return;
  }

  for piece in pieces {
    if piece.end <= from || piece.start >= to {
      continue;
    }

    let token = &run[piece.index];
    if token.kind == TokenKind::Text {
      let start = piece.start.max(from);
      let end = piece.end.min(to);
      if let Some(text) = src.get(start..end).filter(|t| !t.is_empty()) {
        out.push(Token::text(text));
      }
    } else if from <= piece.start && piece.end <= to {
      out.push(token.clone());
    }
  }
}
