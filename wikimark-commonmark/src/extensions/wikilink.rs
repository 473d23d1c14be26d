//! `[[target]]` and `[[target|label]]` links.
use crate::{
  engine::{InlineRule, InlineState},
  token::{Token, TokenKind},
  utils::Slugifier,
};

/// Source rule turning bracketed wikilinks into anchors. The raw `[[...]]`
/// text is claimed before comrak parses the line.
#[derive(Debug, Clone)]
pub struct WikilinkRule {
  slugifier: Slugifier,
}

impl WikilinkRule {
  /// Create the rule; targets are slugified with `slugifier`.
  #[must_use]
  pub const fn new(slugifier: Slugifier) -> Self {
    Self { slugifier }
  }
}

impl InlineRule for WikilinkRule {
  fn name(&self) -> &'static str {
    "wikilink"
  }

  fn try_lex(&self, state: &mut InlineState<'_>) -> bool {
    let rest = state.rest();
    if !rest.starts_with("[[") {
      return false;
    }
    let Some(close) = scan_wikilink(rest) else {
      return false;
    };

    let inner = &rest[2..close];
    let (target, label) = match inner.split_once('|') {
      Some((target, label)) if !label.is_empty() => (target, label),
      Some((target, _)) => (target, target),
      None => (inner, inner),
    };

    let mut open = Token::new(TokenKind::LinkOpen, "a", 1)
      .with_attr("href", self.slugifier.slugify(target));
    open.markup = "wikilink".to_string();

    state.push(open);
    state.push(Token::text(label));
    state.push(Token::new(TokenKind::LinkClose, "a", -1));
    state.advance(close + 2);
    true
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
  Scanning,
  /// After a backslash; the next character is taken literally.
  Escaped,
  /// After a single `]`.
  AwaitingClose,
}

/// Find the closing `]]` of a wikilink starting with `[[` at the beginning
/// of `src`.
///
/// Nested `[[` pairs must be closed too. Returns the byte offset of the
/// closing `]]`, or `None` when a line break or the end of input comes first.
fn scan_wikilink(src: &str) -> Option<usize> {
  let bytes = src.as_bytes();
  let mut depth = 1usize;
  let mut state = ScanState::Scanning;
  let mut i = 2;

  while let Some(&b) = bytes.get(i) {
    match state {
      ScanState::Escaped => {
        if b == b'\n' {
          return None;
        }
        state = ScanState::Scanning;
        i += 1;
      },
      ScanState::AwaitingClose if b == b']' => {
        depth -= 1;
        if depth == 0 {
          return Some(i - 1);
        }
        state = ScanState::Scanning;
        i += 1;
      },
      // Not a closing pair; look at this byte again as plain text.
      ScanState::AwaitingClose => state = ScanState::Scanning,
      ScanState::Scanning => {
        match b {
          b'\n' => return None,
          b'\\' => state = ScanState::Escaped,
          b'[' if bytes.get(i + 1) == Some(&b'[') => {
            depth += 1;
            i += 1;
          },
          b']' => state = ScanState::AwaitingClose,
          _ => {},
        }
        i += 1;
      },
    }
  }

  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_scan_simple() {
    assert_eq!(scan_wikilink("[[Link]]"), Some(6));
    assert_eq!(scan_wikilink("[[Link]] tail"), Some(6));
    assert_eq!(scan_wikilink("[[]]"), Some(2));
  }

  #[test]
  fn test_scan_nested() {
    assert_eq!(scan_wikilink("[[a [[b]] c]]"), Some(11));
    assert_eq!(scan_wikilink("[[LINK[[]]"), None);
  }

  #[test]
  fn test_scan_escapes() {
    assert_eq!(scan_wikilink(r"[[a\]]]"), Some(5));
    assert_eq!(scan_wikilink(r"[[a\]\]]]"), Some(7));
    assert_eq!(scan_wikilink(r"[[LINK|\[hole]]"), Some(13));
  }

  #[test]
  fn test_scan_declines() {
    assert_eq!(scan_wikilink("[[LINK|\n]]"), None);
    assert_eq!(scan_wikilink("[[open"), None);
    assert_eq!(scan_wikilink("[[one]"), None);
    assert_eq!(scan_wikilink("[[a] b"), None);
  }

  #[test]
  fn test_scan_single_bracket_inside() {
    assert_eq!(scan_wikilink("[[a]b]]"), Some(5));
    assert_eq!(scan_wikilink("[[a[b]]"), Some(5));
  }
}
