//! Pre-parse rewrite of links with an empty target.
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::{never_matching_regex, slugify};

static MISSING_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[([^\[\]\n]+)\]\([ \t]*\)").unwrap_or_else(|e| {
    log::error!(
      "Failed to compile MISSING_LINK_RE regex: {e}\n Falling back to never \
       matching regex."
    );
    never_matching_regex()
  })
});

/// Turn every `[title]()` into `[title](/slug-of-title)`.
///
/// The first literal `[]()` is dropped beforehand.
#[must_use]
pub fn normalize_missing_links(content: &str) -> String {
  let content = content.replacen("[]()", "", 1);

  MISSING_LINK_RE
    .replace_all(&content, |caps: &regex::Captures| {
      let title = &caps[1];
      format!("[{title}](/{})", slugify(title))
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_links_missing_targets() {
    assert_eq!(normalize_missing_links("[Test]()"), "[Test](/test)");
    assert_eq!(
      normalize_missing_links("[CrAzY CaSe SpAcEd]()"),
      "[CrAzY CaSe SpAcEd](/crazy-case-spaced)"
    );
    assert_eq!(normalize_missing_links("see [A]( ) and [B]()"), "see [A](/a) and [B](/b)");
  }

  #[test]
  fn test_leaves_other_links_alone() {
    assert_eq!(normalize_missing_links("[Test]"), "[Test]");
    assert_eq!(normalize_missing_links("[Test](/x)"), "[Test](/x)");
    assert_eq!(normalize_missing_links("[[Test]]"), "[[Test]]");
  }

  #[test]
  fn test_drops_first_empty_link_only() {
    assert_eq!(normalize_missing_links("a[]() b[]()"), "a b[]()");
  }
}
