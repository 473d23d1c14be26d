//! Slug generation for anchors, wikilink targets and missing-link fixes.
//!
//! The output matches the conventions of the popular `slugify` package used
//! by most wiki front-ends: common symbols are spelled out (`$` becomes
//! `dollar`), Latin accents are folded, characters outside a small safe set
//! are dropped, and runs of whitespace become the replacement string.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::UtilError;

/// Options controlling how text is turned into a slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugifyOptions {
  /// String used in place of whitespace runs.
  pub replacement: String,

  /// Regex pattern of characters to strip, replacing the default set of
  /// disallowed characters.
  pub remove: Option<String>,

  /// Lowercase the result.
  pub lower: bool,

  /// Strip everything except ASCII letters, digits and whitespace.
  pub strict: bool,

  /// Trim leading and trailing whitespace before joining.
  pub trim: bool,
}

impl Default for SlugifyOptions {
  fn default() -> Self {
    Self {
      replacement: "-".to_string(),
      remove:      None,
      lower:       false,
      strict:      false,
      trim:        true,
    }
  }
}

impl SlugifyOptions {
  /// Default options with lowercasing enabled.
  #[must_use]
  pub fn lowercase() -> Self {
    Self {
      lower: true,
      ..Self::default()
    }
  }
}

/// A slug generator with its `remove` pattern compiled.
#[derive(Debug, Clone)]
pub struct Slugifier {
  options: SlugifyOptions,
  remove:  Option<Regex>,
}

impl Slugifier {
  /// Compile the given options.
  ///
  /// # Errors
  ///
  /// Returns an error if `options.remove` is not a valid regex.
  pub fn new(options: SlugifyOptions) -> Result<Self, UtilError> {
    let remove = options.remove.as_deref().map(Regex::new).transpose()?;
    Ok(Self { options, remove })
  }

  /// Compile the given options, dropping an invalid `remove` pattern.
  #[must_use]
  pub fn new_lossy(options: SlugifyOptions) -> Self {
    match Self::new(options.clone()) {
      Ok(slugifier) => slugifier,
      Err(e) => {
        log::error!(
          "Invalid slugify remove pattern {:?}: {e}\n Falling back to the \
           default character set.",
          options.remove
        );
        Self {
          options: SlugifyOptions {
            remove: None,
            ..options
          },
          remove:  None,
        }
      },
    }
  }

  /// Options this slugifier was built from.
  #[must_use]
  pub const fn options(&self) -> &SlugifyOptions {
    &self.options
  }

  /// Turn `text` into a slug.
  #[must_use]
  pub fn slugify(&self, text: &str) -> String {
    let replacement = self.options.replacement.as_str();
    let mut slug = String::with_capacity(text.len());

    for ch in text.chars() {
      let mut buf = [0u8; 4];
      let mut mapped = match transliterate(ch) {
        Some(spelled) => spelled,
        None => &*ch.encode_utf8(&mut buf),
      };
      if mapped == replacement {
        mapped = " ";
      }

      match &self.remove {
        Some(remove) => slug.push_str(&remove.replace_all(mapped, "")),
        None => slug.extend(mapped.chars().filter(|&c| is_allowed(c))),
      }
    }

    if self.options.strict {
      slug.retain(|c| c.is_ascii_alphanumeric() || c.is_whitespace());
    }

    let source = if self.options.trim {
      slug.trim()
    } else {
      slug.as_str()
    };

    let mut joined = String::with_capacity(source.len());
    let mut in_whitespace = false;
    for c in source.chars() {
      if c.is_whitespace() {
        if !in_whitespace {
          joined.push_str(replacement);
        }
        in_whitespace = true;
      } else {
        joined.push(c);
        in_whitespace = false;
      }
    }

    if self.options.lower {
      joined.to_lowercase()
    } else {
      joined
    }
  }
}

impl Default for Slugifier {
  fn default() -> Self {
    Self {
      options: SlugifyOptions::default(),
      remove:  None,
    }
  }
}

/// Slugify with default options and lowercasing, as used for missing links.
#[must_use]
pub fn slugify(text: &str) -> String {
  static LOWERCASE: LazyLock<Slugifier> = LazyLock::new(|| {
    Slugifier {
      options: SlugifyOptions::lowercase(),
      remove:  None,
    }
  });
  LOWERCASE.slugify(text)
}

/// Characters kept by the default remove set.
fn is_allowed(c: char) -> bool {
  c.is_ascii_alphanumeric()
    || c.is_whitespace()
    || matches!(
      c,
      '_' | '$' | '*' | '+' | '~' | '.' | '(' | ')' | '\'' | '"' | '!' | '-'
        | ':' | '@'
    )
}

/// Spelled-out or accent-folded replacement for a character.
const fn transliterate(c: char) -> Option<&'static str> {
  let mapped = match c {
    '$' => "dollar",
    '%' => "percent",
    '&' => "and",
    '<' => "less",
    '>' => "greater",
    '|' => "or",
    '¢' => "cent",
    '£' => "pound",
    '¤' => "currency",
    '¥' => "yen",
    '©' => "(c)",
    '®' => "(r)",
    '™' => "tm",
    '€' => "euro",
    '∑' => "sum",
    '∞' => "infinity",
    '♥' => "love",
    'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
    'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
    'Æ' => "AE",
    'æ' => "ae",
    'Ç' => "C",
    'ç' => "c",
    'È' | 'É' | 'Ê' | 'Ë' => "E",
    'è' | 'é' | 'ê' | 'ë' => "e",
    'Ì' | 'Í' | 'Î' | 'Ï' => "I",
    'ì' | 'í' | 'î' | 'ï' => "i",
    'Ð' => "D",
    'ð' => "d",
    'Ñ' => "N",
    'ñ' => "n",
    'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
    'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
    'Œ' => "OE",
    'œ' => "oe",
    'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
    'ù' | 'ú' | 'û' | 'ü' => "u",
    'Ý' | 'Ÿ' => "Y",
    'ý' | 'ÿ' => "y",
    'Þ' => "TH",
    'þ' => "th",
    'ß' => "ss",
    'Ł' => "L",
    'ł' => "l",
    'Š' => "S",
    'š' => "s",
    'Ž' => "Z",
    'ž' => "z",
    _ => return None,
  };
  Some(mapped)
}
