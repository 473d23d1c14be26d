//! Token stream produced by lowering a comrak document.
//!
//! The layout follows the classic flat Markdown token model: block tokens form
//! a flat sequence with explicit open/close markers (`nesting` of `1` / `-1`),
//! and every leaf block carries a single [`TokenKind::Inline`] token whose
//! `children` hold the inline tokens of that block, again flat.

/// Discriminant for every token the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  ParagraphOpen,
  ParagraphClose,
  HeadingOpen,
  HeadingClose,
  BlockquoteOpen,
  BlockquoteClose,
  BulletListOpen,
  BulletListClose,
  OrderedListOpen,
  OrderedListClose,
  ListItemOpen,
  ListItemClose,
  TableOpen,
  TableClose,
  TheadOpen,
  TheadClose,
  TbodyOpen,
  TbodyClose,
  TrOpen,
  TrClose,
  ThOpen,
  ThClose,
  TdOpen,
  TdClose,
  CodeBlock,
  Fence,
  HtmlBlock,
  Hr,
  /// Container for the inline children of a leaf block.
  Inline,
  Text,
  /// Backslash escape; `content` is the literal character, `markup` the
  /// original `\x` sequence.
  TextSpecial,
  Softbreak,
  Hardbreak,
  CodeInline,
  EmOpen,
  EmClose,
  StrongOpen,
  StrongClose,
  StrikethroughOpen,
  StrikethroughClose,
  LinkOpen,
  LinkClose,
  Image,
  HtmlInline,
  TocOpen,
  TocBody,
  TocClose,
  /// Pre-rendered HTML for nodes the engine has no dedicated kind for.
  Raw,
}

impl TokenKind {
  /// Snake-case name, as used in debug logs.
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::ParagraphOpen => "paragraph_open",
      Self::ParagraphClose => "paragraph_close",
      Self::HeadingOpen => "heading_open",
      Self::HeadingClose => "heading_close",
      Self::BlockquoteOpen => "blockquote_open",
      Self::BlockquoteClose => "blockquote_close",
      Self::BulletListOpen => "bullet_list_open",
      Self::BulletListClose => "bullet_list_close",
      Self::OrderedListOpen => "ordered_list_open",
      Self::OrderedListClose => "ordered_list_close",
      Self::ListItemOpen => "list_item_open",
      Self::ListItemClose => "list_item_close",
      Self::TableOpen => "table_open",
      Self::TableClose => "table_close",
      Self::TheadOpen => "thead_open",
      Self::TheadClose => "thead_close",
      Self::TbodyOpen => "tbody_open",
      Self::TbodyClose => "tbody_close",
      Self::TrOpen => "tr_open",
      Self::TrClose => "tr_close",
      Self::ThOpen => "th_open",
      Self::ThClose => "th_close",
      Self::TdOpen => "td_open",
      Self::TdClose => "td_close",
      Self::CodeBlock => "code_block",
      Self::Fence => "fence",
      Self::HtmlBlock => "html_block",
      Self::Hr => "hr",
      Self::Inline => "inline",
      Self::Text => "text",
      Self::TextSpecial => "text_special",
      Self::Softbreak => "softbreak",
      Self::Hardbreak => "hardbreak",
      Self::CodeInline => "code_inline",
      Self::EmOpen => "em_open",
      Self::EmClose => "em_close",
      Self::StrongOpen => "strong_open",
      Self::StrongClose => "strong_close",
      Self::StrikethroughOpen => "s_open",
      Self::StrikethroughClose => "s_close",
      Self::LinkOpen => "link_open",
      Self::LinkClose => "link_close",
      Self::Image => "image",
      Self::HtmlInline => "html_inline",
      Self::TocOpen => "toc_open",
      Self::TocBody => "toc_body",
      Self::TocClose => "toc_close",
      Self::Raw => "raw",
    }
  }
}

/// A single node of the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind:     TokenKind,
  /// HTML element name, empty for tokens without a tag.
  pub tag:      String,
  /// Attribute pairs in output order. Keys are unique.
  pub attrs:    Vec<(String, String)>,
  /// Source line span `[start, end)`, 0-based.
  pub map:      Option<[usize; 2]>,
  /// `1` opens a tag, `-1` closes it, `0` is self-contained.
  pub nesting:  i8,
  pub content:  String,
  pub markup:   String,
  pub info:     String,
  /// Inline children, only populated on [`TokenKind::Inline`].
  pub children: Vec<Self>,
  /// Block-level token (affects newline placement when rendering).
  pub block:    bool,
  /// Skipped by the renderer (paragraphs inside tight lists).
  pub hidden:   bool,
}

impl Token {
  /// Create a token of `kind` with the given tag and nesting.
  #[must_use]
  pub fn new(kind: TokenKind, tag: &str, nesting: i8) -> Self {
    Self {
      kind,
      tag: tag.to_string(),
      attrs: Vec::new(),
      map: None,
      nesting,
      content: String::new(),
      markup: String::new(),
      info: String::new(),
      children: Vec::new(),
      block: false,
      hidden: false,
    }
  }

  /// Create a block-level token.
  #[must_use]
  pub fn block(kind: TokenKind, tag: &str, nesting: i8) -> Self {
    Self {
      block: true,
      ..Self::new(kind, tag, nesting)
    }
  }

  /// Create a plain text token.
  #[must_use]
  pub fn text(content: impl Into<String>) -> Self {
    Self {
      content: content.into(),
      ..Self::new(TokenKind::Text, "", 0)
    }
  }

  /// Look up an attribute value.
  #[must_use]
  pub fn attr_get(&self, key: &str) -> Option<&str> {
    self
      .attrs
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  /// Set an attribute, updating it in place when the key already exists and
  /// appending it otherwise.
  pub fn attr_set(&mut self, key: &str, value: impl Into<String>) {
    let value = value.into();
    if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| k == key) {
      slot.1 = value;
    } else {
      self.attrs.push((key.to_string(), value));
    }
  }

  /// Builder-style variant of [`Token::attr_set`].
  #[must_use]
  pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
    self.attr_set(key, value);
    self
  }

  /// Heading level parsed from an `hN` tag.
  #[must_use]
  pub fn heading_level(&self) -> Option<u8> {
    self
      .tag
      .strip_prefix('h')
      .and_then(|n| n.parse::<u8>().ok())
      .filter(|n| (1..=6).contains(n))
  }
}
