//! Lowering of the comrak AST into a flat token stream.
use comrak::{
  nodes::{AstNode, ListType, NodeValue, Sourcepos, TableAlignment},
  options::Options,
};
use log::{trace, warn};

use super::Masked;
use crate::{
  token::{Token, TokenKind},
  utils::extract_inline_text,
};

/// Lower the document rooted at `root` into block tokens.
///
/// `root` was parsed from `masked.source()`; `source` is the unmasked text,
/// which heading contents are taken from verbatim.
#[must_use]
pub fn lower<'a>(
  root: &'a AstNode<'a>,
  source: &str,
  masked: &Masked<'_>,
  options: &Options<'_>,
) -> Vec<Token> {
  let mut raw_options = options.clone();
  raw_options.render.escaped_char_spans = false;

  let mut lowerer = Lowerer {
    lines: source.lines().collect(),
    masked,
    raw_options,
    tokens: Vec::new(),
  };
  lowerer.blocks(root, false);
  lowerer.tokens
}

struct Lowerer<'s, 'm, 'c> {
  lines:       Vec<&'s str>,
  masked:      &'m Masked<'m>,
  raw_options: Options<'c>,
  tokens:      Vec<Token>,
}

impl Lowerer<'_, '_, '_> {
  fn blocks<'a>(&mut self, parent: &'a AstNode<'a>, tight: bool) {
    for child in parent.children() {
      self.block(child, tight);
    }
  }

  fn block<'a>(&mut self, node: &'a AstNode<'a>, tight: bool) {
    let map = block_map(node);

    match node.data.borrow().value {
      NodeValue::Document => self.blocks(node, false),
      NodeValue::BlockQuote => {
        self.open(TokenKind::BlockquoteOpen, "blockquote", ">", map);
        self.blocks(node, false);
        self.close(TokenKind::BlockquoteClose, "blockquote", ">");
      },
      NodeValue::List(ref list) => {
        let ordered = matches!(list.list_type, ListType::Ordered);
        let (open, close, tag, markup) = if ordered {
          (
            TokenKind::OrderedListOpen,
            TokenKind::OrderedListClose,
            "ol",
            ".",
          )
        } else {
          (TokenKind::BulletListOpen, TokenKind::BulletListClose, "ul", "-")
        };

        self.open(open, tag, markup, map);
        if ordered && list.start != 1 {
          if let Some(token) = self.tokens.last_mut() {
            token.attr_set("start", list.start.to_string());
          }
        }
        self.blocks(node, list.tight);
        self.close(close, tag, markup);
      },
      NodeValue::Item(_) => {
        self.open(TokenKind::ListItemOpen, "li", "", map);
        self.blocks(node, tight);
        self.close(TokenKind::ListItemClose, "li", "");
      },
      NodeValue::Paragraph => {
        self.open(TokenKind::ParagraphOpen, "p", "", map);
        if let Some(token) = self.tokens.last_mut() {
          token.hidden = tight;
        }

        let mut inline = self.inline(node, map);
        inline.content = self.inline_source(node);
        self.tokens.push(inline);

        self.close(TokenKind::ParagraphClose, "p", "");
        if let Some(token) = self.tokens.last_mut() {
          token.hidden = tight;
        }
      },
      NodeValue::Heading(ref heading) => {
        let tag = format!("h{}", heading.level);
        let markup = match (heading.setext, heading.level) {
          (true, 1) => "=".to_string(),
          (true, _) => "-".to_string(),
          (false, level) => "#".repeat(usize::from(level)),
        };

        self.open(TokenKind::HeadingOpen, &tag, &markup, map);
        let mut inline = self.inline(node, map);
        inline.content = self.heading_source(node, heading.setext);
        self.tokens.push(inline);
        self.close(TokenKind::HeadingClose, &tag, &markup);
      },
      NodeValue::CodeBlock(ref code) => {
        let kind = if code.fenced {
          TokenKind::Fence
        } else {
          TokenKind::CodeBlock
        };
        let mut token = Token::block(kind, "code", 0);
        token.map = map;
        token.info = self.masked.restore(&code.info).into_owned();
        token.content = self.masked.restore(&code.literal).into_owned();
        self.tokens.push(token);
      },
      NodeValue::HtmlBlock(ref html) => {
        let mut token = Token::block(TokenKind::HtmlBlock, "", 0);
        token.map = map;
        token.content = self.masked.restore(&html.literal).into_owned();
        self.tokens.push(token);
      },
      NodeValue::ThematicBreak => {
        let mut token = Token::block(TokenKind::Hr, "hr", 0);
        token.map = map;
        token.markup = "---".to_string();
        self.tokens.push(token);
      },
      NodeValue::Table(ref table) => {
        let alignments = table.alignments.clone();
        self.table(node, &alignments, map);
      },
      _ => {
        let token = self.raw(node, map, true);
        self.tokens.push(token);
      },
    }
  }

  fn open(
    &mut self,
    kind: TokenKind,
    tag: &str,
    markup: &str,
    map: Option<[usize; 2]>,
  ) {
    let mut token = Token::block(kind, tag, 1);
    token.markup = markup.to_string();
    token.map = map;
    self.tokens.push(token);
  }

  fn close(&mut self, kind: TokenKind, tag: &str, markup: &str) {
    let mut token = Token::block(kind, tag, -1);
    token.markup = markup.to_string();
    self.tokens.push(token);
  }

  fn table<'a>(
    &mut self,
    node: &'a AstNode<'a>,
    alignments: &[TableAlignment],
    map: Option<[usize; 2]>,
  ) {
    self.open(TokenKind::TableOpen, "table", "", map);

    let mut in_body = false;
    for row in node.children() {
      let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
      if header {
        self.open(TokenKind::TheadOpen, "thead", "", block_map(row));
      } else if !in_body {
        self.open(TokenKind::TbodyOpen, "tbody", "", block_map(row));
        in_body = true;
      }

      self.open(TokenKind::TrOpen, "tr", "", block_map(row));
      for (column, cell) in row.children().enumerate() {
        let (open, close, tag) = if header {
          (TokenKind::ThOpen, TokenKind::ThClose, "th")
        } else {
          (TokenKind::TdOpen, TokenKind::TdClose, "td")
        };

        let cell_map = block_map(cell);
        self.open(open, tag, "", cell_map);
        if let Some(style) = alignments.get(column).and_then(align_style) {
          if let Some(token) = self.tokens.last_mut() {
            token.attr_set("style", style);
          }
        }

        let mut inline = self.inline(cell, cell_map);
        inline.content = self.inline_source(cell);
        self.tokens.push(inline);
        self.close(close, tag, "");
      }
      self.close(TokenKind::TrClose, "tr", "");

      if header {
        self.close(TokenKind::TheadClose, "thead", "");
      }
    }

    if in_body {
      self.close(TokenKind::TbodyClose, "tbody", "");
    }
    self.close(TokenKind::TableClose, "table", "");
  }

  /// Build the `inline` token holding the lowered children of `node`.
  fn inline<'a>(&self, node: &'a AstNode<'a>, map: Option<[usize; 2]>) -> Token {
    let mut token = Token::block(TokenKind::Inline, "", 0);
    token.map = map;
    self.inlines_into(node, &mut token.children);
    token
  }

  fn inlines_into<'a>(&self, parent: &'a AstNode<'a>, out: &mut Vec<Token>) {
    for child in parent.children() {
      self.inline_node(child, out);
    }
  }

  fn inline_node<'a>(&self, node: &'a AstNode<'a>, out: &mut Vec<Token>) {
    match node.data.borrow().value {
      NodeValue::Text(ref text) => self.masked.expand_text(text, out),
      NodeValue::Escaped => {
        let literal = extract_inline_text(node);
        let mut token = Token::new(TokenKind::TextSpecial, "", 0);
        token.markup = format!("\\{literal}");
        token.content = literal;
        token.info = "escape".to_string();
        out.push(token);
      },
      NodeValue::SoftBreak => out.push(Token::new(TokenKind::Softbreak, "br", 0)),
      NodeValue::LineBreak => out.push(Token::new(TokenKind::Hardbreak, "br", 0)),
      NodeValue::Code(ref code) => {
        let mut token = Token::new(TokenKind::CodeInline, "code", 0);
        token.content = self.masked.restore(&code.literal).into_owned();
        token.markup = "`".to_string();
        out.push(token);
      },
      NodeValue::Emph => {
        self.wrap(node, out, (TokenKind::EmOpen, TokenKind::EmClose), "em", "*");
      },
      NodeValue::Strong => {
        self.wrap(
          node,
          out,
          (TokenKind::StrongOpen, TokenKind::StrongClose),
          "strong",
          "**",
        );
      },
      NodeValue::Strikethrough => {
        self.wrap(
          node,
          out,
          (TokenKind::StrikethroughOpen, TokenKind::StrikethroughClose),
          "del",
          "~~",
        );
      },
      NodeValue::Link(ref link) => {
        let mut open = Token::new(TokenKind::LinkOpen, "a", 1)
          .with_attr("href", self.masked.restore(&link.url));
        if !link.title.is_empty() {
          open.attr_set("title", self.masked.restore(&link.title));
        }
        out.push(open);
        self.inlines_into(node, out);
        out.push(Token::new(TokenKind::LinkClose, "a", -1));
      },
      NodeValue::Image(ref link) => {
        let alt = self
          .masked
          .restore_plain(&extract_inline_text(node))
          .into_owned();
        let mut image = Token::new(TokenKind::Image, "img", 0)
          .with_attr("src", self.masked.restore(&link.url))
          .with_attr("alt", alt.clone());
        if !link.title.is_empty() {
          image.attr_set("title", self.masked.restore(&link.title));
        }
        image.content = alt;
        self.inlines_into(node, &mut image.children);
        out.push(image);
      },
      NodeValue::HtmlInline(ref html) => {
        let mut token = Token::new(TokenKind::HtmlInline, "", 0);
        token.content = self.masked.restore(html).into_owned();
        out.push(token);
      },
      _ => out.push(self.raw(node, None, false)),
    }
  }

  fn wrap<'a>(
    &self,
    node: &'a AstNode<'a>,
    out: &mut Vec<Token>,
    (open, close): (TokenKind, TokenKind),
    tag: &str,
    markup: &str,
  ) {
    let mut token = Token::new(open, tag, 1);
    token.markup = markup.to_string();
    out.push(token);

    self.inlines_into(node, out);

    let mut token = Token::new(close, tag, -1);
    token.markup = markup.to_string();
    out.push(token);
  }

  /// Render a node the engine has no dedicated token for through comrak.
  fn raw<'a>(
    &self,
    node: &'a AstNode<'a>,
    map: Option<[usize; 2]>,
    block: bool,
  ) -> Token {
    trace!("Falling back to comrak rendering for {:?}", node.data.borrow().value);

    let mut html = String::new();
    if let Err(e) = comrak::format_html(node, &self.raw_options, &mut html) {
      warn!("Failed to render node through comrak: {e}");
    }

    let mut token = Token::new(TokenKind::Raw, "", 0);
    token.content = self.masked.restore_html(&html).into_owned();
    token.block = block;
    token.map = map;
    token
  }

  /// Source-like text of an inline container, markup dropped but claimed
  /// spans kept raw.
  fn inline_source<'a>(&self, node: &'a AstNode<'a>) -> String {
    self.masked.restore(&extract_inline_text(node)).into_owned()
  }

  /// Raw source text of a heading, without its markers.
  fn heading_source<'a>(&self, node: &'a AstNode<'a>, setext: bool) -> String {
    let pos = node.data.borrow().sourcepos;
    let first = pos.start.line.checked_sub(1);

    if setext {
      if pos.start.column <= 1 {
        if let Some(text) = first.and_then(|start| self.setext_source(start, pos)) {
          return text;
        }
      }
      return self.inline_source(node);
    }

    first
      .and_then(|index| self.lines.get(index))
      .map_or_else(
        || self.inline_source(node),
        |line| {
          let from = pos.start.column.saturating_sub(1);
          atx_content(line.get(from..).unwrap_or(line)).to_string()
        },
      )
  }

  fn setext_source(&self, start: usize, pos: Sourcepos) -> Option<String> {
    let underline = pos.end.line.checked_sub(1)?;
    let lines = self.lines.get(start..underline)?;
    Some(
      lines
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string(),
    )
  }
}

/// Strip the opening and optional closing sequence of an ATX heading line.
fn atx_content(line: &str) -> &str {
  let content = line.trim_start().trim_start_matches('#').trim();
  let without_closing = content.trim_end_matches('#');

  if without_closing.is_empty() {
    ""
  } else if without_closing.len() < content.len()
    && without_closing.ends_with([' ', '\t'])
  {
    without_closing.trim_end()
  } else {
    content
  }
}

/// 0-based `[start, end)` line span of a block node.
fn block_map<'a>(node: &'a AstNode<'a>) -> Option<[usize; 2]> {
  let pos = node.data.borrow().sourcepos;
  (pos.start.line > 0).then(|| [pos.start.line - 1, pos.end.line])
}

const fn align_style(alignment: &TableAlignment) -> Option<&'static str> {
  match alignment {
    TableAlignment::Left => Some("text-align:left"),
    TableAlignment::Center => Some("text-align:center"),
    TableAlignment::Right => Some("text-align:right"),
    TableAlignment::None => None,
  }
}

#[cfg(test)]
mod tests {
  use comrak::{Arena, parse_document};

  use super::*;
  use crate::engine::EngineOptions;

  fn lower_str(source: &str) -> Vec<Token> {
    let arena = Arena::new();
    let engine_options = EngineOptions::default();
    let options = engine_options.comrak_options();
    let root = parse_document(&arena, source, &options);
    lower(root, source, &Masked::new(source, &[]), &options)
  }

  fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
  }

  #[test]
  fn test_atx_content() {
    assert_eq!(atx_content("# First"), "First");
    assert_eq!(atx_content("## Second ##"), "Second");
    assert_eq!(atx_content("# foo#"), "foo#");
    assert_eq!(atx_content("# "), "");
    assert_eq!(atx_content("### ###"), "");
    assert_eq!(atx_content("## End / Return (`$00`)"), "End / Return (`$00`)");
  }

  #[test]
  fn test_heading_tokens_carry_source_and_map() {
    let tokens = lower_str("# First\n\n## Second ##\n");
    assert_eq!(kinds(&tokens), vec![
      TokenKind::HeadingOpen,
      TokenKind::Inline,
      TokenKind::HeadingClose,
      TokenKind::HeadingOpen,
      TokenKind::Inline,
      TokenKind::HeadingClose,
    ]);
    assert_eq!(tokens[0].tag, "h1");
    assert_eq!(tokens[1].content, "First");
    assert_eq!(tokens[1].map, Some([0, 1]));
    assert_eq!(tokens[3].tag, "h2");
    assert_eq!(tokens[4].content, "Second");
    assert_eq!(tokens[4].map, Some([2, 3]));
  }

  #[test]
  fn test_tight_list_paragraphs_are_hidden() {
    let tokens = lower_str("- one\n- two\n");
    let paragraphs: Vec<&Token> = tokens
      .iter()
      .filter(|t| t.kind == TokenKind::ParagraphOpen)
      .collect();
    assert_eq!(paragraphs.len(), 2);
    assert!(paragraphs.iter().all(|t| t.hidden));

    let loose = lower_str("- one\n\n- two\n");
    assert!(
      loose
        .iter()
        .filter(|t| t.kind == TokenKind::ParagraphOpen)
        .all(|t| !t.hidden)
    );
  }

  #[test]
  fn test_escapes_lower_to_text_special() {
    let tokens = lower_str("a \\[b\n");
    let inline = &tokens[1];
    let special: Vec<&Token> = inline
      .children
      .iter()
      .filter(|t| t.kind == TokenKind::TextSpecial)
      .collect();
    assert_eq!(special.len(), 1);
    assert_eq!(special[0].content, "[");
    assert_eq!(special[0].markup, "\\[");
  }

  #[test]
  fn test_links_and_images() {
    let tokens = lower_str("[a](/x \"T\") ![pic](/p.png)\n");
    let children = &tokens[1].children;
    assert_eq!(children[0].kind, TokenKind::LinkOpen);
    assert_eq!(children[0].attr_get("href"), Some("/x"));
    assert_eq!(children[0].attr_get("title"), Some("T"));

    let image = children.iter().find(|t| t.kind == TokenKind::Image);
    assert!(image.is_some());
    if let Some(image) = image {
      assert_eq!(image.attr_get("src"), Some("/p.png"));
      assert_eq!(image.attr_get("alt"), Some("pic"));
    }
  }

  #[test]
  fn test_table_alignment() {
    let tokens = lower_str("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
    let th: Vec<&Token> =
      tokens.iter().filter(|t| t.kind == TokenKind::ThOpen).collect();
    assert_eq!(th.len(), 2);
    assert_eq!(th[0].attr_get("style"), Some("text-align:left"));
    assert_eq!(th[1].attr_get("style"), Some("text-align:right"));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::TbodyOpen));
  }
}
