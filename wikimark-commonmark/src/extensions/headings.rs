//! Heading anchors and heading collection.
use crate::{
  engine::{CorePass, RenderContext, RenderOverride, Renderer},
  token::{Token, TokenKind},
  types::Heading,
  utils::Slugifier,
};

/// Records every heading of the document into the render context.
#[derive(Debug, Clone)]
pub struct HeadingCollector {
  slugifier: Slugifier,
}

impl HeadingCollector {
  /// Create the pass; heading slugs are built with `slugifier`.
  #[must_use]
  pub const fn new(slugifier: Slugifier) -> Self {
    Self { slugifier }
  }
}

impl CorePass for HeadingCollector {
  fn name(&self) -> &'static str {
    "heading_collector"
  }

  fn run(&self, tokens: &mut Vec<Token>, ctx: &mut RenderContext) {
    ctx.headings.clear();

    for (idx, token) in tokens.iter().enumerate() {
      if token.kind != TokenKind::HeadingClose {
        continue;
      }
      let Some(inline) = idx
        .checked_sub(1)
        .and_then(|i| tokens.get(i))
        .filter(|t| t.kind == TokenKind::Inline)
      else {
        continue;
      };
      let Some(level) = token.heading_level() else {
        continue;
      };

      ctx.headings.push(Heading {
        content: inline.content.clone(),
        index: inline.map.map_or(0, |map| map[0]),
        level,
        slug: self.slugifier.slugify(&inline.content),
      });
    }
  }
}

/// Renders `heading_open` with a line-indexed `id`.
///
/// Two headings with the same text get different ids because the source line
/// is part of the anchor.
#[derive(Debug, Clone)]
pub struct HeadingAnchors {
  slugifier: Slugifier,
}

impl HeadingAnchors {
  /// Create the override; anchor slugs are built with `slugifier`.
  #[must_use]
  pub const fn new(slugifier: Slugifier) -> Self {
    Self { slugifier }
  }
}

impl RenderOverride for HeadingAnchors {
  fn kind(&self) -> TokenKind {
    TokenKind::HeadingOpen
  }

  fn render(
    &self,
    tokens: &[Token],
    idx: usize,
    renderer: &Renderer<'_>,
    out: &mut String,
  ) {
    let token = &tokens[idx];
    let next = tokens.get(idx + 1);

    let Some(inline) = next
      .filter(|t| t.kind == TokenKind::Inline && !t.children.is_empty())
    else {
      renderer.render_token(tokens, idx, out);
      return;
    };

    let index = token.map.or(inline.map).map_or(0, |map| map[0]);
    let id = format!("{}-{index}", self.slugifier.slugify(&inline.content));

    let mut anchored = token.clone();
    anchored.attr_set("id", id);
    let previous = idx.checked_sub(1).and_then(|i| tokens.get(i));
    renderer.render_tag(&anchored, previous, next, out);
  }
}
