//! Link attribute rewriting: `rel`/`target` for external links and base URL
//! prefixing for relative ones.
use std::sync::LazyLock;

use indexmap::IndexSet;
use log::trace;
use regex::Regex;
use url::Url;

use crate::{
  engine::{CorePass, RenderContext},
  processor::WikiOptions,
  token::{Token, TokenKind},
  utils::never_matching_regex,
};

/// `rel` for links to allow-listed hosts.
pub const REL_ALLOWED: &str = "external noopener noreferrer";

/// `rel` for links to any other host.
pub const REL_NOFOLLOW: &str = "external nofollow noopener noreferrer";

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").unwrap_or_else(|e| {
    log::error!(
      "Failed to compile SCHEME_RE regex: {e}\n Falling back to never \
       matching regex."
    );
    never_matching_regex()
  })
});

/// Core pass applying the domain policy to every link.
#[derive(Debug, Clone)]
pub struct LinkPolicy {
  base_url:        String,
  allowed_hosts:   IndexSet<String>,
  open_new_window: bool,
}

impl LinkPolicy {
  #[must_use]
  pub fn new(options: &WikiOptions) -> Self {
    Self {
      base_url:        options.base_url.clone(),
      allowed_hosts:   options
        .allowed_external_domains
        .iter()
        .map(|domain| domain.trim().to_ascii_lowercase())
        .collect(),
      open_new_window: options.open_new_window,
    }
  }

  /// Apply the policy to one `link_open` token.
  pub fn apply(&self, token: &mut Token) {
    let Some(href) = token.attr_get("href").filter(|h| !h.is_empty()) else {
      return;
    };

    if is_web_url(href) {
      let rel = if self.is_allowed(href) {
        REL_ALLOWED
      } else {
        REL_NOFOLLOW
      };
      token.attr_set("rel", rel);
      if self.open_new_window {
        token.attr_set("target", "_blank");
      }
    } else if let Some(prefixed) = self.prefixed(href) {
      trace!("Prefixing relative link {href:?} -> {prefixed:?}");
      token.attr_set("href", prefixed);
    }
  }

  fn is_allowed(&self, href: &str) -> bool {
    Url::parse(href)
      .ok()
      .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
      .is_some_and(|host| self.allowed_hosts.contains(&host))
  }

  /// `href` under the base URL, or `None` when it should stay untouched.
  fn prefixed(&self, href: &str) -> Option<String> {
    if self.base_url.is_empty()
      || href.starts_with("//")
      || SCHEME_RE.is_match(href)
    {
      return None;
    }

    let base = self.base_url.trim_end_matches('/');
    if !base.is_empty()
      && (href == base
        || href.strip_prefix(base).is_some_and(|rest| rest.starts_with('/')))
    {
      return None;
    }

    Some(format!("{base}/{}", href.trim_start_matches('/')))
  }
}

impl CorePass for LinkPolicy {
  fn name(&self) -> &'static str {
    "link_policy"
  }

  fn run(&self, tokens: &mut Vec<Token>, _ctx: &mut RenderContext) {
    for token in tokens
      .iter_mut()
      .filter(|t| t.kind == TokenKind::Inline)
    {
      for child in token
        .children
        .iter_mut()
        .filter(|t| t.kind == TokenKind::LinkOpen)
      {
        self.apply(child);
      }
    }
  }
}

fn is_web_url(href: &str) -> bool {
  let starts_with = |prefix: &str| {
    href
      .get(..prefix.len())
      .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
  };
  starts_with("http://") || starts_with("https://")
}
