use std::fmt;

/// Error type for template operations.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateError {
  /// The requested configuration format is not supported. Contains the name
  /// of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration in TOML, commented so a new user can find their way
/// around every field.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# wikimark configuration file

# Directory (or single file) containing markdown documents
input_dir = "content"

# Output directory for rendered HTML
output_dir = "public"

# Number of threads to use for parallel rendering (defaults to number of CPU cores)
# jobs = 4

[markdown]
# Pass raw HTML in documents through instead of escaping it
html = false

# Close void tags XHTML style (<br />)
xhtml_out = false

# Convert newlines inside paragraphs into <br>
breaks = false

# CSS class prefix for fenced code block languages
lang_prefix = "language-"

# Turn bare URLs into links
linkify = false

# Smart quotes and dashes
typographer = false

# GitHub tables and strikethrough
gfm = true

[markdown.wiki]
# Prefix for relative links, e.g. "/wiki". Empty disables prefixing.
base_url = ""

# Hosts whose links are followed by search engines. Links to every other host
# get rel="nofollow".
allowed_external_domains = []

# Open external links in a new window
open_new_window = true

[markdown.wiki.toc]
# Markup wrapped around a [toc] table of contents
opening_tag = '<nav class="table-of-contents">'
closing_tag = "</nav>"

# Class prefix of the nested lists, suffixed with -h1, -h2, ...
list_class = "table-of-contents"

# Slug options for heading anchors
[markdown.wiki.toc.slugify]
lower = true
# replacement = "-"
# remove = "[*+~.()'\"!:@]"
# strict = false
# trim = true

[markdown.wiki.wikilinks.slugify]
lower = true
"#;

/// Default configuration in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "input_dir": "content",
  "output_dir": "public",
  "markdown": {
    "html": false,
    "xhtml_out": false,
    "breaks": false,
    "lang_prefix": "language-",
    "linkify": false,
    "typographer": false,
    "gfm": true,
    "wiki": {
      "base_url": "",
      "allowed_external_domains": [],
      "open_new_window": true,
      "toc": {
        "opening_tag": "<nav class=\"table-of-contents\">",
        "closing_tag": "</nav>",
        "list_class": "table-of-contents",
        "slugify": {
          "lower": true
        }
      },
      "wikilinks": {
        "slugify": {
          "lower": true
        }
      }
    }
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
