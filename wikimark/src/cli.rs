use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for wikimark
#[derive(Parser, Debug)]
#[command(author, version, about = "wikimark: wiki-flavored Markdown to HTML")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to the configuration file (TOML or JSON). When omitted,
  /// `wikimark.toml` or `wikimark.json` in the working directory is used if
  /// present.
  #[arg(short = 'c', long = "config-file", global = true)]
  pub config_file: Option<PathBuf>,
}

/// All supported subcommands for the wikimark CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new wikimark configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "wikimark.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Render markdown documents to HTML.
  Render {
    /// Markdown file, or directory searched recursively for `.md` files.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory. A single input file without one is rendered to
    /// stdout.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Prefix for relative links, overriding the configuration.
    #[arg(long)]
    base_url: Option<String>,

    /// Number of threads to use for parallel rendering.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_parse_render() {
    let cli = Cli::try_parse_from([
      "wikimark",
      "-v",
      "render",
      "-i",
      "content",
      "--base-url",
      "/wiki",
      "-p",
      "2",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
      Commands::Render {
        input,
        output_dir,
        base_url,
        jobs,
      } => {
        assert_eq!(input, Some(PathBuf::from("content")));
        assert_eq!(output_dir, None);
        assert_eq!(base_url.as_deref(), Some("/wiki"));
        assert_eq!(jobs, Some(2));
      },
      Commands::Init { .. } => panic!("expected render"),
    }
  }

  #[test]
  fn test_parse_init_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["wikimark", "init", "-F", "yaml"]).is_err());

    let cli = Cli::try_parse_from(["wikimark", "init", "-F", "json"]).unwrap();
    assert!(matches!(cli.command, Commands::Init { ref format, .. } if format == "json"));
  }
}
