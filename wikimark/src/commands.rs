//! Implementation of the `init` and `render` subcommands.
use std::{
  fs,
  io::Write,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use log::{debug, info, warn};
use rayon::prelude::*;
use wikimark_commonmark::{
  MarkdownProcessor,
  processor::{collect_markdown_files, process_with_recovery},
};
use wikimark_config::Config;

/// Settings of a `render` invocation that override the config file.
#[derive(Debug, Clone, Default)]
pub struct RenderOverrides {
  pub input:      Option<PathBuf>,
  pub output_dir: Option<PathBuf>,
  pub base_url:   Option<String>,
  pub jobs:       Option<usize>,
}

impl RenderOverrides {
  /// Apply the overrides on top of `config`.
  pub fn apply(self, config: &mut Config) {
    if let Some(input) = self.input {
      config.input_dir = Some(input);
    }
    if let Some(output_dir) = self.output_dir {
      config.output_dir = Some(output_dir);
    }
    if let Some(base_url) = self.base_url {
      config.markdown.wiki.base_url = base_url;
    }
    if let Some(jobs) = self.jobs {
      config.jobs = Some(jobs);
    }
  }
}

/// Write a default configuration file.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if the file
/// cannot be written.
pub fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!(
    "Configuration file created successfully. Edit it to customize \
     rendering."
  );
  Ok(())
}

/// Render the configured input.
///
/// A directory input is rendered file by file into the output directory. A
/// single file is written into the output directory when one is configured,
/// and to `stdout` otherwise.
///
/// # Errors
///
/// Returns an error if no input is configured, the processor cannot be built,
/// or any file cannot be read or written.
pub fn render(config: &Config, stdout: &mut dyn Write) -> Result<Vec<PathBuf>> {
  let Some(input) = config.input_dir.as_deref() else {
    bail!("No input given. Pass --input or set input_dir in the config file.");
  };
  if !input.exists() {
    bail!("Input path does not exist: {}", input.display());
  }

  let processor = config
    .processor()
    .wrap_err("Invalid markdown configuration")?;

  if input.is_file() {
    return match config.output_dir.as_deref() {
      Some(output_dir) => {
        let name = input.file_name().map_or(input, Path::new);
        let written = render_file(&processor, input, name, output_dir)?;
        Ok(vec![written])
      },
      None => {
        let content = fs::read_to_string(input).wrap_err_with(|| {
          format!("Failed to read markdown file: {}", input.display())
        })?;
        let result = process_with_recovery(&processor, &content);
        writeln!(stdout, "{}", result.html)
          .wrap_err("Failed to write to stdout")?;
        Ok(Vec::new())
      },
    };
  }

  let Some(output_dir) = config.output_dir.as_deref() else {
    bail!(
      "An output directory is required to render {}",
      input.display()
    );
  };
  render_directory(&processor, input, output_dir, config.jobs)
}

/// Render every `.md` file below `input_dir` into `output_dir`, mirroring
/// the directory layout.
///
/// # Errors
///
/// Returns an error if the thread pool cannot be created or any file cannot
/// be read or written.
pub fn render_directory(
  processor: &MarkdownProcessor,
  input_dir: &Path,
  output_dir: &Path,
  jobs: Option<usize>,
) -> Result<Vec<PathBuf>> {
  info!("Input directory: {}", input_dir.display());
  let files = collect_markdown_files(input_dir);
  info!("Found {} markdown files", files.len());
  if files.is_empty() {
    warn!("Nothing to render in {}", input_dir.display());
  }

  fs::create_dir_all(output_dir).wrap_err_with(|| {
    format!("Failed to create output directory: {}", output_dir.display())
  })?;

  let thread_count = jobs.unwrap_or_else(num_cpus::get);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()
    .wrap_err("Failed to build thread pool")?;
  debug!("Rendering with {thread_count} threads");

  let written = pool.install(|| {
    files
      .par_iter()
      .map(|file| {
        let relative = file
          .strip_prefix(input_dir)
          .ok()
          .or_else(|| file.file_name().map(Path::new))
          .unwrap_or(file.as_path());
        render_file(processor, file, relative, output_dir)
      })
      .collect::<Result<Vec<_>>>()
  })?;

  info!(
    "Rendered {} documents into {}",
    written.len(),
    output_dir.display()
  );
  Ok(written)
}

/// Render `file` to `output_dir/<relative>` with an `.html` extension.
fn render_file(
  processor: &MarkdownProcessor,
  file: &Path,
  relative: &Path,
  output_dir: &Path,
) -> Result<PathBuf> {
  let content = fs::read_to_string(file).wrap_err_with(|| {
    format!("Failed to read markdown file: {}", file.display())
  })?;
  let result = process_with_recovery(processor, &content);

  let target = output_dir.join(relative).with_extension("html");

  if let Some(parent) = target.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }
  fs::write(&target, result.html).wrap_err_with(|| {
    format!("Failed to write output file: {}", target.display())
  })?;

  debug!("Rendered {} -> {}", file.display(), target.display());
  Ok(target)
}
