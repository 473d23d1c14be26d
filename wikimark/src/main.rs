use std::io;

use color_eyre::eyre::Result;
use log::{LevelFilter, info};
use wikimark::{
  cli::{Cli, Commands},
  commands::{self, RenderOverrides},
};
use wikimark_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => commands::init(&output, &format, force),

    Commands::Render {
      input,
      output_dir,
      base_url,
      jobs,
    } => {
      let mut config = Config::load(cli.config_file.as_deref())?;
      RenderOverrides {
        input,
        output_dir,
        base_url,
        jobs,
      }
      .apply(&mut config);

      let written = commands::render(&config, &mut io::stdout().lock())?;
      if !written.is_empty() {
        info!("Wrote {} files", written.len());
      }
      Ok(())
    },
  }
}
