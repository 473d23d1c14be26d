#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::fs;

use tempfile::tempdir;
use wikimark::commands::{self, RenderOverrides};
use wikimark_config::Config;

#[test]
fn test_render_directory_mirrors_layout() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input_dir = temp_dir.path().join("content");
  let output_dir = temp_dir.path().join("public");
  fs::create_dir_all(input_dir.join("guides"))
    .expect("Failed to create dir in test");

  fs::write(
    input_dir.join("index.md"),
    "# Home\n\n[toc]\n\n## Start\n\nSee [[Getting Started]] and \
     [Out](https://evil.org).\n",
  )
  .expect("Failed to write index.md in test");
  fs::write(input_dir.join("guides/setup.md"), "# Setup\n\n[Test]()\n")
    .expect("Failed to write setup.md in test");
  fs::write(input_dir.join("notes.txt"), "not markdown")
    .expect("Failed to write notes.txt in test");

  let mut config = Config::default();
  RenderOverrides {
    input:      Some(input_dir),
    output_dir: Some(output_dir.clone()),
    base_url:   Some("/wiki".to_string()),
    jobs:       Some(2),
  }
  .apply(&mut config);

  let mut stdout: Vec<u8> = Vec::new();
  let mut written =
    commands::render(&config, &mut stdout).expect("Render failed in test");
  written.sort();

  assert_eq!(written, vec![
    output_dir.join("guides/setup.html"),
    output_dir.join("index.html"),
  ]);
  assert!(stdout.is_empty());

  let index = fs::read_to_string(output_dir.join("index.html"))
    .expect("Failed to read index.html in test");
  assert!(index.starts_with(r#"<h1 id="home-0">Home</h1>"#));
  assert!(index.contains(r##"<a href="#start-4" title="Start">Start</a>"##));
  assert!(index.contains(r#"<a href="/wiki/getting-started">Getting Started</a>"#));
  assert!(index.contains(
    r#"<a href="https://evil.org" rel="external nofollow noopener noreferrer" target="_blank">Out</a>"#
  ));

  let setup = fs::read_to_string(output_dir.join("guides/setup.html"))
    .expect("Failed to read setup.html in test");
  assert_eq!(
    setup,
    "<h1 id=\"setup-0\">Setup</h1>\n<p><a href=\"/wiki/test\">Test</a></p>"
  );
  assert!(!output_dir.join("notes.html").exists());
}

#[test]
fn test_single_file_to_stdout() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input = temp_dir.path().join("page.md");
  fs::write(&input, "A deep [[Link]]").expect("Failed to write in test");

  let config = Config {
    input_dir: Some(input),
    ..Config::default()
  };

  let mut stdout: Vec<u8> = Vec::new();
  let written =
    commands::render(&config, &mut stdout).expect("Render failed in test");
  assert!(written.is_empty());
  assert_eq!(
    String::from_utf8(stdout).expect("Invalid UTF-8 in test"),
    "<p>A deep <a href=\"link\">Link</a></p>\n"
  );
}

#[test]
fn test_single_file_to_output_dir() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input = temp_dir.path().join("page.md");
  let output_dir = temp_dir.path().join("out");
  fs::write(&input, "# Page").expect("Failed to write in test");

  let config = Config {
    input_dir: Some(input),
    output_dir: Some(output_dir.clone()),
    ..Config::default()
  };

  let written =
    commands::render(&config, &mut Vec::<u8>::new()).expect("Render failed in test");
  assert_eq!(written, vec![output_dir.join("page.html")]);
}

#[test]
fn test_render_errors() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");

  let no_input = Config::default();
  assert!(commands::render(&no_input, &mut Vec::<u8>::new()).is_err());

  let missing = Config {
    input_dir: Some(temp_dir.path().join("nonexistent")),
    ..Config::default()
  };
  assert!(commands::render(&missing, &mut Vec::<u8>::new()).is_err());

  // A directory needs somewhere to write to.
  let no_output = Config {
    input_dir: Some(temp_dir.path().to_path_buf()),
    ..Config::default()
  };
  assert!(commands::render(&no_output, &mut Vec::<u8>::new()).is_err());
}

#[test]
fn test_init_writes_loadable_config() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let output = temp_dir.path().join("nested/wikimark.toml");

  commands::init(&output, "toml", false).expect("Init failed in test");
  let config = Config::from_file(&output).expect("Failed to load in test");
  assert!(config.markdown.wiki.open_new_window);

  // Existing files are only replaced with --force.
  assert!(commands::init(&output, "toml", false).is_err());
  commands::init(&output, "toml", true).expect("Forced init failed in test");

  let json = temp_dir.path().join("wikimark.json");
  commands::init(&json, "json", false).expect("Init failed in test");
  assert!(Config::from_file(&json).is_ok());
}

#[test]
fn test_config_file_drives_rendering() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input = temp_dir.path().join("page.md");
  fs::write(
    &input,
    "[Ok](http://example.org/a) [No](http://evil.org/b)\n",
  )
  .expect("Failed to write in test");

  let config_path = temp_dir.path().join("wikimark.json");
  fs::write(
    &config_path,
    r#"{
      "markdown": {
        "wiki": {
          "allowedExternalDomains": ["example.org"],
          "openNewWindow": false
        }
      }
    }"#,
  )
  .expect("Failed to write config in test");

  let mut config =
    Config::load(Some(config_path.as_path())).expect("Failed to load in test");
  config.input_dir = Some(input);

  let mut stdout: Vec<u8> = Vec::new();
  commands::render(&config, &mut stdout).expect("Render failed in test");
  assert_eq!(
    String::from_utf8(stdout).expect("Invalid UTF-8 in test"),
    "<p><a href=\"http://example.org/a\" rel=\"external noopener noreferrer\">Ok</a> <a \
     href=\"http://evil.org/b\" rel=\"external nofollow noopener noreferrer\">No</a></p>\n"
  );
}
