use std::fs;

use wikimark_commonmark::{
  Document,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  processor::{ProcessorFeature, process_batch, render_collection},
};

const PAGE: &str = r"# Getting Started

[toc]

## Install

Read [[Installation Notes]] or the [upstream docs](https://example.org/docs).

## Usage

Unwritten pages such as [Advanced Usage]() link to their slug.

### Flags

Visit [somewhere else](https://elsewhere.net) at your own risk.
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
  println!("wikimark-commonmark examples\n");

  let options = MarkdownOptionsBuilder::new()
    .base_url("/wiki")
    .allowed_external_domains(["example.org"])
    .open_new_window(true)
    .build();
  let processor = MarkdownProcessor::new(options.clone());

  println!("=== Single page ===");
  let result = processor.render(PAGE);
  println!("Title: {:?}", result.title);
  for heading in &result.headings {
    println!(
      "  {}{} -> #{}",
      "  ".repeat(usize::from(heading.level.saturating_sub(1))),
      heading.content,
      heading.anchor()
    );
  }
  println!("\n{}\n", result.html);

  println!("=== Features ===");
  for feature in [
    ProcessorFeature::Gfm,
    ProcessorFeature::RawHtml,
    ProcessorFeature::BaseUrl,
    ProcessorFeature::NewWindow,
  ] {
    println!("{feature:?}: {}", processor.has_feature(feature));
  }
  println!();

  println!("=== Collection ===");
  let documents = vec![
    Document::new("A deep [[Link]]"),
    Document::new(""),
    Document::new("[[Other Page|other]]"),
  ];
  for document in render_collection(documents, &options) {
    println!("{:?}", document.html);
  }
  println!();

  println!("=== Batch ===");
  let dir = std::env::temp_dir().join("wikimark-example");
  fs::create_dir_all(&dir)?;
  fs::write(dir.join("one.md"), "# One\n\nFirst page.")?;
  let files = vec![dir.join("one.md"), dir.join("missing.md")];
  for (path, outcome) in
    process_batch(&processor, files.into_iter(), |p| fs::read_to_string(p))
  {
    match outcome {
      Ok(result) => println!("{}: {}", path.display(), result.html),
      Err(e) => println!("{}: {e}", path.display()),
    }
  }

  Ok(())
}
