use anyhow::{Result, anyhow, Context};

use dlmonte_control::{ParserBuilder, control::{DuplicatePolicy, TrailingContent}};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    // Read input path from args
    let input_file = std::env::args().nth(1)
        .ok_or(anyhow!("Usage: control-roundtrip <CONTROL> [--strict]"))?;
    let strict = std::env::args().nth(2).as_deref() == Some("--strict");
    let source = std::fs::read_to_string(&input_file)
        .with_context(|| format!("Cannot read {}", input_file))?;
    // Strict mode rejects duplicate fed sections and content after `start`
    let parser = ParserBuilder::new()
        .with_duplicate_fed_sections(if strict { DuplicatePolicy::Reject } else { DuplicatePolicy::KeepLast })
        .with_trailing_content(if strict { TrailingContent::Reject } else { TrailingContent::Ignore })
        .build();
    let doc = parser.parse(&source)?;
    tracing::info!(title = %doc.title, moves = doc.main_block.moves().len(), "parsed {}", input_file);
    // Write it back
    println!("{}", doc.serialize()?);
    Ok(())
}
