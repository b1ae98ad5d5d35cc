use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use kadra::config::Settings;
use kadra::ingest::csv::{decode_csv_bytes, parse_csv_text};
use kadra::pipeline::preview_records;
use kadra::vocab::Vocabulary;

/// Run a CSV file through the normalization pipeline and print the
/// preview as JSON.
#[derive(Parser)]
struct Args {
    /// Path to the CSV file
    csv: PathBuf,

    /// Override the allow-list map path
    #[arg(long)]
    map: Option<PathBuf>,

    /// Override the aliases file path
    #[arg(long)]
    aliases: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::from_env();
    if let Some(map) = args.map {
        settings.map_path = map.display().to_string();
    }
    if let Some(aliases) = args.aliases {
        settings.aliases_path = aliases.display().to_string();
    }

    let bytes = fs::read(&args.csv)
        .with_context(|| format!("failed to read {}", args.csv.display()))?;
    let records = parse_csv_text(&decode_csv_bytes(&bytes))?;
    let vocab = Vocabulary::load(&settings)?;
    let items = preview_records(records, &vocab);

    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
