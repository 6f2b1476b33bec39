//! Subcommands and the input/output plumbing they share.

pub mod answers;
pub mod batch;
pub mod config;
pub mod merge;
pub mod questions;
pub mod scrape;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use tracing::{debug, warn};

use gabarito_core::models::config::GabaritoConfig;
use gabarito_core::pdf::{PdfExtractor, RawText};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gabarito")
        .join("config.json")
}

/// Load the config given on the command line, else the default file if it
/// exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<GabaritoConfig> {
    if let Some(path) = config_path {
        return Ok(GabaritoConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(GabaritoConfig::from_file(&default_path)?)
    } else {
        Ok(GabaritoConfig::default())
    }
}

/// Decode an input file. PDFs go through the PDF decoder; `.txt` files are
/// taken as already-decoded text.
pub fn read_input(path: &Path, config: &GabaritoConfig) -> anyhow::Result<RawText> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let raw = match extension.as_str() {
        "pdf" => decode_pdf(&fs::read(path)?)?,
        "txt" | "text" => RawText::from_plain(fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    if raw.looks_scanned(config.pdf.min_text_length) {
        warn!(
            "{} has almost no text ({} pages); image-only PDFs are not OCRed",
            path.display(),
            raw.page_count
        );
    }
    Ok(raw)
}

/// Decode PDF bytes to text.
pub fn decode_pdf(data: &[u8]) -> anyhow::Result<RawText> {
    let raw = PdfExtractor::decode(data)?;
    debug!("PDF has {} pages", raw.page_count);
    Ok(raw)
}

/// Write to a file when one is given, else print to stdout.
pub fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}
