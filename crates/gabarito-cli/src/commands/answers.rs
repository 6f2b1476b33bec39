//! Answers command - extract answer keys from a gabarito file.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gabarito_core::extraction::{AnswerKeyReport, ExamExtractor};

use super::{load_config, read_input, write_output, OutputFormat};

/// Arguments for the answers command.
#[derive(Args)]
pub struct AnswersArgs {
    /// Answer-key file (PDF or pre-decoded .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report which header style and answer strategy were used
    #[arg(long)]
    show_strategy: bool,
}

pub async fn run(args: AnswersArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    info!("Processing answer key: {}", args.input.display());
    let raw = read_input(&args.input, &config)?;

    let extractor = ExamExtractor::from_config(&config)?;
    let report = extractor.extract_answer_key_report(&raw.text);

    if report.blocks.is_empty() {
        eprintln!(
            "{} No answer keys found in {}",
            style("⚠").yellow(),
            args.input.display()
        );
    }

    let output = format_report(&report, args.format)?;
    write_output(&output, args.output.as_deref())?;

    if args.show_strategy {
        eprintln!();
        eprintln!(
            "{} Header style: {}",
            style("ℹ").blue(),
            report
                .header
                .map(|h| h.to_string())
                .unwrap_or_else(|| "none (whole text)".to_string())
        );
        for (block, strategy) in report.blocks.iter().zip(&report.strategies) {
            eprintln!(
                "   {} tipo {}: {} answers via {}",
                block.exam_name,
                block.tipo,
                block.answers.len(),
                strategy
            );
        }
        eprintln!(
            "{} {} discarded, {} duplicates, {}ms",
            style("ℹ").blue(),
            report.discarded,
            report.duplicates,
            report.processing_time_ms
        );
    }

    Ok(())
}

pub fn format_report(report: &AnswerKeyReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.blocks)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["exam_name", "tipo", "question", "answer"])?;
            for block in &report.blocks {
                for (number, letter) in &block.answers {
                    wtr.write_record([
                        block.exam_name.as_str(),
                        block.tipo.as_str(),
                        number.to_string().as_str(),
                        letter.to_string().as_str(),
                    ])?;
                }
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            for block in &report.blocks {
                output.push_str(&format!(
                    "{} (tipo {}) - {} answers",
                    block.exam_name,
                    block.tipo,
                    block.answers.len()
                ));
                let annulled = block.annulled_count();
                if annulled > 0 {
                    output.push_str(&format!(", {} annulled", annulled));
                }
                output.push('\n');
                output.push_str(&format!("  {}\n\n", block.format_answers()));
            }
            output.push_str(&format!("{} answer keys\n", report.blocks.len()));
            Ok(output)
        }
    }
}
