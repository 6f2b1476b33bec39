//! Questions command - split an exam into numbered questions.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use gabarito_core::extraction::ExamExtractor;
use gabarito_core::models::question::Question;

use super::{load_config, read_input, write_output, OutputFormat};

/// Arguments for the questions command.
#[derive(Args)]
pub struct QuestionsArgs {
    /// Exam file (PDF or pre-decoded .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: QuestionsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Processing exam: {}", args.input.display());
    let raw = read_input(&args.input, &config)?;

    let extractor = ExamExtractor::from_config(&config)?;
    let questions = extractor.extract_questions(&raw.text);

    if questions.is_empty() {
        eprintln!(
            "{} No questions found in {}",
            style("⚠").yellow(),
            args.input.display()
        );
    }

    let output = format_questions(&questions, args.format)?;
    write_output(&output, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

pub fn format_questions(questions: &[Question], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(questions)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["number", "text"])?;
            for question in questions {
                wtr.write_record([question.number.to_string().as_str(), question.text.as_str()])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            for question in questions {
                output.push_str(&format!("Questão {}\n", question.number));
                output.push_str(question.text.trim());
                output.push_str("\n\n");
            }
            output.push_str(&format!("{} questions\n", questions.len()));
            Ok(output)
        }
    }
}
