//! Merge command - pair an exam's questions with its answer key.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gabarito_core::extraction::{merge_answers, select_block, ExamExtractor};
use gabarito_core::models::question::AnsweredQuestion;

use super::{load_config, read_input, write_output, OutputFormat};

/// Arguments for the merge command.
#[derive(Args)]
pub struct MergeArgs {
    /// Exam file (PDF or pre-decoded .txt)
    #[arg(required = true)]
    exam: PathBuf,

    /// Answer-key file (PDF or pre-decoded .txt)
    #[arg(required = true)]
    answer_key: PathBuf,

    /// Exam variant to use (default: the first key found)
    #[arg(short, long)]
    tipo: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: MergeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let extractor = ExamExtractor::from_config(&config)?;

    let exam = read_input(&args.exam, &config)?;
    let key = read_input(&args.answer_key, &config)?;

    let questions = extractor.extract_questions(&exam.text);
    let blocks = extractor.extract_answer_keys(&key.text);

    let Some(block) = select_block(&blocks, args.tipo.as_deref()) else {
        anyhow::bail!("No answer key found in {}", args.answer_key.display());
    };
    if let Some(tipo) = &args.tipo {
        if &block.tipo != tipo {
            eprintln!(
                "{} No key for tipo {}, using {} (tipo {})",
                style("⚠").yellow(),
                tipo,
                block.exam_name,
                block.tipo
            );
        }
    }

    let merged = merge_answers(&questions, block);
    info!(
        "Merged {} of {} questions with key {} (tipo {})",
        merged.len(),
        questions.len(),
        block.exam_name,
        block.tipo
    );

    let output = format_merged(&merged, args.format)?;
    write_output(&output, args.output.as_deref())?;
    Ok(())
}

pub fn format_merged(merged: &[AnsweredQuestion], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(merged)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["number", "correct_answer", "text"])?;
            for question in merged {
                wtr.write_record([
                    question.number.to_string().as_str(),
                    question.correct_answer.to_string().as_str(),
                    question.text.as_str(),
                ])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            for question in merged {
                output.push_str(&format!(
                    "Questão {} - resposta {}\n{}\n\n",
                    question.number,
                    question.correct_answer,
                    question.text.trim()
                ));
            }
            output.push_str(&format!("{} answered questions\n", merged.len()));
            Ok(output)
        }
    }
}
