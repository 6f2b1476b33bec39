//! CLI application for exam PDF harvesting and answer-key extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{answers, batch, config, merge, questions, scrape};

/// gabarito - Extract questions and answer keys from public exam PDFs
#[derive(Parser)]
#[command(name = "gabarito")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split an exam PDF into numbered questions
    Questions(questions::QuestionsArgs),

    /// Extract answer keys from a gabarito PDF
    Answers(answers::AnswersArgs),

    /// Pair an exam's questions with its answer key
    Merge(merge::MergeArgs),

    /// Extract answer keys from multiple gabarito files
    Batch(batch::BatchArgs),

    /// Harvest exams of one banca from the listing site
    Scrape(scrape::ScrapeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Questions(args) => questions::run(args, config_path).await,
        Commands::Answers(args) => answers::run(args, config_path).await,
        Commands::Merge(args) => merge::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Scrape(args) => scrape::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
