//! Scrape command - harvest a banca's exams from the listing site.
//!
//! Walks the paginated listing, resolves each exam's PDF links, and
//! optionally downloads the PDFs and merges questions with the first
//! answer key. Per-exam failures go to the report; they never stop the run.

use std::fs::{self, File};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use futures_util::future::join_all;
use futures_util::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use gabarito_core::GabaritoError;
use gabarito_core::extraction::{merge_answers, select_block, ExamExtractor};
use gabarito_core::models::config::{FetchConfig, GabaritoConfig};
use gabarito_core::models::exam::ExamRecord;
use gabarito_core::source::{listing_page_url, parse_download_links, parse_exam_list, DEFAULT_YEAR};

use super::{decode_pdf, load_config, write_output};

/// Arguments for the scrape command.
#[derive(Args)]
pub struct ScrapeArgs {
    /// Banca (examining institution) slug, e.g. "fgv"
    #[arg(required = true)]
    banca: String,

    /// Stop after this many exams
    #[arg(long, default_value = "10")]
    max_exams: usize,

    /// Stop after this many listing pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Download exam and answer-key PDFs
    #[arg(long)]
    download: bool,

    /// Extract and merge questions from the downloaded PDFs (implies --download)
    #[arg(long)]
    extract: bool,

    /// Report file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Outcome of a harvest run.
#[derive(Debug, Serialize)]
struct ScrapeReport {
    banca: String,
    started_at: DateTime<Utc>,
    total_exams: usize,
    total_questions: usize,
    errors: Vec<String>,
    exams: Vec<ExamOutcome>,
}

/// What was done for one exam.
#[derive(Debug, Serialize)]
struct ExamOutcome {
    #[serde(flatten)]
    record: ExamRecord,
    year_number: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answered_questions: Option<usize>,
}

pub async fn run(args: ScrapeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let fetch = &config.fetch;

    let client = reqwest::Client::builder()
        .user_agent(fetch.user_agent.as_str())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .build()?;

    let mut report = ScrapeReport {
        banca: args.banca.clone(),
        started_at: Utc::now(),
        total_exams: 0,
        total_questions: 0,
        errors: Vec::new(),
        exams: Vec::new(),
    };

    let base_url = fetch.banca_url(&args.banca);
    let records = collect_listing(&client, fetch, &base_url, &args, &mut report.errors).await;
    eprintln!(
        "{} Found {} exams for {}",
        style("ℹ").blue(),
        records.len(),
        style(&args.banca).cyan().bold()
    );

    let records = resolve_downloads(&client, fetch, records, &mut report.errors).await;

    let extractor = ExamExtractor::from_config(&config)?;
    let download_dir = fetch.download_dir.join(args.banca.to_lowercase());
    if args.download || args.extract {
        fs::create_dir_all(&download_dir)?;
    }

    for record in records {
        if record.download.is_empty() {
            debug!("No PDFs for {}", record.name);
            continue;
        }
        report.total_exams += 1;

        let mut outcome = ExamOutcome {
            year_number: record.year_or(DEFAULT_YEAR),
            record,
            files: Vec::new(),
            answered_questions: None,
        };

        if args.download || args.extract {
            match download_exam(&client, &config, &outcome.record, &download_dir).await {
                Ok(files) => outcome.files = files,
                Err(e) => {
                    report
                        .errors
                        .push(format!("Error downloading {}: {}", outcome.record.name, e));
                }
            }
        }

        if args.extract && outcome.record.download.is_complete() && outcome.files.len() == 2 {
            match extract_exam(&extractor, &outcome.files[0], &outcome.files[1]).await {
                Ok(count) => {
                    report.total_questions += count;
                    outcome.answered_questions = Some(count);
                }
                Err(e) => {
                    report
                        .errors
                        .push(format!("Error extracting from {}: {}", outcome.record.name, e));
                }
            }
        }

        report.exams.push(outcome);
    }

    info!(
        "Harvested {} exams, {} questions, {} errors",
        report.total_exams,
        report.total_questions,
        report.errors.len()
    );

    write_output(&serde_json::to_string_pretty(&report)?, args.output.as_deref())?;

    eprintln!(
        "{} {} exams, {} questions, {} errors",
        if report.errors.is_empty() {
            style("✓").green()
        } else {
            style("⚠").yellow()
        },
        report.total_exams,
        report.total_questions,
        report.errors.len()
    );
    Ok(())
}

/// Walk listing pages until one is empty, a limit is hit, or a page fails.
async fn collect_listing(
    client: &reqwest::Client,
    fetch: &FetchConfig,
    base_url: &str,
    args: &ScrapeArgs,
    errors: &mut Vec<String>,
) -> Vec<ExamRecord> {
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let url = listing_page_url(base_url, page);
        info!("Fetching page {}: {}", page, url);

        let html = match with_retry(fetch, &url, || fetch_text(client, &url)).await {
            Ok(html) => html,
            Err(e) => {
                errors.push(format!("Failed to fetch page {}: {}", page, e));
                break;
            }
        };

        let exams = parse_exam_list(&html);
        if exams.is_empty() {
            debug!("No more exams found at page {}", page);
            break;
        }
        records.extend(exams);

        if records.len() >= args.max_exams {
            records.truncate(args.max_exams);
            break;
        }
        if args.max_pages.is_some_and(|max| page >= max) {
            break;
        }

        page += 1;
        tokio::time::sleep(Duration::from_millis(fetch.delay_between_requests_ms)).await;
    }

    records
}

/// Fetch each exam's detail page, at most `max_concurrent_requests` at a time.
async fn resolve_downloads(
    client: &reqwest::Client,
    fetch: &FetchConfig,
    records: Vec<ExamRecord>,
    errors: &mut Vec<String>,
) -> Vec<ExamRecord> {
    let semaphore = Arc::new(Semaphore::new(fetch.max_concurrent_requests.max(1)));

    let pb = ProgressBar::new(records.len() as u64);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} exam pages")
    {
        pb.set_style(bar_style.progress_chars("=>-"));
    }

    let tasks = records.into_iter().map(|mut record| {
        let semaphore = Arc::clone(&semaphore);
        let pb = pb.clone();
        async move {
            let result = match semaphore.acquire().await {
                Ok(_permit) => {
                    with_retry(fetch, &record.page_url, || fetch_text(client, &record.page_url))
                        .await
                }
                Err(e) => Err(anyhow::anyhow!(e)),
            };
            pb.inc(1);

            match result {
                Ok(html) => {
                    record.download = parse_download_links(&html);
                    (record, None)
                }
                Err(e) => {
                    let message = format!("Error processing {}: {}", record.name, e);
                    (record, Some(message))
                }
            }
        }
    });

    let results = join_all(tasks).await;
    pb.finish_and_clear();

    results
        .into_iter()
        .map(|(record, error)| {
            if let Some(error) = error {
                warn!("{}", error);
                errors.push(error);
            }
            record
        })
        .collect()
}

/// Download the exam and answer-key PDFs. Returns the saved paths, exam first.
async fn download_exam(
    client: &reqwest::Client,
    config: &GabaritoConfig,
    record: &ExamRecord,
    dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let stem = file_stem_for(record);
    let mut files = Vec::new();

    let targets = [
        (record.download.exam_url.as_deref(), "prova"),
        (record.download.answer_key_url.as_deref(), "gabarito"),
    ];
    for (url, suffix) in targets {
        let Some(url) = url else { continue };
        let path = dir.join(format!("{}-{}.pdf", stem, suffix));
        if path.exists() {
            debug!("Already downloaded: {}", path.display());
        } else {
            with_retry(&config.fetch, url, || download_file(client, url, &path)).await?;
        }
        files.push(path);
    }

    Ok(files)
}

/// Decode both PDFs off the async runtime and merge questions with the first key.
async fn extract_exam(
    extractor: &ExamExtractor,
    exam_path: &Path,
    key_path: &Path,
) -> anyhow::Result<usize> {
    let exam_data = fs::read(exam_path)?;
    let key_data = fs::read(key_path)?;

    let (exam, key) = tokio::task::spawn_blocking(move || {
        Ok::<_, anyhow::Error>((decode_pdf(&exam_data)?, decode_pdf(&key_data)?))
    })
    .await??;

    let questions = extractor.extract_questions(&exam.text);
    let blocks = extractor.extract_answer_keys(&key.text);
    let Some(block) = select_block(&blocks, None) else {
        anyhow::bail!("no answer key found");
    };

    Ok(merge_answers(&questions, block).len())
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> anyhow::Result<String> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        let status = response.status();
        return Err(GabaritoError::Fetch(format!("HTTP {} for {}", status, url)).into());
    }
    Ok(response.text().await?)
}

async fn download_file(client: &reqwest::Client, url: &str, path: &Path) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(GabaritoError::Fetch(format!("HTTP {} for {}", status, url)).into());
    }

    save_stream(response.bytes_stream(), path).await
}

/// Write a byte stream to `path` through a `.tmp` sibling that is renamed
/// on success and removed on failure.
async fn save_stream<S, B, E>(stream: S, path: &Path) -> anyhow::Result<()>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<anyhow::Error>,
{
    let temp_path = path.with_extension("tmp");
    let downloaded = match write_chunks(stream, &temp_path).await {
        Ok(downloaded) => downloaded,
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
    };

    fs::rename(&temp_path, path)?;
    debug!("Downloaded {} bytes to {}", downloaded, path.display());
    Ok(())
}

async fn write_chunks<S, B, E>(stream: S, temp_path: &Path) -> anyhow::Result<u64>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<anyhow::Error>,
{
    let mut stream = pin!(stream);
    let mut file = File::create(temp_path)?;
    let mut downloaded: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::<anyhow::Error>::into)?;
        file.write_all(chunk.as_ref())?;
        downloaded += chunk.as_ref().len() as u64;
    }
    file.flush()?;
    Ok(downloaded)
}

/// Run `op` up to `retry_attempts` times with exponential backoff between tries.
async fn with_retry<T, F, Fut>(fetch: &FetchConfig, what: &str, mut op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let attempts = fetch.retry_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                let delay = fetch.backoff_secs(attempt);
                warn!(
                    "Attempt {}/{} for {} failed: {}; retrying in {}s",
                    attempt, attempts, what, e, delay
                );
                tokio::time::sleep(Duration::from_secs(delay)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// File-system-safe stem from the exam's detail URL, falling back to its name.
fn file_stem_for(record: &ExamRecord) -> String {
    let source = record
        .page_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(&record.name);

    let stem: String = source
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "exam".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gabarito_core::models::exam::ExamDownload;

    fn record(page_url: &str, name: &str) -> ExamRecord {
        ExamRecord {
            name: name.to_string(),
            year: "2023".to_string(),
            organization: "TRF".to_string(),
            institution: "FGV".to_string(),
            level: "Superior".to_string(),
            page_url: page_url.to_string(),
            download: ExamDownload::default(),
        }
    }

    #[test]
    fn test_file_stem_from_page_url() {
        let r = record("https://www.pciconcursos.com.br/prova/analista-judiciario-2023/", "x");
        assert_eq!(file_stem_for(&r), "analista-judiciario-2023");
    }

    #[test]
    fn test_file_stem_falls_back_to_name() {
        let r = record("", "Técnico Judiciário");
        assert_eq!(file_stem_for(&r), "t-cnico-judici-rio");
        assert_eq!(file_stem_for(&record("", "ÁÉ")), "exam");
    }

    #[tokio::test]
    async fn test_save_stream_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prova.pdf");
        let chunks = vec![Ok::<_, anyhow::Error>(b"%PDF".to_vec()), Ok(b"-1.4".to_vec())];

        save_stream(futures_util::stream::iter(chunks), &path).await.unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4");
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_no_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gabarito.pdf");
        let chunks = vec![
            Ok(b"%PDF".to_vec()),
            Err(anyhow::anyhow!("connection reset")),
        ];

        let result = save_stream(futures_util::stream::iter(chunks), &path).await;

        assert!(result.is_err());
        assert!(!path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_configured_attempts() {
        let fetch = FetchConfig {
            retry_attempts: 2,
            backoff_min_secs: 0,
            backoff_max_secs: 0,
            ..FetchConfig::default()
        };
        let mut calls = 0;
        let result: anyhow::Result<()> = with_retry(&fetch, "test", || {
            calls += 1;
            async { anyhow::bail!("boom") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_retry_returns_first_success() {
        let fetch = FetchConfig {
            backoff_min_secs: 0,
            backoff_max_secs: 0,
            ..FetchConfig::default()
        };
        let mut calls = 0;
        let result = with_retry(&fetch, "test", || {
            calls += 1;
            let n = calls;
            async move {
                if n < 2 {
                    anyhow::bail!("transient")
                }
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }
}
