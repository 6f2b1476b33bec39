//! Configuration structures for the extraction pipeline and the harvester.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration for gabarito.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GabaritoConfig {
    /// Question and answer-key extraction thresholds.
    pub extraction: ExtractionConfig,

    /// Boilerplate removal.
    pub normalize: NormalizeConfig,

    /// PDF decoding.
    pub pdf: PdfConfig,

    /// Listing site and PDF downloads.
    pub fetch: FetchConfig,
}

/// Extraction thresholds. These are empirical noise filters, not domain limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Largest accepted question number. Guards against page counts and codes.
    pub max_question_number: u32,

    /// Segments shorter than this (in characters, trimmed) are false boundaries.
    pub min_question_chars: usize,

    /// Question text is truncated to this many characters.
    pub max_question_chars: usize,

    /// Answer-key blocks with fewer answers are discarded.
    pub min_answers: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_question_number: 200,
            min_question_chars: 50,
            max_question_chars: 3000,
            min_answers: 5,
        }
    }
}

/// Boilerplate tokens stripped before extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Watermark prefixes; each is removed together with the token following it.
    pub watermark_markers: Vec<String>,

    /// Site-domain footer strings.
    pub footer_domains: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            watermark_markers: vec!["pcimarkpci".to_string()],
            footer_domains: vec![
                "www.pciconcursos.com.br".to_string(),
                "pciconcursos.com.br".to_string(),
            ],
        }
    }
}

/// PDF decoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF text-based rather than scanned.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

/// Network settings for the listing harvester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Listing root; a banca's listing lives at `<base_url>/<banca>`.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent for HTTP requests.
    pub user_agent: String,

    /// Directory for downloaded PDFs.
    pub download_dir: PathBuf,

    /// Pause between listing pages, in milliseconds.
    pub delay_between_requests_ms: u64,

    /// Cap on simultaneous in-flight requests.
    pub max_concurrent_requests: usize,

    /// Total attempts per request, including the first.
    pub retry_attempts: u32,

    /// Lower bound of the exponential backoff, in seconds.
    pub backoff_min_secs: u64,

    /// Upper bound of the exponential backoff, in seconds.
    pub backoff_max_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.pciconcursos.com.br/provas".to_string(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
            download_dir: PathBuf::from("downloads"),
            delay_between_requests_ms: 500,
            max_concurrent_requests: 10,
            retry_attempts: 3,
            backoff_min_secs: 2,
            backoff_max_secs: 10,
        }
    }
}

impl FetchConfig {
    /// Backoff before retry number `attempt` (1-based): doubles from the
    /// lower bound and is clamped to the upper bound.
    pub fn backoff_secs(&self, attempt: u32) -> u64 {
        let exp = attempt.saturating_sub(1).min(16);
        self.backoff_min_secs
            .saturating_mul(1u64 << exp)
            .clamp(self.backoff_min_secs, self.backoff_max_secs.max(self.backoff_min_secs))
    }

    /// Listing URL for a banca.
    pub fn banca_url(&self, banca: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), banca.trim().to_lowercase())
    }
}

impl GabaritoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
