//! Exam listing records as scraped from the source site.

use serde::{Deserialize, Serialize};

/// Links to the PDFs attached to an exam page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDownload {
    /// Exam (prova) PDF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_url: Option<String>,

    /// Answer-key (gabarito) PDF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_key_url: Option<String>,
}

impl ExamDownload {
    /// Both PDFs are needed to build answered questions.
    pub fn is_complete(&self) -> bool {
        self.exam_url.is_some() && self.answer_key_url.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.exam_url.is_none() && self.answer_key_url.is_none()
    }
}

/// One row of the paginated exam listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Exam name (usually the cargo).
    pub name: String,

    /// Year as printed in the listing.
    pub year: String,

    /// Organization (órgão) running the contest.
    pub organization: String,

    /// Examining institution (banca).
    pub institution: String,

    /// Education level.
    pub level: String,

    /// Detail page holding the download links.
    pub page_url: String,

    /// Download links, filled in after the detail page is fetched.
    #[serde(default)]
    pub download: ExamDownload,
}

impl ExamRecord {
    /// Parse the listing year, falling back to `default` when it is missing or malformed.
    pub fn year_or(&self, default: u32) -> u32 {
        self.year.trim().parse().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: &str) -> ExamRecord {
        ExamRecord {
            name: "Analista".to_string(),
            year: year.to_string(),
            organization: "TRF".to_string(),
            institution: "FGV".to_string(),
            level: "Superior".to_string(),
            page_url: "https://example.com/prova".to_string(),
            download: ExamDownload::default(),
        }
    }

    #[test]
    fn test_year_fallback() {
        assert_eq!(record("2023").year_or(2024), 2023);
        assert_eq!(record(" 2021 ").year_or(2024), 2021);
        assert_eq!(record("").year_or(2024), 2024);
        assert_eq!(record("20x3").year_or(2024), 2024);
    }

    #[test]
    fn test_download_completeness() {
        let mut download = ExamDownload::default();
        assert!(download.is_empty());
        download.exam_url = Some("a.pdf".to_string());
        assert!(!download.is_complete());
        download.answer_key_url = Some("gabarito.pdf".to_string());
        assert!(download.is_complete());
    }
}
