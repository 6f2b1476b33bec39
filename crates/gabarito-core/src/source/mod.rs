//! Parsers for the exam listing site.
//!
//! The listing is a paginated HTML table with one `tr.lk_link` row per exam;
//! each row links to a detail page carrying the exam and gabarito PDFs.
//! Fetching is left to the caller.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::models::exam::{ExamDownload, ExamRecord};

/// Year used when a listing row has no parseable year.
pub const DEFAULT_YEAR: u32 = 2024;

lazy_static! {
    static ref LISTING_ROW: Selector = Selector::parse("tr.lk_link[data-url]").unwrap();
    static ref TABLE_CELL: Selector = Selector::parse("td").unwrap();
    static ref PROVA_DOWNLOAD_LINK: Selector = Selector::parse("a.prova_download").unwrap();
    static ref PDF_LINK: Selector = Selector::parse(r#"a[href$=".pdf"]"#).unwrap();
}

/// Listing URL for a 1-based page number.
pub fn listing_page_url(base: &str, page: u32) -> String {
    let base = base.trim_end_matches('/');
    if page <= 1 {
        base.to_string()
    } else {
        format!("{}/{}", base, page)
    }
}

/// Parse the exam rows of one listing page. Rows with fewer than five cells
/// are skipped.
pub fn parse_exam_list(html: &str) -> Vec<ExamRecord> {
    let document = Html::parse_document(html);
    let mut exams = Vec::new();

    for row in document.select(&LISTING_ROW) {
        let Some(page_url) = row.value().attr("data-url") else {
            continue;
        };

        let cells: Vec<String> = row.select(&TABLE_CELL).map(element_text).collect();
        if cells.len() < 5 {
            trace!("Skipping listing row with {} cells", cells.len());
            continue;
        }

        let name = row
            .select(&PROVA_DOWNLOAD_LINK)
            .next()
            .map(element_text)
            .unwrap_or_default();

        exams.push(ExamRecord {
            name,
            year: cells[1].clone(),
            organization: cells[2].clone(),
            institution: cells[3].clone(),
            level: cells[4].clone(),
            page_url: page_url.trim().to_string(),
            download: ExamDownload::default(),
        });
    }

    debug!("Parsed {} exams from listing page", exams.len());
    exams
}

/// Find the exam and gabarito PDF links on a detail page. The first link
/// whose URL mentions "gabarito" is the answer key; the first other PDF is
/// the exam.
pub fn parse_download_links(html: &str) -> ExamDownload {
    let document = Html::parse_document(html);
    let mut download = ExamDownload::default();

    for link in document.select(&PDF_LINK) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if href.to_lowercase().contains("gabarito") {
            if download.answer_key_url.is_none() {
                download.answer_key_url = Some(href.to_string());
            }
        } else if download.exam_url.is_none() {
            download.exam_url = Some(href.to_string());
        }
    }

    download
}

/// Visible text of an element with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
