//! Answer-key block detection.
//!
//! A gabarito document usually holds several keys, one per cargo or exam
//! variant, each introduced by a header line. Header styles differ between
//! bancas, so the detector tries one header pattern at a time, most specific
//! first, and commits to the first pattern whose blocks produce a usable key.
//! Patterns are never mixed within one document.

use std::fmt;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::answers::AnswerExtractor;
use super::rules::{
    CARGO_LABEL, HEADER_CAPS_ROLE, HEADER_GABARITO_PROVA, HEADER_NUMBERED_VARIANT,
    HEADER_ROLE_LINE, HEADER_ROLE_TIPO, NAME_CARGO_PREFIX, NAME_GABARITO_PREFIX,
    NAME_ORDINAL_PREFIX, WHITESPACE_RUN,
};
use crate::models::answer_key::AnswerMap;

/// Variant identifier used when a header does not print one.
pub const DEFAULT_TIPO: &str = "1";

/// Exam name used when nothing in the document looks like one.
pub const UNKNOWN_EXAM: &str = "Unknown";

const MIN_NAME_CHARS: usize = 4;
const REJECTED_NAMES: [&str; 3] = ["PROVA", "GABARITO", "TIPO"];

/// Header styles, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderKind {
    /// "M1 – ANALISTA JUDICIÁRIO"
    NumberedVariant,
    /// "Soldado Bombeiro Militar – Tipo 2"
    RoleTipo,
    /// "GABARITO DEFINITIVO Analista de Sistemas Prova – 03"
    GabaritoProva,
    /// "ESCRITURÁRIO" directly above the answer list
    CapsRole,
    /// Any short line with a role keyword. Least reliable, tried last.
    RoleLine,
}

impl HeaderKind {
    pub const PRIORITY: [HeaderKind; 5] = [
        HeaderKind::NumberedVariant,
        HeaderKind::RoleTipo,
        HeaderKind::GabaritoProva,
        HeaderKind::CapsRole,
        HeaderKind::RoleLine,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HeaderKind::NumberedVariant => "numbered_variant",
            HeaderKind::RoleTipo => "role_tipo",
            HeaderKind::GabaritoProva => "gabarito_prova",
            HeaderKind::CapsRole => "caps_role",
            HeaderKind::RoleLine => "role_line",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            HeaderKind::NumberedVariant => &*HEADER_NUMBERED_VARIANT,
            HeaderKind::RoleTipo => &*HEADER_ROLE_TIPO,
            HeaderKind::GabaritoProva => &*HEADER_GABARITO_PROVA,
            HeaderKind::CapsRole => &*HEADER_CAPS_ROLE,
            HeaderKind::RoleLine => &*HEADER_ROLE_LINE,
        }
    }

    /// Raw name and tipo from one header match.
    fn parse<'t>(&self, caps: &Captures<'t>) -> Option<(&'t str, String)> {
        match self {
            HeaderKind::NumberedVariant => {
                Some((caps.get(2)?.as_str(), caps.get(1)?.as_str().to_string()))
            }
            HeaderKind::RoleTipo | HeaderKind::GabaritoProva => {
                Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().to_string()))
            }
            HeaderKind::CapsRole | HeaderKind::RoleLine => {
                Some((caps.get(1)?.as_str(), DEFAULT_TIPO.to_string()))
            }
        }
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A labeled slice of the answer-key text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub exam_name: String,
    pub tipo: String,
    /// Byte offset where the header ends and the block body starts.
    pub header_end: usize,
    /// Byte offset where the block body ends (next header or end of text).
    pub end: usize,
}

impl BlockSpan {
    /// Body of this block within the text it was detected in.
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.header_end..self.end).unwrap_or("")
    }
}

/// A block together with the answers read from its body.
#[derive(Debug, Clone)]
pub struct DetectedBlock {
    pub span: BlockSpan,
    pub answers: AnswerMap,
    /// Answer strategy that produced `answers`, if any did.
    pub strategy: Option<&'static str>,
}

/// Result of block detection over one document.
#[derive(Debug, Clone)]
pub struct BlockDetection {
    /// Header style the document was split by; `None` for the whole-text fallback.
    pub header: Option<HeaderKind>,
    pub blocks: Vec<DetectedBlock>,
}

/// Splits answer-key text into labeled blocks.
pub struct BlockDetector {
    extractor: AnswerExtractor,
    min_answers: usize,
}

impl BlockDetector {
    pub fn new() -> Self {
        Self {
            extractor: AnswerExtractor::new(),
            min_answers: 5,
        }
    }

    /// Set the answer count a block needs for its header style to be accepted.
    pub fn with_min_answers(mut self, min_answers: usize) -> Self {
        self.min_answers = min_answers;
        self
    }

    /// Set the largest accepted question number.
    pub fn with_max_number(mut self, max_number: u32) -> Self {
        self.extractor = self.extractor.with_max_number(max_number);
        self
    }

    /// Detect blocks and read their answers.
    pub fn detect(&self, text: &str) -> BlockDetection {
        for kind in HeaderKind::PRIORITY {
            let spans = find_spans(kind, text);
            if spans.is_empty() {
                trace!("No {} headers", kind);
                continue;
            }

            let blocks: Vec<DetectedBlock> = spans
                .into_iter()
                .map(|span| self.read_block(span, text))
                .collect();

            if blocks.iter().any(|b| b.answers.len() >= self.min_answers) {
                debug!("Split answer key by {} headers into {} blocks", kind, blocks.len());
                return BlockDetection {
                    header: Some(kind),
                    blocks,
                };
            }
            debug!("{} headers found but no block has a usable key", kind);
        }

        debug!("No header style matched, treating the whole text as one block");
        let span = BlockSpan {
            exam_name: fallback_exam_name(text),
            tipo: DEFAULT_TIPO.to_string(),
            header_end: 0,
            end: text.len(),
        };
        BlockDetection {
            header: None,
            blocks: vec![self.read_block(span, text)],
        }
    }

    fn read_block(&self, span: BlockSpan, text: &str) -> DetectedBlock {
        let (strategy, answers) = match self.extractor.extract_with_strategy(span.body(text)) {
            Some((name, answers)) => (Some(name), answers),
            None => (None, AnswerMap::new()),
        };
        DetectedBlock {
            span,
            answers,
            strategy,
        }
    }
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Block spans with the default thresholds.
pub fn detect_blocks(text: &str) -> Vec<BlockSpan> {
    BlockDetector::new()
        .detect(text)
        .blocks
        .into_iter()
        .map(|b| b.span)
        .collect()
}

/// Spans for one header style. Headers with an unusable name are not
/// boundaries, so their text stays in the preceding block.
fn find_spans(kind: HeaderKind, text: &str) -> Vec<BlockSpan> {
    let mut headers: Vec<(usize, usize, String, String)> = Vec::new();

    for caps in kind.pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some((raw_name, tipo)) = kind.parse(&caps) else { continue };
        let Some(exam_name) = clean_exam_name(raw_name) else {
            trace!("Rejected {} header name {:?}", kind, raw_name);
            continue;
        };
        let header_end = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.end())
            .max()
            .unwrap_or(whole.end());
        headers.push((whole.start(), header_end, exam_name, tipo));
    }

    let starts: Vec<usize> = headers.iter().map(|h| h.0).skip(1).collect();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, (_, header_end, exam_name, tipo))| BlockSpan {
            exam_name,
            tipo,
            header_end,
            end: starts.get(i).copied().unwrap_or(text.len()),
        })
        .collect()
}

/// Strip boilerplate from a header name. Returns `None` for names that are
/// too short or are a bare label word.
pub fn clean_exam_name(raw: &str) -> Option<String> {
    let name = NAME_GABARITO_PREFIX.replace(raw.trim(), "");
    let name = NAME_CARGO_PREFIX.replace(&name, "");
    let name = NAME_ORDINAL_PREFIX.replace(&name, "");
    let name = WHITESPACE_RUN.replace_all(&name, " ");
    let name = name
        .trim()
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '–' | '—' | ':' | ',')
        });

    if name.chars().count() < MIN_NAME_CHARS {
        return None;
    }
    let upper = name.to_uppercase();
    if REJECTED_NAMES.iter().any(|word| *word == upper) {
        return None;
    }
    Some(name.to_string())
}

/// Best-effort name for a document without recognizable headers: a
/// "CARGO:" label, then the first role-keyword line, then `UNKNOWN_EXAM`.
pub fn fallback_exam_name(text: &str) -> String {
    CARGO_LABEL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .chain(HEADER_ROLE_LINE.captures_iter(text).filter_map(|caps| caps.get(1)))
        .find_map(|m| clean_exam_name(m.as_str()))
        .unwrap_or_else(|| UNKNOWN_EXAM.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer_key::AnswerLetter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbered_variant_blocks() {
        let text = "M1 – ANALISTA\n1 2 3 4 5\nA B C D E\nM2 – TÉCNICO\n1 2 3 4 5\nE D C B A\n";
        let detection = BlockDetector::new().detect(text);
        assert_eq!(detection.header, Some(HeaderKind::NumberedVariant));
        assert_eq!(detection.blocks.len(), 2);

        let first = &detection.blocks[0];
        assert_eq!(first.span.exam_name, "ANALISTA");
        assert_eq!(first.span.tipo, "1");
        assert_eq!(first.answers[&1], AnswerLetter::A);
        assert_eq!(first.answers.len(), 5);

        let second = &detection.blocks[1];
        assert_eq!(second.span.exam_name, "TÉCNICO");
        assert_eq!(second.span.tipo, "2");
        assert_eq!(second.answers[&1], AnswerLetter::E);
        assert!(!first.span.body(text).contains("TÉCNICO"));
    }

    #[test]
    fn test_role_tipo_blocks() {
        let text = "Soldado Bombeiro Militar – Tipo 1\n1 2 3 4 5\nA B C D E\n\
                    Soldado Bombeiro Militar – Tipo 2\n1 2 3 4 5\nB C D E A\n";
        let detection = BlockDetector::new().detect(text);
        assert_eq!(detection.header, Some(HeaderKind::RoleTipo));
        let tipos: Vec<&str> = detection.blocks.iter().map(|b| b.span.tipo.as_str()).collect();
        assert_eq!(tipos, vec!["1", "2"]);
        assert!(detection
            .blocks
            .iter()
            .all(|b| b.span.exam_name == "Soldado Bombeiro Militar"));
    }

    #[test]
    fn test_gabarito_prova_header() {
        let text = "GABARITO DEFINITIVO Analista de Sistemas Prova – 03\n1-A 2-B 3-C 4-D 5-E\n";
        let detection = BlockDetector::new().detect(text);
        assert_eq!(detection.header, Some(HeaderKind::GabaritoProva));
        let span = &detection.blocks[0].span;
        assert_eq!(span.exam_name, "Analista de Sistemas");
        assert_eq!(span.tipo, "03");
    }

    #[test]
    fn test_caps_role_header() {
        let text = "ESCRITURÁRIO\n1-A 2-B 3-C 4-D 5-E\nTÉCNICO JUDICIÁRIO\n1-E 2-E 3-E 4-E 5-E\n";
        let detection = BlockDetector::new().detect(text);
        assert_eq!(detection.header, Some(HeaderKind::CapsRole));
        let names: Vec<&str> = detection.blocks.iter().map(|b| b.span.exam_name.as_str()).collect();
        assert_eq!(names, vec!["ESCRITURÁRIO", "TÉCNICO JUDICIÁRIO"]);
        assert_eq!(detection.blocks[0].answers[&1], AnswerLetter::A);
        assert_eq!(detection.blocks[1].answers[&1], AnswerLetter::E);
    }

    #[test]
    fn test_role_line_degraded_layer() {
        let text = "Analista Judiciário\n1 2 3 4 5\nA B C D E\nTécnico Judiciário\n1 2 3 4 5\nB B B B B\n";
        let detection = BlockDetector::new().detect(text);
        assert_eq!(detection.header, Some(HeaderKind::RoleLine));
        assert_eq!(detection.blocks.len(), 2);
        assert!(detection.blocks.iter().all(|b| b.span.tipo == DEFAULT_TIPO));
    }

    #[test]
    fn test_unusable_style_falls_through() {
        let text = "Analista Judiciário – Tipo 3\n1 2 3 4 5\nA B C D E\nM1 – ANEXO\n1-A\n";
        let detection = BlockDetector::new().detect(text);
        assert_eq!(detection.header, Some(HeaderKind::RoleTipo));
        assert_eq!(detection.blocks[0].span.tipo, "3");
        assert_eq!(detection.blocks[0].strategy, Some("table"));
    }

    #[test]
    fn test_whole_text_fallback() {
        let detection = BlockDetector::new().detect("1-A 2-B 3-C 4-D 5-E");
        assert_eq!(detection.header, None);
        assert_eq!(detection.blocks.len(), 1);
        assert_eq!(detection.blocks[0].span.exam_name, UNKNOWN_EXAM);
        assert_eq!(detection.blocks[0].span.tipo, "1");
        assert_eq!(detection.blocks[0].answers.len(), 5);
    }

    #[test]
    fn test_fallback_name_sources() {
        assert_eq!(fallback_exam_name("CARGO: Bibliotecário\n1-A"), "Bibliotecário");
        assert_eq!(fallback_exam_name("texto\nAgente de Trânsito\n"), "Agente de Trânsito");
        assert_eq!(fallback_exam_name("nada"), UNKNOWN_EXAM);
    }

    #[test]
    fn test_clean_exam_name() {
        assert_eq!(
            clean_exam_name("GABARITO OFICIAL (Prova Objetiva) Analista  de\tSistemas -")
                .as_deref(),
            Some("Analista de Sistemas")
        );
        assert_eq!(clean_exam_name("2º Tenente Médico").as_deref(), Some("Tenente Médico"));
        assert_eq!(clean_exam_name("CARGO: Auditor Fiscal").as_deref(), Some("Auditor Fiscal"));
        assert_eq!(clean_exam_name("Prova"), None);
        assert_eq!(clean_exam_name("GABARITO"), None);
        assert_eq!(clean_exam_name("tipo"), None);
        assert_eq!(clean_exam_name("ABC"), None);
    }

    #[test]
    fn test_invalid_names_are_not_boundaries() {
        let text = "M1 – ANALISTA\n1 2 3 4 5\nA B C D E\nM2 – TIPO\n6 7 8 9 10\nA A A A A\n";
        let detection = BlockDetector::new().detect(text);
        assert_eq!(detection.blocks.len(), 1);
        assert_eq!(detection.blocks[0].answers.len(), 10);
    }

    #[test]
    fn test_detect_blocks_spans() {
        let text = "M1 – ANALISTA\n1 2 3 4 5\nA B C D E\n";
        let spans = detect_blocks(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].body(text), "\n1 2 3 4 5\nA B C D E\n");
    }
}
