//! Exam and answer-key extraction entry points.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::blocks::{BlockDetector, HeaderKind};
use super::normalize::TextNormalizer;
use super::segmenter::QuestionSegmenter;
use crate::error::Result;
use crate::models::answer_key::AnswerKeyBlock;
use crate::models::config::{ExtractionConfig, GabaritoConfig};
use crate::models::question::Question;

/// Result of answer-key extraction over one document.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerKeyReport {
    /// Accepted blocks, in document order.
    pub blocks: Vec<AnswerKeyBlock>,
    /// Answer strategy used for each accepted block.
    pub strategies: Vec<&'static str>,
    /// Header style the document was split by, `None` for the whole-text fallback.
    pub header: Option<HeaderKind>,
    /// Blocks dropped for having too few answers.
    pub discarded: usize,
    /// Blocks dropped for repeating an earlier (exam_name, tipo).
    pub duplicates: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Composes normalization, segmentation, block detection and answer
/// extraction. Extraction never fails on bad text; it returns empty results.
#[derive(Debug, Clone)]
pub struct ExamExtractor {
    normalizer: TextNormalizer,
    max_question_number: u32,
    min_question_chars: usize,
    max_question_chars: usize,
    min_answers: usize,
}

impl ExamExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::with_extraction_config(TextNormalizer::new(), &ExtractionConfig::default())
    }

    /// Create an extractor from a loaded configuration.
    pub fn from_config(config: &GabaritoConfig) -> Result<Self> {
        let normalizer = TextNormalizer::from_config(&config.normalize)?;
        Ok(Self::with_extraction_config(normalizer, &config.extraction))
    }

    fn with_extraction_config(normalizer: TextNormalizer, config: &ExtractionConfig) -> Self {
        Self {
            normalizer,
            max_question_number: config.max_question_number,
            min_question_chars: config.min_question_chars,
            max_question_chars: config.max_question_chars,
            min_answers: config.min_answers,
        }
    }

    /// Set the largest accepted question number.
    pub fn with_max_question_number(mut self, max: u32) -> Self {
        self.max_question_number = max;
        self
    }

    /// Set the minimum answer count for a block to be kept.
    pub fn with_min_answers(mut self, min: usize) -> Self {
        self.min_answers = min;
        self
    }

    /// Set the minimum question length in characters.
    pub fn with_min_question_chars(mut self, min: usize) -> Self {
        self.min_question_chars = min;
        self
    }

    /// Set the maximum question length in characters.
    pub fn with_max_question_chars(mut self, max: usize) -> Self {
        self.max_question_chars = max;
        self
    }

    /// Replace the text normalizer.
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn segmenter(&self) -> QuestionSegmenter {
        QuestionSegmenter::new()
            .with_max_number(self.max_question_number)
            .with_min_chars(self.min_question_chars)
            .with_max_chars(self.max_question_chars)
    }

    fn detector(&self) -> BlockDetector {
        BlockDetector::new()
            .with_max_number(self.max_question_number)
            .with_min_answers(self.min_answers)
    }

    /// Split exam text into questions ordered by number.
    pub fn extract_questions(&self, exam_text: &str) -> Vec<Question> {
        let start = Instant::now();
        let text = self.normalizer.normalize(exam_text);
        let questions = self.segmenter().segment(&text);
        info!(
            "Extracted {} questions from {} characters in {}ms",
            questions.len(),
            exam_text.len(),
            start.elapsed().as_millis()
        );
        questions
    }

    /// Recover the answer keys in a gabarito text.
    pub fn extract_answer_keys(&self, answer_key_text: &str) -> Vec<AnswerKeyBlock> {
        self.extract_answer_key_report(answer_key_text).blocks
    }

    /// Recover the answer keys together with how they were found.
    pub fn extract_answer_key_report(&self, answer_key_text: &str) -> AnswerKeyReport {
        let start = Instant::now();
        let text = self.normalizer.normalize(answer_key_text);
        let detection = self.detector().detect(&text);

        let mut seen = HashSet::new();
        let mut blocks = Vec::new();
        let mut strategies = Vec::new();
        let mut discarded = 0;
        let mut duplicates = 0;

        for detected in detection.blocks {
            let span = detected.span;
            if detected.answers.len() < self.min_answers {
                warn!(
                    "Discarding block {:?} tipo {}: {} answers, need {}",
                    span.exam_name,
                    span.tipo,
                    detected.answers.len(),
                    self.min_answers
                );
                discarded += 1;
                continue;
            }
            if !seen.insert((span.exam_name.clone(), span.tipo.clone())) {
                debug!("Dropping duplicate block {:?} tipo {}", span.exam_name, span.tipo);
                duplicates += 1;
                continue;
            }
            strategies.push(detected.strategy.unwrap_or("none"));
            blocks.push(AnswerKeyBlock::new(span.exam_name, span.tipo, detected.answers));
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} answer keys ({} discarded, {} duplicates) in {}ms",
            blocks.len(),
            discarded,
            duplicates,
            processing_time_ms
        );

        AnswerKeyReport {
            blocks,
            strategies,
            header: detection.header,
            discarded,
            duplicates,
            processing_time_ms,
        }
    }
}

impl Default for ExamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Split exam text into questions with the default settings.
pub fn extract_questions(exam_text: &str) -> Vec<Question> {
    ExamExtractor::new().extract_questions(exam_text)
}

/// Recover answer keys with the default settings.
pub fn extract_answer_keys(answer_key_text: &str) -> Vec<AnswerKeyBlock> {
    ExamExtractor::new().extract_answer_keys(answer_key_text)
}
