//! Question segmentation for exam text.
//!
//! Boundaries are bare numbers alone on a line; when a document has none,
//! "Questão N" labels are used instead. Each question runs from its boundary
//! to the next one.

use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, trace};

use super::rules::{truncate_chars, QUESTION_LABEL, QUESTION_NUMBER_LINE};
use crate::models::config::ExtractionConfig;
use crate::models::question::Question;

/// A candidate question boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary {
    start: usize,
    number: Option<u32>,
}

/// Splits exam text into numbered questions.
#[derive(Debug, Clone)]
pub struct QuestionSegmenter {
    max_number: u32,
    min_chars: usize,
    max_chars: usize,
}

impl QuestionSegmenter {
    /// Create a segmenter with the default thresholds.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_number: config.max_question_number,
            min_chars: config.min_question_chars,
            max_chars: config.max_question_chars,
        }
    }

    /// Set the largest accepted question number.
    pub fn with_max_number(mut self, max_number: u32) -> Self {
        self.max_number = max_number;
        self
    }

    /// Set the minimum trimmed length of a question.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Set the truncation length of question text.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Split `text` into questions ordered by number.
    pub fn segment(&self, text: &str) -> Vec<Question> {
        let mut boundaries = find_boundaries(&QUESTION_NUMBER_LINE, text);
        if boundaries.is_empty() {
            debug!("No numeric line boundaries, falling back to question labels");
            boundaries = find_boundaries(&QUESTION_LABEL, text);
        }
        if boundaries.is_empty() {
            debug!("No question boundaries found");
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut questions = Vec::new();

        for (i, boundary) in boundaries.iter().enumerate() {
            let Some(number) = boundary.number else {
                trace!("Skipping boundary at {} with unparseable number", boundary.start);
                continue;
            };
            // A number is claimed by its first boundary even when that span
            // turns out too short to keep.
            if number == 0 || !seen.insert(number) || number > self.max_number {
                trace!("Skipping duplicate or out-of-range question {}", number);
                continue;
            }

            let span = match boundaries.get(i + 1) {
                Some(next) => &text[boundary.start..next.start],
                None => truncate_chars(&text[boundary.start..], self.max_chars),
            };
            let span = span.trim();

            if span.chars().count() < self.min_chars {
                trace!(
                    "Question {} too short ({} chars), treating as noise",
                    number,
                    span.len()
                );
                continue;
            }

            questions.push(Question::new(number, truncate_chars(span, self.max_chars)));
        }

        questions.sort_by_key(|q| q.number);
        debug!("Segmented {} questions from {} boundaries", questions.len(), boundaries.len());
        questions
    }
}

impl Default for QuestionSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment with the default thresholds.
pub fn segment(text: &str) -> Vec<Question> {
    QuestionSegmenter::new().segment(text)
}

fn find_boundaries(pattern: &Regex, text: &str) -> Vec<Boundary> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Boundary {
                start: whole.start(),
                number: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FILLER: &str = "Assinale a alternativa correta sobre o tema apresentado no texto acima.";

    fn exam(numbers: &[&str]) -> String {
        numbers
            .iter()
            .map(|n| format!("{}\n{} ({})\n(A) um\n(B) dois\n", n, FILLER, n))
            .collect()
    }

    #[test]
    fn test_segments_numeric_boundaries() {
        let questions = segment(&exam(&["1", "2", "3"]));
        let numbers: Vec<u32> = questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(questions[0].text.starts_with("1\nAssinale"));
        assert!(!questions[0].text.contains("(2)"));
    }

    #[test]
    fn test_output_sorted_by_number() {
        let questions = segment(&exam(&["12", "3", "7"]));
        let numbers: Vec<u32> = questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![3, 7, 12]);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let text = format!(
            "{}4\nOutra questão quatro repetida que deve ser ignorada pelo segmentador.\n",
            exam(&["4"])
        );
        let questions = segment(&text);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].text.contains(FILLER));
    }

    #[test]
    fn test_rejects_numbers_above_ceiling() {
        let questions = segment(&exam(&["150", "250"]));
        let numbers: Vec<u32> = questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![150]);

        let questions = QuestionSegmenter::new()
            .with_max_number(300)
            .segment(&exam(&["150", "250"]));
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn test_zero_is_not_a_question_number() {
        let questions = segment(&exam(&["0", "1"]));
        let numbers: Vec<u32> = questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1]);
    }

    #[test]
    fn test_short_span_is_noise() {
        let text = format!("5\nPágina\n{}", exam(&["6"]));
        let questions = segment(&text);
        let numbers: Vec<u32> = questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![6]);
    }

    #[test]
    fn test_label_fallback() {
        let text = format!(
            "QUESTÃO 1 {}\n(A) a\nQuestão 2 {}\n(A) b\n",
            FILLER, FILLER
        );
        let questions = segment(&text);
        let numbers: Vec<u32> = questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(questions[1].text.starts_with("Questão 2"));
    }

    #[test]
    fn test_truncates_long_questions() {
        let long = "x".repeat(5000);
        let text = format!("1\n{}\n2\n{}\n", long, long);
        let questions = segment(&text);
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.char_len() <= 3000));
    }

    #[test]
    fn test_no_boundaries_yields_empty() {
        assert!(segment("Texto sem marcadores de questão.\nNada aqui.").is_empty());
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_invariants_hold_on_noisy_text() {
        let text = format!(
            "{}\n999\n{}\n0\n{}\n{}",
            exam(&["1", "1", "2"]),
            FILLER,
            FILLER,
            exam(&["201", "200"])
        );
        let questions = segment(&text);
        let mut seen = HashSet::new();
        for q in &questions {
            assert!(q.number >= 1);
            assert!(q.number <= 200);
            assert!(q.char_len() <= 3000);
            assert!(seen.insert(q.number));
        }
        assert!(questions.windows(2).all(|w| w[0].number < w[1].number));
    }
}
