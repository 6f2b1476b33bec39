//! Answer extraction from one gabarito block.
//!
//! Two strategies, tried in order until one yields anything:
//!
//! 1. `TableStrategy` - a line of question numbers followed by a line of
//!    letters, paired by position.
//! 2. `InlinePairStrategy` - free-text pairs such as "12-C", "12.C" or "12 C".

use regex::Regex;
use tracing::{debug, trace};

use super::rules::{
    parse_question_number, AnswerStrategy, INLINE_DASH_PAIR, INLINE_DOT_PAIR, INLINE_SPACE_PAIR,
};
use crate::models::answer_key::{AnswerLetter, AnswerMap};

/// Shortest number or letter run that counts as a table row.
pub const MIN_TABLE_RUN: usize = 5;

/// Positional table layout:
///
/// ```text
/// 1 2 3 4 5 6
/// A C X B E D
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TableStrategy;

impl TableStrategy {
    /// Longest run of consecutive tokens accepted by `is_cell`.
    fn longest_run<'a>(line: &'a str, is_cell: impl Fn(&str) -> bool) -> Vec<&'a str> {
        let mut best: Vec<&str> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for token in line.split_whitespace() {
            if is_cell(token) {
                current.push(token);
            } else {
                if current.len() > best.len() {
                    best = std::mem::take(&mut current);
                }
                current.clear();
            }
        }
        if current.len() > best.len() {
            best = current;
        }
        best
    }

    fn is_number_cell(token: &str) -> bool {
        (1..=3).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit())
    }

    fn is_letter_cell(token: &str) -> bool {
        AnswerLetter::from_token(token).is_some()
    }
}

impl AnswerStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(&self, text: &str, max_number: u32) -> AnswerMap {
        let mut answers = AnswerMap::new();
        let lines: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();

        for pair in lines.windows(2) {
            let numbers = Self::longest_run(pair[0], Self::is_number_cell);
            if numbers.len() < MIN_TABLE_RUN {
                continue;
            }
            let letters = Self::longest_run(pair[1], Self::is_letter_cell);
            if letters.len() < MIN_TABLE_RUN {
                continue;
            }
            if numbers.len() != letters.len() {
                trace!(
                    "Table row has {} numbers but {} letters, pairing by position",
                    numbers.len(),
                    letters.len()
                );
            }

            for (number, letter) in numbers.iter().zip(&letters) {
                let (Some(number), Some(letter)) = (
                    parse_question_number(number, max_number),
                    AnswerLetter::from_token(letter),
                ) else {
                    continue;
                };
                answers.entry(number).or_insert(letter);
            }
        }

        answers
    }
}

/// Free-text pairs. Patterns run from strictest to loosest and the first
/// letter found for a number is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlinePairStrategy;

impl AnswerStrategy for InlinePairStrategy {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn extract(&self, text: &str, max_number: u32) -> AnswerMap {
        let mut answers = AnswerMap::new();
        let patterns: [&Regex; 3] = [&*INLINE_DASH_PAIR, &*INLINE_DOT_PAIR, &*INLINE_SPACE_PAIR];
        for pattern in patterns {
            for caps in pattern.captures_iter(text) {
                let number = caps
                    .get(1)
                    .and_then(|m| parse_question_number(m.as_str(), max_number));
                let letter = caps.get(2).and_then(|m| AnswerLetter::from_token(m.as_str()));
                if let (Some(number), Some(letter)) = (number, letter) {
                    answers.entry(number).or_insert(letter);
                }
            }
        }
        answers
    }
}

/// Runs answer strategies in priority order.
pub struct AnswerExtractor {
    strategies: Vec<Box<dyn AnswerStrategy + Send + Sync>>,
    max_number: u32,
}

impl AnswerExtractor {
    /// Table first, inline pairs as fallback, numbers up to 200.
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(TableStrategy), Box::new(InlinePairStrategy)],
            max_number: 200,
        }
    }

    /// Set the largest accepted question number.
    pub fn with_max_number(mut self, max_number: u32) -> Self {
        self.max_number = max_number;
        self
    }

    /// Extract answers from one block, returning the winning strategy's name.
    /// Returns `None` when no strategy recognizes anything.
    pub fn extract_with_strategy(&self, text: &str) -> Option<(&'static str, AnswerMap)> {
        for strategy in &self.strategies {
            let answers = strategy.extract(text, self.max_number);
            if !answers.is_empty() {
                debug!("{} strategy found {} answers", strategy.name(), answers.len());
                return Some((strategy.name(), answers));
            }
            trace!("{} strategy found nothing", strategy.name());
        }
        None
    }

    /// Extract answers from one block.
    pub fn extract(&self, text: &str) -> AnswerMap {
        self.extract_with_strategy(text)
            .map(|(_, answers)| answers)
            .unwrap_or_default()
    }
}

impl Default for AnswerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract answers from one block with the default extractor.
pub fn extract_answers(text: &str) -> AnswerMap {
    AnswerExtractor::new().extract(text)
}
