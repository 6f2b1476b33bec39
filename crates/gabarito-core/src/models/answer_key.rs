//! Answer-key models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Question number to answer letter, ordered by question number.
pub type AnswerMap = BTreeMap<u32, AnswerLetter>;

/// A correct-answer letter as printed in a gabarito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
    E,
    /// Annulled question, printed as "X". Whether it counts as correct for
    /// every candidate or is excluded from scoring is left to the consumer.
    #[serde(rename = "X")]
    Annulled,
}

impl AnswerLetter {
    /// Parse an uppercase answer letter.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(AnswerLetter::A),
            'B' => Some(AnswerLetter::B),
            'C' => Some(AnswerLetter::C),
            'D' => Some(AnswerLetter::D),
            'E' => Some(AnswerLetter::E),
            'X' => Some(AnswerLetter::Annulled),
            _ => None,
        }
    }

    /// Parse a token consisting of exactly one answer letter.
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            AnswerLetter::A => 'A',
            AnswerLetter::B => 'B',
            AnswerLetter::C => 'C',
            AnswerLetter::D => 'D',
            AnswerLetter::E => 'E',
            AnswerLetter::Annulled => 'X',
        }
    }

    pub fn is_annulled(&self) -> bool {
        matches!(self, AnswerLetter::Annulled)
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One labeled answer key recovered from a gabarito document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyBlock {
    /// Exam or cargo name the block belongs to, cleaned of boilerplate.
    pub exam_name: String,

    /// Exam variant identifier ("1" when the document does not print one).
    pub tipo: String,

    /// Question number to answer letter.
    pub answers: AnswerMap,
}

impl AnswerKeyBlock {
    pub fn new(exam_name: impl Into<String>, tipo: impl Into<String>, answers: AnswerMap) -> Self {
        Self {
            exam_name: exam_name.into(),
            tipo: tipo.into(),
            answers,
        }
    }

    /// Answer for a question number, if the key lists one.
    pub fn answer(&self, number: u32) -> Option<AnswerLetter> {
        self.answers.get(&number).copied()
    }

    /// Identity of a block within one document.
    pub fn key(&self) -> (&str, &str) {
        (&self.exam_name, &self.tipo)
    }

    /// Number of annulled questions in this key.
    pub fn annulled_count(&self) -> usize {
        self.answers.values().filter(|l| l.is_annulled()).count()
    }

    /// Answers rendered as a compact "1-A 2-B ..." listing.
    pub fn format_answers(&self) -> String {
        self.answers
            .iter()
            .map(|(n, l)| format!("{}-{}", n, l))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
