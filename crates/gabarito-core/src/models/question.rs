//! Question models produced by segmentation and by the answer merge step.

use serde::{Deserialize, Serialize};

use super::answer_key::AnswerLetter;

/// A single question cut out of an exam PDF's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question number as printed in the exam (not necessarily contiguous).
    pub number: u32,

    /// Question text, starting at its boundary marker.
    pub text: String,
}

impl Question {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Number of characters (not bytes) in the question text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A question paired with its resolved answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub number: u32,
    pub text: String,
    pub correct_answer: AnswerLetter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_accented_letters_once() {
        let question = Question::new(1, "Questão");
        assert_eq!(question.char_len(), 7);
        assert!(question.text.len() > 7);
    }
}
