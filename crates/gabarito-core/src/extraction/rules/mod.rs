//! Rule-based building blocks for exam and answer-key extraction.

pub mod patterns;

pub use patterns::*;

use crate::models::answer_key::AnswerMap;

/// One way of reading answer pairs out of a block of gabarito text.
pub trait AnswerStrategy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Extract every pair this strategy recognizes. Numbers above
    /// `max_number` are dropped; the first pair seen for a number wins.
    fn extract(&self, text: &str, max_number: u32) -> AnswerMap;
}

/// Parse a question number token, accepting only 1..=max_number.
pub(crate) fn parse_question_number(token: &str, max_number: u32) -> Option<u32> {
    if token.is_empty() || token.len() > 3 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token
        .parse::<u32>()
        .ok()
        .filter(|&n| n >= 1 && n <= max_number)
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question_number() {
        assert_eq!(parse_question_number("7", 200), Some(7));
        assert_eq!(parse_question_number("007", 200), Some(7));
        assert_eq!(parse_question_number("0", 200), None);
        assert_eq!(parse_question_number("201", 200), None);
        assert_eq!(parse_question_number("201", 250), Some(201));
        assert_eq!(parse_question_number("1000", 5000), None);
        assert_eq!(parse_question_number("1a", 200), None);
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("questão", 6), "questã");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
