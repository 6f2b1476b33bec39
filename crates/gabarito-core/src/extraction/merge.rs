//! Pairing segmented questions with an answer key.

use tracing::debug;

use crate::models::answer_key::AnswerKeyBlock;
use crate::models::question::{AnsweredQuestion, Question};

/// Pair each question with its answer from `block`. Questions the key does
/// not cover are left out; question order is preserved.
pub fn merge_answers(questions: &[Question], block: &AnswerKeyBlock) -> Vec<AnsweredQuestion> {
    let merged: Vec<AnsweredQuestion> = questions
        .iter()
        .filter_map(|q| {
            block.answer(q.number).map(|correct_answer| AnsweredQuestion {
                number: q.number,
                text: q.text.clone(),
                correct_answer,
            })
        })
        .collect();

    debug!(
        "Merged {} of {} questions with key {:?} tipo {}",
        merged.len(),
        questions.len(),
        block.exam_name,
        block.tipo
    );
    merged
}

/// Pick the key for a given tipo. Without a tipo, or when no block carries
/// it, the first block is used.
pub fn select_block<'a>(
    blocks: &'a [AnswerKeyBlock],
    tipo: Option<&str>,
) -> Option<&'a AnswerKeyBlock> {
    tipo.and_then(|t| blocks.iter().find(|b| b.tipo == t))
        .or_else(|| blocks.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer_key::{AnswerLetter, AnswerMap};
    use pretty_assertions::assert_eq;

    fn block(tipo: &str, pairs: &[(u32, AnswerLetter)]) -> AnswerKeyBlock {
        let answers: AnswerMap = pairs.iter().copied().collect();
        AnswerKeyBlock::new("Analista", tipo, answers)
    }

    #[test]
    fn test_merge_keeps_only_answered_questions() {
        let questions = vec![
            Question::new(1, "Primeira"),
            Question::new(2, "Segunda"),
            Question::new(4, "Quarta"),
        ];
        let key = block(
            "1",
            &[(1, AnswerLetter::C), (4, AnswerLetter::Annulled), (9, AnswerLetter::A)],
        );
        let merged = merge_answers(&questions, &key);

        assert_eq!(
            merged,
            vec![
                AnsweredQuestion {
                    number: 1,
                    text: "Primeira".to_string(),
                    correct_answer: AnswerLetter::C,
                },
                AnsweredQuestion {
                    number: 4,
                    text: "Quarta".to_string(),
                    correct_answer: AnswerLetter::Annulled,
                },
            ]
        );
    }

    #[test]
    fn test_select_block_by_tipo() {
        let blocks = vec![block("1", &[]), block("2", &[])];
        assert_eq!(select_block(&blocks, Some("2")).map(|b| b.tipo.as_str()), Some("2"));
        assert_eq!(select_block(&blocks, Some("7")).map(|b| b.tipo.as_str()), Some("1"));
        assert_eq!(select_block(&blocks, None).map(|b| b.tipo.as_str()), Some("1"));
        assert!(select_block(&[], Some("1")).is_none());
    }
}
