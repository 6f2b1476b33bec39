//! Question and answer-key extraction from decoded exam text.

pub mod answers;
pub mod blocks;
pub mod merge;
pub mod normalize;
mod parser;
pub mod rules;
pub mod segmenter;

pub use answers::{extract_answers, AnswerExtractor, InlinePairStrategy, TableStrategy};
pub use blocks::{detect_blocks, BlockDetection, BlockDetector, BlockSpan, HeaderKind};
pub use merge::{merge_answers, select_block};
pub use normalize::{normalize, TextNormalizer};
pub use parser::{extract_answer_keys, extract_questions, AnswerKeyReport, ExamExtractor};
pub use rules::AnswerStrategy;
pub use segmenter::{segment, QuestionSegmenter};
