//! Data models shared by the extraction pipeline and its callers.

pub mod answer_key;
pub mod config;
pub mod exam;
pub mod question;

pub use answer_key::{AnswerKeyBlock, AnswerLetter, AnswerMap};
pub use config::GabaritoConfig;
pub use exam::{ExamDownload, ExamRecord};
pub use question::{AnsweredQuestion, Question};
