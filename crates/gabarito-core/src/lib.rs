//! Core library for public exam PDFs.
//!
//! This crate provides:
//! - PDF text decoding (linear text stream, no OCR)
//! - Boilerplate normalization of decoded text
//! - Question segmentation of exam text
//! - Answer-key (gabarito) block detection and answer extraction
//! - Parsers for the exam listing site

pub mod error;
pub mod extraction;
pub mod models;
pub mod pdf;
pub mod source;

pub use error::{GabaritoError, PdfError, Result};
pub use extraction::{
    extract_answer_keys, extract_answers, extract_questions, merge_answers, normalize,
    select_block, AnswerKeyReport, ExamExtractor, HeaderKind,
};
pub use models::{
    AnswerKeyBlock, AnswerLetter, AnswerMap, AnsweredQuestion, ExamDownload, ExamRecord,
    GabaritoConfig, Question,
};
pub use pdf::{PdfExtractor, PdfProcessor, RawText};
