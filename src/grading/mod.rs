//! Grading, statistics and reporting
//!
//! Everything after the marks are read: comparing responses to a key,
//! summarizing a batch, and recovering a key from recognized text.

/// Answer-key parsing from recognized text
pub mod answer_key;
/// Per-student grading against an answer key
pub mod engine;
/// Fixed-width text report
pub mod report;
/// Batch statistics
pub mod statistics;

pub use answer_key::{AnswerKeyParser, ExtractedKey};
pub use engine::{BatchGrader, classify};
pub use report::format_results_table;
pub use statistics::aggregate;
