//! omr_grader - optical mark recognition for multiple-choice answer sheets
//!
//! Finds answer cards in a photograph, flattens each one, reads its filled
//! bubbles and grades the responses against an answer key.
//!
//! ```no_run
//! use omr_grader::{AnswerKey, OmrConfig, OmrPipeline};
//!
//! let photo = omr_grader::tools::load_rgb("class.jpg")?;
//! let pipeline = OmrPipeline::new(OmrConfig::default(), None)?;
//! let result = pipeline.grade_photo(&photo, &AnswerKey::new(vec![3, 1, 4, 1, 5]));
//! println!("{}", omr_grader::grading::format_results_table(&result));
//! # Ok::<(), omr_grader::OmrError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Detector, template and grading configuration
pub mod config;
/// Sheet detection (rectification, bubbles, layout, grid)
pub mod detector;
/// Error type
pub mod error;
/// Grading, statistics, reports and answer-key parsing
pub mod grading;
/// Core data structures (AnswerKey, BubbleCandidate, BoxRegion, etc.)
pub mod models;
/// Per-photo processing context
pub mod pipeline;
/// Text recognizer seams and name lookup
pub mod recognizer;
/// Helpers for the command-line tools
pub mod tools;
/// Utility functions (grayscale, binarization, geometry, morphology)
pub mod utils;
/// Diagnostic overlays
pub mod visualization;

pub use config::OmrConfig;
pub use error::OmrError;
pub use models::{
    AnswerKey, AnswerStatus, BatchGradingResult, BatchStatistics, BoxRegion, StudentResponse,
    StudentResult,
};
pub use pipeline::{CardResult, OmrPipeline};
pub use recognizer::{TextRecognizer, TextSpan};
