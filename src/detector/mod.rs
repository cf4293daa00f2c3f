//! Answer sheet detection modules
//!
//! This module contains the geometric side of the pipeline:
//! - Frame rectification (find the sheet boundary, flatten it)
//! - Bubble detection and fill scoring
//! - Layout clustering (columns, rows, numbered questions)
//! - Grid segmentation (several cards in one photo)

/// Bubble candidates and marking scores
pub mod bubble;
/// Border tracing on binary images
pub mod contour;
/// Sheet boundary search and perspective correction
pub mod frame;
/// Multi-card segmentation and reading order
pub mod grid;
/// Column, row and question clustering
pub mod layout;

pub use bubble::BubbleDetector;
pub use frame::{FrameRectifier, Rectification, RectifyOutcome};
pub use grid::{CardRegion, GridSegmenter};
