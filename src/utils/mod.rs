//! Utility functions for image processing
//!
//! This module provides the low-level building blocks for sheet detection:
//! - Grayscale conversion (RGB to luminance)
//! - Binarization (fixed threshold and Otsu's method)
//! - Morphology (open, close, dilate with rect or ellipse kernels)
//! - Geometry (perspective transforms, polygon area and simplification)

/// Fixed and Otsu thresholding
pub mod binarization;
/// Perspective transforms and polygon helpers
pub mod geometry;
/// RGB to luminance conversion
pub mod grayscale;
/// Open, close and dilate
pub mod morphology;
