//! Tunable parameters for every stage, with the defaults the detectors were
//! calibrated against.
//!
//! All structs deserialize with `#[serde(default)]`, so a JSON file only
//! needs the fields it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OmrError;

/// Document boundary search and perspective correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifierConfig {
    /// Height of the working copy used for corner search
    pub resize_height: u32,
    /// Gaussian sigma applied before edge detection
    pub blur_sigma: f32,
    /// Canny low hysteresis threshold
    pub canny_low: f32,
    /// Canny high hysteresis threshold
    pub canny_high: f32,
    /// Radius of the square closing kernel
    pub close_radius: u8,
    /// Largest outlines examined for a quadrilateral
    pub top_contours: usize,
    /// Polygon tolerance as a fraction of the outline perimeter
    pub poly_epsilon_factor: f32,
    /// Minimum quad area as a fraction of the image area
    pub min_area_ratio: f32,
}

impl Default for RectifierConfig {
    fn default() -> Self {
        Self {
            resize_height: 1000,
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 200.0,
            close_radius: 2,
            top_contours: 10,
            poly_epsilon_factor: 0.02,
            min_area_ratio: 0.1,
        }
    }
}

/// Bubble detection, clustering and marking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Pixels at or below this intensity count as ink
    pub binary_threshold: u8,
    /// Radius of the elliptical opening kernel
    pub open_radius: u8,
    /// Smallest accepted bubble side in pixels
    pub min_bubble_size: u32,
    /// Largest accepted bubble side in pixels
    pub max_bubble_size: u32,
    /// Lowest accepted width / height
    pub min_aspect_ratio: f32,
    /// Highest accepted width / height
    pub max_aspect_ratio: f32,
    /// Outlines enclosing no more than this area are noise
    pub min_contour_area: f32,
    /// Centroids closer than this are the same bubble
    pub dedup_distance: f32,
    /// Maximum x gap to the previous column member
    pub column_threshold: f32,
    /// Maximum y gap to the first row member
    pub row_threshold: f32,
    /// Darkness above which a bubble is marked
    pub marking_threshold: f32,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            binary_threshold: 200,
            open_radius: 1,
            min_bubble_size: 8,
            max_bubble_size: 100,
            min_aspect_ratio: 0.4,
            max_aspect_ratio: 2.5,
            min_contour_area: 20.0,
            dedup_distance: 5.0,
            column_threshold: 50.0,
            row_threshold: 15.0,
            marking_threshold: 0.35,
        }
    }
}

/// Multi-card segmentation of one photograph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Smallest card as a fraction of the photo area
    pub min_card_area_ratio: f32,
    /// Largest card as a fraction of the photo area
    pub max_card_area_ratio: f32,
    /// Lowest accepted width / height
    pub min_aspect_ratio: f32,
    /// Highest accepted width / height
    pub max_aspect_ratio: f32,
    /// Margin added around each card when cropping
    pub card_padding: u32,
    /// Outlines enclosing less area than this are ignored
    pub min_contour_area: f32,
    /// Gaussian sigma applied before edge detection
    pub blur_sigma: f32,
    /// Canny low hysteresis threshold
    pub canny_low: f32,
    /// Canny high hysteresis threshold
    pub canny_high: f32,
    /// Radius of the square kernel used to close and dilate edges
    pub morph_radius: u8,
    /// Closing repetitions
    pub close_iterations: u8,
    /// Dilation repetitions
    pub dilate_iterations: u8,
    /// Polygon tolerance as a fraction of the outline perimeter
    pub poly_epsilon_factor: f32,
    /// Row grouping threshold as a fraction of the mean card height
    pub row_tolerance: f32,
    /// Allowed intersection as a fraction of the smaller card
    pub max_overlap: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_card_area_ratio: 0.02,
            max_card_area_ratio: 0.5,
            min_aspect_ratio: 0.4,
            max_aspect_ratio: 2.5,
            card_padding: 10,
            min_contour_area: 10_000.0,
            blur_sigma: 1.1,
            canny_low: 30.0,
            canny_high: 150.0,
            morph_radius: 2,
            close_iterations: 2,
            dilate_iterations: 2,
            poly_epsilon_factor: 0.02,
            row_tolerance: 0.3,
            max_overlap: 0.5,
        }
    }
}

/// Printed layout of the answer sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetTemplate {
    /// Columns starting at or left of this x hold student-ID bubbles
    pub question_x_offset: f32,
    /// Column grouping threshold for question assignment
    pub column_threshold: f32,
    /// Question columns on the sheet
    pub num_question_columns: usize,
    /// Questions per column
    pub questions_per_column: usize,
    /// Choices per question
    pub choices_per_question: usize,
    /// Labels preceding the student's name
    pub name_keywords: Vec<String>,
    /// Separator between a label and the name on the same span
    pub name_separator: char,
}

impl Default for SheetTemplate {
    fn default() -> Self {
        Self {
            question_x_offset: 300.0,
            column_threshold: 60.0,
            num_question_columns: 4,
            questions_per_column: 10,
            choices_per_question: 5,
            name_keywords: vec!["이름".into(), "성명".into(), "name".into()],
            name_separator: ':',
        }
    }
}

impl SheetTemplate {
    /// Number of questions the template can hold
    pub fn max_questions(&self) -> usize {
        self.num_question_columns * self.questions_per_column
    }
}

/// Scoring policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Points awarded per correct question
    pub points_per_question: u32,
    /// Percentage below which a student fails
    pub failing_threshold: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            points_per_question: 1,
            failing_threshold: 60.0,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmrConfig {
    /// Frame rectifier parameters
    pub rectifier: RectifierConfig,
    /// Bubble detector parameters
    pub bubble: BubbleConfig,
    /// Grid segmenter parameters
    pub grid: GridConfig,
    /// Sheet layout
    pub template: SheetTemplate,
    /// Grading policy
    pub grading: GradingConfig,
    /// Look for several cards in each photo
    pub expect_grid: bool,
    /// Process cards of one photo on the rayon pool
    pub parallel: bool,
}

impl Default for OmrConfig {
    fn default() -> Self {
        Self {
            rectifier: RectifierConfig::default(),
            bubble: BubbleConfig::default(),
            grid: GridConfig::default(),
            template: SheetTemplate::default(),
            grading: GradingConfig::default(),
            expect_grid: true,
            parallel: true,
        }
    }
}

impl OmrConfig {
    /// Load a JSON config from disk and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OmrError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config to disk as pretty JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OmrError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject values no detector can work with
    pub fn validate(&self) -> Result<(), OmrError> {
        let r = &self.rectifier;
        if r.resize_height == 0 {
            return Err(OmrError::invalid("rectifier.resize_height", "must be positive"));
        }
        if r.canny_low > r.canny_high {
            return Err(OmrError::invalid("rectifier.canny_low", "exceeds canny_high"));
        }
        check_fraction("rectifier.min_area_ratio", r.min_area_ratio)?;
        check_fraction("rectifier.poly_epsilon_factor", r.poly_epsilon_factor)?;

        let b = &self.bubble;
        if b.min_bubble_size > b.max_bubble_size {
            return Err(OmrError::invalid("bubble.min_bubble_size", "exceeds max_bubble_size"));
        }
        if b.min_aspect_ratio > b.max_aspect_ratio {
            return Err(OmrError::invalid("bubble.min_aspect_ratio", "exceeds max_aspect_ratio"));
        }
        check_fraction("bubble.marking_threshold", b.marking_threshold)?;
        if b.dedup_distance < 0.0 || b.column_threshold < 0.0 || b.row_threshold < 0.0 {
            return Err(OmrError::invalid("bubble", "distances must be non-negative"));
        }

        let g = &self.grid;
        if g.min_card_area_ratio > g.max_card_area_ratio {
            return Err(OmrError::invalid("grid.min_card_area_ratio", "exceeds max_card_area_ratio"));
        }
        check_fraction("grid.max_card_area_ratio", g.max_card_area_ratio)?;
        check_fraction("grid.max_overlap", g.max_overlap)?;
        if g.min_aspect_ratio > g.max_aspect_ratio {
            return Err(OmrError::invalid("grid.min_aspect_ratio", "exceeds max_aspect_ratio"));
        }
        if g.canny_low > g.canny_high {
            return Err(OmrError::invalid("grid.canny_low", "exceeds canny_high"));
        }

        let t = &self.template;
        if t.num_question_columns == 0 || t.questions_per_column == 0 {
            return Err(OmrError::invalid("template", "must hold at least one question"));
        }
        if t.choices_per_question == 0 || t.choices_per_question > u8::MAX as usize {
            return Err(OmrError::invalid("template.choices_per_question", "must be in 1..=255"));
        }

        if self.grading.failing_threshold < 0.0 || self.grading.failing_threshold > 100.0 {
            return Err(OmrError::invalid("grading.failing_threshold", "must be within [0, 100]"));
        }
        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f32) -> Result<(), OmrError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(OmrError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}
