//! Composing context for one photograph.
//!
//! Per card the stages run strictly in sequence:
//! rectify -> detect -> cluster -> assign -> read marks -> name lookup.
//! Cards of one photo are independent and may run in parallel; results
//! always come back in grid order.

use std::collections::BTreeMap;

use image::RgbImage;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::OmrConfig;
use crate::detector::bubble::BubbleDetector;
use crate::detector::frame::{FrameRectifier, RectifyOutcome};
use crate::detector::grid::{CardRegion, GridSegmenter};
use crate::detector::layout::{assign_questions, group_columns};
use crate::error::OmrError;
use crate::grading::engine::BatchGrader;
use crate::models::{
    AnswerKey, BatchGradingResult, BoxRegion, CardImage, QuestionMarks, StudentResponse,
};
use crate::recognizer::{TextRecognizer, find_student_name};

/// Longest-to-shortest side ratio a card region may have
const MAX_CARD_ASPECT: u64 = 20;

/// Name given to cards that could not be processed
pub const FAILED_CARD_NAME: &str = "Error";

const FAILED_CARD: &str = "card processing failed";

/// Everything read from one card
#[derive(Debug, Clone)]
pub struct CardResult {
    /// Position in grid order
    pub index: usize,
    /// Name found by the recognizer
    pub name: Option<String>,
    /// Marks per numbered question
    pub marks: Vec<QuestionMarks>,
    /// Card rectangle in photo coordinates
    pub bbox: BoxRegion,
    /// Rectified card, or the crop when rectification fell back
    pub image: RgbImage,
    /// How the card was rectified
    pub outcome: RectifyOutcome,
    /// Why the card could not be processed
    pub error: Option<String>,
}

impl CardResult {
    fn failed(index: usize, bbox: BoxRegion, error: String) -> Self {
        Self {
            index,
            name: Some(FAILED_CARD_NAME.to_string()),
            marks: Vec::new(),
            bbox,
            image: RgbImage::new(0, 0),
            outcome: RectifyOutcome::Unaligned {
                reason: FAILED_CARD,
            },
            error: Some(error),
        }
    }

    /// Selected choices per question
    pub fn answers(&self) -> BTreeMap<u32, Vec<u8>> {
        self.marks
            .iter()
            .map(|m| (m.question, m.selected.clone()))
            .collect()
    }

    /// Darkness of every choice per question
    pub fn confidence(&self) -> BTreeMap<u32, Vec<f32>> {
        self.marks
            .iter()
            .map(|m| (m.question, m.scores.clone()))
            .collect()
    }

    /// Response to hand to the grader
    pub fn to_response(&self) -> StudentResponse {
        StudentResponse::new(self.name.clone(), self.answers())
    }

    /// True when the card was processed
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs every stage over photographs with one configuration
pub struct OmrPipeline {
    config: OmrConfig,
    rectifier: FrameRectifier,
    bubbles: BubbleDetector,
    segmenter: GridSegmenter,
    grader: BatchGrader,
    recognizer: Option<Box<dyn TextRecognizer>>,
}

impl OmrPipeline {
    /// Validate `config` and build the stages.
    ///
    /// Without a recognizer every card gets the positional name.
    pub fn new(
        config: OmrConfig,
        recognizer: Option<Box<dyn TextRecognizer>>,
    ) -> Result<Self, OmrError> {
        config.validate()?;
        Ok(Self {
            rectifier: FrameRectifier::new(config.rectifier.clone()),
            bubbles: BubbleDetector::new(config.bubble.clone()),
            segmenter: GridSegmenter::new(config.grid.clone()),
            grader: BatchGrader::new(config.grading.clone()),
            recognizer,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &OmrConfig {
        &self.config
    }

    /// Read one card image
    pub fn process_card(&self, index: usize, image: &RgbImage) -> Result<CardResult, OmrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OmrError::CardProcessing {
                index,
                reason: "empty image".to_string(),
                hint: "check that the card was cropped from the photo",
            });
        }
        let (short, long) = (width.min(height), width.max(height));
        if short < self.config.bubble.min_bubble_size {
            return Err(OmrError::CardProcessing {
                index,
                reason: format!("{width}x{height} region cannot hold a bubble"),
                hint: "check that the card was cropped from the photo",
            });
        }
        if long as u64 > short as u64 * MAX_CARD_ASPECT {
            return Err(OmrError::CardProcessing {
                index,
                reason: format!("{width}x{height} region is too elongated for a card"),
                hint: "photograph the cards flat and away from the table edge",
            });
        }

        let rectified = self.rectifier.rectify(image);
        let outcome = rectified.outcome;
        let card = CardImage::new(rectified.image);

        let candidates = self.bubbles.detect(&card);
        if candidates.is_empty() {
            warn!("card {index}: no bubbles detected");
        }
        let columns = group_columns(&candidates, self.config.template.column_threshold);
        let questions = assign_questions(
            &columns,
            &self.config.template,
            self.config.bubble.row_threshold,
        );
        let marks = self.bubbles.read_questions(&card, &questions);

        let name = self.recognizer.as_ref().and_then(|r| {
            let spans = r.extract_text(card.rgb());
            find_student_name(&spans, &self.config.template)
        });
        debug!(
            "card {index}: {} bubbles, {} columns, {} questions, name {:?}",
            candidates.len(),
            columns.len(),
            marks.len(),
            name
        );

        Ok(CardResult {
            index,
            name,
            marks,
            bbox: BoxRegion::new(0, 0, width, height),
            image: card.into_rgb(),
            outcome,
            error: None,
        })
    }

    fn process_region(&self, index: usize, region: &CardRegion) -> CardResult {
        match self.process_card(index, &region.image) {
            Ok(mut result) => {
                result.bbox = region.bbox;
                result
            }
            Err(err) => {
                warn!("{err}");
                CardResult::failed(index, region.bbox, err.to_string())
            }
        }
    }

    /// Card images of a photo in reading order; the whole photo when no
    /// grid is expected or none is found
    pub fn split_cards(&self, image: &RgbImage) -> Vec<CardRegion> {
        let mut regions = if self.config.expect_grid {
            self.segmenter.segment(image)
        } else {
            Vec::new()
        };
        if regions.is_empty() {
            if self.config.expect_grid {
                info!("no grid found, processing the whole photo as one card");
            }
            regions.push(CardRegion {
                bbox: BoxRegion::new(0, 0, image.width(), image.height()),
                image: image.clone(),
            });
        }
        regions
    }

    /// Read every card of a photo; failed cards become placeholders
    pub fn process_photo(&self, image: &RgbImage) -> Vec<CardResult> {
        let regions = self.split_cards(image);
        let results: Vec<CardResult> = if self.config.parallel && regions.len() > 1 {
            debug!("processing {} cards in parallel", regions.len());
            regions
                .par_iter()
                .enumerate()
                .map(|(i, r)| self.process_region(i, r))
                .collect()
        } else {
            regions
                .iter()
                .enumerate()
                .map(|(i, r)| self.process_region(i, r))
                .collect()
        };

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        info!("processed {} cards, {failed} failed", results.len());
        results
    }

    /// Grade already-read cards
    pub fn grade_cards(&self, cards: &[CardResult], key: &AnswerKey) -> BatchGradingResult {
        let responses: Vec<StudentResponse> = cards.iter().map(CardResult::to_response).collect();
        self.grader.grade_batch(key, &responses)
    }

    /// Read and grade every card of a photo
    pub fn grade_photo(&self, image: &RgbImage, key: &AnswerKey) -> BatchGradingResult {
        if key.is_empty() {
            return self.grader.grade_batch(key, &[]);
        }
        let cards = self.process_photo(image);
        self.grade_cards(&cards, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::TextSpan;
    use image::Rgb;

    struct NameTag(&'static str);

    impl TextRecognizer for NameTag {
        fn extract_text(&self, _image: &RgbImage) -> Vec<TextSpan> {
            vec![TextSpan::new("이름:"), TextSpan::new(self.0)]
        }
    }

    fn single_card_config() -> OmrConfig {
        OmrConfig {
            expect_grid: false,
            ..OmrConfig::default()
        }
    }

    #[test]
    fn test_empty_card_is_an_error() {
        let pipeline = OmrPipeline::new(OmrConfig::default(), None).unwrap();
        let err = pipeline.process_card(3, &RgbImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, OmrError::CardProcessing { index: 3, .. }));
    }

    #[test]
    fn test_degenerate_crops_are_errors() {
        let pipeline = OmrPipeline::new(OmrConfig::default(), None).unwrap();
        let sliver = RgbImage::from_pixel(400, 3, Rgb([240, 240, 240]));
        let err = pipeline.process_card(0, &sliver).unwrap_err();
        assert!(matches!(err, OmrError::CardProcessing { index: 0, .. }));

        let strip = RgbImage::from_pixel(20_000, 10, Rgb([240, 240, 240]));
        let err = pipeline.process_card(1, &strip).unwrap_err();
        assert!(matches!(err, OmrError::CardProcessing { index: 1, .. }));
    }

    #[test]
    fn test_degenerate_photo_yields_placeholder() {
        let pipeline = OmrPipeline::new(single_card_config(), None).unwrap();
        let strip = RgbImage::from_pixel(20_000, 10, Rgb([240, 240, 240]));
        let cards = pipeline.process_photo(&strip);
        assert_eq!(cards.len(), 1);
        assert!(!cards[0].is_ok());
        assert_eq!(cards[0].name.as_deref(), Some(FAILED_CARD_NAME));
        assert!(cards[0].error.as_deref().is_some_and(|e| e.contains("elongated")));
    }

    #[test]
    fn test_failed_region_becomes_placeholder() {
        let pipeline = OmrPipeline::new(OmrConfig::default(), None).unwrap();
        let region = CardRegion {
            bbox: BoxRegion::new(5, 5, 0, 0),
            image: RgbImage::new(0, 0),
        };
        let result = pipeline.process_region(1, &region);
        assert_eq!(result.name.as_deref(), Some(FAILED_CARD_NAME));
        assert!(result.answers().is_empty());
        assert!(!result.is_ok());
        assert_eq!(result.bbox, region.bbox);
    }

    #[test]
    fn test_blank_photo_is_one_card() {
        let pipeline = OmrPipeline::new(OmrConfig::default(), None).unwrap();
        let photo = RgbImage::from_pixel(200, 150, Rgb([230, 230, 230]));
        let cards = pipeline.process_photo(&photo);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].is_ok());
        assert!(cards[0].marks.is_empty());
        assert_eq!(cards[0].bbox, BoxRegion::new(0, 0, 200, 150));
    }

    #[test]
    fn test_recognizer_supplies_name() {
        let pipeline =
            OmrPipeline::new(single_card_config(), Some(Box::new(NameTag("김민수")))).unwrap();
        let photo = RgbImage::from_pixel(120, 90, Rgb([240, 240, 240]));
        let cards = pipeline.process_photo(&photo);
        assert_eq!(cards[0].name.as_deref(), Some("김민수"));
        assert_eq!(cards[0].to_response().name.as_deref(), Some("김민수"));
    }

    #[test]
    fn test_empty_key_skips_processing() {
        let pipeline = OmrPipeline::new(OmrConfig::default(), None).unwrap();
        let photo = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        let result = pipeline.grade_photo(&photo, &AnswerKey::default());
        assert_eq!(result.error.as_deref(), Some("No answer key provided"));
        assert!(result.students.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = OmrConfig::default();
        config.bubble.marking_threshold = 1.5;
        assert!(OmrPipeline::new(config, None).is_err());
    }
}
