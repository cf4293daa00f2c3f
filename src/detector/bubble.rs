//! Bubble candidates and fill scoring.
//!
//! Ink is isolated with an inverted global threshold, thin printed lines
//! are erased by a small opening, and every traced border (outer and hole)
//! that looks like a bubble becomes a candidate. A ring-shaped bubble
//! yields two concentric borders, which deduplication folds into one.

use log::debug;

use crate::config::BubbleConfig;
use crate::detector::contour::{RetrievalMode, find_outlines};
use crate::models::{BoxRegion, BubbleCandidate, CardImage, MarkingScore, Question, QuestionMarks, Row};
use crate::utils::binarization::{ThresholdMode, threshold_binarize};
use crate::utils::morphology::{self, Kernel};

/// Finds and scores answer bubbles on one card
#[derive(Debug, Clone, Default)]
pub struct BubbleDetector {
    config: BubbleConfig,
}

impl BubbleDetector {
    /// Create a detector
    pub fn new(config: BubbleConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &BubbleConfig {
        &self.config
    }

    /// Bubble candidates, deduplicated and sorted by x
    pub fn detect(&self, card: &CardImage) -> Vec<BubbleCandidate> {
        let cfg = &self.config;
        let ink = threshold_binarize(card.gray(), cfg.binary_threshold, ThresholdMode::Inverted);
        let kernel = Kernel::Ellipse(cfg.open_radius.saturating_mul(2).saturating_add(1));
        let cleaned = morphology::open(&ink, kernel);

        let outlines = find_outlines(&cleaned, RetrievalMode::All);
        let total = outlines.len();
        let candidates: Vec<BubbleCandidate> = outlines
            .into_iter()
            .filter_map(|outline| {
                let bbox = outline.bbox()?;
                if !self.accepts_shape(&bbox) || outline.area() <= cfg.min_contour_area {
                    return None;
                }
                Some(BubbleCandidate::from_outline(bbox, outline.to_points()))
            })
            .collect();

        let kept = candidates.len();
        let deduped = dedup_candidates(candidates, cfg.dedup_distance);
        debug!(
            "bubbles: {total} outlines, {kept} shaped, {} after dedup",
            deduped.len()
        );
        deduped
    }

    fn accepts_shape(&self, bbox: &BoxRegion) -> bool {
        let cfg = &self.config;
        let size_ok = |v: u32| (cfg.min_bubble_size..=cfg.max_bubble_size).contains(&v);
        let aspect = bbox.aspect_ratio();
        size_ok(bbox.width)
            && size_ok(bbox.height)
            && aspect >= cfg.min_aspect_ratio
            && aspect <= cfg.max_aspect_ratio
    }

    /// Darkness of each candidate's bounding box
    pub fn score_markings(&self, card: &CardImage, candidates: &[BubbleCandidate]) -> Vec<MarkingScore> {
        let gray = card.gray();
        candidates
            .iter()
            .map(|c| {
                let roi = c.bbox.clamped(gray.width(), gray.height());
                let score = if roi.area() == 0 {
                    0.0
                } else {
                    let mut sum = 0u64;
                    for y in roi.y..roi.bottom() {
                        for x in roi.x..roi.right() {
                            sum += gray.get_pixel(x, y)[0] as u64;
                        }
                    }
                    let mean = sum as f64 / roi.area() as f64;
                    ((255.0 - mean) / 255.0) as f32
                };
                MarkingScore {
                    bbox: c.bbox,
                    score,
                    marked: score > self.config.marking_threshold,
                }
            })
            .collect()
    }

    /// Selected choices and per-choice darkness for each question
    pub fn read_questions(&self, card: &CardImage, questions: &[Question]) -> Vec<QuestionMarks> {
        questions
            .iter()
            .map(|q| {
                let scores = self.score_markings(card, &q.choices);
                let selected = scores
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.marked)
                    .map(|(i, _)| (i + 1).min(u8::MAX as usize) as u8)
                    .collect();
                QuestionMarks {
                    question: q.id,
                    selected,
                    scores: scores.iter().map(|s| s.score).collect(),
                }
            })
            .collect()
    }

    /// Read a single-column sheet where every row is one question
    pub fn grade_rows(&self, card: &CardImage, rows: &[Row]) -> Vec<QuestionMarks> {
        let questions: Vec<Question> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| Question {
                id: i as u32 + 1,
                choices: row.clone(),
            })
            .collect();
        self.read_questions(card, &questions)
    }
}

/// Drop candidates whose anchor is closer than `distance` to an
/// already-kept one. Candidates are visited in x order so the leftmost of
/// a duplicate pair survives.
pub fn dedup_candidates(mut candidates: Vec<BubbleCandidate>, distance: f32) -> Vec<BubbleCandidate> {
    candidates.sort_by_key(|c| c.bbox.x);
    let mut kept: Vec<BubbleCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let duplicate = kept
            .iter()
            .any(|k| k.anchor().distance(&candidate.anchor()) < distance);
        if !duplicate {
            kept.push(candidate);
        }
    }
    kept
}
