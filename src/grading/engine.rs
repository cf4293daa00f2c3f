use log::{info, warn};

use crate::config::GradingConfig;
use crate::grading::statistics::aggregate;
use crate::models::{
    AnswerKey, AnswerStatus, BatchGradingResult, GradingDetail, StudentResponse, StudentResult,
};

/// Classify one question: correct only for a single matching selection
pub fn classify(selected: &[u8], correct_answer: u8) -> AnswerStatus {
    match selected {
        [] => AnswerStatus::Unanswered,
        [only] if *only == correct_answer => AnswerStatus::Correct,
        _ => AnswerStatus::Wrong,
    }
}

/// Grades student responses against one answer key
#[derive(Debug, Clone, Default)]
pub struct BatchGrader {
    config: GradingConfig,
}

impl BatchGrader {
    /// Create a grader
    pub fn new(config: GradingConfig) -> Self {
        Self { config }
    }

    /// Grader awarding `points` per correct question
    pub fn with_points(points: u32) -> Self {
        Self::new(GradingConfig {
            points_per_question: points,
            ..GradingConfig::default()
        })
    }

    /// Grade one student; `index` is the card position
    pub fn grade_student(&self, index: usize, response: &StudentResponse, key: &AnswerKey) -> StudentResult {
        let total_questions = key.len();
        let details: Vec<GradingDetail> = (1..=total_questions as u32)
            .map(|question| {
                let correct_answer = key.get(question);
                let selected = response.selected(question).to_vec();
                let status = classify(&selected, correct_answer);
                GradingDetail {
                    question,
                    correct_answer,
                    selected,
                    status,
                }
            })
            .collect();

        let correct_count = details.iter().filter(|d| d.is_correct()).count();
        let score = if total_questions > 0 {
            correct_count as f64 / total_questions as f64 * 100.0
        } else {
            0.0
        };

        StudentResult {
            name: response
                .name
                .clone()
                .unwrap_or_else(|| format!("Student {}", index + 1)),
            index,
            total_questions,
            correct_count,
            score,
            points: u32::try_from(correct_count)
                .unwrap_or(u32::MAX)
                .saturating_mul(self.config.points_per_question),
            answers: response.answers.clone(),
            correct_answers: key.to_map(),
            details,
        }
    }

    /// Grade every response in order
    pub fn grade(&self, key: &AnswerKey, responses: &[StudentResponse]) -> Vec<StudentResult> {
        responses
            .iter()
            .enumerate()
            .map(|(i, r)| self.grade_student(i, r, key))
            .collect()
    }

    /// Grade a batch and aggregate its statistics.
    ///
    /// An empty key yields [`BatchGradingResult::empty`] instead of an error.
    pub fn grade_batch(&self, key: &AnswerKey, responses: &[StudentResponse]) -> BatchGradingResult {
        if key.is_empty() {
            warn!("grading skipped: empty answer key");
            return BatchGradingResult::empty(crate::OmrError::EmptyAnswerKey.to_string());
        }

        let students = self.grade(key, responses);
        let statistics = aggregate(&students, self.config.failing_threshold);
        info!(
            "graded {} students on {} questions, mean {:.2}%",
            students.len(),
            key.len(),
            statistics.average_score
        );

        BatchGradingResult {
            answer_key: key.as_slice().to_vec(),
            total_questions: key.len(),
            students,
            statistics,
            error: None,
        }
    }
}
