use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Correct choice per question, question `i + 1` at position `i`.
///
/// Choices are 1-based. A stored `0` marks a question the key extractor
/// could not read; no selection can ever match it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerKey {
    answers: Vec<u8>,
}

impl AnswerKey {
    /// Build a key from choices in question order
    pub fn new(answers: Vec<u8>) -> Self {
        Self { answers }
    }

    /// Correct choice for a 1-based question id, `0` when absent
    pub fn get(&self, question: u32) -> u8 {
        if question == 0 {
            return 0;
        }
        self.answers
            .get(question as usize - 1)
            .copied()
            .unwrap_or(0)
    }

    /// Number of questions
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// True when the key has no questions
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Choices in question order
    pub fn as_slice(&self) -> &[u8] {
        &self.answers
    }

    /// `question id -> correct choice` for every question
    pub fn to_map(&self) -> BTreeMap<u32, u8> {
        self.answers
            .iter()
            .enumerate()
            .map(|(i, &a)| (i as u32 + 1, a))
            .collect()
    }
}

impl From<Vec<u8>> for AnswerKey {
    fn from(answers: Vec<u8>) -> Self {
        Self::new(answers)
    }
}

/// One student's marks: question id to the selected 1-based choices
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudentResponse {
    /// Display name, when known
    pub name: Option<String>,
    /// Selected choices per question; missing means nothing selected
    pub answers: BTreeMap<u32, Vec<u8>>,
}

impl StudentResponse {
    /// Build a response from a name and answers
    pub fn new(name: Option<String>, answers: BTreeMap<u32, Vec<u8>>) -> Self {
        Self { name, answers }
    }

    /// Selected choices for a question
    pub fn selected(&self, question: u32) -> &[u8] {
        self.answers
            .get(&question)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Classification of one answered question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Exactly one choice selected and it matches the key
    Correct,
    /// One wrong choice, or several choices
    Wrong,
    /// Nothing selected
    Unanswered,
}

impl AnswerStatus {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Correct => "correct",
            AnswerStatus::Wrong => "wrong",
            AnswerStatus::Unanswered => "unanswered",
        }
    }
}

/// Grading outcome for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingDetail {
    /// 1-based question id
    pub question: u32,
    /// Choice from the key (`0` if the key had none)
    pub correct_answer: u8,
    /// Choices the student marked
    pub selected: Vec<u8>,
    /// Classification
    pub status: AnswerStatus,
}

impl GradingDetail {
    /// Whether the question was answered correctly
    pub fn is_correct(&self) -> bool {
        self.status == AnswerStatus::Correct
    }
}

/// Grading outcome for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResult {
    /// Display name
    pub name: String,
    /// Position of the card in grid order
    pub index: usize,
    /// Number of questions in the key
    pub total_questions: usize,
    /// Questions answered correctly
    pub correct_count: usize,
    /// Percentage score, `0.0` for an empty key
    pub score: f64,
    /// `correct_count * points_per_question`, saturating at `u32::MAX`
    pub points: u32,
    /// Raw selections as read from the card
    pub answers: BTreeMap<u32, Vec<u8>>,
    /// The key as a map
    pub correct_answers: BTreeMap<u32, u8>,
    /// Per-question outcome for every id `1..=total_questions`
    pub details: Vec<GradingDetail>,
}

impl StudentResult {
    /// `"correct/total"`
    pub fn score_display(&self) -> String {
        format!("{}/{}", self.correct_count, self.total_questions)
    }

    /// Percentage with one decimal, e.g. `"40.0%"`
    pub fn percentage_display(&self) -> String {
        format!("{:.1}%", self.score)
    }

    /// Status of a question, if it is in the key
    pub fn status(&self, question: u32) -> Option<AnswerStatus> {
        self.details
            .iter()
            .find(|d| d.question == question)
            .map(|d| d.status)
    }
}

/// Share of students answering one question correctly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAccuracy {
    /// 1-based question id
    pub question: u32,
    /// Students who got it right
    pub correct_count: usize,
    /// Students graded
    pub total_students: usize,
    /// `correct_count / total_students * 100`
    pub accuracy: f64,
}

/// Descriptive statistics over one batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchStatistics {
    /// Students graded
    pub student_count: usize,
    /// Mean percentage score
    pub average_score: f64,
    /// Mean correct count
    pub average_correct: f64,
    /// Highest percentage score
    pub highest_score: f64,
    /// Lowest percentage score
    pub lowest_score: f64,
    /// Population standard deviation of percentage scores
    pub std_deviation: f64,
    /// Accuracy for every question id
    pub question_accuracy: Vec<QuestionAccuracy>,
    /// Students at 100%
    pub perfect_scores: usize,
    /// Students below the failing threshold
    pub failing_scores: usize,
}

/// Everything produced by grading one batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchGradingResult {
    /// Key the batch was graded against
    pub answer_key: Vec<u8>,
    /// Number of questions in the key
    pub total_questions: usize,
    /// Per-student results in card order
    pub students: Vec<StudentResult>,
    /// Aggregate statistics
    pub statistics: BatchStatistics,
    /// Why the batch could not be graded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchGradingResult {
    /// Empty result carrying a reason
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
