/// Answer keys, responses and grading results
pub mod grading;
/// 2D points
pub mod point;
/// Axis-aligned rectangles
pub mod region;
/// Sheet geometry: corners, bubbles, questions, card images
pub mod sheet;

pub use grading::{
    AnswerKey, AnswerStatus, BatchGradingResult, BatchStatistics, GradingDetail,
    QuestionAccuracy, StudentResponse, StudentResult,
};
pub use point::Point;
pub use region::BoxRegion;
pub use sheet::{
    BubbleCandidate, CardImage, Column, CornerQuad, MarkingScore, Question, QuestionMarks, Row,
};
