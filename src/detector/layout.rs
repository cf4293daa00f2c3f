//! One-dimensional clustering of bubbles into columns, rows and questions.
//!
//! Columns chain: each bubble is compared to the last one accepted, so a
//! column can drift along a slightly rotated sheet. Rows anchor: each
//! bubble is compared to the first one in the row. Both comparisons are
//! strict (`<`) and measured between bounding-box top-left corners, so
//! bubbles of different sizes in one column still line up on their left
//! edge.

use crate::config::SheetTemplate;
use crate::models::{BubbleCandidate, Column, Question, Row};

/// Cluster by anchor x; each column is sorted top-to-bottom
pub fn group_columns(candidates: &[BubbleCandidate], threshold: f32) -> Vec<Column> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.bbox.x.cmp(&b.bbox.x));

    let mut columns: Vec<Column> = Vec::new();
    let mut current: Column = Vec::new();
    for candidate in sorted {
        let joins = current
            .last()
            .is_some_and(|last| (candidate.anchor().x - last.anchor().x).abs() < threshold);
        if !joins && !current.is_empty() {
            columns.push(std::mem::take(&mut current));
        }
        current.push(candidate);
    }
    if !current.is_empty() {
        columns.push(current);
    }

    for column in &mut columns {
        column.sort_by(|a, b| a.bbox.y.cmp(&b.bbox.y));
    }
    columns
}

/// Cluster by anchor y; each row is sorted left-to-right
pub fn group_rows(candidates: &[BubbleCandidate], threshold: f32) -> Vec<Row> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.bbox.y.cmp(&b.bbox.y));

    let mut rows: Vec<Row> = Vec::new();
    let mut current: Row = Vec::new();
    for candidate in sorted {
        let joins = current
            .first()
            .is_some_and(|first| (candidate.anchor().y - first.anchor().y).abs() < threshold);
        if !joins && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
        }
        current.push(candidate);
    }
    if !current.is_empty() {
        rows.push(current);
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.bbox.x.cmp(&b.bbox.x));
    }
    rows
}

/// Map clustered bubbles onto numbered questions.
///
/// Columns whose topmost bubble starts at or left of
/// `template.question_x_offset` belong to the ID area and are skipped. Of
/// the rest, the first `num_question_columns` are split into rows and
/// numbered `col * questions_per_column + row + 1`.
pub fn assign_questions(columns: &[Column], template: &SheetTemplate, row_threshold: f32) -> Vec<Question> {
    let question_columns = columns
        .iter()
        .filter(|col| {
            col.first()
                .is_some_and(|top| top.bbox.x as f32 > template.question_x_offset)
        })
        .take(template.num_question_columns);

    let mut questions = Vec::new();
    for (col_idx, column) in question_columns.enumerate() {
        for (row_idx, row) in group_rows(column, row_threshold).into_iter().enumerate() {
            questions.push(Question {
                id: (col_idx * template.questions_per_column + row_idx + 1) as u32,
                choices: row,
            });
        }
    }
    questions
}
