//! End-to-end runs over synthetic answer cards.

mod common;

use approx::assert_relative_eq;
use common::{GRID_ORIGINS, grid_photo, single_card_photo};
use omr_grader::config::SheetTemplate;
use omr_grader::detector::bubble::BubbleDetector;
use omr_grader::detector::frame::FrameRectifier;
use omr_grader::detector::layout::group_columns;
use omr_grader::models::CardImage;
use omr_grader::{AnswerKey, AnswerStatus, OmrConfig, OmrPipeline};

fn test_config(blocks: usize, rows: usize) -> OmrConfig {
    OmrConfig {
        template: SheetTemplate {
            question_x_offset: 0.0,
            num_question_columns: blocks,
            questions_per_column: rows,
            ..SheetTemplate::default()
        },
        ..OmrConfig::default()
    }
}

#[test]
fn single_card_reads_every_question() {
    let marks = [1, 2, 3, 4, 5, 0, 2, 2, 1, 3];
    let photo = single_card_photo(2, 5, &marks);
    let pipeline = OmrPipeline::new(test_config(2, 5), None).unwrap();

    let cards = pipeline.process_photo(&photo);
    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert!(card.is_ok());

    let answers = card.answers();
    assert_eq!(answers.len(), 10);
    for (i, &expected) in marks.iter().enumerate() {
        let selected = &answers[&(i as u32 + 1)];
        if expected == 0 {
            assert!(selected.is_empty(), "question {} should be blank", i + 1);
        } else {
            assert_eq!(selected, &vec![expected], "question {}", i + 1);
        }
    }
    assert!(card.confidence().values().all(|scores| scores.len() == 5));
}

#[test]
fn single_card_without_grid_matches_grid_fallback() {
    let marks = [3, 3, 3, 3, 3];
    let photo = single_card_photo(1, 5, &marks);

    let mut config = test_config(1, 5);
    config.expect_grid = false;
    let direct = OmrPipeline::new(config, None).unwrap().process_photo(&photo);
    let fallback = OmrPipeline::new(test_config(1, 5), None).unwrap().process_photo(&photo);

    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].answers(), fallback[0].answers());
}

#[test]
fn rectified_card_drops_the_table() {
    let photo = single_card_photo(1, 2, &[1, 2]);
    let rectification = FrameRectifier::default().rectify(&photo);
    assert!(rectification.is_rectified());

    let (w, h) = rectification.image.dimensions();
    let (cw, ch) = common::card_size(1, 2);
    assert!((w as i32 - cw as i32).abs() <= 6, "width {w} vs {cw}");
    assert!((h as i32 - ch as i32).abs() <= 6, "height {h} vs {ch}");
}

#[test]
fn bubbles_cluster_into_blocks() {
    let photo = single_card_photo(2, 3, &[]);
    let card = CardImage::new(FrameRectifier::default().rectify(&photo).image);
    let candidates = BubbleDetector::default().detect(&card);
    assert_eq!(candidates.len(), 2 * 3 * 5);

    let columns = group_columns(&candidates, SheetTemplate::default().column_threshold);
    assert_eq!(columns.len(), 2);
    assert!(columns.iter().all(|c| c.len() == 15));
}

#[test]
fn grade_photo_scores_single_card() {
    let marks = [1, 2, 3, 4, 5];
    let photo = single_card_photo(1, 5, &marks);
    let pipeline = OmrPipeline::new(test_config(1, 5), None).unwrap();

    let result = pipeline.grade_photo(&photo, &AnswerKey::new(vec![1, 2, 3, 1, 1]));
    assert!(result.error.is_none());
    assert_eq!(result.students.len(), 1);

    let student = &result.students[0];
    assert_eq!(student.name, "Student 1");
    assert_eq!(student.correct_count, 3);
    assert_relative_eq!(student.score, 60.0);
    assert_eq!(student.status(4), Some(AnswerStatus::Wrong));
    assert_eq!(result.statistics.failing_scores, 0);
}

#[test]
fn grid_photo_is_read_in_row_major_order() {
    let answers = [[1, 1, 1], [2, 2, 2], [3, 3, 3], [4, 4, 4]];
    let photo = grid_photo(&answers);
    let pipeline = OmrPipeline::new(test_config(1, 3), None).unwrap();

    let cards = pipeline.process_photo(&photo);
    assert_eq!(cards.len(), 4);
    for (i, card) in cards.iter().enumerate() {
        assert_eq!(card.index, i);
        let (x, y) = GRID_ORIGINS[i];
        let (w, h) = common::card_size(1, 3);
        let cx = (card.bbox.x + card.bbox.width / 2) as i32;
        let cy = (card.bbox.y + card.bbox.height / 2) as i32;
        assert!((cx - (x + w as i32 / 2)).abs() <= 15, "card {i} center x {cx}");
        assert!((cy - (y + h as i32 / 2)).abs() <= 15, "card {i} center y {cy}");

        let read: Vec<Vec<u8>> = card.answers().into_values().collect();
        let expected = answers[i].map(|a| vec![a]);
        assert_eq!(read, expected.to_vec(), "card {i}");
    }
}

#[test]
fn grid_batch_statistics() {
    let answers = [[1, 2, 3], [1, 2, 4], [5, 5, 5], [1, 2, 3]];
    let photo = grid_photo(&answers);
    let pipeline = OmrPipeline::new(test_config(1, 3), None).unwrap();

    let result = pipeline.grade_photo(&photo, &AnswerKey::new(vec![1, 2, 3]));
    let stats = &result.statistics;
    assert_eq!(stats.student_count, 4);
    assert_eq!(stats.perfect_scores, 2);
    assert_eq!(stats.highest_score, 100.0);
    assert_eq!(stats.lowest_score, 0.0);
    // (100 + 66.67 + 0 + 100) / 4
    assert_relative_eq!(stats.average_score, 66.67);
    assert_relative_eq!(stats.question_accuracy[2].accuracy, 50.0);

    let names: Vec<&str> = result.students.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Student 1", "Student 2", "Student 3", "Student 4"]);
}

#[test]
fn sequential_and_parallel_agree() {
    let photo = grid_photo(&[[2, 0, 4], [1, 3, 5], [0, 0, 0], [5, 4, 3]]);
    let parallel = OmrPipeline::new(test_config(1, 3), None).unwrap();
    let mut config = test_config(1, 3);
    config.parallel = false;
    let sequential = OmrPipeline::new(config, None).unwrap();

    let a: Vec<_> = parallel.process_photo(&photo).iter().map(|c| c.answers()).collect();
    let b: Vec<_> = sequential.process_photo(&photo).iter().map(|c| c.answers()).collect();
    assert_eq!(a, b);
}
