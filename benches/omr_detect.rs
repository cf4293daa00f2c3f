use criterion::{Criterion, black_box, criterion_group, criterion_main};
use omr_grader::detector::bubble::BubbleDetector;
use omr_grader::detector::frame::FrameRectifier;
use omr_grader::detector::grid::GridSegmenter;
use omr_grader::models::CardImage;
use omr_grader::{OmrConfig, OmrPipeline};

mod common;

fn bench_rectify_sheet(c: &mut Criterion) {
    let photo = common::sheet_photo();
    let rectifier = FrameRectifier::default();
    c.bench_function("rectify_sheet_1600x1000", |b| {
        b.iter(|| rectifier.rectify(black_box(&photo)))
    });
}

fn bench_detect_bubbles(c: &mut Criterion) {
    let photo = common::sheet_photo();
    let rectified = FrameRectifier::default().rectify(&photo).image;
    let detector = BubbleDetector::default();
    c.bench_function("detect_bubbles_200", |b| {
        b.iter(|| {
            // Fresh card per iteration so the grayscale copy is not reused
            let card = CardImage::new(rectified.clone());
            let candidates = detector.detect(&card);
            detector.score_markings(&card, &candidates)
        })
    });
}

fn bench_segment_grid(c: &mut Criterion) {
    let photo = common::grid_photo();
    let segmenter = GridSegmenter::default();
    c.bench_function("segment_grid_1000x800", |b| {
        b.iter(|| segmenter.segment(black_box(&photo)))
    });
}

fn bench_process_grid_photo(c: &mut Criterion) {
    let photo = common::grid_photo();
    let mut config = OmrConfig::default();
    config.template.question_x_offset = 0.0;
    let Ok(pipeline) = OmrPipeline::new(config, None) else {
        return;
    };
    c.bench_function("process_grid_photo_4_cards", |b| {
        b.iter(|| pipeline.process_photo(black_box(&photo)))
    });
}

criterion_group!(
    benches,
    bench_rectify_sheet,
    bench_detect_bubbles,
    bench_segment_grid,
    bench_process_grid_photo
);
criterion_main!(benches);
