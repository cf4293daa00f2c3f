use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma};
use omr_grader::utils::binarization::{ThresholdMode, otsu_binarize, threshold_binarize};

fn gradient(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| Luma([((x + y) % 256) as u8]))
}

fn bench_otsu_binarize_small(c: &mut Criterion) {
    let gray = gradient(100, 100);
    c.bench_function("otsu_binarize_100x100", |b| {
        b.iter(|| otsu_binarize(black_box(&gray), ThresholdMode::Binary))
    });
}

fn bench_otsu_binarize_medium(c: &mut Criterion) {
    let gray = gradient(640, 480);
    c.bench_function("otsu_binarize_640x480", |b| {
        b.iter(|| otsu_binarize(black_box(&gray), ThresholdMode::Binary))
    });
}

fn bench_otsu_binarize_large(c: &mut Criterion) {
    let gray = gradient(1920, 1080);
    c.bench_function("otsu_binarize_1920x1080", |b| {
        b.iter(|| otsu_binarize(black_box(&gray), ThresholdMode::Binary))
    });
}

fn bench_threshold_binarize_medium(c: &mut Criterion) {
    let gray = gradient(640, 480);
    c.bench_function("threshold_binarize_inverted_640x480", |b| {
        b.iter(|| threshold_binarize(black_box(&gray), black_box(200), ThresholdMode::Inverted))
    });
}

criterion_group!(
    benches,
    bench_otsu_binarize_small,
    bench_otsu_binarize_medium,
    bench_otsu_binarize_large,
    bench_threshold_binarize_medium
);
criterion_main!(benches);
