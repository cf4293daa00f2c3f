use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};
use omr_grader::utils::grayscale::{rgb_to_gray, rgb_to_grayscale};

fn bench_rgb_to_grayscale_small(c: &mut Criterion) {
    let image = vec![128u8; 100 * 100 * 3];
    c.bench_function("rgb_to_grayscale_100x100", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&image), black_box(100), black_box(100)))
    });
}

fn bench_rgb_to_grayscale_medium(c: &mut Criterion) {
    let image = vec![128u8; 640 * 480 * 3];
    c.bench_function("rgb_to_grayscale_640x480", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&image), black_box(640), black_box(480)))
    });
}

fn bench_rgb_to_gray_large(c: &mut Criterion) {
    let image = RgbImage::from_pixel(1920, 1080, Rgb([200, 120, 40]));
    c.bench_function("rgb_to_gray_1920x1080", |b| {
        b.iter(|| rgb_to_gray(black_box(&image)))
    });
}

fn bench_rgb_to_gray_photo(c: &mut Criterion) {
    let image = RgbImage::from_pixel(4032, 3024, Rgb([90, 160, 220]));
    c.bench_function("rgb_to_gray_4032x3024", |b| {
        b.iter(|| rgb_to_gray(black_box(&image)))
    });
}

criterion_group!(
    benches,
    bench_rgb_to_grayscale_small,
    bench_rgb_to_grayscale_medium,
    bench_rgb_to_gray_large,
    bench_rgb_to_gray_photo
);
criterion_main!(benches);
