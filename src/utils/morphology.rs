//! Structuring-element morphology on binary images.
//!
//! Square kernels map to the `LInf` norm and the small cross-shaped
//! ellipse maps to `L1`, each with radius `size / 2`.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Kernel shape for a morphological operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// Square kernel with an odd side length
    Rect(u8),
    /// Diamond kernel approximating an ellipse of the given odd size
    Ellipse(u8),
}

impl Kernel {
    fn norm_and_radius(self, iterations: u8) -> (Norm, u8) {
        let (norm, size) = match self {
            Kernel::Rect(size) => (Norm::LInf, size),
            Kernel::Ellipse(size) => (Norm::L1, size),
        };
        (norm, (size / 2).saturating_mul(iterations.max(1)))
    }
}

/// Erosion followed by dilation, removing specks smaller than the kernel
pub fn open(binary: &GrayImage, kernel: Kernel) -> GrayImage {
    let (norm, k) = kernel.norm_and_radius(1);
    if k == 0 {
        return binary.clone();
    }
    morphology::open(binary, norm, k)
}

/// Dilation followed by erosion, repeated `iterations` times per step
pub fn close(binary: &GrayImage, kernel: Kernel, iterations: u8) -> GrayImage {
    let (norm, k) = kernel.norm_and_radius(iterations);
    if k == 0 {
        return binary.clone();
    }
    morphology::close(binary, norm, k)
}

/// Grow foreground by the kernel, `iterations` times
pub fn dilate(binary: &GrayImage, kernel: Kernel, iterations: u8) -> GrayImage {
    let (norm, k) = kernel.norm_and_radius(iterations);
    if k == 0 {
        return binary.clone();
    }
    morphology::dilate(binary, norm, k)
}
