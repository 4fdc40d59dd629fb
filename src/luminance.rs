//! Background luminance classification.
//!
//! Each canvas is reduced to a mean luma value and bucketed as dark or
//! light; the compositor then picks the watermark variant that contrasts
//! with the background (light mark on dark canvas and vice versa).

use image::RgbaImage;

/// Mean luma below this counts as a dark background (0-255 scale).
const DARK_THRESHOLD: f64 = 128.0;

/// Classification of a canvas by its mean luminance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Luminance {
    /// Mean luma below 128; takes the light watermark variant.
    Dark,
    /// Mean luma of 128 or more; takes the dark watermark variant.
    Light,
}

/// Mean luma of all pixels on the 0-255 scale.
///
/// Per-pixel luma is the BT.601 weighting `(299*R + 587*G + 114*B) / 1000`,
/// accumulated in integer space; a uniform canvas reports exactly its own
/// gray value. Alpha is ignored. An empty image reports 255 so the
/// classifier has a stable answer for degenerate input.
#[must_use]
pub fn mean_luma(image: &RgbaImage) -> f64 {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return 255.0;
    }

    let mut sum: u64 = 0;
    for px in image.pixels() {
        sum += 299 * u64::from(px[0]) + 587 * u64::from(px[1]) + 114 * u64::from(px[2]);
    }

    #[allow(clippy::cast_precision_loss)]
    let weighted = sum as f64;
    #[allow(clippy::cast_precision_loss)]
    let scale = (pixel_count * 1000) as f64;
    weighted / scale
}

/// Classify a canvas as dark or light by its mean luminance.
///
/// The boundary resolves upward: a mean of exactly 128 is [`Luminance::Light`].
#[must_use]
pub fn classify(image: &RgbaImage) -> Luminance {
    if mean_luma(image) < DARK_THRESHOLD {
        Luminance::Dark
    } else {
        Luminance::Light
    }
}
