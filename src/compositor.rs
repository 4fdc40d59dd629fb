//! Core adaptive compositing engine.

use std::path::Path;

use image::imageops;
use image::RgbaImage;

use crate::assets::WatermarkPair;
use crate::error::Result;
use crate::luminance::{self, Luminance};
use crate::placement::{self, PlacementOptions};

/// The compositor holding the decoded watermark pair and placement options.
///
/// Create once with [`Compositor::load()`] and reuse for every canvas of a
/// run; assets and options stay immutable for its whole lifetime, so one
/// instance can be shared freely across images and video frames.
pub struct Compositor {
    assets: WatermarkPair,
    options: PlacementOptions,
}

impl Compositor {
    /// Decode both watermark variants and fix the placement options.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AssetLoad`] if either variant cannot be
    /// decoded; nothing can be stamped without the pair.
    pub fn load(light_path: &Path, dark_path: &Path, options: PlacementOptions) -> Result<Self> {
        Ok(Self {
            assets: WatermarkPair::load(light_path, dark_path)?,
            options,
        })
    }

    /// Assemble a compositor from an already-loaded pair.
    #[must_use]
    pub fn new(assets: WatermarkPair, options: PlacementOptions) -> Self {
        Self { assets, options }
    }

    /// The placement options fixed for this run.
    #[must_use]
    pub fn options(&self) -> &PlacementOptions {
        &self.options
    }

    /// The watermark pair fixed for this run.
    #[must_use]
    pub fn assets(&self) -> &WatermarkPair {
        &self.assets
    }

    /// Watermark one canvas in place and report how it was classified.
    ///
    /// The canvas is classified by mean luminance, the contrasting variant
    /// is fitted against the shorter canvas dimension and pasted at the
    /// anchored position. A mark reaching past the canvas edge is clipped;
    /// a degenerate (zero-size) fit leaves the canvas untouched.
    pub fn stamp(&self, canvas: &mut RgbaImage) -> Luminance {
        let background = luminance::classify(canvas);
        let variant = self.assets.variant_for(background);

        let fit = placement::compute(
            canvas.width(),
            canvas.height(),
            variant.width(),
            variant.height(),
            &self.options,
        );
        if fit.width == 0 || fit.height == 0 {
            return background;
        }

        let resized = variant.resize_to(fit.width, fit.height);
        if variant.has_alpha() {
            imageops::overlay(canvas, &resized, fit.x, fit.y);
        } else {
            imageops::replace(canvas, &resized, fit.x, fit.y);
        }

        background
    }
}
