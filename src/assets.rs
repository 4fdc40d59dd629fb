//! Watermark asset loading.
//!
//! The light and dark variants are decoded once per run and held immutable
//! for its whole duration. Resized copies are produced per canvas (target
//! sizes differ between canvases) and always derive from the native pixels,
//! so repeated stamping never compounds resampling loss.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{Error, Result};
use crate::luminance::Luminance;

/// A decoded watermark variant.
///
/// Pixels are held as RGBA. `has_alpha` records whether the source file
/// actually carried an alpha channel: transparent marks are alpha-blended
/// onto the canvas, opaque ones pasted as a solid rectangle.
#[derive(Debug, Clone)]
pub struct WatermarkAsset {
    path: PathBuf,
    image: RgbaImage,
    has_alpha: bool,
}

impl WatermarkAsset {
    /// Decode a watermark image from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoad`] if the file cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|source| Error::AssetLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let has_alpha = decoded.color().has_alpha();
        Ok(Self {
            path: path.to_path_buf(),
            image: decoded.to_rgba8(),
            has_alpha,
        })
    }

    /// Native width of the source image in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Native height of the source image in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the source file carried an alpha channel.
    #[must_use]
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// File name of the source asset, used to skip it during batch walks.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    /// Produce a copy resized to the target dimensions.
    ///
    /// Resampling is Catmull-Rom and always starts from the native pixels.
    #[must_use]
    pub fn resize_to(&self, width: u32, height: u32) -> RgbaImage {
        imageops::resize(&self.image, width, height, FilterType::CatmullRom)
    }
}

/// The light/dark watermark pair for one run.
#[derive(Debug, Clone)]
pub struct WatermarkPair {
    /// Variant composited onto dark backgrounds.
    pub light: WatermarkAsset,
    /// Variant composited onto light backgrounds.
    pub dark: WatermarkAsset,
}

impl WatermarkPair {
    /// Load both variants, failing if either cannot be decoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoad`] naming the offending path.
    pub fn load(light_path: &Path, dark_path: &Path) -> Result<Self> {
        Ok(Self {
            light: WatermarkAsset::load(light_path)?,
            dark: WatermarkAsset::load(dark_path)?,
        })
    }

    /// The variant that contrasts with the given background classification.
    #[must_use]
    pub fn variant_for(&self, background: Luminance) -> &WatermarkAsset {
        match background {
            Luminance::Dark => &self.light,
            Luminance::Light => &self.dark,
        }
    }
}
