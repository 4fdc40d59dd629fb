//! Error types for the adaptive-watermark crate.

use std::path::PathBuf;

/// Errors that can occur while loading watermark assets or running a pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A watermark asset file could not be read or decoded.
    ///
    /// Always fatal: without the light/dark pair no canvas can be stamped.
    #[error("failed to load watermark asset '{path}': {source}")]
    AssetLoad {
        /// Path of the asset that failed.
        path: PathBuf,
        /// Underlying decode error.
        source: image::ImageError,
    },

    /// A video could not be probed or its decoder could not be started.
    #[error("failed to open video '{path}': {reason}")]
    VideoOpen {
        /// Path of the offending video.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Frame data could not be read from the video decoder mid-stream.
    #[error("failed to decode video '{path}': {reason}")]
    VideoDecode {
        /// Path of the offending video.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// The video encoder failed; an incomplete output file may remain.
    #[error("failed to encode video for '{path}': {reason}")]
    VideoEncode {
        /// Path of the source video whose run failed.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
