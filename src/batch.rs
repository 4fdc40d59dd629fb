//! Batch watermarking over a directory tree of still images.
//!
//! The tree is walked recursively in deterministic name order. Each
//! supported image is stamped and written back as PNG, mirroring its
//! position relative to the source root. One bad file never aborts the
//! batch: its path and cause are recorded and processing moves on.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::compositor::Compositor;

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Output files written, in processing order.
    pub outputs: Vec<PathBuf>,
    /// Inputs that could not be processed, with the cause for each.
    pub failures: Vec<Failure>,
}

/// A single input that failed during a batch run.
#[derive(Debug)]
pub struct Failure {
    /// The input path that failed.
    pub path: PathBuf,
    /// Human-readable description of what went wrong.
    pub reason: String,
}

/// Check if a file has a supported still-image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png"),
        None => false,
    }
}

/// Mirror `file`'s position under `source_root` into `output_root`, with
/// the extension swapped for the fixed PNG output format.
fn output_path_for(file: &Path, source_root: &Path, output_root: &Path) -> PathBuf {
    let relative = file.strip_prefix(source_root).unwrap_or(file);
    let mut out = output_root.join(relative);
    out.set_extension("png");
    out
}

impl Compositor {
    /// Watermark every supported image under `source_dir`.
    ///
    /// Accepted inputs are `jpg`/`jpeg`/`png` files (matched by extension,
    /// case-insensitively), found by a recursive walk in deterministic name
    /// order. The two watermark asset files are skipped by file name if
    /// they live inside the tree. Outputs land under `output_dir` (or back
    /// inside the source tree when `None`), mirroring each file's relative
    /// position, always encoded as RGBA PNG regardless of the input format.
    ///
    /// A file that fails to decode or save is recorded in
    /// [`RunResult::failures`] and the batch continues; directory creation
    /// failures are treated the same way, per file.
    ///
    /// `progress` receives a percentage in `[0, 100]` after every file.
    /// A completed run always ends on exactly `100.0`, including the
    /// degenerate case of a tree with no matching files.
    pub fn process_directory(
        &self,
        source_dir: &Path,
        output_dir: Option<&Path>,
        mut progress: impl FnMut(f32),
    ) -> RunResult {
        let light_name = self.assets().light.file_name();
        let dark_name = self.assets().dark.file_name();

        let files: Vec<PathBuf> = WalkDir::new(source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| is_supported_image(path))
            .filter(|path| path.file_name() != light_name && path.file_name() != dark_name)
            .collect();

        let mut result = RunResult::default();
        let total = files.len();
        if total == 0 {
            progress(100.0);
            return result;
        }

        let output_root = output_dir.unwrap_or(source_dir);
        for (index, file) in files.iter().enumerate() {
            match self.stamp_file(file, source_dir, output_root) {
                Ok(written) => result.outputs.push(written),
                Err(reason) => result.failures.push(Failure {
                    path: file.clone(),
                    reason,
                }),
            }

            #[allow(clippy::cast_precision_loss)]
            let pct = (index + 1) as f32 / total as f32 * 100.0;
            progress(pct);
        }

        result
    }

    /// Process one file: decode, stamp, mirror, save as PNG.
    ///
    /// Error strings feed the batch failure record; they never abort the run.
    fn stamp_file(
        &self,
        file: &Path,
        source_root: &Path,
        output_root: &Path,
    ) -> std::result::Result<PathBuf, String> {
        let decoded = image::open(file).map_err(|e| format!("Failed to load: {e}"))?;
        let mut canvas = decoded.to_rgba8();
        self.stamp(&mut canvas);

        let output_path = output_path_for(file, source_root, output_root);
        if let Some(parent) = output_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create output directory: {e}"))?;
            }
        }

        canvas
            .save(&output_path)
            .map_err(|e| format!("Failed to save: {e}"))?;
        Ok(output_path)
    }
}
