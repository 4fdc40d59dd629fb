//! Watermark geometry: target size and paste position on a canvas.
//!
//! Sizing is relative so one watermark pair serves canvases of any
//! resolution: the target width is a percentage of the shorter canvas
//! dimension and the height follows the source mark's aspect ratio.

/// Named paste position relative to the canvas corners or its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Centered on the canvas; the margin is ignored.
    #[default]
    Center,
    /// Top-left corner, inset by the margin.
    TopLeft,
    /// Top-right corner, inset by the margin.
    TopRight,
    /// Bottom-left corner, inset by the margin.
    BottomLeft,
    /// Bottom-right corner, inset by the margin.
    BottomRight,
}

impl Anchor {
    /// Parse an anchor name, falling back to `Center` for anything
    /// unrecognized.
    ///
    /// Matching is case-insensitive and tolerates `-`/`_` separators, so
    /// `top-left`, `TopLeft` and `topleft` all name the same corner.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "topleft" => Self::TopLeft,
            "topright" => Self::TopRight,
            "bottomleft" => Self::BottomLeft,
            "bottomright" => Self::BottomRight,
            _ => Self::Center,
        }
    }
}

/// Options controlling watermark size and position, fixed for a whole run.
#[derive(Debug, Clone)]
pub struct PlacementOptions {
    /// Where to paste the watermark on each canvas.
    pub anchor: Anchor,
    /// Padding in pixels between the watermark and the canvas edge.
    pub margin: u32,
    /// Watermark width as a percentage of the shorter canvas dimension.
    /// Expected to be positive; values that floor the target width to zero
    /// leave the canvas untouched.
    pub scale_percent: f32,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            anchor: Anchor::Center,
            margin: 0,
            scale_percent: 20.0,
        }
    }
}

/// A computed watermark fit for one canvas.
///
/// Coordinates are signed: a margin or scale large enough to push the mark
/// past the canvas edge yields negative values, which the compositor clips
/// at paste time rather than rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Target watermark width in pixels.
    pub width: u32,
    /// Target watermark height in pixels.
    pub height: u32,
    /// X coordinate of the watermark's top-left corner.
    pub x: i64,
    /// Y coordinate of the watermark's top-left corner.
    pub y: i64,
}

/// Compute the watermark fit for a canvas.
///
/// The target width is `min(canvas_w, canvas_h) * scale / 100`, floored.
/// The target height preserves the source watermark's aspect ratio, also
/// floored; the source dimensions are always the native ones, never those
/// of a previously resized copy. Degenerate source dimensions produce a
/// zero-size placement, which callers skip.
#[must_use]
pub fn compute(
    canvas_w: u32,
    canvas_h: u32,
    source_w: u32,
    source_h: u32,
    options: &PlacementOptions,
) -> Placement {
    let shorter = f64::from(canvas_w.min(canvas_h));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = (shorter * f64::from(options.scale_percent) / 100.0).floor() as u32;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = if source_w == 0 || source_h == 0 {
        0
    } else {
        let aspect = f64::from(source_w) / f64::from(source_h);
        (f64::from(width) / aspect).floor() as u32
    };

    let (cw, ch) = (i64::from(canvas_w), i64::from(canvas_h));
    let (tw, th) = (i64::from(width), i64::from(height));
    let margin = i64::from(options.margin);

    let (x, y) = match options.anchor {
        Anchor::Center => ((cw - tw) / 2, (ch - th) / 2),
        Anchor::TopLeft => (margin, margin),
        Anchor::TopRight => (cw - tw - margin, margin),
        Anchor::BottomLeft => (margin, ch - th - margin),
        Anchor::BottomRight => (cw - tw - margin, ch - th - margin),
    };

    Placement {
        width,
        height,
        x,
        y,
    }
}
