//! Batch-apply a light or dark watermark chosen by background luminance.
//!
//! Given a pair of watermark images (one light variant, one dark), the
//! compositor classifies each canvas by mean luminance and pastes the
//! variant that contrasts with it: light mark on dark backgrounds, dark
//! mark on light ones. The mark is scaled against the canvas's shorter
//! side, so one asset pair serves phone snapshots and 8K stills alike.
//!
//! # Quick Start
//!
//! ```no_run
//! use adaptive_watermark::{Compositor, PlacementOptions};
//!
//! let compositor = Compositor::load(
//!     "light.png".as_ref(),
//!     "dark.png".as_ref(),
//!     PlacementOptions::default(),
//! )
//! .expect("failed to load watermarks");
//!
//! let result =
//!     compositor.process_directory("photos".as_ref(), Some("out".as_ref()), |pct| {
//!         eprintln!("{pct:.0}%");
//!     });
//! println!(
//!     "written: {}, failed: {}",
//!     result.outputs.len(),
//!     result.failures.len()
//! );
//! ```
//!
//! # Videos
//!
//! Videos are re-encoded frame by frame through an external FFmpeg pair
//! (decoder and encoder child processes). Every frame is classified on its
//! own, so footage that moves between dark and light scenes switches
//! watermark variants mid-stream:
//!
//! ```no_run
//! use adaptive_watermark::{Compositor, PlacementOptions};
//!
//! let compositor = Compositor::load(
//!     "light.png".as_ref(),
//!     "dark.png".as_ref(),
//!     PlacementOptions::default(),
//! )
//! .expect("failed to load watermarks");
//!
//! let out = compositor
//!     .process_video("clip.mp4".as_ref(), "out".as_ref(), |_| {})
//!     .expect("video run failed");
//! println!("wrote {}", out.display());
//! ```
//!
//! # Background runs
//!
//! A run executes synchronously on the calling thread. Interactive callers
//! wrap it in a [`Task`], which moves the run to a worker thread and
//! reports progress over a channel:
//!
//! ```no_run
//! use adaptive_watermark::{Compositor, PlacementOptions, Task};
//!
//! let compositor = Compositor::load(
//!     "light.png".as_ref(),
//!     "dark.png".as_ref(),
//!     PlacementOptions::default(),
//! )
//! .expect("failed to load watermarks");
//!
//! let task = Task::spawn(move |progress| {
//!     compositor.process_directory("photos".as_ref(), None, |pct| progress.send(pct))
//! });
//! while !task.is_finished() {
//!     if let Some(pct) = task.latest_progress() {
//!         eprintln!("{pct:.0}%");
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! let result = task.join();
//! ```

#![deny(missing_docs)]

pub mod assets;
pub mod batch;
pub mod compositor;
pub mod error;
pub mod luminance;
pub mod placement;
pub mod task;
pub mod video;

pub use assets::{WatermarkAsset, WatermarkPair};
pub use batch::{is_supported_image, Failure, RunResult};
pub use compositor::Compositor;
pub use error::{Error, Result};
pub use luminance::{classify, mean_luma, Luminance};
pub use placement::{Anchor, Placement, PlacementOptions};
pub use task::{ProgressSender, Task};
pub use video::{is_supported_video, probe, VideoInfo};
