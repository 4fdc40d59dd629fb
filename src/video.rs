//! Frame-sequential video watermarking via external FFmpeg.
//!
//! Two FFmpeg child processes do the container work: a decoder streams raw
//! RGB24 frames on stdout, and an encoder consumes stamped frames on stdin,
//! writing H.264/MP4 and copying any audio stream from the source. Each
//! frame is classified on its own, so footage that crosses between dark and
//! light scenes switches watermark variants mid-stream.
//!
//! Requires `ffmpeg` and `ffprobe` on the PATH.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};

use crate::compositor::Compositor;
use crate::error::{Error, Result};

/// Check if a file has a supported video extension.
#[must_use]
pub fn is_supported_video(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "mp4" | "avi" | "mov" | "mkv"),
        None => false,
    }
}

/// Probed properties of a video's first stream.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Total frame count; estimated from the duration when the container
    /// does not record it, and 0 when unknown.
    pub frame_count: u64,
    /// Frame rate exactly as reported, e.g. `"30000/1001"`.
    pub fps: String,
}

/// Probe a video's dimensions, frame rate and frame count with `ffprobe`.
///
/// # Errors
///
/// Returns [`Error::VideoOpen`] if `ffprobe` cannot run or its output does
/// not describe a video stream.
pub fn probe(path: &Path) -> Result<VideoInfo> {
    let open_err = |reason: String| Error::VideoOpen {
        path: path.to_path_buf(),
        reason,
    };

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            open_err(format!(
                "cannot run ffprobe: {e} (is FFmpeg installed and on PATH?)"
            ))
        })?;

    if !out.status.success() {
        return Err(open_err(format!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let text = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < 3 {
        return Err(open_err(format!("unexpected ffprobe output: {text}")));
    }

    let width: u32 = lines[0]
        .trim()
        .parse()
        .map_err(|_| open_err("cannot parse video width".to_string()))?;
    let height: u32 = lines[1]
        .trim()
        .parse()
        .map_err(|_| open_err("cannot parse video height".to_string()))?;
    let fps = lines[2].trim().to_string();

    // Containers like MKV often omit nb_frames; fall back to duration * fps
    let frame_count = lines
        .get(3)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .or_else(|| estimate_frames(path, &fps))
        .unwrap_or(0);

    Ok(VideoInfo {
        width,
        height,
        frame_count,
        fps,
    })
}

fn estimate_frames(path: &Path, fps_str: &str) -> Option<u64> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .ok()?;
    let duration: f64 = String::from_utf8_lossy(&out.stdout).trim().parse().ok()?;
    let fps = parse_fps(fps_str)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (duration * fps).ceil() as u64;
    Some(frames)
}

/// Parse an FFmpeg rate string such as `"30000/1001"` or `"25"`.
fn parse_fps(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den > 0.0 {
            Some(num / den)
        } else {
            None
        }
    } else {
        s.trim().parse().ok()
    }
}

/// Read exactly `buf.len()` bytes. Returns `Ok(false)` on clean EOF at a
/// frame boundary; EOF mid-frame is an error.
fn read_frame(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut pos = 0;
    while pos < buf.len() {
        match reader.read(&mut buf[pos..]) {
            Ok(0) if pos == 0 => return Ok(false),
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "incomplete frame data",
                ))
            }
            Ok(n) => pos += n,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Output file name for a stamped video: `<stem>_watermarked.mp4`.
fn derived_output_name(video: &Path) -> String {
    let stem = video
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned());
    format!("{stem}_watermarked.mp4")
}

/// Decoder child: video in, raw RGB24 frames on stdout.
fn spawn_decoder(video: &Path) -> Result<Child> {
    Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(video)
        .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::VideoOpen {
            path: video.to_path_buf(),
            reason: format!("cannot run ffmpeg decoder: {e} (is FFmpeg installed and on PATH?)"),
        })
}

/// Encoder child: raw RGB24 frames on stdin, H.264/MP4 out, audio copied
/// from the source container.
fn spawn_encoder(video: &Path, output: &Path, info: &VideoInfo) -> Result<Child> {
    Command::new("ffmpeg")
        .args(["-v", "error", "-y"])
        .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
        .args(["-s", &format!("{}x{}", info.width, info.height)])
        .args(["-r", &info.fps])
        .args(["-i", "pipe:0"])
        .arg("-i")
        .arg(video)
        .args(["-map", "0:v:0", "-map", "1:a?"])
        .args(["-c:v", "libx264", "-preset", "fast", "-crf", "18", "-pix_fmt", "yuv420p"])
        .args(["-c:a", "copy", "-shortest"])
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::VideoEncode {
            path: video.to_path_buf(),
            reason: format!("cannot run ffmpeg encoder: {e}"),
        })
}

impl Compositor {
    /// Watermark every frame of a video.
    ///
    /// The output is written to `output_dir` as `<stem>_watermarked.mp4`
    /// (H.264, `yuv420p`), keeping the source dimensions and frame rate and
    /// copying any audio stream. Classification runs per frame: each frame
    /// is expanded to RGBA, stamped exactly like a still image, then
    /// flattened back into the encoder's RGB24 stream.
    ///
    /// `progress` receives a percentage in `[0, 100]` per frame; the final
    /// value of a successful run is exactly 100. Unlike the batch
    /// processor there is no per-item recovery: any frame-level failure
    /// aborts the run, and an incomplete output file may remain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VideoOpen`] if probing fails or the decoder cannot
    /// start, [`Error::VideoDecode`] or [`Error::VideoEncode`] for
    /// mid-stream failures, and [`Error::Io`] if the output directory
    /// cannot be created.
    pub fn process_video(
        &self,
        video: &Path,
        output_dir: &Path,
        mut progress: impl FnMut(f32),
    ) -> Result<PathBuf> {
        let info = probe(video)?;
        std::fs::create_dir_all(output_dir)?;
        let output = output_dir.join(derived_output_name(video));

        let mut decoder = spawn_decoder(video)?;
        let mut encoder = match spawn_encoder(video, &output, &info) {
            Ok(child) => child,
            Err(e) => {
                let _ = decoder.kill();
                let _ = decoder.wait();
                return Err(e);
            }
        };

        // Frame failures are fatal; reap both children before reporting
        if let Err(e) = self.pump_frames(video, &info, &mut decoder, &mut encoder, &mut progress) {
            let _ = decoder.kill();
            let _ = encoder.kill();
            let _ = decoder.wait();
            let _ = encoder.wait();
            return Err(e);
        }

        let _ = decoder.wait();
        let status = encoder.wait().map_err(|e| Error::VideoEncode {
            path: video.to_path_buf(),
            reason: format!("encoder process failed: {e}"),
        })?;
        if !status.success() {
            return Err(Error::VideoEncode {
                path: video.to_path_buf(),
                reason: "ffmpeg encoder exited with an error".to_string(),
            });
        }

        progress(100.0);
        Ok(output)
    }

    /// Stream frames decoder -> stamp -> encoder until clean EOF.
    ///
    /// Dropping the encoder's stdin at the end signals it to finalize the
    /// container.
    fn pump_frames(
        &self,
        video: &Path,
        info: &VideoInfo,
        decoder: &mut Child,
        encoder: &mut Child,
        progress: &mut impl FnMut(f32),
    ) -> Result<()> {
        let Some(stdout) = decoder.stdout.take() else {
            return Err(Error::VideoOpen {
                path: video.to_path_buf(),
                reason: "decoder stdout pipe unavailable".to_string(),
            });
        };
        let Some(stdin) = encoder.stdin.take() else {
            return Err(Error::VideoEncode {
                path: video.to_path_buf(),
                reason: "encoder stdin pipe unavailable".to_string(),
            });
        };

        let mut dec_out = BufReader::new(stdout);
        let mut enc_in = BufWriter::new(stdin);

        let frame_size = info.width as usize * info.height as usize * 3;
        let mut buf = vec![0u8; frame_size];
        let total = info.frame_count.max(1);
        let mut index: u64 = 0;

        loop {
            match read_frame(&mut dec_out, &mut buf) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    return Err(Error::VideoDecode {
                        path: video.to_path_buf(),
                        reason: format!("failed to read frame {index}: {e}"),
                    })
                }
            }

            let frame_buf = std::mem::take(&mut buf);
            let Some(frame) = RgbImage::from_raw(info.width, info.height, frame_buf) else {
                return Err(Error::VideoDecode {
                    path: video.to_path_buf(),
                    reason: "frame buffer size mismatch".to_string(),
                });
            };

            let mut canvas: RgbaImage = frame.convert();
            self.stamp(&mut canvas);
            let flattened: RgbImage = canvas.convert();

            enc_in
                .write_all(flattened.as_raw())
                .map_err(|e| Error::VideoEncode {
                    path: video.to_path_buf(),
                    reason: format!("failed to write frame {index}: {e}"),
                })?;
            buf = frame.into_raw();

            index += 1;
            // The frame count may be an estimate; 100 is only emitted once
            // the encoder has exited
            #[allow(clippy::cast_precision_loss)]
            let pct = (index as f32 / total as f32 * 100.0).min(99.9);
            progress(pct);
        }

        enc_in.flush().map_err(|e| Error::VideoEncode {
            path: video.to_path_buf(),
            reason: format!("failed to flush encoder input: {e}"),
        })?;
        Ok(())
    }
}
