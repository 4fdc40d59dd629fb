use std::path::{Path, PathBuf};

use adaptive_watermark::{Anchor, Compositor, PlacementOptions, Task};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

/// Write a uniform RGB image; the extension picks the encoder.
fn write_image(path: &Path, width: u32, height: u32, value: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(width, height, Rgb(value))
        .save(path)
        .unwrap();
}

/// Opaque white light mark and opaque black dark mark, 40x20 each.
fn write_marks(dir: &Path) -> (PathBuf, PathBuf) {
    let light = dir.join("light-mark.png");
    write_image(&light, 40, 20, [255, 255, 255]);
    let dark = dir.join("dark-mark.png");
    write_image(&dark, 40, 20, [0, 0, 0]);
    (light, dark)
}

fn center_compositor(marks_dir: &Path, scale_percent: f32) -> Compositor {
    let (light, dark) = write_marks(marks_dir);
    Compositor::load(
        &light,
        &dark,
        PlacementOptions {
            anchor: Anchor::Center,
            margin: 0,
            scale_percent,
        },
    )
    .unwrap()
}

#[test]
fn batch_mirrors_the_source_tree() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    let output = root.path().join("output");
    write_image(&source.join("a.jpg"), 64, 64, [20, 20, 20]);
    write_image(&source.join("albums/2024/b.png"), 64, 64, [240, 240, 240]);

    let comp = center_compositor(root.path(), 20.0);
    let result = comp.process_directory(&source, Some(&output), |_| {});

    assert!(result.failures.is_empty());
    assert_eq!(result.outputs.len(), 2);
    assert!(output.join("a.png").is_file());
    assert!(output.join("albums/2024/b.png").is_file());

    // Sources stay untouched
    assert!(source.join("a.jpg").is_file());
    assert!(source.join("albums/2024/b.png").is_file());
}

#[test]
fn batch_outputs_are_rgba_png() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    let output = root.path().join("output");
    write_image(&source.join("photo.jpg"), 64, 64, [20, 20, 20]);

    let comp = center_compositor(root.path(), 20.0);
    comp.process_directory(&source, Some(&output), |_| {});

    let decoded = image::open(output.join("photo.png")).unwrap();
    assert_eq!(decoded.color(), image::ColorType::Rgba8);
}

#[test]
fn variants_switch_with_background_luminance() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    let output = root.path().join("output");
    write_image(&source.join("night.jpg"), 100, 100, [0, 0, 0]);
    write_image(&source.join("day.jpg"), 100, 100, [255, 255, 255]);

    // 50% of the shorter side: a 50x25 mark centered at (25, 37)
    let comp = center_compositor(root.path(), 50.0);
    let result = comp.process_directory(&source, Some(&output), |_| {});
    assert!(result.failures.is_empty());

    let night = image::open(output.join("night.png")).unwrap().to_rgba8();
    assert_eq!(night.get_pixel(50, 50), &Rgba([255, 255, 255, 255]));

    let day = image::open(output.join("day.png")).unwrap().to_rgba8();
    assert_eq!(day.get_pixel(50, 50), &Rgba([0, 0, 0, 255]));
}

#[test]
fn corrupt_file_is_isolated_and_reported() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    let output = root.path().join("output");
    write_image(&source.join("a.jpg"), 64, 64, [10, 10, 10]);
    write_image(&source.join("b.jpg"), 64, 64, [10, 10, 10]);
    write_image(&source.join("c.png"), 64, 64, [10, 10, 10]);
    std::fs::write(source.join("broken.png"), b"not an image at all").unwrap();

    let comp = center_compositor(root.path(), 20.0);
    let mut seen = Vec::new();
    let result = comp.process_directory(&source, Some(&output), |pct| seen.push(pct));

    assert_eq!(result.outputs.len(), 3);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].path, source.join("broken.png"));
    assert!(!result.failures[0].reason.is_empty());

    // One signal per file, nondecreasing, ending on exactly 100
    assert_eq!(seen.len(), 4);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&100.0));
    assert_eq!(seen.iter().filter(|pct| **pct == 100.0).count(), 1);
}

#[test]
fn in_place_run_writes_beside_the_sources() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    write_image(&source.join("photo.jpg"), 64, 64, [10, 10, 10]);

    let comp = center_compositor(root.path(), 20.0);
    let result = comp.process_directory(&source, None, |_| {});

    assert_eq!(result.outputs, vec![source.join("photo.png")]);
    assert!(source.join("photo.png").is_file());
    assert!(source.join("photo.jpg").is_file());
}

#[test]
fn watermark_assets_inside_the_tree_are_skipped() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    std::fs::create_dir_all(&source).unwrap();

    // The marks live inside the tree being processed
    let (light, dark) = write_marks(&source);
    write_image(&source.join("photo.jpg"), 64, 64, [10, 10, 10]);

    let light_bytes = std::fs::read(&light).unwrap();
    let dark_bytes = std::fs::read(&dark).unwrap();

    let comp = Compositor::load(&light, &dark, PlacementOptions::default()).unwrap();
    let result = comp.process_directory(&source, None, |_| {});

    assert_eq!(result.outputs, vec![source.join("photo.png")]);
    assert!(result.failures.is_empty());
    assert_eq!(std::fs::read(&light).unwrap(), light_bytes);
    assert_eq!(std::fs::read(&dark).unwrap(), dark_bytes);
}

#[test]
fn unsupported_files_are_ignored() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(source.join("notes.txt"), b"nothing to stamp").unwrap();
    std::fs::write(source.join("anim.gif"), b"GIF89a").unwrap();
    write_image(&source.join("photo.png"), 64, 64, [10, 10, 10]);

    let comp = center_compositor(root.path(), 20.0);
    let result = comp.process_directory(&source, None, |_| {});

    assert_eq!(result.outputs.len(), 1);
    assert!(result.failures.is_empty());
    assert!(!source.join("notes.png").exists());
}

#[test]
fn empty_tree_reports_complete_immediately() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    std::fs::create_dir_all(&source).unwrap();

    let comp = center_compositor(root.path(), 20.0);
    let mut seen = Vec::new();
    let result = comp.process_directory(&source, None, |pct| seen.push(pct));

    assert!(result.outputs.is_empty());
    assert!(result.failures.is_empty());
    assert_eq!(seen, vec![100.0]);
}

#[test]
fn runs_are_deterministic() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    write_image(&source.join("a.jpg"), 64, 48, [30, 60, 90]);
    write_image(&source.join("sub/b.png"), 80, 64, [220, 220, 220]);

    let comp = center_compositor(root.path(), 35.0);
    let first = root.path().join("first");
    let second = root.path().join("second");
    comp.process_directory(&source, Some(&first), |_| {});
    comp.process_directory(&source, Some(&second), |_| {});

    for rel in ["a.png", "sub/b.png"] {
        let a = std::fs::read(first.join(rel)).unwrap();
        let b = std::fs::read(second.join(rel)).unwrap();
        assert_eq!(a, b, "outputs for {rel} differ between runs");
    }
}

#[test]
fn run_on_a_task_reports_progress_and_outcome() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("source");
    let output = root.path().join("output");
    write_image(&source.join("a.jpg"), 64, 64, [10, 10, 10]);
    write_image(&source.join("b.jpg"), 64, 64, [10, 10, 10]);

    let comp = center_compositor(root.path(), 20.0);
    let task = Task::spawn(move |progress| {
        comp.process_directory(&source, Some(&output), |pct| progress.send(pct))
    });

    while !task.is_finished() {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(task.latest_progress(), Some(100.0));

    let result = task.join();
    assert_eq!(result.outputs.len(), 2);
    assert!(result.failures.is_empty());
}

#[test]
fn stamping_a_frame_sequence_switches_variants_per_frame() {
    // Video runs classify each frame on its own; emulate a two-frame
    // stream that crosses from a dark scene to a light one
    let root = TempDir::new().unwrap();
    let comp = center_compositor(root.path(), 50.0);

    let mut dark_frame = RgbaImage::from_pixel(100, 100, Rgba([5, 5, 5, 255]));
    let mut light_frame = RgbaImage::from_pixel(100, 100, Rgba([250, 250, 250, 255]));

    comp.stamp(&mut dark_frame);
    comp.stamp(&mut light_frame);

    assert_eq!(dark_frame.get_pixel(50, 50), &Rgba([255, 255, 255, 255]));
    assert_eq!(light_frame.get_pixel(50, 50), &Rgba([0, 0, 0, 255]));
}
