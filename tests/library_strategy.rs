//! Library strategy write-loop tests.
//!
//! Frames come from a synthetic [`FrameSource`] so these run without video
//! fixtures; the JPEG files are real and are decoded back where it matters.

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

use image::{Rgb, RgbImage};
use stills::{
    ExtractionRequest, FrameSource, ProgressCallback, ProgressInfo, StillsError, write_frames,
};

/// A fake video whose frame at `t` is a solid colour derived from `t`.
struct SyntheticClip {
    duration: Option<f64>,
    decoded: Vec<f64>,
}

impl SyntheticClip {
    fn new(duration: Option<f64>) -> Self {
        Self {
            duration,
            decoded: Vec::new(),
        }
    }
}

impl FrameSource for SyntheticClip {
    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn frame_at(&mut self, seconds: f64) -> Result<RgbImage, StillsError> {
        self.decoded.push(seconds);
        let shade = (seconds * 20.0).min(255.0) as u8;
        Ok(RgbImage::from_pixel(32, 24, Rgb([shade, 0, 255 - shade])))
    }
}

fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .expect("Failed to list output")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn ten_second_clip_every_two_seconds() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let request = ExtractionRequest::new("clip.mp4", &output).with_interval(2.0);

    let mut clip = SyntheticClip::new(Some(10.0));
    let extracted = write_frames(&mut clip, &request).expect("Failed to write frames");

    assert_eq!(extracted, 6);
    assert_eq!(clip.decoded, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    assert_eq!(
        file_names(&output),
        vec![
            "frame_000000s_0-00-00.jpg",
            "frame_000002s_0-00-02.jpg",
            "frame_000004s_0-00-04.jpg",
            "frame_000006s_0-00-06.jpg",
            "frame_000008s_0-00-08.jpg",
            "frame_000010s_0-00-10.jpg",
        ]
    );

    let frame = image::open(output.join("frame_000004s_0-00-04.jpg")).expect("Not a JPEG");
    assert_eq!((frame.width(), frame.height()), (32, 24));
}

#[test]
fn second_run_without_overwrite_skips_everything() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("clip.mp4", temporary_directory.path())
        .with_interval(1.0)
        .with_end(Some(4.0));

    let mut first = SyntheticClip::new(Some(30.0));
    assert_eq!(write_frames(&mut first, &request).unwrap(), 5);
    let names_after_first = file_names(temporary_directory.path());

    let mut second = SyntheticClip::new(Some(30.0));
    assert_eq!(write_frames(&mut second, &request).unwrap(), 0);
    assert!(second.decoded.is_empty(), "skipped frames must not be decoded");
    assert_eq!(file_names(temporary_directory.path()), names_after_first);
}

#[test]
fn overwrite_reextracts_every_instant() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("clip.mp4", temporary_directory.path())
        .with_interval(2.5)
        .with_overwrite(true);

    for _ in 0..2 {
        let mut clip = SyntheticClip::new(Some(10.0));
        assert_eq!(write_frames(&mut clip, &request).unwrap(), 5);
        assert_eq!(clip.decoded.len(), 5);
    }
}

#[test]
fn partially_filled_directory_only_writes_missing_frames() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(
        temporary_directory.path().join("frame_000002s_0-00-02.jpg"),
        b"keep me",
    )
    .unwrap();

    let request = ExtractionRequest::new("clip.mp4", temporary_directory.path());
    let mut clip = SyntheticClip::new(Some(3.0));
    assert_eq!(write_frames(&mut clip, &request).unwrap(), 3);
    assert_eq!(clip.decoded, vec![0.0, 1.0, 3.0]);
    assert_eq!(
        fs::read(temporary_directory.path().join("frame_000002s_0-00-02.jpg")).unwrap(),
        b"keep me"
    );
}

#[test]
fn end_past_duration_is_clamped() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("clip.mp4", temporary_directory.path())
        .with_interval(2.0)
        .with_start(5.0)
        .with_end(Some(60.0));

    let mut clip = SyntheticClip::new(Some(15.0));
    assert_eq!(write_frames(&mut clip, &request).unwrap(), 6);
    assert_eq!(clip.decoded.last(), Some(&15.0));
}

#[test]
fn unknown_duration_requires_an_end() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");

    let unbounded = ExtractionRequest::new("clip.mp4", &output);
    let result = write_frames(&mut SyntheticClip::new(None), &unbounded);
    assert!(matches!(result, Err(StillsError::VideoDecodeError(_))));
    assert!(!output.exists());

    let bounded = unbounded.with_end(Some(2.0));
    assert_eq!(write_frames(&mut SyntheticClip::new(None), &bounded).unwrap(), 3);
}

#[test]
fn invalid_interval_writes_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");

    for interval in [0.0, -1.0] {
        let request = ExtractionRequest::new("clip.mp4", &output).with_interval(interval);
        let mut clip = SyntheticClip::new(Some(10.0));
        let result = write_frames(&mut clip, &request);
        assert!(matches!(result, Err(StillsError::InvalidParameter(_))));
        assert!(clip.decoded.is_empty());
        assert!(!output.exists());
    }
}

#[test]
fn start_after_end_extracts_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let request = ExtractionRequest::new("clip.mp4", &output)
        .with_start(8.0)
        .with_end(Some(4.0));

    let mut clip = SyntheticClip::new(Some(10.0));
    assert_eq!(write_frames(&mut clip, &request).unwrap(), 0);
    assert!(clip.decoded.is_empty());
    assert!(!output.exists());
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<(u64, Option<u64>, bool)>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.events
            .lock()
            .unwrap()
            .push((info.current, info.total, info.skipped));
    }
}

#[test]
fn progress_reports_every_instant() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temporary_directory.path().join("frame_000001s_0-00-01.jpg"), b"").unwrap();

    let progress = Arc::new(RecordingProgress::default());
    let request = ExtractionRequest::new("clip.mp4", temporary_directory.path())
        .with_progress(progress.clone());

    let mut clip = SyntheticClip::new(Some(2.0));
    assert_eq!(write_frames(&mut clip, &request).unwrap(), 2);

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![(1, Some(3), false), (2, Some(3), true), (3, Some(3), false)]
    );
}
