//! Frame extraction through the FFmpeg libraries.
//!
//! [`VideoClip`] opens a video in-process, and [`write_frames`] walks the
//! planned sample instants, decoding one frame per instant and encoding it
//! straight to its final timestamped JPEG. Frames that already exist are
//! left alone unless the request asks for overwriting.
//!
//! [`FrameSource`] is the seam between the two: anything that can report a
//! duration and produce an RGB frame for an instant can be written out.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{RgbImage, codecs::jpeg::JpegEncoder};

use crate::{
    configuration::ExtractionRequest,
    conversion::{
        container_duration_seconds, frame_to_rgb_buffer, pts_to_seconds,
        seconds_to_seek_timestamp, stream_start_seconds,
    },
    error::StillsError,
    naming::frame_file_name,
    planner::SamplePlan,
    progress::ProgressInfo,
};

/// Slack when comparing a decoded frame's timestamp to the requested instant.
const TIMESTAMP_TOLERANCE: f64 = 1e-4;

/// Something that yields RGB frames by time offset.
pub trait FrameSource {
    /// Total duration in seconds, if known.
    fn duration(&self) -> Option<f64>;

    /// The frame shown at `seconds` into the video.
    fn frame_at(&mut self, seconds: f64) -> Result<RgbImage, StillsError>;
}

/// An open video, ready to decode frames at arbitrary instants.
///
/// Owns the demuxer, decoder, and scaler. They are released when the clip is
/// dropped, so every exit path of an extraction closes the file.
///
/// # Example
///
/// ```no_run
/// use stills::{FrameSource, VideoClip};
///
/// let mut clip = VideoClip::open("input.mp4")?;
/// println!("{:?}", clip.duration());
/// clip.frame_at(2.0)?.save("two_seconds.png")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct VideoClip {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    time_base: Rational,
    start_offset: f64,
    width: u32,
    height: u32,
    duration: Option<f64>,
    path: PathBuf,
}

impl VideoClip {
    /// Open the best video stream of `path` for decoding.
    ///
    /// # Errors
    ///
    /// - [`StillsError::DependencyUnavailable`] if FFmpeg cannot be
    ///   initialised or has no decoder for the stream's codec.
    /// - [`StillsError::FileOpen`] if the container cannot be opened.
    /// - [`StillsError::NoVideoStream`] if there is nothing to decode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StillsError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video clip: {}", path.display());

        ffmpeg_next::init().map_err(|error| StillsError::DependencyUnavailable {
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| StillsError::FileOpen {
            path: path.clone(),
            reason: error.to_string(),
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(StillsError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let start_offset = stream_start_seconds(stream.start_time(), time_base);

        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context.decoder().video().map_err(|error| {
            StillsError::DependencyUnavailable {
                reason: format!("no usable decoder for stream {stream_index}: {error}"),
            }
        })?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let duration = container_duration_seconds(input.duration());

        log::info!(
            "Opened {} ({}x{}, duration={}, starts at {start_offset:.3}s)",
            path.display(),
            width,
            height,
            duration.map_or_else(|| "unknown".to_string(), |seconds| format!("{seconds:.2}s")),
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            start_offset,
            width,
            height,
            duration,
            path,
        })
    }

    /// Frame dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The file this clip was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for VideoClip {
    fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Seeks to the keyframe before `seconds`, then decodes forward to the
    /// last frame whose timestamp is not after `seconds`. Past the final
    /// frame, the final frame is returned.
    ///
    /// `seconds` counts from the first frame; stream timestamps are shifted
    /// by the stream's start time.
    fn frame_at(&mut self, seconds: f64) -> Result<RgbImage, StillsError> {
        let target = seconds.max(0.0) + self.start_offset;
        let seek_timestamp = seconds_to_seek_timestamp(target);
        self.input.seek(seek_timestamp, ..seek_timestamp)?;
        self.decoder.flush();

        let stream_index = self.stream_index;
        let time_base = self.time_base;
        let (width, height) = (self.width, self.height);

        let mut decoded = VideoFrame::empty();
        let mut previous = VideoFrame::empty();
        let mut have_previous = false;

        for (stream, packet) in self.input.packets() {
            if stream.index() != stream_index {
                continue;
            }

            self.decoder.send_packet(&packet)?;

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let Some(pts) = decoded.timestamp().or(decoded.pts()) else {
                    return convert_frame(&mut self.scaler, &decoded, width, height);
                };
                if pts_to_seconds(pts, time_base) > target + TIMESTAMP_TOLERANCE {
                    let shown = if have_previous { &previous } else { &decoded };
                    return convert_frame(&mut self.scaler, shown, width, height);
                }
                std::mem::swap(&mut decoded, &mut previous);
                have_previous = true;
            }
        }

        // Drain frames still buffered in the decoder.
        self.decoder.send_eof()?;
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let past_target = decoded
                .timestamp()
                .or(decoded.pts())
                .is_some_and(|pts| pts_to_seconds(pts, time_base) > target + TIMESTAMP_TOLERANCE);
            if past_target {
                let shown = if have_previous { &previous } else { &decoded };
                return convert_frame(&mut self.scaler, shown, width, height);
            }
            std::mem::swap(&mut decoded, &mut previous);
            have_previous = true;
        }

        if have_previous {
            return convert_frame(&mut self.scaler, &previous, width, height);
        }

        Err(StillsError::VideoDecodeError(format!(
            "no frame could be decoded at {seconds:.3}s"
        )))
    }
}

impl Drop for VideoClip {
    fn drop(&mut self) {
        log::debug!("Closing video clip: {}", self.path().display());
    }
}

/// Scale a decoded frame to RGB24 and wrap it as an [`RgbImage`].
fn convert_frame(
    scaler: &mut ScalingContext,
    decoded: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<RgbImage, StillsError> {
    let mut rgb_frame = VideoFrame::empty();
    scaler.run(decoded, &mut rgb_frame)?;
    let buffer = frame_to_rgb_buffer(&rgb_frame, width, height);
    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        StillsError::VideoDecodeError(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })
}

/// Encode `image` as a JPEG at `path`.
///
/// A partially written file is removed on failure so it is not mistaken for
/// a finished frame on the next run.
pub fn encode_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), StillsError> {
    let result = write_jpeg(image, path, quality);
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

fn write_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), StillsError> {
    let mut writer = BufWriter::new(File::create(path)?);
    // Only quality is configurable; this encoder has no Huffman table optimisation.
    JpegEncoder::new_with_quality(&mut writer, quality).encode_image(image)?;
    writer.flush()?;
    Ok(())
}

/// Write one JPEG per planned instant of `request`, reading frames from
/// `source`.
///
/// Existing files are skipped (not decoded, not counted) unless
/// `request.overwrite()` is set. Returns the number of files written.
///
/// # Errors
///
/// - [`StillsError::InvalidParameter`] for a bad interval or quality, before
///   anything touches the filesystem.
/// - [`StillsError::VideoDecodeError`] if neither an end time nor the
///   duration is known, or a frame cannot be decoded.
/// - [`StillsError::IoError`] / [`StillsError::ImageError`] when writing.
pub fn write_frames<S: FrameSource + ?Sized>(
    source: &mut S,
    request: &ExtractionRequest,
) -> Result<usize, StillsError> {
    request.validate()?;

    let plan = SamplePlan::new(
        request.start(),
        request.end(),
        request.interval(),
        source.duration(),
    )?;
    let total = plan.len().ok_or_else(|| {
        StillsError::VideoDecodeError(
            "video duration is unknown and no end time was given".to_string(),
        )
    })?;
    if total == 0 {
        log::info!("Nothing to extract: start is past the end of the range");
        return Ok(0);
    }

    fs::create_dir_all(request.output())?;

    let mut extracted = 0;
    for (index, instant) in plan.instants().enumerate() {
        let path = request.output().join(frame_file_name(instant));
        let skipped = !request.overwrite() && path.exists();

        if skipped {
            log::debug!("Skipping existing frame {}", path.display());
        } else {
            let image = source.frame_at(instant)?;
            encode_jpeg(&image, &path, request.quality())?;
            extracted += 1;
            log::debug!("Saved frame at {instant:.3}s -> {}", path.display());
        }

        request.progress.on_progress(&ProgressInfo {
            current: index as u64 + 1,
            total: Some(total as u64),
            instant,
            path,
            skipped,
        });
    }

    log::info!(
        "Extracted {extracted} of {total} planned frame(s) into {}",
        request.output().display()
    );
    Ok(extracted)
}

/// Extract frames of `request.input()` through the FFmpeg libraries.
///
/// # Errors
///
/// Any error from [`VideoClip::open`] or [`write_frames`].
pub fn extract_with_library(request: &ExtractionRequest) -> Result<usize, StillsError> {
    request.validate()?;
    let mut clip = VideoClip::open(request.input())?;
    write_frames(&mut clip, request)
}
