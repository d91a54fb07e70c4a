//! Internal conversion helpers.
//!
//! Timestamp rescaling between seconds, stream time bases and FFmpeg's
//! `AV_TIME_BASE`, and pixel copying out of padded FFmpeg frames.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// FFmpeg's internal time base, in ticks per second.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// FFmpeg's `AV_NOPTS_VALUE`.
const NO_TIMESTAMP: i64 = i64::MIN;

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert seconds to a container-level seek timestamp in `AV_TIME_BASE`
/// (microseconds), as expected by `Input::seek`.
pub(crate) fn seconds_to_seek_timestamp(seconds: f64) -> i64 {
    (seconds.max(0.0) * AV_TIME_BASE) as i64
}

/// Convert a container duration in `AV_TIME_BASE` units to seconds.
///
/// Non-positive values (FFmpeg's "unknown") map to `None`.
pub(crate) fn container_duration_seconds(duration: i64) -> Option<f64> {
    (duration > 0).then(|| duration as f64 / AV_TIME_BASE)
}

/// A stream's `start_time` in seconds; FFmpeg's "no timestamp" maps to 0.
pub(crate) fn stream_start_seconds(start_time: i64, time_base: Rational) -> f64 {
    if start_time == NO_TIMESTAMP {
        0.0
    } else {
        pts_to_seconds(start_time, time_base)
    }
}

/// Copy RGB24 pixel data from an FFmpeg video frame into a tightly-packed
/// buffer suitable for [`image::RgbImage::from_raw`].
///
/// FFmpeg rows frequently carry padding (stride > width × 3).
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}
