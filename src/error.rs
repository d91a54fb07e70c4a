//! Error types for the `stills` crate.
//!
//! This module defines [`StillsError`], the unified error type returned by all
//! fallible operations in the crate. Variants carry the path, tool name, or
//! upstream message needed to diagnose a failure without extra logging at the
//! call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `stills` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StillsError {
    /// A request parameter is out of range (e.g. a non-positive interval).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The in-process decoding libraries (or the JPEG encoder) cannot be used.
    ///
    /// The strategy selector treats this as a signal to fall back to the
    /// external `ffmpeg` tool.
    #[error("Dependency unavailable: {reason}")]
    DependencyUnavailable {
        /// Why the dependency could not be used.
        reason: String,
    },

    /// An external command-line tool failed to run or produced unusable output.
    #[error("{tool} failed: {reason}")]
    ExternalTool {
        /// The program that was invoked.
        tool: String,
        /// Exit status, spawn error, or the tail of its stderr.
        reason: String,
    },

    /// The input video does not exist.
    #[error("Input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// The media file could not be opened by the decoding library.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoClip::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl StillsError {
    /// Returns `true` for failures of the in-process decoding path that the
    /// external tool may still be able to handle.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            StillsError::DependencyUnavailable { .. }
                | StillsError::FileOpen { .. }
                | StillsError::NoVideoStream
                | StillsError::VideoDecodeError(_)
                | StillsError::FfmpegError(_)
        )
    }
}

impl From<FfmpegError> for StillsError {
    fn from(error: FfmpegError) -> Self {
        StillsError::FfmpegError(error.to_string())
    }
}
