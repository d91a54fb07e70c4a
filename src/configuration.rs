//! Extraction configuration.
//!
//! [`ExtractionRequest`] is the single immutable value that carries every
//! setting of one extraction run. It is built once (by the CLI or a library
//! caller) and passed by reference to the strategy selector and from there to
//! whichever strategy runs.
//!
//! # Example
//!
//! ```no_run
//! use stills::ExtractionRequest;
//!
//! let request = ExtractionRequest::new("IMG_0343.MOV", "frames_2sec")
//!     .with_interval(2.0)
//!     .with_start(5.0)
//!     .with_end(Some(15.0))
//!     .with_quality(85)
//!     .with_overwrite(true);
//! request.validate()?;
//! # Ok::<(), stills::StillsError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use crate::{
    error::StillsError,
    progress::{NoOpProgress, ProgressCallback},
};

/// Default seconds between sampled frames.
pub const DEFAULT_INTERVAL: f64 = 1.0;
/// Default JPEG quality on the 1–100 scale.
pub const DEFAULT_QUALITY: u8 = 90;

/// Locations of the external FFmpeg command-line tools.
///
/// Both default to the bare program names, resolved through `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTools {
    /// The decoding tool used by the external-tool strategy.
    pub ffmpeg: PathBuf,
    /// The metadata tool used to probe the video duration.
    pub ffprobe: PathBuf,
}

impl Default for ExternalTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Which extraction strategies the selector may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyChoice {
    /// In-process decoding first, the `ffmpeg` tool as fallback.
    #[default]
    Auto,
    /// In-process decoding only.
    Library,
    /// The `ffmpeg` tool only.
    Tool,
}

impl FromStr for StrategyChoice {
    type Err = StillsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(StrategyChoice::Auto),
            "library" | "lib" => Ok(StrategyChoice::Library),
            "tool" | "ffmpeg" => Ok(StrategyChoice::Tool),
            other => Err(StillsError::InvalidParameter(format!(
                "unknown strategy '{other}' (expected auto, library, or tool)"
            ))),
        }
    }
}

/// Settings for one extraction run.
///
/// Construct with [`ExtractionRequest::new`] and refine with the `with_*`
/// builder methods. Times are in seconds.
#[derive(Clone)]
pub struct ExtractionRequest {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) interval: f64,
    pub(crate) start: f64,
    pub(crate) end: Option<f64>,
    pub(crate) quality: u8,
    pub(crate) overwrite: bool,
    pub(crate) tools: ExternalTools,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ExtractionRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractionRequest")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("interval", &self.interval)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("quality", &self.quality)
            .field("overwrite", &self.overwrite)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

impl ExtractionRequest {
    /// Create a request with default settings.
    ///
    /// Defaults: one frame per second from the start to the end of the video,
    /// JPEG quality 90, existing frames are kept.
    pub fn new<I: AsRef<Path>, O: AsRef<Path>>(input: I, output: O) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            interval: DEFAULT_INTERVAL,
            start: 0.0,
            end: None,
            quality: DEFAULT_QUALITY,
            overwrite: false,
            tools: ExternalTools::default(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Seconds between sampled frames. Must be greater than zero.
    #[must_use]
    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }

    /// Offset of the first sampled frame. Negative values are treated as zero.
    #[must_use]
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    /// Last instant to sample. `None` (or a value past the end of the video)
    /// means the video duration.
    #[must_use]
    pub fn with_end(mut self, end: Option<f64>) -> Self {
        self.end = end;
        self
    }

    /// JPEG quality on the 1–100 scale.
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Replace frames that already exist in the output directory.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Use custom `ffmpeg` / `ffprobe` binaries.
    #[must_use]
    pub fn with_tools(mut self, tools: ExternalTools) -> Self {
        self.tools = tools;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Check the parameters that no strategy can recover from.
    ///
    /// # Errors
    ///
    /// Returns [`StillsError::InvalidParameter`] if the interval is not a
    /// positive finite number or the quality is outside 1–100.
    pub fn validate(&self) -> Result<(), StillsError> {
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(StillsError::InvalidParameter(format!(
                "interval must be > 0 (got {})",
                self.interval
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(StillsError::InvalidParameter(format!(
                "quality must be between 1 and 100 (got {})",
                self.quality
            )));
        }
        Ok(())
    }

    /// The video to read.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Directory the frames are written to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Seconds between sampled instants.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Requested start time in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Requested end time in seconds, `None` for the end of the video.
    pub fn end(&self) -> Option<f64> {
        self.end
    }

    /// JPEG quality, 1 to 100.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Whether existing frames are replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Paths of the external `ffmpeg` and `ffprobe` binaries.
    pub fn tools(&self) -> &ExternalTools {
        &self.tools
    }
}
