//! # stills
//!
//! Extract still frames from a video at fixed time intervals, writing one
//! timestamped JPEG per sampled instant.
//!
//! Frames are decoded in-process through FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and encoded
//! with [`image`]. When the libraries cannot handle the input, extraction
//! falls back to running the `ffmpeg` command-line tool.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stills::{ExtractionRequest, StrategySelector};
//!
//! // One frame every 2 seconds between 0:05 and 0:15.
//! let request = ExtractionRequest::new("IMG_0343.MOV", "frames_2sec")
//!     .with_interval(2.0)
//!     .with_start(5.0)
//!     .with_end(Some(15.0));
//!
//! let report = StrategySelector::default().run(&request)?;
//! println!("Extracted {} frames to {}", report.extracted, report.output.display());
//! # Ok::<(), stills::StillsError>(())
//! ```
//!
//! Files are named after the integer second they were sampled at:
//! `frame_000125s_0-02-05.jpg` for 125 seconds in.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build the crate. The
//! fallback strategy additionally expects `ffmpeg` and `ffprobe` on `PATH`
//! (or configured through [`ExternalTools`]).

pub mod configuration;
mod conversion;
pub mod error;
pub mod external;
pub mod ffmpeg;
pub mod library;
pub mod naming;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod strategy;

pub use configuration::{ExternalTools, ExtractionRequest, StrategyChoice};
pub use error::StillsError;
pub use external::{extract_with_tool, quality_to_qscale};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use library::{FrameSource, VideoClip, encode_jpeg, extract_with_library, write_frames};
pub use naming::frame_file_name;
pub use planner::{SampleInstants, SamplePlan};
pub use probe::probe_duration;
pub use progress::{ProgressCallback, ProgressInfo};
pub use strategy::{
    ExtractionReport, ExtractionStrategy, LibraryStrategy, StrategyOutcome, StrategySelector,
    ToolStrategy,
};
