//! Progress reporting.
//!
//! [`ProgressCallback`] lets callers observe the library strategy as it walks
//! the planned sample instants. The CLI uses it to drive a progress bar.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stills::{ExtractionRequest, ProgressCallback, ProgressInfo, StrategySelector};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(total) = info.total {
//!             println!("{}/{total} at {:.1}s", info.current, info.instant);
//!         }
//!     }
//! }
//!
//! let request = ExtractionRequest::new("input.mp4", "frames")
//!     .with_progress(Arc::new(PrintProgress));
//! let report = StrategySelector::default().run(&request)?;
//! # Ok::<(), stills::StillsError>(())
//! ```

use std::path::PathBuf;

/// A snapshot of extraction progress, delivered once per sample instant.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many sample instants have been handled so far (written or skipped).
    pub current: u64,
    /// Total instants planned, if the range is bounded.
    pub total: Option<u64>,
    /// The sample instant just handled, in seconds.
    pub instant: f64,
    /// Destination file for this instant.
    pub path: PathBuf,
    /// `true` if the file already existed and was left untouched.
    pub skipped: bool,
}

impl ProgressInfo {
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub fn percentage(&self) -> Option<f32> {
        self.total
            .filter(|total| *total > 0)
            .map(|total| self.current as f32 / total as f32 * 100.0)
    }
}

/// Trait for receiving progress updates during extraction.
///
/// Progress callbacks are **infallible**: they observe but cannot halt the
/// operation.
pub trait ProgressCallback: Send + Sync {
    /// Called after each sample instant is handled.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}
