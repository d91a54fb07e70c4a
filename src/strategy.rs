//! Strategy selection and fallback.
//!
//! Extraction is attempted by an ordered list of [`ExtractionStrategy`]
//! implementations. Each returns a [`StrategyOutcome`]; the
//! [`StrategySelector`] moves on to the next strategy only when the current
//! one reports itself [`Unavailable`](StrategyOutcome::Unavailable).
//!
//! The default order is in-process decoding ([`LibraryStrategy`]) followed
//! by the `ffmpeg` tool ([`ToolStrategy`]).

use std::path::PathBuf;

use crate::{
    configuration::{ExtractionRequest, StrategyChoice},
    error::StillsError,
    external::extract_with_tool,
    library::extract_with_library,
};

/// The result of one strategy attempt.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// Frames were extracted; the count of files written.
    Success(usize),
    /// The strategy cannot run here; try the next one.
    Unavailable(String),
    /// The strategy ran and failed.
    Failure(StillsError),
}

/// One way of turning a request into frames on disk.
pub trait ExtractionStrategy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Best-effort strategies report a [`StrategyOutcome::Failure`] as an
    /// empty result instead of an error.
    fn best_effort(&self) -> bool {
        false
    }

    fn extract(&self, request: &ExtractionRequest) -> StrategyOutcome;
}

/// In-process decoding through the FFmpeg libraries.
///
/// Initialisation problems and decoding faults are reported as
/// [`StrategyOutcome::Unavailable`] so the next strategy gets a chance; any
/// other error (bad parameters, unwritable output) is a failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryStrategy;

impl ExtractionStrategy for LibraryStrategy {
    fn name(&self) -> &'static str {
        "library"
    }

    fn extract(&self, request: &ExtractionRequest) -> StrategyOutcome {
        match extract_with_library(request) {
            Ok(count) => StrategyOutcome::Success(count),
            Err(error) if error.triggers_fallback() => {
                StrategyOutcome::Unavailable(error.to_string())
            }
            Err(error) => StrategyOutcome::Failure(error),
        }
    }
}

/// The `ffmpeg` command-line tool. Best effort.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolStrategy;

impl ExtractionStrategy for ToolStrategy {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn best_effort(&self) -> bool {
        true
    }

    fn extract(&self, request: &ExtractionRequest) -> StrategyOutcome {
        match extract_with_tool(request) {
            Ok(count) => StrategyOutcome::Success(count),
            Err(error) => StrategyOutcome::Failure(error),
        }
    }
}

/// What an extraction run produced.
#[derive(Debug)]
pub struct ExtractionReport {
    /// Number of frame files written.
    pub extracted: usize,
    /// Name of the strategy that produced the result.
    pub strategy: &'static str,
    /// The output directory.
    pub output: PathBuf,
    /// Set when a best-effort strategy failed and `extracted` is zero
    /// because of it.
    pub failure: Option<StillsError>,
}

impl ExtractionReport {
    /// `true` if no strategy failure was recorded.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Process exit code for this report.
    ///
    /// A best-effort failure still exits `0` unless `strict` is set.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.failure.is_some() && strict { 1 } else { 0 }
    }
}

/// Runs strategies in order until one produces a result.
pub struct StrategySelector {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::for_choice(StrategyChoice::Auto)
    }
}

impl StrategySelector {
    /// A selector over an explicit list of strategies, tried in order.
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// The built-in strategy list for `choice`.
    pub fn for_choice(choice: StrategyChoice) -> Self {
        let strategies: Vec<Box<dyn ExtractionStrategy>> = match choice {
            StrategyChoice::Auto => vec![Box::new(LibraryStrategy), Box::new(ToolStrategy)],
            StrategyChoice::Library => vec![Box::new(LibraryStrategy)],
            StrategyChoice::Tool => vec![Box::new(ToolStrategy)],
        };
        Self::new(strategies)
    }

    /// Names of the strategies, in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    /// Extract frames for `request`.
    ///
    /// # Errors
    ///
    /// - [`StillsError::InvalidParameter`] before any strategy runs.
    /// - The error of a strategy that failed without being best effort.
    /// - [`StillsError::DependencyUnavailable`] if every strategy was
    ///   unavailable.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stills::{ExtractionRequest, StrategySelector};
    ///
    /// let request = ExtractionRequest::new("IMG_0343.MOV", "frames").with_interval(2.0);
    /// let report = StrategySelector::default().run(&request)?;
    /// println!("{} frames via {}", report.extracted, report.strategy);
    /// # Ok::<(), stills::StillsError>(())
    /// ```
    pub fn run(&self, request: &ExtractionRequest) -> Result<ExtractionReport, StillsError> {
        request.validate()?;

        let mut reasons: Vec<String> = Vec::new();
        for strategy in &self.strategies {
            log::debug!("Trying {} strategy", strategy.name());
            match strategy.extract(request) {
                StrategyOutcome::Success(extracted) => {
                    return Ok(ExtractionReport {
                        extracted,
                        strategy: strategy.name(),
                        output: request.output().to_path_buf(),
                        failure: None,
                    });
                }
                StrategyOutcome::Unavailable(reason) => {
                    log::warn!(
                        "{} strategy unavailable ({reason}), trying fallback",
                        strategy.name()
                    );
                    reasons.push(format!("{}: {reason}", strategy.name()));
                }
                StrategyOutcome::Failure(error) if strategy.best_effort() => {
                    log::error!("{} strategy failed: {error}", strategy.name());
                    return Ok(ExtractionReport {
                        extracted: 0,
                        strategy: strategy.name(),
                        output: request.output().to_path_buf(),
                        failure: Some(error),
                    });
                }
                StrategyOutcome::Failure(error) => return Err(error),
            }
        }

        Err(StillsError::DependencyUnavailable {
            reason: if reasons.is_empty() {
                "no extraction strategy configured".to_string()
            } else {
                reasons.join("; ")
            },
        })
    }
}
