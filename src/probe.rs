//! Video duration probing.
//!
//! The external-tool strategy has no decoder of its own to ask for the
//! duration, so it runs `ffprobe` and reads the container-level duration.
//! The duration only serves to clamp the end of the sampling range: when it
//! cannot be determined, extraction carries on without it.

use std::{path::Path, process::Command};

use crate::{configuration::ExternalTools, error::StillsError};

/// Probe the container duration of `input`, in seconds.
///
/// Returns `None` (and logs a warning) if `ffprobe` cannot be run, exits
/// unsuccessfully, or prints something that is not a duration.
///
/// # Example
///
/// ```no_run
/// use stills::{ExternalTools, probe_duration};
///
/// match probe_duration(&ExternalTools::default(), "IMG_0343.MOV".as_ref()) {
///     Some(seconds) => println!("{seconds:.2}s"),
///     None => println!("duration unknown"),
/// }
/// ```
pub fn probe_duration(tools: &ExternalTools, input: &Path) -> Option<f64> {
    match run_probe(tools, input) {
        Ok(seconds) => {
            log::debug!("Probed duration of {}: {seconds:.3}s", input.display());
            Some(seconds)
        }
        Err(error) => {
            log::warn!("Could not get video duration: {error}");
            None
        }
    }
}

fn run_probe(tools: &ExternalTools, input: &Path) -> Result<f64, StillsError> {
    let tool = tools.ffprobe.display().to_string();
    let output = Command::new(&tools.ffprobe)
        .args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"])
        .arg(input)
        .output()
        .map_err(|error| StillsError::ExternalTool {
            tool: tool.clone(),
            reason: error.to_string(),
        })?;

    if !output.status.success() {
        return Err(StillsError::ExternalTool {
            tool,
            reason: format!("exited with {}", output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_duration_output(&stdout).ok_or_else(|| StillsError::ExternalTool {
        tool,
        reason: format!("unexpected duration output {:?}", stdout.trim()),
    })
}

/// Parse the `csv=p=0` duration output of `ffprobe`.
///
/// Accepts a single non-negative finite number surrounded by whitespace;
/// `N/A` and anything else yield `None`.
pub fn parse_duration_output(output: &str) -> Option<f64> {
    output
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parses_plain_duration() {
        assert_eq!(parse_duration_output("10.000000\n"), Some(10.0));
        assert_eq!(parse_duration_output("  125.48\r\n"), Some(125.48));
    }

    #[test]
    fn rejects_unusable_output() {
        assert_eq!(parse_duration_output(""), None);
        assert_eq!(parse_duration_output("N/A\n"), None);
        assert_eq!(parse_duration_output("-1.0"), None);
        assert_eq!(parse_duration_output("inf"), None);
        assert_eq!(parse_duration_output("10.0\n12.0\n"), None);
    }

    #[test]
    fn missing_tool_yields_unknown() {
        let tools = ExternalTools {
            ffprobe: PathBuf::from("/nonexistent/stills-test/ffprobe"),
            ..ExternalTools::default()
        };
        assert_eq!(probe_duration(&tools, Path::new("video.mp4")), None);
    }
}
