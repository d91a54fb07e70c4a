//! Frame extraction through the `ffmpeg` command-line tool.
//!
//! This strategy runs a single `ffmpeg` invocation that samples the video
//! with an `fps=1/<interval>` filter and writes numbered JPEGs
//! (`frame_000001.jpg`, ...). The numbered files are then renamed in order to
//! their timestamped names. It needs nothing but an `ffmpeg` binary, which
//! makes it the fallback when in-process decoding is unavailable.
//!
//! Unlike the library strategy it always overwrites: `ffmpeg` is run with
//! `-y` and the renames replace existing targets.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{
    configuration::ExtractionRequest,
    error::StillsError,
    naming::{frame_file_name, is_numbered_frame_name},
    planner::SamplePlan,
    probe::probe_duration,
};

/// Output pattern handed to `ffmpeg`, relative to the output directory.
pub const NUMBERED_PATTERN: &str = "frame_%06d.jpg";

/// Stderr lines kept in an [`StillsError::ExternalTool`] reason.
const STDERR_TAIL_LINES: usize = 5;

/// Map a 1–100 JPEG quality onto `ffmpeg`'s inverted 1–31 `-q:v` scale.
pub fn quality_to_qscale(quality: u8) -> u8 {
    let scaled = 32 - i32::from(quality) / 3;
    scaled.clamp(1, 31) as u8
}

/// Build the `ffmpeg` argument list for a plan.
///
/// `-ss` is only passed for a positive start and `-t` only when the plan has
/// a known end after the start.
pub fn ffmpeg_arguments(
    request: &ExtractionRequest,
    plan: &SamplePlan,
    pattern: &Path,
) -> Vec<OsString> {
    let mut arguments: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error"]
        .into_iter()
        .map(OsString::from)
        .collect();

    if plan.start() > 0.0 {
        arguments.push("-ss".into());
        arguments.push(plan.start().to_string().into());
    }

    arguments.push("-i".into());
    arguments.push(request.input().as_os_str().to_owned());

    if let Some(span) = plan.span() {
        arguments.push("-t".into());
        arguments.push(span.to_string().into());
    }

    arguments.push("-vf".into());
    arguments.push(format!("fps=1/{}", plan.interval()).into());
    arguments.push("-q:v".into());
    arguments.push(quality_to_qscale(request.quality()).to_string().into());
    arguments.push(pattern.as_os_str().to_owned());
    arguments
}

/// Extract frames by running `ffmpeg` once and renaming its output.
///
/// Returns the number of frames renamed into place.
///
/// # Errors
///
/// - [`StillsError::InvalidParameter`] for a bad interval or quality, before
///   anything touches the filesystem.
/// - [`StillsError::ExternalTool`] if `ffmpeg` cannot be started or fails.
/// - [`StillsError::IoError`] if the output directory cannot be created,
///   listed, or renamed into.
pub fn extract_with_tool(request: &ExtractionRequest) -> Result<usize, StillsError> {
    request.validate()?;

    let duration = probe_duration(request.tools(), request.input());
    let plan = SamplePlan::new(
        request.start(),
        request.end(),
        request.interval(),
        duration,
    )?;

    if plan.is_empty() {
        log::info!(
            "Nothing to extract: start {:.3}s is past end {:?}",
            plan.start(),
            plan.end()
        );
        return Ok(0);
    }

    fs::create_dir_all(request.output())?;

    let pattern = request.output().join(NUMBERED_PATTERN);
    let arguments = ffmpeg_arguments(request, &plan, &pattern);
    run_ffmpeg(&request.tools().ffmpeg, &arguments)?;

    let renamed = rename_numbered_frames(request.output(), &plan)?;
    log::info!(
        "ffmpeg extracted {renamed} frame(s) into {}",
        request.output().display()
    );
    Ok(renamed)
}

fn run_ffmpeg(program: &Path, arguments: &[OsString]) -> Result<(), StillsError> {
    let tool = program.display().to_string();
    log::debug!(
        "Running {tool} {}",
        arguments
            .iter()
            .map(|argument| argument.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = Command::new(program)
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|error| StillsError::ExternalTool {
            tool: tool.clone(),
            reason: error.to_string(),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.trim().is_empty()).collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("; ");
    let reason = if tail.is_empty() {
        format!("exited with {}", output.status)
    } else {
        format!("exited with {}: {tail}", output.status)
    };
    Err(StillsError::ExternalTool { tool, reason })
}

/// Rename the numbered files in `directory` to timestamped names.
///
/// The i-th file in name order receives the name for `plan.instant(i)`.
pub(crate) fn rename_numbered_frames(
    directory: &Path,
    plan: &SamplePlan,
) -> Result<usize, StillsError> {
    let mut numbered: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let is_numbered = entry
            .file_name()
            .to_str()
            .is_some_and(is_numbered_frame_name);
        if is_numbered && entry.file_type()?.is_file() {
            numbered.push(entry.path());
        }
    }
    numbered.sort();

    for (index, path) in numbered.iter().enumerate() {
        let target = directory.join(frame_file_name(plan.instant(index)));
        log::debug!("{} -> {}", path.display(), target.display());
        fs::rename(path, &target)?;
    }

    Ok(numbered.len())
}
