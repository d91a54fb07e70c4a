//! Output file naming.
//!
//! Every extracted frame is named after the integer second it was sampled
//! at, both zero-padded and as a clock reading, e.g. `125.0` seconds becomes
//! `frame_000125s_0-02-05.jpg`. Both strategies use the same rule so a
//! directory can be filled by either one.

/// Whole seconds of a sample instant. Fractions are truncated; negative or
/// non-finite values map to zero.
pub fn whole_seconds(instant: f64) -> u64 {
    if instant.is_finite() && instant > 0.0 {
        instant.trunc() as u64
    } else {
        0
    }
}

/// Render whole seconds as `H-MM-SS`.
///
/// Hours are not padded and keep counting past 23.
pub fn clock_label(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{hours}-{minutes:02}-{seconds:02}")
}

/// File name for the frame sampled at `instant` seconds.
pub fn frame_file_name(instant: f64) -> String {
    let seconds = whole_seconds(instant);
    format!("frame_{seconds:06}s_{}.jpg", clock_label(seconds))
}

/// Returns `true` for the numbered names the `ffmpeg` tool writes
/// (`frame_000001.jpg`), as opposed to final timestamped names.
pub(crate) fn is_numbered_frame_name(name: &str) -> bool {
    name.strip_prefix("frame_")
        .and_then(|rest| rest.strip_suffix(".jpg"))
        .is_some_and(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit()))
}
