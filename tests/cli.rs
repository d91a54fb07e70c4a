//! End-to-end tests of the `stills` binary: exit codes and printed summary.

use std::{
    path::Path,
    process::{Command, Output},
};

fn stills(arguments: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stills"))
        .args(arguments)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run stills")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("Temp path is not UTF-8")
}

#[test]
fn missing_input_exits_one_without_output() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = temporary_directory.path().join("missing.mov");
    let output = temporary_directory.path().join("frames");

    let result = stills(&[path_str(&input), path_str(&output)]);

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains(&format!("Input file '{}' not found", input.display())),
        "{stderr}"
    );
    assert!(!output.exists());
}

#[test]
fn invalid_quality_is_a_usage_error() {
    let result = stills(&["clip.mp4", "frames", "--quality", "0"]);
    assert!(!result.status.success());
}

#[cfg(unix)]
mod with_fake_ffmpeg {
    use std::{
        fs,
        os::unix::fs::PermissionsExt,
        path::{Path, PathBuf},
    };

    use super::{path_str, stills};

    fn write_script(directory: &Path, name: &str, body: &str) -> PathBuf {
        let path = directory.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark script executable");
        path
    }

    struct Setup {
        _directory: tempfile::TempDir,
        input: PathBuf,
        output: PathBuf,
        ffmpeg: PathBuf,
        ffprobe: PathBuf,
    }

    fn setup(ffmpeg_body: &str) -> Setup {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let input = directory.path().join("clip.mp4");
        fs::write(&input, b"not decoded by the fake tool").unwrap();
        let ffprobe = write_script(directory.path(), "ffprobe", "echo 10.000000");
        let ffmpeg = write_script(directory.path(), "ffmpeg", ffmpeg_body);
        Setup {
            output: directory.path().join("frames"),
            _directory: directory,
            input,
            ffmpeg,
            ffprobe,
        }
    }

    const WRITES_SIX_FRAMES: &str = "for last; do :; done\n\
        i=1\n\
        while [ $i -le 6 ]; do\n\
        : > \"$(printf \"$last\" $i)\"\n\
        i=$((i + 1))\n\
        done";

    const FAILS: &str = "echo 'clip.mp4: Invalid data found when processing input' >&2\nexit 1";

    fn run(setup: &Setup, extra: &[&str]) -> std::process::Output {
        let mut arguments = vec![
            path_str(&setup.input),
            path_str(&setup.output),
            "--interval",
            "2",
            "--strategy",
            "tool",
            "--ffmpeg",
            path_str(&setup.ffmpeg),
            "--ffprobe",
            path_str(&setup.ffprobe),
        ];
        arguments.extend_from_slice(extra);
        stills(&arguments)
    }

    #[test]
    fn success_prints_count_and_exits_zero() {
        let setup = setup(WRITES_SIX_FRAMES);
        let result = run(&setup, &[]);

        assert_eq!(result.status.code(), Some(0));
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert!(
            stdout.contains(&format!(
                "Extracted 6 frame(s) to {}",
                setup.output.display()
            )),
            "{stdout}"
        );
        assert!(setup.output.join("frame_000010s_0-00-10.jpg").exists());
    }

    #[test]
    fn json_summary() {
        let setup = setup(WRITES_SIX_FRAMES);
        let result = run(&setup, &["--json"]);

        assert_eq!(result.status.code(), Some(0));
        let summary: serde_json::Value =
            serde_json::from_slice(&result.stdout).expect("Output is not JSON");
        assert_eq!(summary["extracted"], 6);
        assert_eq!(summary["strategy"], "ffmpeg");
        assert!(summary["error"].is_null());
    }

    #[test]
    fn failing_tool_exit_code_depends_on_strict() {
        let setup = setup(FAILS);

        let lenient = run(&setup, &[]);
        assert_eq!(lenient.status.code(), Some(0));
        assert!(String::from_utf8_lossy(&lenient.stdout).contains("Extracted 0 frame(s)"));
        assert!(String::from_utf8_lossy(&lenient.stderr).contains("Invalid data found"));

        let strict = run(&setup, &["--strict"]);
        assert_eq!(strict.status.code(), Some(1));
    }
}
