//! Runs the `ladder-engine` binary against shell-script stand-ins for
//! ffprobe and ffmpeg.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assert_cmd::assert::Assert;
use assert_cmd::prelude::*;
use ladder_backend::workers::progress::{Activity, infer_activity};
use predicates::prelude::*;

/// Get a command for the engine binary
#[allow(deprecated)]
fn engine_cmd() -> Command {
    Command::cargo_bin("ladder-engine").unwrap()
}

const SOURCE_BYTES: &[u8] = b"original source";

/// Fake ffmpeg: writes its last argument, failing for any height listed in `FAIL_HEIGHTS`.
const FFMPEG_SCRIPT: &str = r#"for arg; do last="$arg"; done
for h in $FAIL_HEIGHTS; do
  case "$*" in *"scale=-2:$h "*) echo "encoder error at ${h}p" >&2; exit 1;; esac
done
printf 'encoded' > "$last"
"#;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::create_dir(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("clip.mp4"), SOURCE_BYTES).unwrap();
        Self { dir }
    }

    fn tool(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join("bin").join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn probe_reporting(&self, height: &str) -> PathBuf {
        self.tool("ffprobe", &format!("echo {height}\n"))
    }

    fn ffmpeg(&self) -> PathBuf {
        self.tool("ffmpeg", FFMPEG_SCRIPT)
    }

    fn source(&self) -> PathBuf {
        self.dir.path().join("clip.mp4")
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.path().join("clip")
    }

    fn run(&self, ffprobe: &Path, ffmpeg: &Path, fail_heights: &str) -> Assert {
        engine_cmd()
            .arg(self.source())
            .env("FFPROBE_BIN", ffprobe)
            .env("FFMPEG_BIN", ffmpeg)
            .env("FAIL_HEIGHTS", fail_heights)
            .assert()
    }

    fn outputs(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.output_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

fn activities(output: &Output) -> Vec<Activity> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(infer_activity)
        .collect()
}

#[test]
fn encodes_every_rung_below_the_source() {
    let ws = Workspace::new();
    let assert = ws.run(&ws.probe_reporting("480"), &ws.ffmpeg(), "").success();

    assert_eq!(
        ws.outputs(),
        vec!["clip 144.mp4", "clip 240.mp4", "clip 360.mp4", "clip 480.mp4"]
    );
    assert_eq!(
        std::fs::read(ws.output_dir().join("clip 480.mp4")).unwrap(),
        SOURCE_BYTES
    );
    assert_eq!(
        std::fs::read(ws.output_dir().join("clip 360.mp4")).unwrap(),
        b"encoded"
    );

    assert_eq!(
        activities(assert.get_output()),
        vec![
            Activity::Probed(480),
            Activity::Started("360p".into()),
            Activity::Finished("360p".into()),
            Activity::Started("240p".into()),
            Activity::Finished("240p".into()),
            Activity::Started("144p".into()),
            Activity::Finished("144p".into()),
            Activity::Finalizing,
        ]
    );
}

#[test]
fn smallest_source_keeps_only_the_original() {
    let ws = Workspace::new();
    ws.run(&ws.probe_reporting("144"), &ws.ffmpeg(), "")
        .success()
        .stdout(predicate::str::contains(
            "No subordinate qualities to process for 144p video.",
        ));

    assert_eq!(ws.outputs(), vec!["clip 144.mp4"]);
}

#[test]
fn failed_rung_is_reported_and_the_ladder_continues() {
    let ws = Workspace::new();
    ws.run(&ws.probe_reporting("480"), &ws.ffmpeg(), "240")
        .code(1)
        .stdout(predicate::str::contains("✗ 240p failed"))
        .stdout(predicate::str::contains("✓ 144p completed"))
        .stdout(predicate::str::contains("Processing complete"))
        .stderr(predicate::str::contains("encoder error at 240p"));

    assert_eq!(ws.outputs(), vec!["clip 144.mp4", "clip 360.mp4", "clip 480.mp4"]);
}

#[test]
fn unavailable_encoder_fails_every_rung_without_stopping() {
    let ws = Workspace::new();
    let missing = ws.dir.path().join("bin").join("no-such-ffmpeg");
    let assert = ws
        .run(&ws.probe_reporting("480"), &missing, "")
        .code(1)
        .stdout(predicate::str::contains("Processing complete"));

    assert_eq!(ws.outputs(), vec!["clip 480.mp4"]);

    let failed: Vec<Activity> = activities(assert.get_output())
        .into_iter()
        .filter(|a| matches!(a, Activity::RenditionFailed(_)))
        .collect();
    assert_eq!(
        failed,
        vec![
            Activity::RenditionFailed("360p".into()),
            Activity::RenditionFailed("240p".into()),
            Activity::RenditionFailed("144p".into()),
        ]
    );
}

#[test]
fn probe_failure_exits_with_code_2() {
    let ws = Workspace::new();
    let ffprobe = ws.tool("ffprobe", "echo 'moov atom not found' >&2\nexit 1\n");
    ws.run(&ffprobe, &ws.ffmpeg(), "").code(2);

    assert!(!ws.output_dir().exists());
}

#[test]
fn zero_height_is_a_probe_failure() {
    let ws = Workspace::new();
    ws.run(&ws.probe_reporting("0"), &ws.ffmpeg(), "").code(2);

    assert!(!ws.output_dir().exists());
}

#[test]
fn missing_source_exits_with_code_1() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.source()).unwrap();

    ws.run(&ws.probe_reporting("480"), &ws.ffmpeg(), "")
        .code(1)
        .stderr(predicate::str::contains("File does not exist"));
}

#[test]
fn usage_error_without_arguments() {
    engine_cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage:"));
}
