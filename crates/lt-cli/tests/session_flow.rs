//! End-to-end tests for a complete recording session.
//!
//! Drives the session loop with scripted input and a fixed clock, and
//! smoke-tests the spawned binary over piped stdio.

use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

use anyhow::Result;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tempfile::TempDir;

use lt_cli::{Session, StartTimeSource};
use lt_core::SessionClock;

fn lt_binary() -> String {
    env!("CARGO_BIN_EXE_lt").to_string()
}

fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 19, 0, 0).unwrap()
}

struct FixedStart(DateTime<Utc>);

impl StartTimeSource for FixedStart {
    fn live_stream_start(&self, _video_id: &str) -> Result<DateTime<Utc>> {
        Ok(self.0)
    }
}

/// Runs a scripted session where each tag line lands `step` seconds
/// after the previous one.
fn run_session<S: StartTimeSource>(source: Option<S>, step: i64, script: &str) -> String {
    let mut session = Session::new(SessionClock::started_at(session_start()), source);
    let mut input = Cursor::new(script.to_string());
    let mut output = Vec::new();
    let mut elapsed = 0;
    session
        .run_with(&mut input, &mut output, move || {
            elapsed += step;
            session_start() + TimeDelta::seconds(elapsed)
        })
        .unwrap();
    String::from_utf8(output).unwrap()
}

/// A full operator session: record, collide, move, edit, bulk-shift,
/// delete, and flush out.
#[test]
fn test_full_session_flow() {
    let script = "\
national anthem
first pitch
foul ball into the stands
!adjust -2
!edit_back 2 first pitch, called strike
!offset 60 30 150
!delete_back 3
!flush
y
";
    let output = run_session::<FixedStart>(None, 60, script);

    // Tags land at 1:00, 2:00, 3:00.
    assert!(output.contains("1:00 national anthem"));
    assert!(output.contains("2:00 first pitch"));
    assert!(output.contains("3:00 foul ball into the stands"));

    // Point mutations report old and new positions.
    assert!(output.contains("Tag at 3:00 now at 2:58"));
    assert!(output.contains("Tag at 2:00 now reads 'first pitch, cal...'"));

    // Bulk shift moves the two tags in [60, 150).
    assert!(output.contains("30 second offset applied to 2 tags"));

    // The anthem tag moved to 1:30 and was then deleted as the oldest.
    assert!(output.contains("Deleted tag: 1:30 national anthem"));

    // Final flush shows the surviving tags in ascending order.
    let flush = output
        .rsplit_once("----\n")
        .map(|(head, _)| head)
        .and_then(|head| head.rsplit_once("----\n"))
        .map(|(_, tail)| tail)
        .unwrap();
    assert_eq!(
        flush,
        "2:30 first pitch, called strike\n2:58 foul ball into the stands\n"
    );
}

/// Same-second tags relocate forward instead of overwriting.
#[test]
fn test_same_second_tags_do_not_collide() {
    let script = "double down the line\nrun scores\n!flush\ny\n";
    let output = run_session::<FixedStart>(None, 0, script);

    assert!(output.contains("0:00 double down the line"));
    assert!(output.contains("0:01 run scores"));
}

/// A start-time correction shifts recorded tags and later stamps.
#[test]
fn test_correction_realigns_session() {
    let source = FixedStart(session_start() - TimeDelta::seconds(45));
    let script = "warmup ends\n!yt_start https://youtu.be/dQw4w9WgXcQ\ny\nkickoff\n!flush\ny\n";
    let output = run_session(Some(source), 10, script);

    assert!(output.contains("0:10 warmup ends"));
    assert!(output.contains("Start time adjusted by 45"));
    assert!(output.contains("45 second offset applied to 1 tags"));
    // 20s into the session, 65s after the corrected start.
    assert!(output.contains("1:05 kickoff"));
    assert!(output.contains("0:55 warmup ends\n1:05 kickoff"));
}

/// The binary exits cleanly on a confirmed quit.
#[test]
fn test_binary_quits_on_confirmation() {
    let temp = TempDir::new().unwrap();
    let mut child = Command::new(lt_binary())
        .env("HOME", temp.path())
        .env_remove("LT_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn lt");

    child
        .stdin
        .as_mut()
        .expect("stdin piped")
        .write_all(b"!quit\ny\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "lt should exit cleanly: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Finished? "));
}

/// EOF on stdin ends the session without an error.
#[test]
fn test_binary_handles_eof() {
    let temp = TempDir::new().unwrap();
    let output = Command::new(lt_binary())
        .env("HOME", temp.path())
        .env_remove("LT_API_KEY")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run lt");
    assert!(output.status.success());
}
