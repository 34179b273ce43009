use crate::tail::process::terminate;
use crate::tail::{ExitKind, classify_exit};

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

#[test]
fn sigint_means_interrupted() {
    // Raw wait status: low seven bits carry the terminating signal.
    let status = ExitStatus::from_raw(2);

    assert_eq!(classify_exit(status), ExitKind::Interrupted);
}

#[test]
fn other_exits_are_unexpected() {
    assert_eq!(
        classify_exit(ExitStatus::from_raw(7 << 8)),
        ExitKind::Unexpected {
            code: Some(7),
            signal: None
        }
    );
    assert_eq!(
        classify_exit(ExitStatus::from_raw(0)),
        ExitKind::Unexpected {
            code: Some(0),
            signal: None
        }
    );
    assert_eq!(
        classify_exit(ExitStatus::from_raw(15)),
        ExitKind::Unexpected {
            code: None,
            signal: Some(15)
        }
    );
}

#[tokio::test]
async fn terminate_stops_a_cooperative_child_with_sigterm() {
    // Arrange
    let mut child = Command::new("sleep")
        .arg("30")
        .stdin(Stdio::null())
        .spawn()
        .unwrap();

    // Act
    let status = terminate(&mut child, Duration::from_secs(5)).await.unwrap();

    // Assert
    assert_eq!(status.signal(), Some(15));
}

#[tokio::test]
async fn terminate_kills_a_child_that_ignores_sigterm() {
    // Arrange
    let mut child = Command::new("sh")
        .args(["-c", "trap '' TERM; while :; do sleep 0.1; done"])
        .stdin(Stdio::null())
        .spawn()
        .unwrap();
    // Give the shell time to install the trap.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let started = Instant::now();

    // Act
    let status = terminate(&mut child, Duration::from_millis(200)).await.unwrap();

    // Assert
    assert_eq!(status.signal(), Some(9));
    assert!(started.elapsed() < Duration::from_secs(5));
}
