use crate::server::ShutdownHandle;
use crate::tail::supervisor::{LineRead, decode_line, read_bounded_line};
use crate::tail::{FollowCommand, TailSupervisor};
use crate::zone::ZoneCommand;

use nix::sys::signal::kill;
use nix::unistd::Pid;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn script(body: &str) -> FollowCommand {
    FollowCommand::new("sh", vec!["-c".to_string(), body.to_string()])
}

async fn next_line(rx: &mut mpsc::Receiver<ZoneCommand>) -> String {
    let cmd = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a line")
        .expect("channel closed");
    match cmd {
        ZoneCommand::Line(line) => line,
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn decode_line_trims_and_drops_blank_lines() {
    assert_eq!(
        decode_line("site1", b"{\"status\":200}\r\n"),
        Some("{\"status\":200}".to_string())
    );
    assert_eq!(decode_line("site1", b"\n"), None);
    assert_eq!(decode_line("site1", b"   \n"), None);
}

#[test]
fn decode_line_drops_invalid_utf8() {
    assert_eq!(decode_line("site1", b"\xff\xfe{\"status\":200}\n"), None);
}

#[tokio::test]
async fn bounded_read_skips_overlong_lines_and_keeps_going() {
    // Arrange
    let mut input: &[u8] = b"short\n0123456789abcdef\nexactly8\ntail";
    let mut buf = Vec::new();

    // Act
    let first = read_bounded_line(&mut input, &mut buf, 8).await.unwrap();
    let first_line = buf.clone();
    let second = read_bounded_line(&mut input, &mut buf, 8).await.unwrap();
    let second_buf = buf.clone();
    let third = read_bounded_line(&mut input, &mut buf, 8).await.unwrap();
    let third_line = buf.clone();
    let fourth = read_bounded_line(&mut input, &mut buf, 8).await.unwrap();
    let fourth_line = buf.clone();
    let fifth = read_bounded_line(&mut input, &mut buf, 8).await.unwrap();

    // Assert
    assert_eq!(first, LineRead::Line);
    assert_eq!(first_line, b"short\n".to_vec());
    assert_eq!(second, LineRead::TooLong(17));
    assert!(second_buf.is_empty());
    assert_eq!(third, LineRead::Line);
    assert_eq!(third_line, b"exactly8\n".to_vec());
    assert_eq!(fourth, LineRead::Line);
    assert_eq!(fourth_line, b"tail".to_vec());
    assert_eq!(fifth, LineRead::Eof);
}

#[tokio::test]
async fn overlong_line_from_follow_process_is_dropped() {
    // Arrange
    let shutdown = ShutdownHandle::new();
    let (tx, mut rx) = mpsc::channel(16);
    let follow = script(
        r#"head -c 100000 /dev/zero | tr '\0' x; echo; echo '{"status":200}'; exec sleep 30"#,
    );
    let supervisor = TailSupervisor::new(
        "site1",
        "/dev/null",
        follow,
        Duration::from_millis(50),
        tx,
        shutdown.signal(),
    );
    let task = tokio::spawn(supervisor.run());

    // Act
    let line = next_line(&mut rx).await;
    shutdown.trigger();
    let joined = tokio::time::timeout(Duration::from_secs(5), task).await;

    // Assert
    assert_eq!(line, r#"{"status":200}"#);
    assert!(matches!(joined, Ok(Ok(()))));
}

#[tokio::test]
async fn forwards_stdout_lines_in_order() {
    // Arrange
    let shutdown = ShutdownHandle::new();
    let (tx, mut rx) = mpsc::channel(16);
    let follow = script(r#"printf '{"status":200}\n\n{"status":404}\n'; exec sleep 30"#);
    let supervisor = TailSupervisor::new(
        "site1",
        "/dev/null",
        follow,
        Duration::from_millis(50),
        tx,
        shutdown.signal(),
    );
    let task = tokio::spawn(supervisor.run());

    // Act
    let first = next_line(&mut rx).await;
    let second = next_line(&mut rx).await;
    shutdown.trigger();
    let joined = tokio::time::timeout(Duration::from_secs(5), task).await;

    // Assert
    assert_eq!(first, r#"{"status":200}"#);
    assert_eq!(second, r#"{"status":404}"#);
    assert!(matches!(joined, Ok(Ok(()))));
}

#[tokio::test]
async fn restarts_after_unexpected_exit() {
    // Arrange
    let shutdown = ShutdownHandle::new();
    let (tx, mut rx) = mpsc::channel(16);
    let follow = script(r#"echo '{"status":503}'; exit 7"#);
    let supervisor = TailSupervisor::new(
        "site1",
        "/dev/null",
        follow,
        Duration::from_millis(50),
        tx,
        shutdown.signal(),
    );
    let task = tokio::spawn(supervisor.run());

    // Act
    let lines = vec![
        next_line(&mut rx).await,
        next_line(&mut rx).await,
        next_line(&mut rx).await,
    ];
    shutdown.trigger();
    let joined = tokio::time::timeout(Duration::from_secs(5), task).await;

    // Assert
    assert_eq!(lines, vec![r#"{"status":503}"#; 3]);
    assert!(matches!(joined, Ok(Ok(()))));
}

#[tokio::test]
async fn spawn_failures_are_retried_until_shutdown() {
    // Arrange
    let shutdown = ShutdownHandle::new();
    let (tx, _rx) = mpsc::channel(16);
    let follow = FollowCommand::new("/nonexistent/zonestat-follow", Vec::new());
    let supervisor = TailSupervisor::new(
        "site1",
        "/dev/null",
        follow,
        Duration::from_millis(20),
        tx,
        shutdown.signal(),
    );
    let task = tokio::spawn(supervisor.run());
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Act
    let still_running = !task.is_finished();
    shutdown.trigger();
    let joined = tokio::time::timeout(Duration::from_secs(5), task).await;

    // Assert
    assert!(still_running);
    assert!(matches!(joined, Ok(Ok(()))));
}

#[tokio::test]
async fn shutdown_terminates_and_reaps_the_follow_process() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("follow.pid");
    let follow = script(&format!("echo $$ > {}; exec sleep 30", pid_file.display()));
    let shutdown = ShutdownHandle::new();
    let (tx, _rx) = mpsc::channel(16);
    let supervisor = TailSupervisor::new(
        "site1",
        "/dev/null",
        follow,
        Duration::from_millis(50),
        tx,
        shutdown.signal(),
    );
    let task = tokio::spawn(supervisor.run());

    let mut pid = None;
    for _ in 0..200 {
        if let Ok(raw) = std::fs::read_to_string(&pid_file) {
            if let Ok(p) = raw.trim().parse::<i32>() {
                pid = Some(p);
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let pid = Pid::from_raw(pid.expect("follow process never wrote its pid"));

    // Act
    shutdown.trigger();
    let joined = tokio::time::timeout(Duration::from_secs(5), task).await;

    // Assert
    assert!(matches!(joined, Ok(Ok(()))));
    assert!(kill(pid, None).is_err(), "follow process still exists");
}

#[tokio::test]
async fn stops_when_the_zone_channel_closes() {
    // Arrange
    let shutdown = ShutdownHandle::new();
    let (tx, rx) = mpsc::channel(16);
    drop(rx);
    let follow = script(r#"echo '{"status":200}'; exec sleep 30"#);
    let supervisor = TailSupervisor::new(
        "site1",
        "/dev/null",
        follow,
        Duration::from_millis(50),
        tx,
        shutdown.signal(),
    );

    // Act
    let joined = tokio::time::timeout(Duration::from_secs(5), supervisor.run()).await;

    // Assert
    assert!(joined.is_ok());
}
