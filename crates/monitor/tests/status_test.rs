use pretty_assertions::assert_eq;
use teewatch_core::models::{CheckPhase, StatusEvent, StatusKind};
use teewatch_monitor::status::{StatusBoard, StatusSink};

#[test]
fn test_board_keeps_latest_event_per_request() {
    let board = StatusBoard::new();

    board.publish(StatusEvent::info("a1", CheckPhase::Searching, "Searching..."));
    board.publish(StatusEvent::success("a1", CheckPhase::Done, "2 tee times found"));
    board.publish(StatusEvent::error("a2", CheckPhase::Errored, "Agent error: timeout"));

    let latest = board.latest("a1").unwrap();
    assert_eq!(latest.kind, StatusKind::Success);
    assert_eq!(latest.message, "2 tee times found");
    assert_eq!(board.snapshot().len(), 2);
}

#[test]
fn test_clear_forgets_request() {
    let board = StatusBoard::new();
    board.publish(StatusEvent::info("a1", CheckPhase::Done, "No tee times found"));

    let cleared = board.clear("a1");

    assert!(cleared.is_some());
    assert_eq!(board.latest("a1"), None);
    assert_eq!(board.clear("a1"), None);
}

#[test]
fn test_clones_share_state() {
    let board = StatusBoard::new();
    let observer = board.clone();

    board.publish(StatusEvent::info("a1", CheckPhase::Searching, "Searching..."));

    assert_eq!(observer.latest("a1").map(|e| e.phase), Some(CheckPhase::Searching));
}
