// Integration tests for `TurnReconciler::sync`, the once-per-tick pass.
//
// Covers ordering (replay, then inbound, then outbound), how far a pass
// reads before stopping, the undo-aware flush, and the terminal errors a
// pass can surface.

use hexturn_protocol::SideNumber;
use hexturn_protocol::message;
use hexturn_turns::{ErrorClass, ProcessResult, ReplayStatus, SyncError};
use multiplayer_tests::{Call, END_LEVEL, END_TURN, Harness, command};

fn is_flush(call: &Call) -> bool {
    matches!(call, Call::CommitAndSync | Call::SyncNonUndoable)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Every inbound message is read and applied before anything goes out.
#[test]
fn receives_before_sending() {
    let mut h = Harness::two_sides();
    h.push(message::chat("bob", 2, "hi"));
    h.push(message::turn(command("move")));
    h.push(message::observer_joined("olga"));

    let result = h.reconciler().sync().unwrap();
    assert_eq!(result, ProcessResult::Continue);

    let calls = h.log.calls();
    assert_eq!(calls.first(), Some(&Call::ApplyPending));
    assert_eq!(calls.last(), Some(&Call::CommitAndSync));
    assert_eq!(h.log.count(is_flush), 1);
    let last_read = h.log.last_position(|c| matches!(c, Call::Read(_))).unwrap();
    let last_append = h.log.last_position(|c| matches!(c, Call::Append { .. })).unwrap();
    let flush = h.log.position(is_flush).unwrap();
    assert!(last_read < flush);
    assert!(last_append < flush);

    assert_eq!(h.chat.lines.len(), 1);
    assert_eq!(h.chat.observers, vec!["olga".to_owned()]);
    assert_eq!(h.replay.entries.len(), 1);
    assert!(h.network.queue.is_empty());
}

/// An empty network still flushes once.
#[test]
fn idle_pass_flushes() {
    let mut h = Harness::two_sides();
    let result = h.reconciler().sync().unwrap();
    assert_eq!(result, ProcessResult::Continue);
    assert_eq!(h.log.calls(), vec![Call::ApplyPending, Call::CommitAndSync]);
}

/// Outside a networked session only the replay is drained.
#[test]
fn local_session_only_drains_replay() {
    let mut h = Harness::two_sides();
    h.session.networked = false;
    h.replay.preload(command("move"));
    h.push(message::chat("bob", 2, "unread"));

    let result = h.reconciler().sync().unwrap();
    assert_eq!(result, ProcessResult::Continue);
    assert_eq!(h.log.calls(), vec![Call::ApplyPending]);
    assert_eq!(h.replay.applied(), 1);
    assert_eq!(h.network.queue.len(), 1);
}

// ---------------------------------------------------------------------------
// Stopping
// ---------------------------------------------------------------------------

/// A turn that ends the current turn stops the read loop; later messages
/// stay queued for the next pass. Outbound data is still flushed.
#[test]
fn end_turn_stops_reading() {
    let mut h = Harness::two_sides();
    h.push(message::turn(command(END_TURN)));
    h.push(message::chat("bob", 2, "later"));

    let result = h.reconciler().sync().unwrap();
    assert_eq!(result, ProcessResult::EndTurn);
    assert_eq!(h.network.queue.len(), 1);
    assert!(h.chat.lines.is_empty());
    assert_eq!(h.log.calls().last(), Some(&Call::CommitAndSync));
}

/// A pending local entry that ends the level short-circuits the whole
/// pass before any network read.
#[test]
fn replay_result_skips_network() {
    let mut h = Harness::two_sides();
    h.replay.preload(command(END_LEVEL));
    h.push(message::chat("bob", 2, "unread"));

    let result = h.reconciler().sync().unwrap();
    assert_eq!(result, ProcessResult::EndLevel);
    assert_eq!(h.log.count(|c| matches!(c, Call::Read(_))), 0);
    assert_eq!(h.log.count(is_flush), 1);
}

#[test]
fn next_scenario_notice_ends_linger() {
    let mut h = Harness::two_sides();
    h.session.linger = true;
    h.push(message::notify_next_scenario());
    h.push(message::chat("bob", 2, "unread"));

    let result = h.reconciler().sync().unwrap();
    assert_eq!(result, ProcessResult::EndLinger);
    assert_eq!(h.network.queue.len(), 1);
}

/// `process_network_data_from_reader` stops on the first result that
/// ends processing and never flushes.
#[test]
fn reader_pass_stops_without_flushing() {
    let mut h = Harness::two_sides();
    h.push(message::chat("bob", 2, "one"));
    h.push(message::controller_changed(SideNumber(1), false, "bob", "human"));
    h.push(message::chat("bob", 2, "two"));

    let result = h
        .reconciler()
        .process_network_data_from_reader(false)
        .unwrap();
    // Side 1 is playing and was ours, so losing it restarts the turn.
    assert_eq!(result, ProcessResult::RestartTurn);
    assert_eq!(h.chat.lines.len(), 1);
    assert_eq!(h.network.queue.len(), 1);
    assert_eq!(h.log.count(is_flush), 0);
}

// ---------------------------------------------------------------------------
// Flushing
// ---------------------------------------------------------------------------

#[test]
fn undoable_actions_are_held_back() {
    let mut h = Harness::two_sides();
    h.session.can_undo = true;
    h.reconciler().sync().unwrap();
    assert_eq!(h.log.calls().last(), Some(&Call::SyncNonUndoable));
}

/// Once undo is blocked (e.g. something random was revealed) everything
/// goes out.
#[test]
fn blocked_undo_sends_everything() {
    let mut h = Harness::two_sides();
    h.session.can_undo = true;
    h.session.undo_blocked = true;
    h.reconciler().sync().unwrap();
    assert_eq!(h.log.calls().last(), Some(&Call::CommitAndSync));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn leave_notice_with_reason() {
    let mut h = Harness::two_sides();
    h.push(message::leave_game(Some("kicked")));

    let err = h.reconciler().sync().unwrap_err();
    assert_eq!(
        err,
        SyncError::LeftGame {
            reason: "kicked".into()
        }
    );
    assert_eq!(err.class(), ErrorClass::SessionEnded);
    assert_eq!(h.log.count(is_flush), 0);
}

#[test]
fn leave_notice_without_reason() {
    let mut h = Harness::two_sides();
    h.push(message::leave_game(None));

    let err = h.reconciler().sync().unwrap_err();
    assert_eq!(err, SyncError::LeftGame { reason: String::new() });
}

/// A replay status the reconciler has no mapping for is an internal
/// failure, reported before any network work.
#[test]
fn unmapped_replay_status_fails_pass() {
    let mut h = Harness::two_sides();
    h.replay
        .forced
        .push_back(ReplayStatus::Other("desynced".into()));
    h.push(message::chat("bob", 2, "unread"));

    let err = h.reconciler().sync().unwrap_err();
    assert_eq!(err, SyncError::UnmappedReplayStatus("desynced".into()));
    assert_eq!(err.class(), ErrorClass::Internal);
    assert_eq!(h.log.calls(), vec![Call::ApplyPending]);
}

/// A side drop naming a side that does not exist is a protocol error.
#[test]
fn unknown_dropped_side_is_protocol_error() {
    let mut h = Harness::two_sides();
    h.push(message::side_drop(SideNumber(9), "human"));

    let err = h.reconciler().sync().unwrap_err();
    assert!(matches!(err, SyncError::Protocol { .. }));
    assert_eq!(err.class(), ErrorClass::Recoverable);
}
