// End-to-end tests over a real TCP connection.
//
// The test thread plays the relay: it accepts the host's connection and
// writes framed messages with `write_node`. The host side is a `Harness`
// whose reconciler reads from a `RelayInbox` and whose session sends
// through the matching `RelayOutbox`, so a side-drop decision travels back
// to the relay as a real `[change_controller]` frame.

use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use hexturn_net::{RelayConnectConfig, RelayInbox, connect};
use hexturn_protocol::message;
use hexturn_protocol::{Controller, SideNumber, read_node, write_node};
use hexturn_turns::{ProcessResult, SideRecord, SyncError};
use multiplayer_tests::{Harness, command};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Connect a host to a fresh relay socket.
fn start_session() -> (Harness, RelayInbox, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = RelayConnectConfig {
        addr: listener.local_addr().unwrap().to_string(),
        ..Default::default()
    };
    let (inbox, outbox) = connect(&config).unwrap();
    let (relay, _) = listener.accept().unwrap();
    relay.set_read_timeout(Some(TIMEOUT)).unwrap();

    let mut h = Harness::new(vec![
        SideRecord::new(SideNumber(1), Controller::Human, "me")
            .with_local(true)
            .with_team("north"),
        SideRecord::new(SideNumber(2), Controller::Human, "bob").with_team("north"),
        SideRecord::new(SideNumber(3), Controller::Human, "ann").with_team("north"),
    ]);
    h.session.outbox = Some(outbox);
    (h, inbox, relay)
}

/// Run sync passes until `done` holds or the deadline passes.
fn sync_until(
    h: &mut Harness,
    inbox: &mut RelayInbox,
    done: impl Fn(&Harness) -> bool,
) -> Result<ProcessResult, SyncError> {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        let result = h.reconciler_with(&mut *inbox).sync()?;
        if done(&*h) || !result.is_continue() {
            return Ok(result);
        }
        assert!(Instant::now() < deadline, "timed out waiting for relay traffic");
        thread::sleep(Duration::from_millis(10));
    }
}

// ---------------------------------------------------------------------------
// Test scenarios
// ---------------------------------------------------------------------------

/// Chat and turn data arrive, then bob drops. The host gives bob's side to
/// ann and the relay receives the transfer request.
#[test]
fn side_drop_round_trip() {
    let (mut h, mut inbox, mut relay) = start_session();
    h.prompt.answers.push_back(Some(0));

    write_node(&mut relay, &message::chat("bob", 2, "gotta go")).unwrap();
    write_node(&mut relay, &message::turn(command("move"))).unwrap();
    write_node(&mut relay, &message::side_drop(SideNumber(2), "human")).unwrap();

    let result = sync_until(&mut h, &mut inbox, |h| !h.session.sent.is_empty()).unwrap();
    assert_eq!(result, ProcessResult::Continue);

    assert_eq!(h.chat.lines.len(), 1);
    assert_eq!(h.replay.entries.len(), 1);
    assert!(h.replay.entries[0].1);
    assert_eq!(h.prompt.shown.len(), 1);

    let request = read_node(&mut relay).unwrap();
    assert_eq!(request, message::change_controller(SideNumber(2), "ann"));

    // The relay confirms; the side now belongs to ann.
    write_node(
        &mut relay,
        &message::controller_changed(SideNumber(2), false, "ann", "human"),
    )
    .unwrap();
    sync_until(&mut h, &mut inbox, |h| h.sides.get(2).current_player == "ann").unwrap();
    assert_eq!(h.sides.get(2).current_player, "ann");
}

/// A leave notice ends the session even if the relay then hangs up.
#[test]
fn leave_notice_then_hangup() {
    let (mut h, mut inbox, mut relay) = start_session();

    write_node(&mut relay, &message::leave_game(Some("host left"))).unwrap();
    drop(relay);

    let err = sync_until(&mut h, &mut inbox, |_| false).unwrap_err();
    assert_eq!(
        err,
        SyncError::LeftGame {
            reason: "host left".into()
        }
    );

    let deadline = Instant::now() + TIMEOUT;
    while !inbox.is_closed() {
        assert!(Instant::now() < deadline, "reader thread never stopped");
        thread::sleep(Duration::from_millis(10));
    }
}
