// Collaborator contracts the reconciler drives.
//
// The reconciler owns none of these. The game hands it `&mut dyn` borrows
// through `Ports` for the lifetime of one `TurnReconciler`, which keeps game
// state out of globals and lets tests substitute recording fakes (see the
// `multiplayer_tests` crate).
//
// All calls happen on the simulation thread. Nothing here blocks except
// `Prompt::show`, which waits for the local user.

use std::time::SystemTime;

use hexturn_protocol::{Controller, Node, Proxy, SideNumber};

use crate::error::SyncError;
use crate::result::ReplayStatus;
use crate::side::SideRecord;

/// Ordered action history shared with the other clients.
pub trait ReplayLog {
    /// Apply every pending entry and report where execution stopped.
    fn apply_pending(&mut self) -> ReplayStatus;
    /// Append a received entry. `mark_as_sent` keeps the outbound sender
    /// from transmitting it again.
    fn append(&mut self, entry: &Node, mark_as_sent: bool);
    /// True when no entry is waiting to be applied.
    fn at_end(&self) -> bool;
}

/// Inbound relay traffic. Must never block.
pub trait NetworkReader {
    fn try_read(&mut self) -> Option<Node>;
}

/// Batches and transmits locally recorded actions.
pub trait ReplaySender {
    /// Send only actions that can no longer be undone.
    fn sync_non_undoable(&mut self);
    /// Commit the undo stack and send everything.
    fn commit_and_sync(&mut self);
}

/// Per-side control metadata.
pub trait SideRegistry {
    fn team_count(&self) -> usize;
    /// Record at a 0-based slot.
    fn team_at(&self, index: usize) -> Option<&SideRecord>;
    fn set_controller(
        &mut self,
        side: SideNumber,
        is_local: bool,
        player: &str,
        controller: Controller,
    );
    /// Take over a dropped side locally with the given proxy.
    fn drop_to(&mut self, side: SideNumber, controller: Controller, proxy: Proxy);

    fn side(&self, side: SideNumber) -> Option<&SideRecord> {
        self.team_at(side.index(self.team_count())?)
    }
}

/// Session-level state and actions owned by the play controller.
pub trait SessionController {
    fn is_networked(&self) -> bool;
    /// The scenario has ended and the session is kept open for review.
    fn is_linger_mode(&self) -> bool;
    /// A next scenario is queued (campaigns).
    fn has_next_scenario(&self) -> bool;
    /// No side is played on this client.
    fn is_observer(&self) -> bool;
    /// The client now plays at least one side.
    fn on_not_observer(&mut self);
    fn do_autosave(&mut self);
    /// Send a message to the relay.
    fn send(&mut self, message: Node) -> Result<(), SyncError>;
    /// Local actions that could still be undone are recorded.
    fn can_undo(&self) -> bool;
    /// Undo is administratively disabled for the current action.
    fn undo_blocked(&self) -> bool;
}

/// Single-choice dialog.
pub trait Prompt {
    /// Returns the selected index, or `None` if the user cancelled.
    fn show(&mut self, title: &str, message: &str, options: &[String]) -> Option<usize>;
}

/// The local map view.
pub trait DisplayView {
    /// Side whose turn is running.
    fn playing_side(&self) -> SideNumber;
    /// Side whose viewpoint is shown.
    fn viewing_side(&self) -> SideNumber;
    fn set_viewing_side(&mut self, side: SideNumber);
    fn queue_rerender(&mut self);
    fn recalculate_labels(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Public,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLine {
    pub received_at: SystemTime,
    pub sender: String,
    pub side: i64,
    pub text: String,
    pub kind: ChatKind,
    pub bell: bool,
}

/// Chat log and observer roster.
pub trait ChatSurface {
    fn add_chat_message(&mut self, line: ChatLine);
    fn add_observer(&mut self, name: &str);
    fn remove_observer(&mut self, name: &str);
    fn observers(&self) -> Vec<String>;
}

/// Proof that a call runs outside synced (replayed) execution. Only the
/// reconciler constructs one.
#[derive(Debug)]
pub struct UnsyncedContext(());

impl UnsyncedContext {
    pub(crate) fn enter() -> Self {
        UnsyncedContext(())
    }
}

/// Planned-move overlay shared between allies.
pub trait Whiteboard {
    fn process_network_data(&mut self, message: &Node, context: &UnsyncedContext);
    fn on_change_controller(&mut self, side: SideNumber, record: &SideRecord);
}

/// Borrowed collaborators for one reconciler.
pub struct Ports<'a> {
    pub replay: &'a mut dyn ReplayLog,
    pub network: &'a mut dyn NetworkReader,
    pub sender: &'a mut dyn ReplaySender,
    pub sides: &'a mut dyn SideRegistry,
    pub session: &'a mut dyn SessionController,
    pub prompt: &'a mut dyn Prompt,
    pub display: &'a mut dyn DisplayView,
    pub chat: &'a mut dyn ChatSurface,
    pub whiteboard: &'a mut dyn Whiteboard,
}
