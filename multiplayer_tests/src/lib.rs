// Recording fakes for every collaborator the turn reconciler drives.
//
// `Harness` owns one fake per port plus a shared `CallLog`. Each fake
// appends a `Call` to the log when it is invoked, so tests can assert on the
// order of replay draining, network reads, and outbound flushes across
// collaborators. `Harness::reconciler` builds a `TurnReconciler` borrowing
// the fakes; drop it before inspecting their state.
//
// The fakes keep just enough behavior to be realistic: the replay derives
// its status from the commands it holds, the side registry applies
// controller changes and drops, and the session can forward `send` to a
// real `RelayOutbox` for end-to-end tests.
//
// See also: `tests/` for the scenarios.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hexturn_net::RelayOutbox;
use hexturn_protocol::message::COMMAND;
use hexturn_protocol::{Controller, Node, Proxy, SideNumber};
use hexturn_turns::{
    ChatLine, ChatSurface, DisplayView, NetworkReader, Ports, Prompt, ReplayLog, ReplaySender,
    ReplayStatus, SessionController, SideRecord, SideRegistry, SyncConfig, SyncError,
    TurnReconciler, UnsyncedContext, Whiteboard,
};

/// One observed collaborator call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    ApplyPending,
    Append { entry: Node, mark_as_sent: bool },
    Read(Node),
    SyncNonUndoable,
    CommitAndSync,
    SetController { side: SideNumber, is_local: bool, player: String, controller: Controller },
    DropTo { side: SideNumber, controller: Controller, proxy: Proxy },
    Send(Node),
    Autosave,
    NotObserver,
    Prompt,
}

#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    /// Position of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.0.borrow().iter().position(pred)
    }

    /// Position of the last call matching `pred`.
    pub fn last_position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.0.borrow().iter().rposition(pred)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Command markers the fake replay reacts to.
pub const END_TURN: &str = "end_turn";
pub const END_LEVEL: &str = "end_level";
pub const DEPENDENT: &str = "dependent";

/// Replay log whose status is derived from the commands it holds: a command
/// with an `end_turn`, `end_level`, or `dependent` child stops execution with
/// the matching status. `forced` overrides the next status outright.
#[derive(Default)]
pub struct FakeReplay {
    log: CallLog,
    pub entries: Vec<(Node, bool)>,
    applied: usize,
    pub forced: VecDeque<ReplayStatus>,
}

impl FakeReplay {
    /// Add an entry without logging, as if recorded locally and not yet run.
    pub fn preload(&mut self, entry: Node) {
        self.entries.push((entry, false));
    }

    pub fn applied(&self) -> usize {
        self.applied
    }
}

impl ReplayLog for FakeReplay {
    fn apply_pending(&mut self) -> ReplayStatus {
        self.log.push(Call::ApplyPending);
        if let Some(status) = self.forced.pop_front() {
            self.applied = self.entries.len();
            return status;
        }
        while self.applied < self.entries.len() {
            let command = self.entries[self.applied].0.child(COMMAND).cloned();
            self.applied += 1;
            let Some(command) = command else { continue };
            if command.has_child(END_TURN) {
                return ReplayStatus::FoundEndTurn;
            }
            if command.has_child(END_LEVEL) {
                return ReplayStatus::FoundEndLevel;
            }
            if command.has_child(DEPENDENT) {
                return ReplayStatus::FoundDependent;
            }
        }
        ReplayStatus::AtEnd
    }

    fn append(&mut self, entry: &Node, mark_as_sent: bool) {
        self.log.push(Call::Append {
            entry: entry.clone(),
            mark_as_sent,
        });
        self.entries.push((entry.clone(), mark_as_sent));
    }

    fn at_end(&self) -> bool {
        self.applied == self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Network and sender
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct QueueReader {
    log: CallLog,
    pub queue: VecDeque<Node>,
}

impl NetworkReader for QueueReader {
    fn try_read(&mut self) -> Option<Node> {
        let node = self.queue.pop_front()?;
        self.log.push(Call::Read(node.clone()));
        Some(node)
    }
}

#[derive(Default)]
pub struct RecordingSender {
    log: CallLog,
}

impl ReplaySender for RecordingSender {
    fn sync_non_undoable(&mut self) {
        self.log.push(Call::SyncNonUndoable);
    }

    fn commit_and_sync(&mut self) {
        self.log.push(Call::CommitAndSync);
    }
}

// ---------------------------------------------------------------------------
// Sides and session
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSides {
    log: CallLog,
    pub records: Vec<SideRecord>,
}

impl FakeSides {
    pub fn get(&self, side: i64) -> &SideRecord {
        &self.records[(side - 1) as usize]
    }

    fn slot(&mut self, side: SideNumber) -> Option<&mut SideRecord> {
        let index = side.index(self.records.len())?;
        self.records.get_mut(index)
    }
}

impl SideRegistry for FakeSides {
    fn team_count(&self) -> usize {
        self.records.len()
    }

    fn team_at(&self, index: usize) -> Option<&SideRecord> {
        self.records.get(index)
    }

    fn set_controller(
        &mut self,
        side: SideNumber,
        is_local: bool,
        player: &str,
        controller: Controller,
    ) {
        self.log.push(Call::SetController {
            side,
            is_local,
            player: player.to_owned(),
            controller,
        });
        if let Some(record) = self.slot(side) {
            record.is_local = is_local;
            record.current_player = player.to_owned();
            record.controller = controller;
        }
    }

    fn drop_to(&mut self, side: SideNumber, controller: Controller, proxy: Proxy) {
        self.log.push(Call::DropTo {
            side,
            controller,
            proxy,
        });
        if let Some(record) = self.slot(side) {
            record.controller = controller;
            record.proxy = proxy;
            record.is_local = true;
        }
    }
}

pub struct FakeSession {
    log: CallLog,
    pub networked: bool,
    pub linger: bool,
    pub next_scenario: bool,
    pub observer: bool,
    pub can_undo: bool,
    pub undo_blocked: bool,
    pub sent: Vec<Node>,
    /// When set, `send` also writes to a real relay connection.
    pub outbox: Option<RelayOutbox>,
}

impl FakeSession {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            networked: true,
            linger: false,
            next_scenario: false,
            observer: false,
            can_undo: false,
            undo_blocked: false,
            sent: Vec::new(),
            outbox: None,
        }
    }
}

impl SessionController for FakeSession {
    fn is_networked(&self) -> bool {
        self.networked
    }

    fn is_linger_mode(&self) -> bool {
        self.linger
    }

    fn has_next_scenario(&self) -> bool {
        self.next_scenario
    }

    fn is_observer(&self) -> bool {
        self.observer
    }

    fn on_not_observer(&mut self) {
        self.log.push(Call::NotObserver);
        self.observer = false;
    }

    fn do_autosave(&mut self) {
        self.log.push(Call::Autosave);
    }

    fn send(&mut self, message: Node) -> Result<(), SyncError> {
        self.log.push(Call::Send(message.clone()));
        if let Some(outbox) = &mut self.outbox {
            outbox
                .send(&message)
                .map_err(|e| SyncError::Transport(e.to_string()))?;
        }
        self.sent.push(message);
        Ok(())
    }

    fn can_undo(&self) -> bool {
        self.can_undo
    }

    fn undo_blocked(&self) -> bool {
        self.undo_blocked
    }
}

// ---------------------------------------------------------------------------
// Prompt, display, chat, whiteboard
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShownPrompt {
    pub title: String,
    pub message: String,
    pub options: Vec<String>,
}

/// Answers prompts from a script; an exhausted script cancels.
#[derive(Default)]
pub struct ScriptedPrompt {
    log: CallLog,
    pub answers: VecDeque<Option<usize>>,
    pub shown: Vec<ShownPrompt>,
}

impl Prompt for ScriptedPrompt {
    fn show(&mut self, title: &str, message: &str, options: &[String]) -> Option<usize> {
        self.log.push(Call::Prompt);
        self.shown.push(ShownPrompt {
            title: title.to_owned(),
            message: message.to_owned(),
            options: options.to_vec(),
        });
        self.answers.pop_front().flatten()
    }
}

pub struct FakeDisplay {
    pub playing: SideNumber,
    pub viewing: SideNumber,
    pub rerenders: usize,
    pub label_recalcs: usize,
}

impl Default for FakeDisplay {
    fn default() -> Self {
        Self {
            playing: SideNumber(1),
            viewing: SideNumber(1),
            rerenders: 0,
            label_recalcs: 0,
        }
    }
}

impl DisplayView for FakeDisplay {
    fn playing_side(&self) -> SideNumber {
        self.playing
    }

    fn viewing_side(&self) -> SideNumber {
        self.viewing
    }

    fn set_viewing_side(&mut self, side: SideNumber) {
        self.viewing = side;
    }

    fn queue_rerender(&mut self) {
        self.rerenders += 1;
    }

    fn recalculate_labels(&mut self) {
        self.label_recalcs += 1;
    }
}

#[derive(Default)]
pub struct FakeChat {
    pub lines: Vec<ChatLine>,
    pub observers: Vec<String>,
}

impl ChatSurface for FakeChat {
    fn add_chat_message(&mut self, line: ChatLine) {
        self.lines.push(line);
    }

    fn add_observer(&mut self, name: &str) {
        self.observers.push(name.to_owned());
    }

    fn remove_observer(&mut self, name: &str) {
        self.observers.retain(|o| o != name);
    }

    fn observers(&self) -> Vec<String> {
        self.observers.clone()
    }
}

#[derive(Default)]
pub struct FakeWhiteboard {
    pub data: Vec<Node>,
    pub changes: Vec<(SideNumber, SideRecord)>,
}

impl Whiteboard for FakeWhiteboard {
    fn process_network_data(&mut self, message: &Node, _context: &UnsyncedContext) {
        self.data.push(message.clone());
    }

    fn on_change_controller(&mut self, side: SideNumber, record: &SideRecord) {
        self.changes.push((side, record.clone()));
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub log: CallLog,
    pub replay: FakeReplay,
    pub network: QueueReader,
    pub sender: RecordingSender,
    pub sides: FakeSides,
    pub session: FakeSession,
    pub prompt: ScriptedPrompt,
    pub display: FakeDisplay,
    pub chat: FakeChat,
    pub whiteboard: FakeWhiteboard,
    pub config: SyncConfig,
}

impl Harness {
    pub fn new(records: Vec<SideRecord>) -> Self {
        let log = CallLog::default();
        Self {
            replay: FakeReplay {
                log: log.clone(),
                ..FakeReplay::default()
            },
            network: QueueReader {
                log: log.clone(),
                queue: VecDeque::new(),
            },
            sender: RecordingSender { log: log.clone() },
            sides: FakeSides {
                log: log.clone(),
                records,
            },
            session: FakeSession::new(log.clone()),
            prompt: ScriptedPrompt {
                log: log.clone(),
                ..ScriptedPrompt::default()
            },
            display: FakeDisplay::default(),
            chat: FakeChat::default(),
            whiteboard: FakeWhiteboard::default(),
            config: SyncConfig::default(),
            log,
        }
    }

    /// Side 1 is ours (local human), side 2 is a remote human on the
    /// other team.
    pub fn two_sides() -> Self {
        Self::new(vec![
            SideRecord::new(SideNumber(1), Controller::Human, "me").with_local(true),
            SideRecord::new(SideNumber(2), Controller::Human, "bob"),
        ])
    }

    /// Queue an inbound relay message.
    pub fn push(&mut self, message: Node) {
        self.network.queue.push_back(message);
    }

    pub fn reconciler(&mut self) -> TurnReconciler<'_> {
        let ports = Ports {
            replay: &mut self.replay,
            network: &mut self.network,
            sender: &mut self.sender,
            sides: &mut self.sides,
            session: &mut self.session,
            prompt: &mut self.prompt,
            display: &mut self.display,
            chat: &mut self.chat,
            whiteboard: &mut self.whiteboard,
        };
        TurnReconciler::new(ports, self.config.clone())
    }

    /// Like `reconciler`, but reading from another network source.
    pub fn reconciler_with<'a>(
        &'a mut self,
        network: &'a mut dyn NetworkReader,
    ) -> TurnReconciler<'a> {
        let ports = Ports {
            replay: &mut self.replay,
            network,
            sender: &mut self.sender,
            sides: &mut self.sides,
            session: &mut self.session,
            prompt: &mut self.prompt,
            display: &mut self.display,
            chat: &mut self.chat,
            whiteboard: &mut self.whiteboard,
        };
        TurnReconciler::new(ports, self.config.clone())
    }
}

/// A plain command wrapping a single named action.
pub fn command(action: &str) -> Node {
    Node::new().with_child(action, Node::new())
}
