// Relay message vocabulary.
//
// Every message from the relay is a `Node` with one top-level child whose
// name selects the kind. `Inbound::classify` picks the first child whose
// name is recognized, so a malformed message carrying extra children still
// resolves to something sensible; callers decide whether to warn about the
// extra children.
//
// Typed views (`ChatMessage`, `ControllerChange`, `SideDrop`, ...) read the
// attributes of the relevant child. They never fail: missing attributes
// read as empty strings or zero, and validation (side bounds, controller
// strings) is left to the reconciler, which knows the side count.
//
// The builder functions at the bottom produce the same shapes. The client
// uses `change_controller` to hand a dropped side to another player; the
// rest are used by relays and tests.

use crate::node::Node;
use crate::types::SideNumber;

pub const MESSAGE: &str = "message";
pub const WHISPER: &str = "whisper";
pub const OBSERVER: &str = "observer";
pub const OBSERVER_QUIT: &str = "observer_quit";
pub const LEAVE_GAME: &str = "leave_game";
pub const TURN: &str = "turn";
pub const WHITEBOARD: &str = "whiteboard";
pub const CHANGE_CONTROLLER: &str = "change_controller";
pub const SIDE_DROP: &str = "side_drop";
pub const NOTIFY_NEXT_SCENARIO: &str = "notify_next_scenario";
pub const HOST_TRANSFER: &str = "host_transfer";

/// Replay entry tag inside a turn.
pub const COMMAND: &str = "command";
/// Chat action inside a command.
pub const SPEAK: &str = "speak";

/// The kind of an inbound relay message, borrowing the relevant child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Inbound<'a> {
    Message(&'a Node),
    Whisper(&'a Node),
    Observer(&'a Node),
    ObserverQuit(&'a Node),
    LeaveGame(&'a Node),
    Turn(&'a Node),
    Whiteboard(&'a Node),
    ChangeController(&'a Node),
    SideDrop(&'a Node),
    NotifyNextScenario,
    HostTransfer,
    Unknown,
}

impl<'a> Inbound<'a> {
    /// Classify by the first recognized top-level child.
    pub fn classify(message: &'a Node) -> Self {
        message
            .children()
            .find_map(|(name, child)| Self::from_tag(name, child))
            .unwrap_or(Inbound::Unknown)
    }

    fn from_tag(name: &str, child: &'a Node) -> Option<Self> {
        let kind = match name {
            MESSAGE => Inbound::Message(child),
            WHISPER => Inbound::Whisper(child),
            OBSERVER => Inbound::Observer(child),
            OBSERVER_QUIT => Inbound::ObserverQuit(child),
            LEAVE_GAME => Inbound::LeaveGame(child),
            TURN => Inbound::Turn(child),
            WHITEBOARD => Inbound::Whiteboard(child),
            CHANGE_CONTROLLER => Inbound::ChangeController(child),
            SIDE_DROP => Inbound::SideDrop(child),
            NOTIFY_NEXT_SCENARIO => Inbound::NotifyNextScenario,
            HOST_TRANSFER => Inbound::HostTransfer,
            _ => return None,
        };
        Some(kind)
    }

    /// Chat-class traffic is safe to process while a modal prompt is open.
    /// A turn only counts when its command is a `speak` action.
    pub fn is_chat(&self) -> bool {
        match self {
            Inbound::Message(_)
            | Inbound::Whisper(_)
            | Inbound::Observer(_)
            | Inbound::ObserverQuit(_) => true,
            Inbound::Turn(turn) => is_speak_turn(turn),
            _ => false,
        }
    }

    /// Wire tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Inbound::Message(_) => MESSAGE,
            Inbound::Whisper(_) => WHISPER,
            Inbound::Observer(_) => OBSERVER,
            Inbound::ObserverQuit(_) => OBSERVER_QUIT,
            Inbound::LeaveGame(_) => LEAVE_GAME,
            Inbound::Turn(_) => TURN,
            Inbound::Whiteboard(_) => WHITEBOARD,
            Inbound::ChangeController(_) => CHANGE_CONTROLLER,
            Inbound::SideDrop(_) => SIDE_DROP,
            Inbound::NotifyNextScenario => NOTIFY_NEXT_SCENARIO,
            Inbound::HostTransfer => HOST_TRANSFER,
            Inbound::Unknown => "unknown",
        }
    }
}

/// True if the turn body's command is a chat `speak` action.
pub fn is_speak_turn(turn: &Node) -> bool {
    turn.child(COMMAND).is_some_and(|command| command.has_child(SPEAK))
}

/// Public or private chat line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub side: i64,
    pub text: String,
}

impl ChatMessage {
    pub fn from_node(node: &Node) -> Self {
        Self {
            sender: node.attr_or_empty("sender").to_owned(),
            side: node.attr_int("side", 0),
            text: node.attr_or_empty("message").to_owned(),
        }
    }
}

/// Relay-assigned controller for a side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerChange {
    pub side: SideNumber,
    pub is_local: bool,
    pub player: String,
    pub controller: String,
}

impl ControllerChange {
    pub fn from_node(node: &Node) -> Self {
        Self {
            side: SideNumber(node.attr_int("side", 0)),
            is_local: node.attr_bool("is_local", false),
            player: node.attr_or_empty("player").to_owned(),
            controller: node.attr_or_empty("controller").to_owned(),
        }
    }
}

/// A side's player left; only the host receives this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideDrop {
    pub side: SideNumber,
    pub controller: String,
}

impl SideDrop {
    pub fn from_node(node: &Node) -> Self {
        Self {
            side: SideNumber(node.attr_int("side_num", 0)),
            controller: node.attr_or_empty("controller").to_owned(),
        }
    }
}

/// Reason attached to a leave notice, `None` if the relay gave none.
pub fn leave_reason(node: &Node) -> Option<&str> {
    node.attr("reason")
}

/// Observer name from an `observer` / `observer_quit` child.
pub fn observer_name(node: &Node) -> &str {
    node.attr_or_empty("name")
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn wrap(tag: &str, child: Node) -> Node {
    Node::new().with_child(tag, child)
}

/// Ask the relay to give `side` to `player`.
pub fn change_controller(side: SideNumber, player: &str) -> Node {
    wrap(
        CHANGE_CONTROLLER,
        Node::new().with_attr("side", side.0).with_attr("player", player),
    )
}

/// Relay-side notice that `side` now belongs to `player`.
pub fn controller_changed(
    side: SideNumber,
    is_local: bool,
    player: &str,
    controller: &str,
) -> Node {
    wrap(
        CHANGE_CONTROLLER,
        Node::new()
            .with_attr("side", side.0)
            .with_attr("is_local", if is_local { "yes" } else { "no" })
            .with_attr("player", player)
            .with_attr("controller", controller),
    )
}

pub fn chat(sender: &str, side: i64, text: &str) -> Node {
    wrap(
        MESSAGE,
        Node::new()
            .with_attr("sender", sender)
            .with_attr("side", side)
            .with_attr("message", text),
    )
}

pub fn whisper(sender: &str, text: &str) -> Node {
    wrap(
        WHISPER,
        Node::new().with_attr("sender", sender).with_attr("message", text),
    )
}

pub fn observer_joined(name: &str) -> Node {
    wrap(OBSERVER, Node::new().with_attr("name", name))
}

pub fn observer_quit(name: &str) -> Node {
    wrap(OBSERVER_QUIT, Node::new().with_attr("name", name))
}

pub fn leave_game(reason: Option<&str>) -> Node {
    let mut body = Node::new();
    if let Some(reason) = reason {
        body.set_attr("reason", reason);
    }
    wrap(LEAVE_GAME, body)
}

/// Turn data wrapping a single command.
pub fn turn(command: Node) -> Node {
    wrap(TURN, Node::new().with_child(COMMAND, command))
}

/// A command whose only action is a chat line.
pub fn speak_command(sender: &str, text: &str) -> Node {
    Node::new().with_child(
        SPEAK,
        Node::new().with_attr("id", sender).with_attr("message", text),
    )
}

pub fn side_drop(side: SideNumber, controller: &str) -> Node {
    wrap(
        SIDE_DROP,
        Node::new()
            .with_attr("side_num", side.0)
            .with_attr("controller", controller),
    )
}

pub fn notify_next_scenario() -> Node {
    wrap(NOTIFY_NEXT_SCENARIO, Node::new())
}

pub fn host_transfer() -> Node {
    wrap(HOST_TRANSFER, Node::new())
}

pub fn whiteboard(data: Node) -> Node {
    wrap(WHITEBOARD, data)
}
