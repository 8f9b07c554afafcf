// hexturn_protocol — wire vocabulary for hexturn multiplayer sessions.
//
// Shared by the turn reconciler (`hexturn_turns`), the relay connection
// (`hexturn_net`), and test relays. Has no dependency on game rules or the
// reconciler itself.
//
// Module overview:
// - `node.rs`:    `Node`, the config-like tree every relay message is made of.
// - `message.rs`: Top-level tags, `Inbound` classification, typed views of
//                 each message kind, and builders for outbound messages.
// - `types.rs`:   `SideNumber`, `Controller`, `Proxy`.
// - `framing.rs`: 4-byte big-endian length prefix + JSON payload over any
//                 `Read`/`Write`.
//
// Design decisions:
// - **Tree messages, typed views.** The relay forwards trees it does not
//   fully understand (whiteboard data, replay commands), so messages stay
//   generic `Node`s and kinds are recognized by tag on the receiving side.
// - **JSON payloads.** Readable in logs and captures; the framing layer is
//   format-agnostic if that ever needs to change.

pub mod framing;
pub mod message;
pub mod node;
pub mod types;

pub use framing::{MAX_FRAME_SIZE, read_frame, read_node, write_frame, write_node};
pub use message::{ChatMessage, ControllerChange, Inbound, SideDrop};
pub use node::Node;
pub use types::{Controller, Proxy, SideNumber, UnknownControllerType};
