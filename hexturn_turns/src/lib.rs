// hexturn_turns — the turn reconciler for networked hexturn sessions.
//
// Keeps the local replay and the relay's message stream in agreement: drains
// pending replay entries, dispatches relay messages in order, negotiates
// control of sides whose players left, and tells the game loop whether to
// continue, end the turn or level, or restart the turn.
//
// Module overview:
// - `reconciler.rs`: `TurnReconciler`, the sync pass (receive, then send),
//                    the deferred queue, and `ModalScope` for chat-only
//                    processing while a prompt is open.
// - `dispatch.rs`:   Per-message routing and chat-only filtering.
// - `controller.rs`: `[change_controller]` handling and viewpoint updates.
// - `side_drop.rs`:  `[side_drop]` handling, `TransferChoice` prompt layout.
// - `ports.rs`:      Collaborator traits (replay, network, sender, sides,
//                    session, prompt, display, chat, whiteboard) and `Ports`.
// - `side.rs`:       `SideRecord`, per-side control metadata.
// - `result.rs`:     `ProcessResult`, `ReplayStatus`, and their mapping.
// - `error.rs`:      `SyncError`, the terminal conditions of a pass.
// - `config.rs`:     `SyncConfig`, chat and prompt text.
//
// Everything runs on the simulation thread. The reconciler borrows its
// collaborators for its own lifetime and never blocks except inside
// `Prompt::show`.

pub mod config;
mod controller;
mod dispatch;
pub mod error;
pub mod ports;
pub mod reconciler;
pub mod result;
pub mod side;
pub mod side_drop;

pub use config::{PromptText, SyncConfig};
pub use error::{ErrorClass, SyncError};
pub use ports::{
    ChatKind, ChatLine, ChatSurface, DisplayView, NetworkReader, Ports, Prompt, ReplayLog,
    ReplaySender, SessionController, SideRegistry, UnsyncedContext, Whiteboard,
};
pub use reconciler::{ModalScope, TurnReconciler};
pub use result::{ProcessResult, ReplayStatus};
pub use side::SideRecord;
pub use side_drop::{TransferAction, TransferChoice};
