// Message dispatch: one relay message in, one result code out.
//
// Each message is classified by its first recognized top-level child (see
// `hexturn_protocol::message::Inbound`) and routed to a handler. Malformed
// but harmless input (extra children, unknown kinds, bad turn bodies) is
// logged and skipped. Leave notices become `SyncError::LeftGame`.
//
// In chat-only mode only chat-class traffic is handled, plus leave notices,
// which end the session whatever frame is open. Everything else returns
// `CannotHandle` before any state is touched, so the outer frame can
// process it later.

use std::time::SystemTime;

use hexturn_protocol::message::{ChatMessage, Inbound, leave_reason, observer_name};
use hexturn_protocol::Node;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::ports::{ChatKind, ChatLine, UnsyncedContext};
use crate::reconciler::{NETWORK_TARGET, REPLAY_TARGET, TurnReconciler};
use crate::result::ProcessResult;

impl TurnReconciler<'_> {
    /// Dispatch a single relay message.
    pub fn dispatch(
        &mut self,
        message: &Node,
        chat_only: bool,
    ) -> Result<ProcessResult, SyncError> {
        if message.all_children_count() != 1 {
            warn!(
                target: NETWORK_TARGET,
                children = message.all_children_count(),
                "expected exactly one top-level child: {}",
                message.debug()
            );
        }
        if message.has_attributes() {
            warn!(target: NETWORK_TARGET, "ignoring top-level attributes: {}", message.debug());
        }
        if !self.ports.replay.at_end() {
            warn!(
                target: REPLAY_TARGET,
                "processing network data while still having data on the replay"
            );
        }

        let kind = Inbound::classify(message);
        let always_handled = matches!(kind, Inbound::Unknown | Inbound::LeaveGame(_));
        if chat_only && !kind.is_chat() && !always_handled {
            debug!(target: NETWORK_TARGET, "[{}] cannot be handled in chat-only mode", kind.tag());
            return Ok(ProcessResult::CannotHandle);
        }

        match kind {
            Inbound::Message(body) => {
                let chat = ChatMessage::from_node(body);
                self.add_chat(chat.sender, chat.side, chat.text, ChatKind::Public);
            }
            Inbound::Whisper(body) => {
                let chat = ChatMessage::from_node(body);
                let sender = format!("{}{}", self.config.whisper_prefix, chat.sender);
                self.add_chat(sender, 0, chat.text, ChatKind::Private);
            }
            Inbound::Observer(body) => {
                self.ports.chat.add_observer(observer_name(body));
            }
            Inbound::ObserverQuit(body) => {
                self.ports.chat.remove_observer(observer_name(body));
            }
            Inbound::LeaveGame(body) => {
                let reason = leave_reason(body).unwrap_or_default().to_owned();
                return Err(SyncError::LeftGame { reason });
            }
            Inbound::Turn(body) => return self.handle_turn(body),
            Inbound::Whiteboard(_) => {
                let context = UnsyncedContext::enter();
                self.ports.whiteboard.process_network_data(message, &context);
            }
            Inbound::ChangeController(body) => return self.handle_controller_change(body),
            Inbound::SideDrop(body) => return self.handle_side_drop(body),
            // The host ended linger mode in a campaign.
            Inbound::NotifyNextScenario => return Ok(ProcessResult::EndLinger),
            // This client is the new host.
            Inbound::HostTransfer => self.notify_host_transfer(),
            Inbound::Unknown => {
                warn!(target: NETWORK_TARGET, "found unknown command: {}", message.debug());
            }
        }
        Ok(ProcessResult::Continue)
    }

    /// Append the turn's single command to the replay, already marked as
    /// sent, and run it.
    fn handle_turn(&mut self, turn: &Node) -> Result<ProcessResult, SyncError> {
        if turn.all_children_count() != 1 {
            warn!(
                target: NETWORK_TARGET,
                "turn data must wrap exactly one entry, got {}: {}",
                turn.all_children_count(),
                turn.debug()
            );
            return Ok(ProcessResult::Continue);
        }
        self.ports.replay.append(turn, true);
        self.drain_replay()
    }

    fn add_chat(&mut self, sender: String, side: i64, text: String, kind: ChatKind) {
        self.ports.chat.add_chat_message(ChatLine {
            received_at: SystemTime::now(),
            sender,
            side,
            text,
            kind,
            bell: self.config.message_bell,
        });
    }
}
