// The turn reconciler: top-level sync pass.
//
// `TurnReconciler::sync` is called once per game loop tick. It drains the
// local replay, then (in networked sessions) reads and dispatches relay
// messages until one of them needs the caller's attention, and only then
// flushes locally recorded actions to the relay. Receiving before sending
// matters: if we sent the end of our turn first, data for the turn that is
// ending could cross it in flight.
//
// Messages that cannot be handled in the current mode (chat-only) are not
// lost: they go to the front of `deferred` and are delivered before any new
// network traffic on the next pass.
//
// Message handling itself lives in `dispatch.rs`, `controller.rs` and
// `side_drop.rs`; `ModalScope` below is the only way to process traffic
// while a caller-side modal prompt is open.

use std::collections::VecDeque;

use hexturn_protocol::Node;
use tracing::{debug, error};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::ports::Ports;
use crate::result::ProcessResult;

pub(crate) const NETWORK_TARGET: &str = "hexturn::network";
pub(crate) const REPLAY_TARGET: &str = "hexturn::replay";

pub struct TurnReconciler<'a> {
    pub(crate) ports: Ports<'a>,
    pub(crate) config: SyncConfig,
    deferred: VecDeque<Node>,
    host_transfer_listeners: Vec<Box<dyn FnMut() + 'a>>,
}

impl<'a> TurnReconciler<'a> {
    pub fn new(ports: Ports<'a>, config: SyncConfig) -> Self {
        Self {
            ports,
            config,
            deferred: VecDeque::new(),
            host_transfer_listeners: Vec::new(),
        }
    }

    /// Drain the replay, process queued relay traffic, then flush outbound
    /// actions.
    pub fn sync(&mut self) -> Result<ProcessResult, SyncError> {
        // Nothing should be left on the replay after this.
        let mut result = self.drain_replay()?;
        if self.ports.session.is_networked() {
            while result.is_continue() {
                let Some(message) = self.next_message() else {
                    break;
                };
                result = self.dispatch_queued(message, false)?;
            }
            self.send_data();
        }
        Ok(result)
    }

    /// Read and dispatch messages until one returns something other than
    /// `Continue`, without flushing outbound data.
    pub fn process_network_data_from_reader(
        &mut self,
        chat_only: bool,
    ) -> Result<ProcessResult, SyncError> {
        while let Some(message) = self.next_message() {
            let result = self.dispatch_queued(message, chat_only)?;
            if result.ends_processing() {
                return Ok(result);
            }
        }
        Ok(ProcessResult::Continue)
    }

    /// Enter a modal section. Until the returned scope is dropped, only
    /// chat-class traffic can be processed.
    pub fn modal(&mut self) -> ModalScope<'_, 'a> {
        debug!(target: NETWORK_TARGET, "entering modal scope, chat-only dispatch");
        ModalScope { reconciler: self }
    }

    /// Register a callback for when this client becomes the host.
    pub fn on_host_transfer(&mut self, listener: impl FnMut() + 'a) {
        self.host_transfer_listeners.push(Box::new(listener));
    }

    /// Messages held back by chat-only dispatch.
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Flush outbound actions. Everything goes out unless some local action
    /// can still be undone, in which case only the non-undoable prefix is
    /// sent.
    pub(crate) fn send_data(&mut self) {
        let session = &self.ports.session;
        let send_everything = !session.can_undo() || session.undo_blocked();
        if send_everything {
            self.ports.sender.commit_and_sync();
        } else {
            self.ports.sender.sync_non_undoable();
        }
    }

    /// Apply every pending replay entry and map the terminal status.
    pub(crate) fn drain_replay(&mut self) -> Result<ProcessResult, SyncError> {
        let status = self.ports.replay.apply_pending();
        ProcessResult::try_from(status).inspect_err(|err| {
            error!(target: REPLAY_TARGET, "{err}");
        })
    }

    pub(crate) fn notify_host_transfer(&mut self) {
        for listener in &mut self.host_transfer_listeners {
            listener();
        }
    }

    fn next_message(&mut self) -> Option<Node> {
        self.deferred
            .pop_front()
            .or_else(|| self.ports.network.try_read())
    }

    /// Dispatch a message taken from the queue, putting it back if it
    /// could not be handled.
    fn dispatch_queued(
        &mut self,
        message: Node,
        chat_only: bool,
    ) -> Result<ProcessResult, SyncError> {
        let result = self.dispatch(&message, chat_only)?;
        if result == ProcessResult::CannotHandle {
            debug!(target: NETWORK_TARGET, "deferring {}", message.debug());
            self.deferred.push_front(message);
        }
        Ok(result)
    }
}

/// A modal section on the caller's side (a dialog waiting for input) that
/// must keep chat flowing. Holds the reconciler's only mutable borrow, so
/// state-changing messages cannot be processed until it is dropped; they
/// are deferred to the next `sync`.
pub struct ModalScope<'r, 'a> {
    reconciler: &'r mut TurnReconciler<'a>,
}

impl ModalScope<'_, '_> {
    /// Process queued chat traffic. Returns `CannotHandle` when the next
    /// message has to wait for the modal section to end.
    pub fn pump(&mut self) -> Result<ProcessResult, SyncError> {
        self.reconciler.process_network_data_from_reader(true)
    }

    pub fn deferred_count(&self) -> usize {
        self.reconciler.deferred_count()
    }
}

impl Drop for ModalScope<'_, '_> {
    fn drop(&mut self) {
        debug!(
            target: NETWORK_TARGET,
            deferred = self.reconciler.deferred.len(),
            "leaving modal scope"
        );
    }
}
