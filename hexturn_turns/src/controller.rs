// Controller changes announced by the relay.
//
// The relay sends `[change_controller]` when a side changes hands: a player
// reconnects, the host gives a side away, or this client is handed a side.
// Out-of-range sides and empty payloads are ignored with a warning. A
// change restarts the running turn only if it touches the side whose turn
// it is and that side was or becomes local.

use hexturn_protocol::{Controller, ControllerChange, Node, SideNumber};
use tracing::{info, warn};

use crate::error::SyncError;
use crate::reconciler::{NETWORK_TARGET, TurnReconciler};
use crate::result::ProcessResult;
use crate::side::SideRecord;

impl TurnReconciler<'_> {
    pub(crate) fn handle_controller_change(
        &mut self,
        body: &Node,
    ) -> Result<ProcessResult, SyncError> {
        if body.is_empty() {
            warn!(target: NETWORK_TARGET, "bad [change_controller] from relay: tag was empty");
            return Ok(ProcessResult::Continue);
        }

        let change = ControllerChange::from_node(body);
        let Some(index) = change.side.index(self.ports.sides.team_count()) else {
            warn!(
                target: NETWORK_TARGET,
                "bad [change_controller] from relay, side out of bounds: {}",
                body.debug()
            );
            return Ok(ProcessResult::Continue);
        };
        let controller = match change.controller.parse::<Controller>() {
            Ok(controller) => controller,
            Err(err) => {
                warn!(target: NETWORK_TARGET, "bad [change_controller] from relay: {err}");
                return Ok(ProcessResult::Continue);
            }
        };
        let Some(was_local) = self.ports.sides.team_at(index).map(|t| t.is_local) else {
            return Ok(ProcessResult::Continue);
        };

        self.ports
            .sides
            .set_controller(change.side, change.is_local, &change.player, controller);
        let Some(record) = self.ports.sides.team_at(index).cloned() else {
            return Ok(ProcessResult::Continue);
        };
        info!(
            target: NETWORK_TARGET,
            side = change.side.0,
            player = %record.current_player,
            controller = %record.controller,
            is_local = record.is_local,
            "controller changed"
        );

        if !was_local && record.is_local {
            self.ports.session.on_not_observer();
        }

        self.update_viewing_side(change.side, &record);
        self.ports.whiteboard.on_change_controller(change.side, &record);
        self.ports.display.recalculate_labels();

        let restart = self.ports.display.playing_side() == change.side
            && (was_local || record.is_local);
        Ok(ProcessResult::restart_if(restart))
    }

    /// Follow the playing side if we are observing or play it ourselves,
    /// otherwise follow the changed side if it just became ours.
    fn update_viewing_side(&mut self, changed: SideNumber, record: &SideRecord) {
        let playing = self.ports.display.playing_side();
        let playing_is_local_human = self
            .ports
            .sides
            .side(playing)
            .is_some_and(SideRecord::is_local_human);

        if self.ports.session.is_observer() || playing_is_local_human {
            self.set_viewing_side(playing);
        } else if record.is_local_human() {
            self.set_viewing_side(changed);
        }
    }

    fn set_viewing_side(&mut self, side: SideNumber) {
        let changed = self.ports.display.viewing_side() != side;
        self.ports.display.set_viewing_side(side);
        if changed {
            self.ports.display.queue_rerender();
        }
    }
}
