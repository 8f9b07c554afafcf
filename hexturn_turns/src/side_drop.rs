// Side drops: a player left and the host decides what happens to their side.
//
// Only the host receives `[side_drop]`. An AI side is taken over by the
// local AI without asking. A human side needs a decision: hand it to an
// ally or an observer, replace it with the local AI or a local player, set
// it idle, or save and abort. The host is asked through `Prompt` unless the
// scenario is over (linger mode with nothing queued), in which case the
// side is set idle.
//
// `TransferChoice` is the option list for one prompt. Its layout is fixed:
// one entry per ally, one per observer, then the four trailing actions in
// `TRAILING` order. Cancelling the prompt selects "set idle".

use hexturn_protocol::message;
use hexturn_protocol::{Controller, Node, Proxy, SideDrop, SideNumber};
use tracing::{debug, error, info, warn};

use crate::config::PromptText;
use crate::error::SyncError;
use crate::reconciler::{NETWORK_TARGET, TurnReconciler};
use crate::result::ProcessResult;
use crate::side::SideRecord;

/// What to do with a dropped human side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferAction {
    GiveToAlly(String),
    GiveToObserver(String),
    ReplaceWithAi,
    ReplaceWithLocal,
    SetIdle,
    SaveAndAbort,
}

/// Fixed options that follow the ally and observer entries.
pub const TRAILING: [TransferAction; 4] = [
    TransferAction::ReplaceWithAi,
    TransferAction::ReplaceWithLocal,
    TransferAction::SetIdle,
    TransferAction::SaveAndAbort,
];

/// Candidate recipients for one dropped side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferChoice {
    allies: Vec<String>,
    observers: Vec<String>,
}

impl TransferChoice {
    pub fn new(allies: Vec<String>, observers: Vec<String>) -> Self {
        Self { allies, observers }
    }

    /// Number of give-control entries.
    pub fn transfer_count(&self) -> usize {
        self.allies.len() + self.observers.len()
    }

    pub fn option_count(&self) -> usize {
        self.transfer_count() + TRAILING.len()
    }

    /// Index selected when the prompt is cancelled.
    pub fn idle_index(&self) -> usize {
        self.transfer_count() + 2
    }

    /// Prompt labels in index order.
    pub fn options(&self, text: &PromptText) -> Vec<String> {
        let mut options = Vec::with_capacity(self.option_count());
        for ally in &self.allies {
            options.push(PromptText::fill(&text.give_to_ally, ally, None));
        }
        for observer in &self.observers {
            options.push(PromptText::fill(&text.give_to_observer, observer, None));
        }
        options.push(text.replace_with_ai.clone());
        options.push(text.replace_with_local.clone());
        options.push(text.set_idle.clone());
        options.push(text.save_and_abort.clone());
        options
    }

    /// Map a prompt selection back to an action. `None` (cancel) selects
    /// "set idle"; an index past the last option resolves to nothing.
    pub fn resolve(&self, selected: Option<usize>) -> Option<TransferAction> {
        let index = selected.unwrap_or_else(|| self.idle_index());
        if let Some(ally) = self.allies.get(index) {
            return Some(TransferAction::GiveToAlly(ally.clone()));
        }
        if let Some(observer) = self.observers.get(index - self.allies.len()) {
            return Some(TransferAction::GiveToObserver(observer.clone()));
        }
        TRAILING.get(index - self.transfer_count()).cloned()
    }
}

impl TurnReconciler<'_> {
    pub(crate) fn handle_side_drop(&mut self, body: &Node) -> Result<ProcessResult, SyncError> {
        let notice = SideDrop::from_node(body);
        let restart = notice.side == self.ports.display.playing_side();

        let Some(index) = notice.side.index(self.ports.sides.team_count()) else {
            error!(target: NETWORK_TARGET, "unknown side {} is dropping game", notice.side);
            return Err(SyncError::protocol(format!(
                "unknown side {} is dropping game",
                notice.side
            )));
        };

        let controller = notice.controller.parse::<Controller>().map_err(|err| {
            error!(target: NETWORK_TARGET, "side drop of side {}: {err}", notice.side);
            SyncError::protocol(format!("side drop of side {}: {err}", notice.side))
        })?;
        match controller {
            Controller::Ai => {
                info!(target: NETWORK_TARGET, side = notice.side.0, "AI side dropped, taking over locally");
                self.ports.sides.drop_to(notice.side, Controller::Ai, Proxy::Human);
                return Ok(ProcessResult::restart_if(restart));
            }
            Controller::Human => {}
            // Nobody controls a null or idle side, so nobody can drop it.
            other => {
                error!(target: NETWORK_TARGET, "side {} cannot be dropped with controller {other}", notice.side);
                return Err(SyncError::protocol(format!(
                    "side {} cannot be dropped with controller {other}",
                    notice.side
                )));
            }
        }

        let Some(dropped) = self.ports.sides.team_at(index).cloned() else {
            return Err(SyncError::protocol(format!("side {} has no record", notice.side)));
        };
        let choice = self.transfer_choice(&dropped);

        let session = &self.ports.session;
        let action = if !session.is_linger_mode() || session.has_next_scenario() {
            self.ask_transfer(&choice, &dropped)
        } else {
            // The game is over; there is nothing to hand over.
            Some(TransferAction::SetIdle)
        };
        let Some(action) = action else {
            warn!(target: NETWORK_TARGET, "side drop prompt returned an out-of-range selection");
            return Ok(ProcessResult::Continue);
        };

        info!(target: NETWORK_TARGET, side = notice.side.0, ?action, "resolving dropped side");
        self.apply_transfer(notice.side, action)?;
        Ok(ProcessResult::restart_if(restart))
    }

    /// Allies of the dropped side that are played by some other remote
    /// human, plus every observer.
    fn transfer_choice(&self, dropped: &SideRecord) -> TransferChoice {
        let sides = &self.ports.sides;
        let allies = (0..sides.team_count())
            .filter_map(|index| sides.team_at(index))
            .filter(|t| {
                !t.is_enemy_of(dropped)
                    && !t.is_local_human()
                    && !t.is_local_ai()
                    && !t.is_network_ai()
                    && !t.is_empty()
                    && t.current_player != dropped.current_player
            })
            .map(|t| t.current_player.clone())
            .collect();
        TransferChoice::new(allies, self.ports.chat.observers())
    }

    fn ask_transfer(
        &mut self,
        choice: &TransferChoice,
        dropped: &SideRecord,
    ) -> Option<TransferAction> {
        let text = &self.config.prompt;
        let options = choice.options(text);
        let message = PromptText::fill(&text.side_left, &dropped.current_player, Some(dropped.side.0));
        let selected = self.ports.prompt.show(&text.title, &message, &options);
        if selected.is_none() {
            debug!(target: NETWORK_TARGET, "side drop prompt cancelled, setting side idle");
        }
        choice.resolve(selected)
    }

    fn apply_transfer(&mut self, side: SideNumber, action: TransferAction) -> Result<(), SyncError> {
        let sides = &mut self.ports.sides;
        match action {
            TransferAction::GiveToAlly(player) | TransferAction::GiveToObserver(player) => {
                // The relay already treats the side as ours. Match that until
                // the transfer goes through.
                sides.drop_to(side, Controller::Human, Proxy::Idle);
                self.ports
                    .session
                    .send(message::change_controller(side, &player))?;
            }
            TransferAction::ReplaceWithAi => {
                self.ports.session.on_not_observer();
                sides.drop_to(side, Controller::Human, Proxy::Ai);
            }
            TransferAction::ReplaceWithLocal => {
                self.ports.session.on_not_observer();
                sides.drop_to(side, Controller::Human, Proxy::Human);
            }
            TransferAction::SetIdle => {
                sides.drop_to(side, Controller::Human, Proxy::Idle);
            }
            TransferAction::SaveAndAbort => {
                // Deliberately not a relay error: that would throw the host
                // back to the title screen.
                self.ports.session.do_autosave();
                return Err(SyncError::QuitGame);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn options_are_allies_then_observers_then_fixed() {
        let choice = TransferChoice::new(names(&["ann", "ben"]), names(&["olga"]));
        let options = choice.options(&PromptText::default());
        assert_eq!(
            options,
            vec![
                "Give control to their ally ann",
                "Give control to their ally ben",
                "Give control to observer olga",
                "Replace with AI",
                "Replace with local player",
                "Set side to idle",
                "Save and abort game",
            ]
        );
        assert_eq!(choice.option_count(), 7);
    }

    #[test]
    fn resolve_walks_each_block() {
        let choice = TransferChoice::new(names(&["ann", "ben"]), names(&["olga"]));
        assert_eq!(choice.resolve(Some(0)), Some(TransferAction::GiveToAlly("ann".into())));
        assert_eq!(choice.resolve(Some(1)), Some(TransferAction::GiveToAlly("ben".into())));
        assert_eq!(
            choice.resolve(Some(2)),
            Some(TransferAction::GiveToObserver("olga".into()))
        );
        assert_eq!(choice.resolve(Some(3)), Some(TransferAction::ReplaceWithAi));
        assert_eq!(choice.resolve(Some(4)), Some(TransferAction::ReplaceWithLocal));
        assert_eq!(choice.resolve(Some(5)), Some(TransferAction::SetIdle));
        assert_eq!(choice.resolve(Some(6)), Some(TransferAction::SaveAndAbort));
        assert_eq!(choice.resolve(Some(7)), None);
    }

    #[test]
    fn cancel_means_idle() {
        let choice = TransferChoice::new(names(&["ann"]), Vec::new());
        assert_eq!(choice.idle_index(), 3);
        assert_eq!(choice.resolve(None), Some(TransferAction::SetIdle));
        assert_eq!(choice.resolve(None), choice.resolve(Some(choice.idle_index())));
    }

    #[test]
    fn no_candidates_leaves_only_fixed_options() {
        let choice = TransferChoice::default();
        assert_eq!(choice.options(&PromptText::default()).len(), 4);
        assert_eq!(choice.resolve(Some(0)), Some(TransferAction::ReplaceWithAi));
        assert_eq!(choice.resolve(None), Some(TransferAction::SetIdle));
    }
}
