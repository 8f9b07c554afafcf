// Per-side control record.
//
// The side registry owns these; the reconciler reads them to decide who may
// receive a dropped side and whether a controller change touches the side
// whose turn is running. Mutation goes through `SideRegistry::set_controller`
// and `SideRegistry::drop_to` only.

use hexturn_protocol::{Controller, Proxy, SideNumber};

/// Control metadata for one side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideRecord {
    pub side: SideNumber,
    pub controller: Controller,
    pub proxy: Proxy,
    pub current_player: String,
    /// Played on this client rather than over the network.
    pub is_local: bool,
    /// Sides sharing a team name are allies.
    pub team_name: String,
}

impl SideRecord {
    pub fn new(side: SideNumber, controller: Controller, current_player: &str) -> Self {
        Self {
            side,
            controller,
            proxy: Proxy::Human,
            current_player: current_player.to_owned(),
            is_local: false,
            team_name: format!("side{side}"),
        }
    }

    pub fn with_local(mut self, is_local: bool) -> Self {
        self.is_local = is_local;
        self
    }

    pub fn with_team(mut self, team_name: &str) -> Self {
        self.team_name = team_name.to_owned();
        self
    }

    pub fn is_human(&self) -> bool {
        self.controller == Controller::Human
    }

    pub fn is_ai(&self) -> bool {
        self.controller == Controller::Ai
    }

    pub fn is_empty(&self) -> bool {
        self.controller == Controller::Null
    }

    pub fn is_network(&self) -> bool {
        !self.is_local
    }

    pub fn is_local_human(&self) -> bool {
        self.is_human() && self.is_local
    }

    pub fn is_local_ai(&self) -> bool {
        self.is_ai() && self.is_local
    }

    pub fn is_network_ai(&self) -> bool {
        self.is_ai() && self.is_network()
    }

    pub fn is_enemy_of(&self, other: &SideRecord) -> bool {
        self.team_name != other.team_name
    }
}
