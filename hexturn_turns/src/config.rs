// Reconciler configuration.
//
// Only presentation choices live here: chat labelling and the text of the
// side-drop prompt. Prompt strings use `$player` and `$side` placeholders,
// filled in by `PromptText::fill`. The game loads a `SyncConfig` from JSON
// alongside its other settings; every field has a default, so a partial or
// empty object is valid.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Prepended to the sender of private messages.
    pub whisper_prefix: String,
    /// Ring the chat bell for incoming messages.
    pub message_bell: bool,
    pub prompt: PromptText,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            whisper_prefix: "whisper: ".into(),
            message_bell: true,
            prompt: PromptText::default(),
        }
    }
}

impl SyncConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Text of the side-drop prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptText {
    pub title: String,
    pub side_left: String,
    pub give_to_ally: String,
    pub give_to_observer: String,
    pub replace_with_ai: String,
    pub replace_with_local: String,
    pub set_idle: String,
    pub save_and_abort: String,
}

impl Default for PromptText {
    fn default() -> Self {
        Self {
            title: String::new(),
            side_left: "$player who controlled side $side has left the game. \
                        What do you want to do?"
                .into(),
            give_to_ally: "Give control to their ally $player".into(),
            give_to_observer: "Give control to observer $player".into(),
            replace_with_ai: "Replace with AI".into(),
            replace_with_local: "Replace with local player".into(),
            set_idle: "Set side to idle".into(),
            save_and_abort: "Save and abort game".into(),
        }
    }
}

impl PromptText {
    /// Substitute `$player` and `$side` in `template`.
    pub fn fill(template: &str, player: &str, side: Option<i64>) -> String {
        // `$side` first, so a player name is never rescanned.
        let text = match side {
            Some(side) => template.replace("$side", &side.to_string()),
            None => template.to_owned(),
        };
        text.replace("$player", player)
    }
}
