// Terminal conditions that unwind a sync pass.
//
// Ordinary outcomes are `ProcessResult` codes; everything here ends the pass
// and propagates to the game loop, which routes on `SyncError::class()`:
// protocol errors return the player to an interactive state, a leave notice
// goes back to the lobby, save-and-abort quits, and internal failures abort.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The relay told us to leave the game.
    #[error("left the game: {reason}")]
    LeftGame { reason: String },
    /// The relay sent something this client cannot act on.
    #[error("relay protocol error: {detail}")]
    Protocol { detail: String },
    /// The host chose save-and-abort while resolving a side drop.
    #[error("game aborted after autosave")]
    QuitGame,
    /// An outbound message could not be handed to the relay.
    #[error("failed to send to relay: {0}")]
    Transport(String),
    /// The replay executor reported a status with no result mapping.
    #[error("replay returned unmappable status '{0}'")]
    UnmappedReplayStatus(String),
}

/// How the game loop should treat a `SyncError`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Show the error and return to an interactive state.
    Recoverable,
    /// Unwind to the title/lobby flow.
    SessionEnded,
    /// The user asked to stop; no error dialog.
    UserQuit,
    /// Programming error; abort.
    Internal,
}

impl SyncError {
    pub fn protocol(detail: impl Into<String>) -> Self {
        SyncError::Protocol {
            detail: detail.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            SyncError::Protocol { .. } | SyncError::Transport(_) => ErrorClass::Recoverable,
            SyncError::LeftGame { .. } => ErrorClass::SessionEnded,
            SyncError::QuitGame => ErrorClass::UserQuit,
            SyncError::UnmappedReplayStatus(_) => ErrorClass::Internal,
        }
    }
}
