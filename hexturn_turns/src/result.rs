// Result codes produced by one processing pass.
//
// `ReplayStatus` is what the replay executor reports after applying pending
// entries; `ProcessResult` is what the reconciler hands back to the game
// loop. The mapping between them is fixed. Any status outside the four
// mappable ones is an internal consistency failure and becomes
// `SyncError::UnmappedReplayStatus` rather than a result code.

use crate::error::SyncError;

/// Terminal status of draining the replay log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayStatus {
    /// Every pending entry was applied.
    AtEnd,
    /// Stopped at an action that depends on a remote choice.
    FoundDependent,
    FoundEndTurn,
    FoundEndLevel,
    /// Anything else the executor can report. Never valid here.
    Other(String),
}

/// Outcome of a sync or dispatch call. Consumed immediately by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessResult {
    Continue,
    FoundDependent,
    EndTurn,
    EndLevel,
    RestartTurn,
    /// The message is not allowed in chat-only mode and was left unconsumed.
    CannotHandle,
    /// The host ended linger mode; the next scenario may start.
    EndLinger,
}

impl ProcessResult {
    pub fn is_continue(self) -> bool {
        self == ProcessResult::Continue
    }

    /// Anything but `Continue` stops the inbound loop.
    pub fn ends_processing(self) -> bool {
        !self.is_continue()
    }

    pub fn restart_if(restart: bool) -> Self {
        if restart {
            ProcessResult::RestartTurn
        } else {
            ProcessResult::Continue
        }
    }
}

impl TryFrom<ReplayStatus> for ProcessResult {
    type Error = SyncError;

    fn try_from(status: ReplayStatus) -> Result<Self, Self::Error> {
        match status {
            ReplayStatus::AtEnd => Ok(ProcessResult::Continue),
            ReplayStatus::FoundDependent => Ok(ProcessResult::FoundDependent),
            ReplayStatus::FoundEndTurn => Ok(ProcessResult::EndTurn),
            ReplayStatus::FoundEndLevel => Ok(ProcessResult::EndLevel),
            ReplayStatus::Other(status) => Err(SyncError::UnmappedReplayStatus(status)),
        }
    }
}
