// Side and controller types shared by the wire format and the reconciler.
//
// Sides are numbered from 1 on the wire; `SideNumber::index` converts to the
// 0-based slot used by side registries and rejects anything that falls
// outside the registered range. `Controller` and `Proxy` parse the relay's
// controller strings (`human`, `ai`, `idle`, `null`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 1-based side number as carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SideNumber(pub i64);

impl SideNumber {
    /// 0-based registry slot, or `None` if the side is not one of the first
    /// `team_count` sides.
    pub fn index(self, team_count: usize) -> Option<usize> {
        let index = usize::try_from(self.0.checked_sub(1)?).ok()?;
        (index < team_count).then_some(index)
    }
}

impl fmt::Display for SideNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who owns a side at the session level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    Human,
    Ai,
    Idle,
    /// Empty slot: nobody controls the side.
    Null,
}

impl Controller {
    pub fn as_str(self) -> &'static str {
        match self {
            Controller::Human => "human",
            Controller::Ai => "ai",
            Controller::Idle => "idle",
            Controller::Null => "null",
        }
    }
}

/// Unrecognized controller or proxy string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownControllerType(pub String);

impl fmt::Display for UnknownControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown controller type '{}'", self.0)
    }
}

impl std::error::Error for UnknownControllerType {}

impl FromStr for Controller {
    type Err = UnknownControllerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Controller::Human),
            "ai" => Ok(Controller::Ai),
            "idle" => Ok(Controller::Idle),
            "null" | "" => Ok(Controller::Null),
            other => Err(UnknownControllerType(other.to_owned())),
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who actually plays a side on this client. A dropped human side can be
/// proxied to the local AI, a local human, or left idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proxy {
    Human,
    Ai,
    Idle,
}

impl Proxy {
    pub fn as_str(self) -> &'static str {
        match self {
            Proxy::Human => "human",
            Proxy::Ai => "ai",
            Proxy::Idle => "idle",
        }
    }
}

impl FromStr for Proxy {
    type Err = UnknownControllerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Proxy::Human),
            "ai" => Ok(Proxy::Ai),
            "idle" => Ok(Proxy::Idle),
            other => Err(UnknownControllerType(other.to_owned())),
        }
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
