//! Check-in lifecycle states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a check-in.
///
/// `Scheduled` is the only non-terminal state. Every other state is reached
/// from `Scheduled` exactly once and never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Scheduled,
    Acknowledged,
    Escalated,
    Cancelled,
}

impl CheckInStatus {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Acknowledged => "acknowledged",
            Self::Escalated => "escalated",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scheduled)
    }

    /// Whether `self → to` is an edge of the state machine.
    pub fn can_transition_to(self, to: CheckInStatus) -> bool {
        matches!(
            (self, to),
            (
                Self::Scheduled,
                Self::Acknowledged | Self::Escalated | Self::Cancelled
            )
        )
    }
}

impl fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown check-in status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for CheckInStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "acknowledged" => Ok(Self::Acknowledged),
            "escalated" => Ok(Self::Escalated),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}
