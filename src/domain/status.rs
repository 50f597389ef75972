use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::{normalise_token, ConfigurationError};

/// Where a support case sits in its lifecycle.
///
/// Transitions are governed by whoever owns the case; any status may follow
/// any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum CaseStatus {
    /// Newly raised, awaiting first action.
    Open,
    /// Blocked on a reply from the party who raised the case.
    WaitingOnRequester,
    /// Blocked on a reply from the other party (typically the maker).
    WaitingOnCounterparty,
    /// A resolution has been proposed and is being checked.
    InReview,
    /// The issue has been fixed.
    Resolved,
    /// The case has been closed.
    Closed,
}

impl CaseStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::WaitingOnRequester,
        Self::WaitingOnCounterparty,
        Self::InReview,
        Self::Resolved,
        Self::Closed,
    ];

    /// Whether the case has reached the end of its lifecycle.
    ///
    /// Terminal cases are never reported overdue.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// The canonical kebab-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::WaitingOnRequester => "waiting-on-requester",
            Self::WaitingOnCounterparty => "waiting-on-counterparty",
            Self::InReview => "in-review",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_token(s).as_str() {
            "open" => Ok(Self::Open),
            "waitingonrequester" => Ok(Self::WaitingOnRequester),
            "waitingoncounterparty" => Ok(Self::WaitingOnCounterparty),
            "inreview" => Ok(Self::InReview),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ConfigurationError::UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for CaseStatus {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
