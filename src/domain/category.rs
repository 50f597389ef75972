use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::{normalise_token, ConfigurationError};

/// What a support case is about.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Category {
    /// Print defects, wrong material or finish.
    Quality,
    /// Late, lost or damaged parcels.
    Shipping,
    /// Refunds, payouts and invoices.
    Payment,
    /// Problems with the design file itself.
    Design,
    /// Account access and settings.
    Account,
    /// Anything else.
    #[default]
    Other,
}

impl Category {
    /// All categories.
    pub const ALL: [Self; 6] = [
        Self::Quality,
        Self::Shipping,
        Self::Payment,
        Self::Design,
        Self::Account,
        Self::Other,
    ];

    /// The canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Design => "design",
            Self::Account => "account",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalise_token(s);
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == token)
            .ok_or_else(|| ConfigurationError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
