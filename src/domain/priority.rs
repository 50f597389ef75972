use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::{normalise_token, ConfigurationError};

/// The urgency tier of a support case.
///
/// Each tier carries a fixed SLA target, see [`Priority::target_days`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Priority {
    /// Resolve within a week.
    Low,
    /// The default tier.
    #[default]
    Normal,
    /// Resolve within three days.
    High,
    /// Resolve by the next day.
    Urgent,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Normal, Self::High, Self::Urgent];

    /// The number of calendar days allowed between opening a case and its
    /// SLA due date.
    #[must_use]
    pub const fn target_days(self) -> u32 {
        match self {
            Self::Low => 7,
            Self::Normal => 5,
            Self::High => 3,
            Self::Urgent => 1,
        }
    }

    /// The canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_token(s).as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ConfigurationError::UnknownPriority(s.to_string())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Priority::Low, 7)]
    #[test_case(Priority::Normal, 5)]
    #[test_case(Priority::High, 3)]
    #[test_case(Priority::Urgent, 1)]
    fn target_days_table(priority: Priority, expected: u32) {
        assert_eq!(priority.target_days(), expected);
    }

    #[test_case("low", Priority::Low)]
    #[test_case("NORMAL", Priority::Normal)]
    #[test_case(" High", Priority::High ; "leading space")]
    #[test_case("Urgent", Priority::Urgent)]
    fn parses_case_insensitively(input: &str, expected: Priority) {
        assert_eq!(input.parse::<Priority>(), Ok(expected));
    }

    #[test]
    fn unknown_priority_is_a_configuration_error() {
        let err = "critical".parse::<Priority>().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownPriority("critical".into()));
    }

    #[test]
    fn higher_tiers_order_after_lower_ones() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::Normal > Priority::Low);
    }

    #[test]
    fn deserialising_rejects_unknown_tiers() {
        let ok: Priority = serde_yaml::from_str("urgent").unwrap();
        assert_eq!(ok, Priority::Urgent);

        let err = serde_yaml::from_str::<Priority>("asap").unwrap_err();
        assert!(err.to_string().contains("unknown priority 'asap'"));
    }
}
