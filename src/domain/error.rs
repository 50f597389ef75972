/// A value supplied at the boundary (CLI argument, fixture file) is outside
/// the domain the case model accepts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The priority is not one of the four known tiers.
    #[error("unknown priority '{0}': expected one of low, normal, high, urgent")]
    UnknownPriority(String),

    /// The status is not one of the six lifecycle states.
    #[error(
        "unknown status '{0}': expected one of open, waiting-on-requester, \
         waiting-on-counterparty, in-review, resolved, closed"
    )]
    UnknownStatus(String),

    /// The category is not recognised.
    #[error(
        "unknown category '{0}': expected one of quality, shipping, payment, design, account, \
         other"
    )]
    UnknownCategory(String),

    /// The date is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Normalises a boundary token for enum matching.
///
/// Matching ignores ASCII case as well as `-`, `_` and spaces, so
/// `waiting-on-requester`, `Waiting_On_Requester` and `WaitingOnRequester`
/// all compare equal.
pub fn normalise_token(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Parses an ISO-8601 calendar date.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidDate`] if the string is not a valid
/// `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<chrono::NaiveDate, ConfigurationError> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigurationError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn normalise_token_strips_separators_and_case() {
        assert_eq!(normalise_token("Waiting-On_Requester"), "waitingonrequester");
        assert_eq!(normalise_token("in review"), "inreview");
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date("2024-12-20"),
            Ok(NaiveDate::from_ymd_opt(2024, 12, 20).unwrap())
        );
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert_eq!(
            parse_date("2024-02-30"),
            Err(ConfigurationError::InvalidDate("2024-02-30".to_string()))
        );
        assert!(parse_date("20/12/2024").is_err());
    }
}
