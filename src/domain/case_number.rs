use std::{fmt, num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};

/// The prefix used when a case number is displayed without configuration.
pub const DEFAULT_PREFIX: &str = "CASE";

/// The digit width used when a case number is displayed without
/// configuration.
pub const DEFAULT_DIGITS: usize = 3;

/// A human-readable case number, such as `CASE-042`.
///
/// Only the numeric part identifies the case. The alphabetic prefix and the
/// zero-padding are presentation, controlled by
/// [`Config`](crate::domain::Config) and applied through
/// [`CaseNumber::display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseNumber(NonZeroUsize);

impl CaseNumber {
    /// Creates a case number from its numeric part.
    #[must_use]
    pub const fn new(id: NonZeroUsize) -> Self {
        Self(id)
    }

    /// The numeric part.
    #[must_use]
    pub const fn id(self) -> NonZeroUsize {
        self.0
    }

    /// The following case number, or `None` after `usize::MAX`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Returns a displayable representation with the given prefix and digit
    /// width.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::domain::CaseNumber;
    ///
    /// let number: CaseNumber = "CASE-7".parse().unwrap();
    ///
    /// assert_eq!(number.display("SC", 4).to_string(), "SC-0007");
    /// assert_eq!(number.to_string(), "CASE-007");
    /// ```
    #[must_use]
    pub const fn display(self, prefix: &str, digits: usize) -> FormattedCaseNumber<'_> {
        FormattedCaseNumber {
            number: self,
            prefix,
            digits,
        }
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.display(DEFAULT_PREFIX, DEFAULT_DIGITS), f)
    }
}

/// A case number formatted with a prefix and digit width.
///
/// Returned by [`CaseNumber::display`].
#[derive(Debug, Clone, Copy)]
pub struct FormattedCaseNumber<'a> {
    number: CaseNumber,
    prefix: &'a str,
    digits: usize,
}

impl fmt::Display for FormattedCaseNumber<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}-{:0width$}",
            self.prefix,
            self.number.0,
            width = self.digits
        )
    }
}

/// Errors that can occur when parsing a case number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaseNumberError {
    /// The string is not of the form `PREFIX-NNN` or `NNN`.
    #[error("invalid case number '{0}': expected PREFIX-NNN, for example CASE-001")]
    Syntax(String),

    /// The numeric part is zero.
    #[error("invalid case number '{0}': the number cannot be zero")]
    Zero(String),
}

impl FromStr for CaseNumber {
    type Err = CaseNumberError;

    /// Parses `PREFIX-NNN` or a bare `NNN`.
    ///
    /// The prefix must be ASCII letters and is matched case-insensitively; it
    /// does not take part in identity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || CaseNumberError::Syntax(s.to_string());

        let digits = match s.rsplit_once('-') {
            Some((prefix, digits)) => {
                if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(syntax());
                }
                digits
            }
            None => s,
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(syntax());
        }

        let value = digits.parse::<usize>().map_err(|_| syntax())?;
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or_else(|| CaseNumberError::Zero(s.to_string()))
    }
}

impl TryFrom<String> for CaseNumber {
    type Error = CaseNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for CaseNumber {
    type Error = CaseNumberError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CaseNumber> for String {
    fn from(number: CaseNumber) -> Self {
        number.to_string()
    }
}
