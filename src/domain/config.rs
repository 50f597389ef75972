use std::path::Path;

use serde::{Deserialize, Serialize};

use super::case_number::{DEFAULT_DIGITS, DEFAULT_PREFIX};

/// Configuration for the case desk.
///
/// This struct holds presentation settings: how case numbers are rendered
/// and how many cases a listing page holds. SLA targets are fixed per
/// priority and are not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The alphabetic prefix of case numbers.
    ///
    /// For example, 'CASE' renders case 42 as `CASE-042`.
    case_prefix: String,

    /// The number of digits in a case number.
    ///
    /// Digits are padded to this width with leading zeros.
    digits: usize,

    /// The number of cases on one listing page.
    page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            case_prefix: default_prefix(),
            digits: DEFAULT_DIGITS,
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Returns the prefix used when displaying case numbers.
    #[must_use]
    pub fn case_prefix(&self) -> &str {
        &self.case_prefix
    }

    /// Returns the number of digits for padding case numbers.
    #[must_use]
    pub const fn digits(&self) -> usize {
        self.digits
    }

    /// Returns the number of cases on one listing page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

const fn default_page_size() -> usize {
    20
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_prefix")]
        case_prefix: String,

        /// The number of digits in a case number.
        #[serde(default = "default_digits")]
        digits: usize,

        #[serde(default = "default_page_size")]
        page_size: usize,
    },
}

const fn default_digits() -> usize {
    DEFAULT_DIGITS
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                case_prefix,
                digits,
                page_size,
            } => Self {
                case_prefix: case_prefix.to_uppercase(),
                digits,
                // A zero page size would make every page empty.
                page_size: page_size.max(1),
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            case_prefix: config.case_prefix,
            digits: config.digits,
            page_size: config.page_size,
        }
    }
}
