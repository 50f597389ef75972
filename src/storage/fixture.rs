//! Read-only case fixtures in YAML.
//!
//! A fixture document is a YAML list of case records. A fixture directory
//! holds any number of `*.yaml` or `*.yml` documents, which are parsed in
//! parallel and merged into one [`CaseStore`]. Nothing is ever written back.

use std::{
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
};

use non_empty_string::NonEmptyString;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    domain::{
        parse_date, Case, CaseNumber, CaseStatus, Category, ConfigurationError, NewCase, Priority,
    },
    storage::{CaseStore, StoreError},
};

const SEED: &str = include_str!("seed.yaml");

/// A case as written in a fixture document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseRecord {
    number: CaseNumber,
    #[serde(default)]
    uuid: Option<Uuid>,
    subject: String,
    #[serde(default)]
    requester: String,
    #[serde(default)]
    counterparty: String,
    #[serde(default)]
    order: Option<String>,
    #[serde(default)]
    category: Category,
    #[serde(default)]
    priority: Priority,
    #[serde(default = "default_status")]
    status: CaseStatus,
    created: String,
}

const fn default_status() -> CaseStatus {
    CaseStatus::Open
}

/// A fixture record that parsed as YAML but does not describe a valid case.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    /// The subject is empty.
    #[error("case {0} has an empty subject")]
    EmptySubject(CaseNumber),

    /// A field holds a value outside its domain.
    #[error("case {number}: {source}")]
    Configuration {
        /// The case the record describes.
        number: CaseNumber,
        /// What was wrong with the value.
        source: ConfigurationError,
    },
}

impl TryFrom<CaseRecord> for Case {
    type Error = RecordError;

    fn try_from(record: CaseRecord) -> Result<Self, Self::Error> {
        let number = record.number;
        let subject = NonEmptyString::new(record.subject.trim().to_string())
            .map_err(|_| RecordError::EmptySubject(number))?;
        let created = parse_date(&record.created)
            .map_err(|source| RecordError::Configuration { number, source })?;

        let draft = NewCase {
            subject,
            requester: record.requester,
            counterparty: record.counterparty,
            order_reference: record.order.filter(|order| !order.trim().is_empty()),
            category: record.category,
            created,
            priority: record.priority,
            status: record.status,
        };

        Ok(Self::from_draft(
            record.uuid.unwrap_or_else(Uuid::new_v4),
            number,
            draft,
        ))
    }
}

/// Errors that can occur while loading fixtures.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The fixture file or directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The document is not a valid list of case records.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// The document that failed.
        path: PathBuf,
        /// The underlying error.
        source: serde_yaml::Error,
    },

    /// A record parsed but does not describe a valid case.
    #[error("invalid case in {}: {source}", .path.display())]
    Record {
        /// The document holding the record.
        path: PathBuf,
        /// What was wrong with the record.
        source: RecordError,
    },

    /// Two records describe the same case.
    #[error(transparent)]
    Conflict(#[from] StoreError),

    /// Several documents in a directory failed.
    #[error("{}", LoadErrors(.0))]
    Files(Vec<LoadError>),
}

/// Joins several load errors into one message.
struct LoadErrors<'a>(&'a [LoadError]);

impl fmt::Display for LoadErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Parses a YAML fixture document.
///
/// `origin` is only used to label errors.
///
/// # Errors
///
/// Returns an error if the document is not a list of valid case records.
pub fn parse_cases(yaml: &str, origin: &Path) -> Result<Vec<Case>, LoadError> {
    let records: Vec<CaseRecord> =
        serde_yaml::from_str(yaml).map_err(|source| LoadError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

    records
        .into_iter()
        .map(|record| {
            Case::try_from(record).map_err(|source| LoadError::Record {
                path: origin.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Loads every case from a fixture file or directory.
///
/// Directories are searched recursively for `*.yaml` and `*.yml` files.
///
/// # Errors
///
/// Returns an error if any document cannot be read or parsed. When loading
/// a directory, every failing document is reported, not just the first.
pub fn load_cases(path: &Path) -> Result<Vec<Case>, LoadError> {
    if !path.is_dir() {
        return load_file(path);
    }

    let paths = collect_yaml_paths(path);
    tracing::debug!("loading {} fixture files from {}", paths.len(), path.display());

    let (loaded, failed): (Vec<_>, Vec<_>) = paths
        .par_iter()
        .map(|path| load_file(path))
        .partition(Result::is_ok);

    let failed: Vec<_> = failed.into_iter().filter_map(Result::err).collect();
    if !failed.is_empty() {
        return Err(LoadError::Files(failed));
    }

    Ok(loaded
        .into_iter()
        .filter_map(Result::ok)
        .flatten()
        .collect())
}

/// Loads a fixture file or directory into a new store.
///
/// # Errors
///
/// Returns an error if loading fails or if two records share a case number
/// or UUID.
pub fn load_store(path: &Path) -> Result<CaseStore, LoadError> {
    let cases = load_cases(path)?;
    Ok(CaseStore::from_cases(cases)?)
}

/// A store holding the bundled demonstration cases.
///
/// # Errors
///
/// Returns an error only if the bundled data is malformed.
pub fn seed_store() -> Result<CaseStore, LoadError> {
    let cases = parse_cases(SEED, Path::new("<bundled seed>"))?;
    Ok(CaseStore::from_cases(cases)?)
}

fn load_file(path: &Path) -> Result<Vec<Case>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cases = parse_cases(&content, path)?;
    tracing::debug!("loaded {} cases from {}", cases.len(), path.display());
    Ok(cases)
}

fn collect_yaml_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| tracing::warn!("skipping unreadable entry: {e}"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(OsStr::to_str)
                .is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
                })
        })
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use std::{fs, num::NonZeroUsize};

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    const TWO_CASES: &str = r"
- number: CASE-001
  subject: Layer shift on print
  requester: Nadia
  counterparty: Northside Print Lab
  order: ORD-1
  category: quality
  priority: high
  status: open
  created: 2024-12-20
- number: CASE-002
  subject: Parcel lost
  priority: URGENT
  status: WaitingOnCounterparty
  created: 2024-12-17
";

    fn number(id: usize) -> CaseNumber {
        CaseNumber::new(NonZeroUsize::new(id).unwrap())
    }

    #[test]
    fn parses_records_with_defaults() {
        let cases = parse_cases(TWO_CASES, Path::new("cases.yaml")).unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].priority(), Priority::High);
        assert_eq!(cases[0].order_reference(), Some("ORD-1"));
        assert_eq!(cases[1].priority(), Priority::Urgent);
        assert_eq!(cases[1].status(), CaseStatus::WaitingOnCounterparty);
        assert_eq!(cases[1].category(), Category::Other);
        assert_eq!(cases[1].requester(), "");
        assert_eq!(
            cases[1].created(),
            NaiveDate::from_ymd_opt(2024, 12, 17).unwrap()
        );
    }

    #[test]
    fn unknown_priority_is_reported_with_the_file() {
        let yaml = "- number: CASE-001\n  subject: x\n  priority: asap\n  created: 2024-12-01\n";
        let err = parse_cases(yaml, Path::new("bad.yaml")).unwrap_err();

        assert!(matches!(err, LoadError::Parse { .. }));
        let message = err.to_string();
        assert!(message.contains("bad.yaml"));
        assert!(message.contains("unknown priority 'asap'"));
    }

    #[test]
    fn invalid_date_is_a_configuration_error() {
        let yaml = "- number: CASE-004\n  subject: x\n  created: 2024-13-01\n";
        let err = parse_cases(yaml, Path::new("dates.yaml")).unwrap_err();

        match err {
            LoadError::Record { source, .. } => assert_eq!(
                source,
                RecordError::Configuration {
                    number: number(4),
                    source: ConfigurationError::InvalidDate("2024-13-01".into()),
                }
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_subject_is_rejected() {
        let yaml = "- number: CASE-002\n  subject: '  '\n  created: 2024-12-01\n";
        let err = parse_cases(yaml, Path::new("blank.yaml")).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Record {
                source: RecordError::EmptySubject(_),
                ..
            }
        ));
    }

    #[test]
    fn loads_a_directory_recursively() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.yaml"), TWO_CASES).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(
            tmp.path().join("nested").join("b.yml"),
            "- number: CASE-003\n  subject: Nested\n  created: 2024-12-02\n",
        )
        .unwrap();
        fs::write(tmp.path().join("notes.txt"), "not a fixture").unwrap();

        let store = load_store(tmp.path()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.find_by_number(number(3)).unwrap().subject(), "Nested");
    }

    #[test]
    fn directory_errors_name_every_failing_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad1.yaml"), "not: a list").unwrap();
        fs::write(tmp.path().join("bad2.yaml"), "- number: zero\n").unwrap();
        fs::write(tmp.path().join("good.yaml"), TWO_CASES).unwrap();

        let err = load_cases(tmp.path()).unwrap_err();

        let LoadError::Files(errors) = &err else {
            panic!("expected multiple file errors, got {err}");
        };
        assert_eq!(errors.len(), 2);
        let message = err.to_string();
        assert!(message.contains("bad1.yaml"));
        assert!(message.contains("bad2.yaml"));
    }

    #[test]
    fn duplicate_numbers_across_files_conflict() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.yaml"), TWO_CASES).unwrap();
        fs::write(
            tmp.path().join("b.yaml"),
            "- number: CASE-001\n  subject: Again\n  created: 2024-12-02\n",
        )
        .unwrap();

        let err = load_store(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Conflict(StoreError::DuplicateNumber(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_cases(&tmp.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn seed_data_loads() {
        let store = seed_store().unwrap();

        assert_eq!(store.len(), 10);
        let numbers: Vec<_> = store.cases().map(Case::number).collect();
        assert_eq!(numbers.first(), Some(&number(1)));
        assert_eq!(numbers.last(), Some(&number(10)));
    }
}
