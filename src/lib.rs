//! Support-case SLA tracking
//!
//! Support cases are raised between buyers, sellers, designers and makers on
//! a print-on-demand marketplace. Each case carries an SLA derived from its
//! priority and creation date; this crate evaluates that SLA, keeps cases in
//! an in-memory store, and lists them with search, filters, sorting and
//! pagination.

pub mod domain;
pub use domain::{
    Case, CaseNumber, CaseStatus, Category, Config, ConfigurationError, NewCase, Priority,
    Severity, SlaResult, SlaState,
};

/// Search, filter, sort and paginate cases.
pub mod listing;
pub use listing::{CaseQuery, Filters, ListedCase, Listing, Page, SortKey, SortSpec, Summary};

/// In-memory case storage and read-only fixtures.
pub mod storage;
pub use storage::{CaseStore, LoadError, StoreError};
