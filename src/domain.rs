//! Domain models for support-case tracking.
//!
//! This module contains the core domain types including cases, their
//! priority and status, human-readable case numbers, configuration, and the
//! SLA evaluator.

/// Support case entity.
pub mod case;
pub use case::{Case, NewCase};

/// Human-readable case number types and parsing.
pub mod case_number;
pub use case_number::{CaseNumber, CaseNumberError};

mod category;
pub use category::Category;

mod config;
pub use config::Config;

mod error;
pub use error::{parse_date, ConfigurationError};

mod priority;
pub use priority::Priority;

pub mod sla;
pub use sla::{
    classify_severity, compute_due_date, evaluate, target_days, Severity, SlaResult, SlaStanding,
    SlaState,
};

mod status;
pub use status::CaseStatus;
