use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use uuid::Uuid;

use super::{
    sla::{self, SlaResult},
    CaseNumber, CaseStatus, Category, Priority,
};

/// A support case raised between a requester and a counterparty.
///
/// The creation date, UUID and case number are fixed once the case exists.
/// Status and priority change through [`CaseStore`](crate::CaseStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub(crate) uuid: Uuid,
    pub(crate) number: CaseNumber,
    pub(crate) subject: NonEmptyString,
    pub(crate) requester: String,
    pub(crate) counterparty: String,
    pub(crate) order_reference: Option<String>,
    pub(crate) category: Category,
    pub(crate) created: NaiveDate,
    pub(crate) priority: Priority,
    pub(crate) status: CaseStatus,
}

/// The fields needed to open a new case.
///
/// The UUID and case number are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCase {
    /// One-line summary of the problem.
    pub subject: NonEmptyString,
    /// Who raised the case.
    pub requester: String,
    /// Who the case is raised against.
    pub counterparty: String,
    /// The marketplace order the case concerns, if any.
    pub order_reference: Option<String>,
    /// What the case is about.
    pub category: Category,
    /// The day the case was opened.
    pub created: NaiveDate,
    /// Initial priority.
    pub priority: Priority,
    /// Initial status.
    pub status: CaseStatus,
}

impl NewCase {
    /// A draft with the given subject and creation date.
    ///
    /// Everything else takes its default: normal priority, open status,
    /// category "other", and no parties or order reference.
    #[must_use]
    pub fn new(subject: NonEmptyString, created: NaiveDate) -> Self {
        Self {
            subject,
            requester: String::new(),
            counterparty: String::new(),
            order_reference: None,
            category: Category::default(),
            created,
            priority: Priority::default(),
            status: CaseStatus::Open,
        }
    }
}

impl Case {
    /// Builds a case from a draft with an explicit identity.
    #[must_use]
    pub fn from_draft(uuid: Uuid, number: CaseNumber, draft: NewCase) -> Self {
        let NewCase {
            subject,
            requester,
            counterparty,
            order_reference,
            category,
            created,
            priority,
            status,
        } = draft;

        Self {
            uuid,
            number,
            subject,
            requester,
            counterparty,
            order_reference,
            category,
            created,
            priority,
            status,
        }
    }

    /// The unique, stable identifier of this case.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The human-readable case number.
    #[must_use]
    pub const fn number(&self) -> CaseNumber {
        self.number
    }

    /// One-line summary of the problem.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Who raised the case.
    #[must_use]
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Who the case is raised against.
    #[must_use]
    pub fn counterparty(&self) -> &str {
        &self.counterparty
    }

    /// The marketplace order the case concerns, if any.
    #[must_use]
    pub fn order_reference(&self) -> Option<&str> {
        self.order_reference.as_deref()
    }

    /// What the case is about.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// The day the case was opened.
    #[must_use]
    pub const fn created(&self) -> NaiveDate {
        self.created
    }

    /// Current priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> CaseStatus {
        self.status
    }

    /// Whether the case still needs work.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// The SLA standing of this case on the calendar day `today`.
    ///
    /// This is recomputed on every call.
    #[must_use]
    pub fn sla(&self, today: NaiveDate) -> SlaResult {
        sla::evaluate(self.created, self.priority, self.status, today)
    }
}
