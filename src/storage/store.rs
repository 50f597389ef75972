//! In-memory store of support cases.
//!
//! The [`CaseStore`] knows nothing about files. It owns its cases for as
//! long as the caller holds it; nothing is shared between stores.

use std::{
    collections::{BTreeMap, HashMap},
    num::NonZeroUsize,
};

use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{Case, CaseNumber, CaseStatus, NewCase, Priority};

/// An in-memory collection of cases.
///
/// Cases are stored by UUID, with a separate index from case number to UUID
/// so that lookups by either are cheap and iteration follows case-number
/// order.
#[derive(Debug, Default, Clone)]
pub struct CaseStore {
    /// Cases keyed by UUID.
    cases: HashMap<Uuid, Case>,

    /// Lookup from case number to UUID.
    /// `BTreeMap` so iteration is ordered by case number.
    numbers: BTreeMap<CaseNumber, Uuid>,
}

/// Errors that can occur when modifying a [`CaseStore`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No case has the given number.
    #[error("case {0} not found")]
    NotFound(CaseNumber),
    /// Another case already has this number.
    #[error("case number {0} is already in use")]
    DuplicateNumber(CaseNumber),
    /// Another case already has this UUID.
    #[error("case UUID {0} is already in use")]
    DuplicateUuid(Uuid),
    /// The highest possible case number is already in use.
    #[error("no case numbers left to assign")]
    NumbersExhausted,
}

/// The mutable fields of a case, as seen by [`CaseStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseUpdate {
    /// The case status.
    pub status: CaseStatus,
    /// The case priority.
    pub priority: Priority,
}

impl CaseStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` cases.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cases: HashMap::with_capacity(capacity),
            numbers: BTreeMap::new(),
        }
    }

    /// Builds a store from existing cases.
    ///
    /// # Errors
    ///
    /// Returns an error if two cases share a UUID or a case number.
    pub fn from_cases<I>(cases: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = Case>,
    {
        let cases = cases.into_iter();
        let mut store = Self::with_capacity(cases.size_hint().0);
        for case in cases {
            store.insert(case)?;
        }
        Ok(store)
    }

    /// The number of cases in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the store holds no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// The case number the next [`add`](Self::add) will assign.
    ///
    /// This is one past the highest number in use, so numbers freed by
    /// [`remove`](Self::remove) are not reused unless they were the highest.
    /// Returns `None` once the highest possible number is taken.
    #[must_use]
    pub fn next_number(&self) -> Option<CaseNumber> {
        self.numbers.last_key_value().map_or_else(
            || Some(CaseNumber::new(NonZeroUsize::MIN)),
            |(number, _)| number.next(),
        )
    }

    /// Opens a new case from a draft, assigning a fresh UUID and the next
    /// case number.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NumbersExhausted`] if the highest possible case
    /// number is already in use. The store is unchanged in that case.
    #[instrument(level = "debug", skip_all, fields(subject = draft.subject.as_str()))]
    pub fn add(&mut self, draft: NewCase) -> Result<&Case, StoreError> {
        let number = self.next_number().ok_or(StoreError::NumbersExhausted)?;
        let uuid = Uuid::new_v4();

        self.numbers.insert(number, uuid);
        tracing::debug!(%number, %uuid, "opened case");

        Ok(self
            .cases
            .entry(uuid)
            .or_insert_with(|| Case::from_draft(uuid, number, draft)))
    }

    /// Inserts an existing case.
    ///
    /// # Errors
    ///
    /// Returns an error if the UUID or case number is already in use. The
    /// store is unchanged in that case.
    pub fn insert(&mut self, case: Case) -> Result<(), StoreError> {
        if self.cases.contains_key(&case.uuid()) {
            return Err(StoreError::DuplicateUuid(case.uuid()));
        }
        if self.numbers.contains_key(&case.number()) {
            return Err(StoreError::DuplicateNumber(case.number()));
        }

        self.numbers.insert(case.number(), case.uuid());
        self.cases.insert(case.uuid(), case);
        Ok(())
    }

    /// Retrieves a case by UUID.
    #[must_use]
    pub fn get(&self, uuid: Uuid) -> Option<&Case> {
        self.cases.get(&uuid)
    }

    /// Retrieves a case by case number.
    #[must_use]
    pub fn find_by_number(&self, number: CaseNumber) -> Option<&Case> {
        self.numbers
            .get(&number)
            .and_then(|uuid| self.cases.get(uuid))
    }

    /// Iterates over all cases in case-number order.
    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.numbers.values().filter_map(|uuid| self.cases.get(uuid))
    }

    /// Changes the status and/or priority of a case.
    ///
    /// The closure receives the current values and may change either. Other
    /// fields of a case cannot be changed once it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no case has the given number.
    #[instrument(level = "debug", skip(self, change))]
    pub fn update<F>(&mut self, number: CaseNumber, change: F) -> Result<&Case, StoreError>
    where
        F: FnOnce(&mut CaseUpdate),
    {
        let uuid = *self
            .numbers
            .get(&number)
            .ok_or(StoreError::NotFound(number))?;
        let case = self
            .cases
            .get_mut(&uuid)
            .ok_or(StoreError::NotFound(number))?;

        let mut update = CaseUpdate {
            status: case.status,
            priority: case.priority,
        };
        change(&mut update);

        if update.status != case.status {
            tracing::debug!(from = %case.status, to = %update.status, "status changed");
        }
        if update.priority != case.priority {
            tracing::debug!(from = %case.priority, to = %update.priority, "priority changed");
        }

        case.status = update.status;
        case.priority = update.priority;
        Ok(case)
    }

    /// Moves a case to a new status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no case has the given number.
    pub fn set_status(
        &mut self,
        number: CaseNumber,
        status: CaseStatus,
    ) -> Result<&Case, StoreError> {
        self.update(number, |update| update.status = status)
    }

    /// Reassigns the priority of a case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no case has the given number.
    pub fn set_priority(
        &mut self,
        number: CaseNumber,
        priority: Priority,
    ) -> Result<&Case, StoreError> {
        self.update(number, |update| update.priority = priority)
    }

    /// Removes a case, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no case has the given number.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, number: CaseNumber) -> Result<Case, StoreError> {
        let uuid = self
            .numbers
            .remove(&number)
            .ok_or(StoreError::NotFound(number))?;
        self.cases.remove(&uuid).ok_or(StoreError::NotFound(number))
    }
}
