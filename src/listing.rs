use std::{cmp::Ordering, collections::BTreeMap};

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::{
    domain::{
        case_number::{DEFAULT_DIGITS, DEFAULT_PREFIX},
        Case, CaseStatus, Category, Config, Priority, Severity, SlaResult, SlaStanding, SlaState,
    },
    storage::CaseStore,
};

/// A case paired with its SLA standing at listing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListedCase<'a> {
    /// The case.
    pub case: &'a Case,
    /// Its SLA standing on the listing day.
    pub sla: SlaResult,
}

impl<'a> ListedCase<'a> {
    /// Evaluates the SLA of `case` on `today`.
    #[must_use]
    pub fn new(case: &'a Case, today: NaiveDate) -> Self {
        Self {
            case,
            sla: case.sla(today),
        }
    }

    /// The display bucket of the SLA standing.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.sla.severity()
    }
}

/// Field-level filters. An empty list accepts any value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Accepted statuses.
    pub statuses: Vec<CaseStatus>,
    /// Accepted priorities.
    pub priorities: Vec<Priority>,
    /// Accepted categories.
    pub categories: Vec<Category>,
    /// Accepted SLA states.
    pub states: Vec<SlaState>,
    /// Accepted severities.
    pub severities: Vec<Severity>,
    /// Exclude resolved and closed cases.
    pub active_only: bool,
}

impl Filters {
    fn matches(&self, item: &ListedCase<'_>) -> bool {
        let case = item.case;
        accepts(&self.statuses, &case.status())
            && accepts(&self.priorities, &case.priority())
            && accepts(&self.categories, &case.category())
            && accepts(&self.states, &item.sla.state())
            && accepts(&self.severities, &item.severity())
            && (!self.active_only || case.is_active())
    }
}

fn accepts<T: PartialEq>(allowed: &[T], value: &T) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

/// A field to order cases by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Overdue first (most overdue first), then soonest due. Resolved and
    /// closed cases come last.
    #[default]
    Sla,
    /// Urgent first.
    Priority,
    /// Newest first.
    Created,
    /// Lifecycle order, open first.
    Status,
    /// Case number, lowest first.
    Number,
}

/// One level of a multi-key sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    /// The field.
    pub key: SortKey,
    /// Invert the natural order of the field.
    pub reverse: bool,
}

impl From<SortKey> for SortSpec {
    fn from(key: SortKey) -> Self {
        Self {
            key,
            reverse: false,
        }
    }
}

impl SortSpec {
    fn compare(self, a: &ListedCase<'_>, b: &ListedCase<'_>) -> Ordering {
        let ordering = match self.key {
            SortKey::Sla => sla_rank(a).cmp(&sla_rank(b)),
            SortKey::Priority => b.case.priority().cmp(&a.case.priority()),
            SortKey::Created => b.case.created().cmp(&a.case.created()),
            SortKey::Status => a.case.status().cmp(&b.case.status()),
            SortKey::Number => a.case.number().cmp(&b.case.number()),
        };

        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Sort rank for the SLA order: a lower tuple sorts first.
fn sla_rank(item: &ListedCase<'_>) -> (u8, i64) {
    if !item.case.is_active() {
        return (2, 0);
    }
    match item.sla.standing() {
        SlaStanding::Overdue { days_overdue } => (0, -i64::from(days_overdue)),
        SlaStanding::Due { days_left } => (1, i64::from(days_left)),
    }
}

/// Which slice of the sorted matches to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    /// Matches to skip.
    pub offset: usize,
    /// Maximum number of matches to return, or all of them.
    pub limit: Option<usize>,
}

impl Page {
    /// Every match.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    /// `limit` matches after skipping `offset`.
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }

    /// The 1-based page `number` of `size` matches each.
    ///
    /// Page zero is treated as the first page.
    #[must_use]
    pub const fn numbered(number: usize, size: usize) -> Self {
        let index = number.saturating_sub(1);
        Self::new(index.saturating_mul(size), size)
    }

    fn apply<T>(self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

/// The outcome of running a [`CaseQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<'a> {
    /// The requested page of matches, in sorted order.
    pub items: Vec<ListedCase<'a>>,
    /// The number of matches before pagination.
    pub total: usize,
    /// The page that was applied.
    pub page: Page,
}

impl Listing<'_> {
    /// Whether more matches follow this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page.offset.saturating_add(self.items.len()) < self.total
    }
}

/// Search text, filters, sort order and page for listing cases.
///
/// Each case is evaluated once on the listing day, then filtered, sorted
/// and paginated. Ties in the sort order are broken by case number.
#[derive(Debug, Clone)]
pub struct CaseQuery {
    search: Option<String>,
    regex: Option<Regex>,
    filters: Filters,
    sort: Vec<SortSpec>,
    page: Page,
    prefix: String,
    digits: usize,
}

impl Default for CaseQuery {
    fn default() -> Self {
        Self {
            search: None,
            regex: None,
            filters: Filters::default(),
            sort: vec![SortSpec::default()],
            page: Page::all(),
            prefix: DEFAULT_PREFIX.to_string(),
            digits: DEFAULT_DIGITS,
        }
    }
}

impl CaseQuery {
    /// A query matching every case, sorted by SLA.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A query whose search matches case numbers as the configuration
    /// renders them.
    #[must_use]
    pub fn for_config(config: &Config) -> Self {
        Self {
            prefix: config.case_prefix().to_string(),
            digits: config.digits(),
            ..Self::default()
        }
    }

    /// Case-insensitive substring match against the case number, subject,
    /// parties and order reference. Blank text matches everything.
    #[must_use]
    pub fn search(mut self, text: &str) -> Self {
        let text = text.trim();
        self.search = (!text.is_empty()).then(|| text.to_lowercase());
        self
    }

    /// Regular expression match against the subject and order reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn regex(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.regex = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Replaces the field filters.
    #[must_use]
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Replaces the sort order. An empty list sorts by case number only.
    #[must_use]
    pub fn sort<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SortSpec>,
    {
        self.sort = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the page to return.
    #[must_use]
    pub const fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Runs the query against a store as of `today`.
    #[must_use]
    pub fn run<'a>(&self, store: &'a CaseStore, today: NaiveDate) -> Listing<'a> {
        self.run_over(store.cases(), today)
    }

    /// Runs the query against any collection of cases as of `today`.
    #[must_use]
    pub fn run_over<'a, I>(&self, cases: I, today: NaiveDate) -> Listing<'a>
    where
        I: IntoIterator<Item = &'a Case>,
    {
        let mut matches: Vec<ListedCase<'a>> = cases
            .into_iter()
            .map(|case| ListedCase::new(case, today))
            .filter(|item| self.matches(item))
            .collect();

        matches.sort_by(|a, b| self.compare(a, b));

        let total = matches.len();
        tracing::debug!(total, "listed cases");

        Listing {
            items: self.page.apply(matches),
            total,
            page: self.page,
        }
    }

    fn matches(&self, item: &ListedCase<'_>) -> bool {
        if !self.filters.matches(item) {
            return false;
        }

        let case = item.case;

        if let Some(search) = &self.search {
            let number = case.number().display(&self.prefix, self.digits).to_string();
            let found = [
                number.as_str(),
                case.subject(),
                case.requester(),
                case.counterparty(),
                case.order_reference().unwrap_or_default(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(search.as_str()));
            if !found {
                return false;
            }
        }

        if let Some(regex) = &self.regex {
            let haystack = case.order_reference().map_or_else(
                || case.subject().to_string(),
                |order| format!("{}\n{order}", case.subject()),
            );
            if !regex.is_match(&haystack) {
                return false;
            }
        }

        true
    }

    fn compare(&self, a: &ListedCase<'_>, b: &ListedCase<'_>) -> Ordering {
        self.sort
            .iter()
            .map(|spec| spec.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.case.number().cmp(&b.case.number()))
    }
}

/// Headline counts for a desk of cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// All cases.
    pub total: usize,
    /// Cases that are neither resolved nor closed.
    pub active: usize,
    /// Active cases past their due date.
    pub overdue: usize,
    /// Cases per status. Every status is present, possibly with zero.
    pub by_status: BTreeMap<CaseStatus, usize>,
    /// Active cases per severity. Every severity is present, possibly with
    /// zero.
    pub by_severity: BTreeMap<Severity, usize>,
}

impl Summary {
    /// Counts the cases in a store as of `today`.
    #[must_use]
    pub fn of(store: &CaseStore, today: NaiveDate) -> Self {
        Self::over(store.cases(), today)
    }

    /// Counts any collection of cases as of `today`.
    #[must_use]
    pub fn over<'a, I>(cases: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Case>,
    {
        let mut summary = Self {
            by_status: CaseStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
            by_severity: Severity::ALL.into_iter().map(|s| (s, 0)).collect(),
            ..Self::default()
        };

        for case in cases {
            summary.total += 1;
            *summary.by_status.entry(case.status()).or_insert(0) += 1;

            if !case.is_active() {
                continue;
            }

            let sla = case.sla(today);
            summary.active += 1;
            if sla.state() == SlaState::Overdue {
                summary.overdue += 1;
            }
            *summary.by_severity.entry(sla.severity()).or_insert(0) += 1;
        }

        summary
    }
}
