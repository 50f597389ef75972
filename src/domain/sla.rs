//! SLA deadline and standing for support cases.
//!
//! Every function here is pure: the current date is always supplied by the
//! caller, and results are recomputed on each call rather than stored on a
//! case.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::{CaseStatus, Priority};

/// The number of calendar days between opening a case and its due date.
#[must_use]
pub const fn target_days(priority: Priority) -> u32 {
    priority.target_days()
}

/// The SLA due date of a case opened on `created` with the given priority.
///
/// Saturates at the latest representable date.
#[must_use]
pub fn compute_due_date(created: NaiveDate, priority: Priority) -> NaiveDate {
    created
        .checked_add_days(Days::new(u64::from(target_days(priority))))
        .unwrap_or(NaiveDate::MAX)
}

/// Whether a case is still within its SLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlaState {
    /// The due date is today or later.
    Due,
    /// The due date has passed.
    Overdue,
}

impl SlaState {
    /// The canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for SlaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state of an SLA together with its day count.
///
/// Only the count matching the state exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SlaStanding {
    /// Still within the SLA.
    Due {
        /// Whole days until the due date; zero on the due date itself.
        #[serde(rename = "daysLeft")]
        days_left: u32,
    },
    /// Past the due date.
    Overdue {
        /// Whole days since the due date; always at least one.
        #[serde(rename = "daysOverdue")]
        days_overdue: u32,
    },
}

impl SlaStanding {
    /// The state without its count.
    #[must_use]
    pub const fn state(self) -> SlaState {
        match self {
            Self::Due { .. } => SlaState::Due,
            Self::Overdue { .. } => SlaState::Overdue,
        }
    }
}

/// Display bucket for an SLA standing.
///
/// Severity only picks how a standing is shown. It never feeds back into
/// the standing itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Overdue.
    Critical,
    /// Due today or tomorrow.
    Warning,
    /// Due in two days.
    Caution,
    /// Nothing to flag.
    Normal,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Self; 4] = [Self::Critical, Self::Warning, Self::Caution, Self::Normal];

    /// The canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Caution => "caution",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an SLA standing to its display bucket.
#[must_use]
pub const fn classify_severity(standing: SlaStanding) -> Severity {
    match standing {
        SlaStanding::Overdue { .. } => Severity::Critical,
        SlaStanding::Due { days_left: 0 | 1 } => Severity::Warning,
        SlaStanding::Due { days_left: 2 } => Severity::Caution,
        SlaStanding::Due { .. } => Severity::Normal,
    }
}

/// The SLA standing of a case as of a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaResult {
    due_date: NaiveDate,
    #[serde(flatten)]
    standing: SlaStanding,
}

impl SlaResult {
    /// The date the case is due.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// The state and its day count.
    #[must_use]
    pub const fn standing(&self) -> SlaStanding {
        self.standing
    }

    /// Whether the case is due or overdue.
    #[must_use]
    pub const fn state(&self) -> SlaState {
        self.standing.state()
    }

    /// Days remaining, if the case is due.
    #[must_use]
    pub const fn days_left(&self) -> Option<u32> {
        match self.standing {
            SlaStanding::Due { days_left } => Some(days_left),
            SlaStanding::Overdue { .. } => None,
        }
    }

    /// Days past the due date, if the case is overdue.
    #[must_use]
    pub const fn days_overdue(&self) -> Option<u32> {
        match self.standing {
            SlaStanding::Overdue { days_overdue } => Some(days_overdue),
            SlaStanding::Due { .. } => None,
        }
    }

    /// The display bucket for this result.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        classify_severity(self.standing)
    }
}

/// Evaluates the SLA standing of a case on the calendar day `today`.
///
/// Resolved and closed cases are always reported as due with zero days
/// left, however late they were resolved.
#[must_use]
pub fn evaluate(
    created: NaiveDate,
    priority: Priority,
    status: CaseStatus,
    today: NaiveDate,
) -> SlaResult {
    let due_date = compute_due_date(created, priority);

    if status.is_terminal() {
        return SlaResult {
            due_date,
            standing: SlaStanding::Due { days_left: 0 },
        };
    }

    // Both sides are whole days, so the difference is already the ceiling.
    let days_diff = due_date.signed_duration_since(today).num_days();

    let standing = if days_diff >= 0 {
        SlaStanding::Due {
            days_left: clamp_days(days_diff),
        }
    } else {
        SlaStanding::Overdue {
            days_overdue: clamp_days(days_diff.saturating_abs()),
        }
    };

    SlaResult { due_date, standing }
}

/// Evaluates the SLA standing at a moment in time.
///
/// The time of day is discarded on both sides before comparing.
#[must_use]
pub fn evaluate_at(
    created: NaiveDateTime,
    priority: Priority,
    status: CaseStatus,
    now: NaiveDateTime,
) -> SlaResult {
    evaluate(created.date(), priority, status, now.date())
}

fn clamp_days(days: i64) -> u32 {
    u32::try_from(days).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test_case(Priority::Low, "2024-12-08")]
    #[test_case(Priority::Normal, "2024-12-06")]
    #[test_case(Priority::High, "2024-12-04")]
    #[test_case(Priority::Urgent, "2024-12-02")]
    fn due_date_adds_target_days(priority: Priority, expected: &str) {
        assert_eq!(
            compute_due_date(date("2024-12-01"), priority),
            date(expected)
        );
    }

    #[test]
    fn due_date_crosses_month_and_year_boundaries() {
        assert_eq!(
            compute_due_date(date("2024-12-29"), Priority::Normal),
            date("2025-01-03")
        );
        assert_eq!(
            compute_due_date(date("2024-02-27"), Priority::High),
            date("2024-03-01")
        );
    }

    #[test]
    fn high_priority_due_in_two_days() {
        let result = evaluate(
            date("2024-12-20"),
            Priority::High,
            CaseStatus::Open,
            date("2024-12-21"),
        );

        assert_eq!(result.due_date(), date("2024-12-23"));
        assert_eq!(result.state(), SlaState::Due);
        assert_eq!(result.days_left(), Some(2));
        assert_eq!(result.days_overdue(), None);
        assert_eq!(result.severity(), Severity::Caution);
    }

    #[test]
    fn waiting_case_past_due_is_overdue() {
        let result = evaluate(
            date("2024-12-17"),
            Priority::High,
            CaseStatus::WaitingOnCounterparty,
            date("2024-12-22"),
        );

        assert_eq!(result.due_date(), date("2024-12-20"));
        assert_eq!(result.state(), SlaState::Overdue);
        assert_eq!(result.days_overdue(), Some(2));
        assert_eq!(result.days_left(), None);
        assert_eq!(result.severity(), Severity::Critical);
    }

    #[test]
    fn resolved_case_is_never_overdue() {
        let result = evaluate(
            date("2024-12-10"),
            Priority::Normal,
            CaseStatus::Resolved,
            date("2025-01-15"),
        );

        assert_eq!(result.due_date(), date("2024-12-15"));
        assert_eq!(result.standing(), SlaStanding::Due { days_left: 0 });
    }

    #[test]
    fn urgent_case_due_today() {
        let result = evaluate(
            date("2024-12-20"),
            Priority::Urgent,
            CaseStatus::Open,
            date("2024-12-21"),
        );

        assert_eq!(result.due_date(), date("2024-12-21"));
        assert_eq!(result.standing(), SlaStanding::Due { days_left: 0 });
        assert_eq!(result.severity(), Severity::Warning);
    }

    #[test]
    fn low_priority_due_on_the_day() {
        let result = evaluate(
            date("2024-12-01"),
            Priority::Low,
            CaseStatus::InReview,
            date("2024-12-08"),
        );

        assert_eq!(result.due_date(), date("2024-12-08"));
        assert_eq!(result.standing(), SlaStanding::Due { days_left: 0 });
    }

    #[test]
    fn evaluation_is_deterministic() {
        let args = (
            date("2024-12-17"),
            Priority::Normal,
            CaseStatus::Open,
            date("2024-12-30"),
        );
        let first = evaluate(args.0, args.1, args.2, args.3);
        let second = evaluate(args.0, args.1, args.2, args.3);
        assert_eq!(first, second);
    }

    #[test]
    fn due_date_ignores_status_and_today() {
        let created = date("2024-11-03");
        let expected = compute_due_date(created, Priority::High);

        for status in CaseStatus::ALL {
            for offset in [0, 3, 40] {
                let today = created + Days::new(offset);
                let result = evaluate(created, Priority::High, status, today);
                assert_eq!(result.due_date(), expected);
            }
        }
    }

    #[test_case(CaseStatus::Resolved)]
    #[test_case(CaseStatus::Closed)]
    fn terminal_statuses_short_circuit(status: CaseStatus) {
        let created = date("2020-01-01");
        for today in ["2020-01-01", "2021-06-30", "2030-12-31"] {
            let result = evaluate(created, Priority::Urgent, status, date(today));
            assert_eq!(result.standing(), SlaStanding::Due { days_left: 0 });
        }
    }

    #[test]
    fn exactly_one_count_is_present() {
        let created = date("2024-12-01");
        for priority in Priority::ALL {
            for status in CaseStatus::ALL {
                for offset in 0..15 {
                    let today = created + Days::new(offset);
                    let result = evaluate(created, priority, status, today);
                    match result.state() {
                        SlaState::Due => {
                            assert!(result.days_left().is_some());
                            assert!(result.days_overdue().is_none());
                        }
                        SlaState::Overdue => {
                            assert!(result.days_left().is_none());
                            assert!(result.days_overdue().is_some_and(|days| days > 0));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn advancing_a_day_moves_one_step_closer() {
        let created = date("2024-12-01");
        for priority in Priority::ALL {
            let mut previous = evaluate(created, priority, CaseStatus::Open, created);
            for offset in 1..20 {
                let today = created + Days::new(offset);
                let current = evaluate(created, priority, CaseStatus::Open, today);

                match (previous.standing(), current.standing()) {
                    (
                        SlaStanding::Due { days_left: before },
                        SlaStanding::Due { days_left: after },
                    ) => assert_eq!(after + 1, before),
                    (
                        SlaStanding::Due { days_left: 0 },
                        SlaStanding::Overdue { days_overdue: 1 },
                    ) => {}
                    (
                        SlaStanding::Overdue { days_overdue: before },
                        SlaStanding::Overdue { days_overdue: after },
                    ) => assert_eq!(after, before + 1),
                    (before, after) => panic!("unexpected transition {before:?} -> {after:?}"),
                }

                previous = current;
            }
        }
    }

    #[test]
    fn time_of_day_is_ignored() {
        let created = date("2024-12-20").and_hms_opt(23, 59, 0).unwrap();
        let now = date("2024-12-21").and_hms_opt(0, 1, 0).unwrap();

        let result = evaluate_at(created, Priority::High, CaseStatus::Open, now);

        assert_eq!(result.due_date(), date("2024-12-23"));
        assert_eq!(result.days_left(), Some(2));
    }

    #[test_case(SlaStanding::Overdue { days_overdue: 1 }, Severity::Critical)]
    #[test_case(SlaStanding::Overdue { days_overdue: 30 }, Severity::Critical)]
    #[test_case(SlaStanding::Due { days_left: 0 }, Severity::Warning)]
    #[test_case(SlaStanding::Due { days_left: 1 }, Severity::Warning)]
    #[test_case(SlaStanding::Due { days_left: 2 }, Severity::Caution)]
    #[test_case(SlaStanding::Due { days_left: 3 }, Severity::Normal)]
    #[test_case(SlaStanding::Due { days_left: 7 }, Severity::Normal)]
    fn severity_buckets(standing: SlaStanding, expected: Severity) {
        assert_eq!(classify_severity(standing), expected);
    }

    #[test]
    fn serialises_only_the_matching_count() {
        let due = evaluate(
            date("2024-12-20"),
            Priority::High,
            CaseStatus::Open,
            date("2024-12-21"),
        );
        let json = serde_json::to_value(due).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"dueDate": "2024-12-23", "state": "due", "daysLeft": 2})
        );

        let overdue = evaluate(
            date("2024-12-17"),
            Priority::High,
            CaseStatus::Open,
            date("2024-12-22"),
        );
        let json = serde_json::to_value(overdue).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"dueDate": "2024-12-20", "state": "overdue", "daysOverdue": 2})
        );
    }
}
