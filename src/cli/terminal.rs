//! Terminal capability detection and colour tokens

use casebook::{domain::SlaStanding, Severity, SlaResult};
use owo_colors::{colors::css, OwoColorize};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 60)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as critical (red)
    fn critical(&self) -> String;
    /// Color as caution (yellow)
    fn caution(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;

    /// Color according to an SLA severity.
    fn severity(&self, severity: Severity) -> String {
        match severity {
            Severity::Critical => self.critical(),
            Severity::Warning => self.warning(),
            Severity::Caution => self.caution(),
            Severity::Normal => self.success(),
        }
    }
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn critical(&self) -> String {
        if supports_color() {
            self.fg::<css::Red>().bold().to_string()
        } else {
            self.to_string()
        }
    }

    fn caution(&self) -> String {
        if supports_color() {
            self.fg::<css::Gold>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn critical(&self) -> String {
        self.as_str().critical()
    }

    fn caution(&self) -> String {
        self.as_str().caution()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// Short text for an SLA standing, such as `2d left` or `3d overdue`.
pub fn sla_label(sla: &SlaResult) -> String {
    match sla.standing() {
        SlaStanding::Due { days_left: 0 } => "due today".to_string(),
        SlaStanding::Due { days_left } => format!("{days_left}d left"),
        SlaStanding::Overdue { days_overdue } => format!("{days_overdue}d overdue"),
    }
}

#[cfg(test)]
mod tests {
    use casebook::{domain::sla::evaluate, CaseStatus, Priority};
    use chrono::NaiveDate;
    use test_case::test_case;

    use super::*;

    #[test_case("2024-12-21", CaseStatus::Open, "due today")]
    #[test_case("2024-12-20", CaseStatus::Open, "1d left")]
    #[test_case("2024-12-22", CaseStatus::Open, "1d overdue")]
    #[test_case("2024-12-30", CaseStatus::Closed, "due today"; "closed reads as due today")]
    fn labels_follow_the_standing(today: &str, status: CaseStatus, expected: &str) {
        let created = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
        let today: NaiveDate = today.parse().unwrap();

        let result = evaluate(created, Priority::Urgent, status, today);

        assert_eq!(sla_label(&result), expected);
    }
}
