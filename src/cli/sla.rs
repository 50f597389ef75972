use casebook::{domain::sla, CaseStatus, Priority, SlaResult};
use chrono::NaiveDate;
use clap::Parser;
use tracing::instrument;

use super::{
    parse_day, parse_priority, parse_status,
    terminal::{sla_label, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "Evaluate the SLA of a case that is not on the desk")]
pub struct Sla {
    /// The day the case was opened
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_day)]
    created: NaiveDate,

    /// The case priority
    #[arg(long, value_parser = parse_priority)]
    priority: Priority,

    /// The case status
    #[arg(long, default_value = "open", value_parser = parse_status)]
    status: CaseStatus,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Sla {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, today: NaiveDate) -> anyhow::Result<()> {
        let result = self.evaluate(today);

        match self.output {
            OutputFormat::Pretty => {
                println!(
                    "{} priority, target {} days",
                    self.priority,
                    sla::target_days(self.priority)
                );
                println!("Due:      {}", result.due_date());
                println!(
                    "Standing: {}",
                    sla_label(&result).severity(result.severity())
                );
                println!("Severity: {}", result.severity());
            }
            OutputFormat::Json => {
                let mut value = serde_json::to_value(result)?;
                value["severity"] = serde_json::json!(result.severity());
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }

        Ok(())
    }

    fn evaluate(&self, today: NaiveDate) -> SlaResult {
        sla::evaluate(self.created, self.priority, self.status, today)
    }
}

#[cfg(test)]
mod tests {
    use casebook::{Severity, SlaState};
    use test_case::test_case;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 22).unwrap()
    }

    #[test_case(
        &["--created", "2024-12-20", "--priority", "high"],
        SlaState::Due,
        Severity::Warning;
        "high due tomorrow"
    )]
    #[test_case(
        &["--created", "2024-12-17", "--priority", "high"],
        SlaState::Overdue,
        Severity::Critical;
        "high overdue"
    )]
    #[test_case(
        &["--created", "2024-12-20", "--priority", "normal"],
        SlaState::Due,
        Severity::Normal;
        "normal three days out"
    )]
    #[test_case(
        &["--created", "2024-12-01", "--priority", "low", "--status", "resolved"],
        SlaState::Due,
        Severity::Warning;
        "resolved short circuits"
    )]
    fn evaluates_from_flags(args: &[&str], state: SlaState, severity: Severity) {
        let mut argv = vec!["sla"];
        argv.extend_from_slice(args);
        let command = Sla::try_parse_from(argv).unwrap();

        let result = command.evaluate(today());
        assert_eq!(result.state(), state);
        assert_eq!(result.severity(), severity);
    }

    #[test]
    fn created_and_priority_are_required() {
        assert!(Sla::try_parse_from(["sla", "--priority", "urgent"]).is_err());
        assert!(Sla::try_parse_from(["sla", "--created", "2024-12-20"]).is_err());
    }
}
