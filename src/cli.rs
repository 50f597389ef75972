use std::path::{Path, PathBuf};

mod list;
mod show;
mod sla;
mod status;
mod terminal;

use anyhow::Context;
use casebook::{
    domain::parse_date, storage, CaseNumber, CaseStatus, CaseStore, Category, Config, Priority,
};
use chrono::NaiveDate;
use clap::ArgAction;
use list::List;
use show::Show;
use sla::Sla;
use status::Status;

/// The configuration file looked for in the working directory.
const DEFAULT_CONFIG: &str = "casebook.toml";

/// Parse a case number from a string, normalizing to uppercase.
fn parse_case_number(s: &str) -> Result<CaseNumber, String> {
    s.trim().to_uppercase().parse().map_err(|e| format!("{e}"))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_status(s: &str) -> Result<CaseStatus, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// A YAML case file, or a directory of them (default: bundled demo cases)
    #[arg(short, long, global = true, value_name = "PATH")]
    cases: Option<PathBuf>,

    /// Configuration file (default: ./casebook.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// The day to evaluate each SLA on (default: today's local date)
    #[arg(long, global = true, value_name = "YYYY-MM-DD", value_parser = parse_day)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        tracing::debug!(%today, "evaluating SLAs");

        let command = self
            .command
            .unwrap_or_else(|| Command::Status(Status::default()));

        let desk = Desk {
            store: load_store(self.cases.as_deref())?,
            config: load_config(self.config.as_deref())?,
            today,
        };
        command.run(&desk)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show case counts and SLA health (default)
    Status(Status),

    /// List cases with search, filters, sorting and pagination
    List(List),

    /// Show one case and its SLA
    Show(Show),

    /// Evaluate the SLA for an ad hoc case
    Sla(Sla),
}

impl Command {
    fn run(self, desk: &Desk) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(desk)?,
            Self::List(command) => command.run(desk)?,
            Self::Show(command) => command.run(desk)?,
            Self::Sla(command) => command.run(desk.today)?,
        }
        Ok(())
    }
}

/// Everything a command needs to read the desk.
pub struct Desk {
    store: CaseStore,
    config: Config,
    today: NaiveDate,
}

fn load_store(path: Option<&Path>) -> anyhow::Result<CaseStore> {
    let store = match path {
        Some(path) => storage::load_store(path)
            .with_context(|| format!("failed to load cases from {}", path.display()))?,
        None => storage::seed_store().context("failed to load bundled cases")?,
    };
    tracing::info!("loaded {} cases", store.len());
    Ok(store)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return Config::load(path).map_err(|e| anyhow::anyhow!(e));
    }

    let path = Path::new(DEFAULT_CONFIG);
    Ok(Config::load(path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    }))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn case_numbers_are_normalised() {
        assert_eq!(
            parse_case_number(" case-007 ").unwrap().id().get(),
            7
        );
        assert!(parse_case_number("case-x").is_err());
    }

    #[test]
    fn boundary_parsers_report_domain_errors() {
        assert!(parse_priority("sometime")
            .unwrap_err()
            .contains("unknown priority"));
        assert!(parse_status("snoozed").unwrap_err().contains("unknown status"));
        assert!(parse_category("misc").unwrap_err().contains("unknown category"));
        assert!(parse_day("yesterday").unwrap_err().contains("invalid date"));
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["casebook", "--today", "2024-12-21", "list", "-v"]).unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 12, 21));
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Some(Command::List(_))));
    }

    #[test]
    fn unknown_priority_flag_is_rejected() {
        let result = Cli::try_parse_from([
            "casebook",
            "sla",
            "--created",
            "2024-12-20",
            "--priority",
            "asap",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn bundled_desk_loads_without_a_path() {
        let store = load_store(None).unwrap();
        assert!(!store.is_empty());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&tmp.path().join("nope.toml"))).is_err());
    }
}
