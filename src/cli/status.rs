use std::process;

use casebook::{CaseStatus, Severity, Summary};
use clap::Parser;
use tracing::instrument;

use super::{
    terminal::{is_narrow, Colorize},
    Desk,
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show case counts and SLA health")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, desk: &Desk) -> anyhow::Result<()> {
        let summary = Summary::of(&desk.store, desk.today);

        if summary.total == 0 {
            println!("No cases found.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Table => {
                if self.quiet {
                    println!("{}", quiet_line(&summary));
                } else {
                    Self::output_table(&summary, desk);
                }
            }
        }

        // Exit with a non-zero code when any active case is past due.
        if summary.overdue > 0 {
            process::exit(2);
        }

        Ok(())
    }

    fn output_table(summary: &Summary, desk: &Desk) {
        let narrow = is_narrow();

        println!("Cases as of {}", desk.today);
        println!("{}", "──────────────────────".dim());

        if narrow {
            for (status, count) in &summary.by_status {
                println!("{status}: {count}");
            }
            println!("Total: {}", summary.total);
        } else {
            println!("{:<26} Count", "Status");
            for (status, count) in &summary.by_status {
                let line = format!("{:<26} {count}", status.as_str());
                if *count == 0 {
                    println!("{}", line.dim());
                } else {
                    println!("{line}");
                }
            }
            println!("{:<26} {}", "Total", summary.total);
        }

        println!();
        println!("Active cases: {}", summary.active);
        for severity in Severity::ALL {
            let count = summary.by_severity.get(&severity).copied().unwrap_or(0);
            let label = format!("{:<9} {count}", severity.as_str());
            println!("  {}", label.severity(severity));
        }

        println!();
        if summary.overdue == 0 {
            println!("Overdue: {} ✅", "0".success());
        } else {
            println!("Overdue: {} ⚠️", summary.overdue.to_string().critical());
            println!(
                "{}",
                "Run 'casebook list --state overdue' to investigate.".dim()
            );
        }
    }
}

fn quiet_line(summary: &Summary) -> String {
    let open = summary
        .by_status
        .get(&CaseStatus::Open)
        .copied()
        .unwrap_or(0);
    format!(
        "total={} active={} open={open} overdue={}",
        summary.total, summary.active, summary.overdue
    )
}
