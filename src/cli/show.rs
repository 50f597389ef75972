use casebook::{Case, CaseNumber, SlaResult};
use clap::Parser;
use serde::Serialize;
use tracing::instrument;

use super::{
    terminal::{sla_label, Colorize},
    Desk,
};

#[derive(Debug, Parser)]
#[command(about = "Display one case and its SLA")]
pub struct Show {
    /// The case number, such as CASE-004 or 4
    #[clap(value_parser = super::parse_case_number)]
    number: CaseNumber,

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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaseOutput<'a> {
    number: String,
    uuid: String,
    subject: &'a str,
    requester: &'a str,
    counterparty: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_reference: Option<&'a str>,
    category: casebook::Category,
    created: String,
    priority: casebook::Priority,
    status: casebook::CaseStatus,
    sla: SlaResult,
    severity: casebook::Severity,
}

impl Show {
    #[instrument(level = "debug", skip(self, desk), fields(number = self.number.id().get()))]
    pub fn run(self, desk: &Desk) -> anyhow::Result<()> {
        let number = self
            .number
            .display(desk.config.case_prefix(), desk.config.digits())
            .to_string();

        let Some(case) = desk.store.find_by_number(self.number) else {
            anyhow::bail!("Case {number} not found");
        };
        let sla = case.sla(desk.today);

        match self.output {
            OutputFormat::Pretty => Self::output_pretty(&number, case, &sla),
            OutputFormat::Json => Self::output_json(number, case, sla)?,
        }

        Ok(())
    }

    fn output_pretty(number: &str, case: &Case, sla: &SlaResult) {
        println!("# {number}");
        println!("{}\n", case.subject());

        println!("{}", "Case".dim());
        println!("  Category:     {}", case.category());
        println!("  Priority:     {}", case.priority());
        println!("  Status:       {}", case.status());
        println!("  Created:      {}", case.created());
        println!("  UUID:         {}", case.uuid());

        println!("\n{}", "Parties".dim());
        println!("  Requester:    {}", or_dash(case.requester()));
        println!("  Counterparty: {}", or_dash(case.counterparty()));
        if let Some(order) = case.order_reference() {
            println!("  Order:        {order}");
        }

        println!("\n{}", "SLA".dim());
        println!("  Due:          {}", sla.due_date());
        println!("  Standing:     {}", sla_label(sla).severity(sla.severity()));
        println!("  Severity:     {}", sla.severity());
    }

    fn output_json(number: String, case: &Case, sla: SlaResult) -> anyhow::Result<()> {
        let output = CaseOutput {
            number,
            uuid: case.uuid().to_string(),
            subject: case.subject(),
            requester: case.requester(),
            counterparty: case.counterparty(),
            order_reference: case.order_reference(),
            category: case.category(),
            created: case.created().to_string(),
            priority: case.priority(),
            status: case.status(),
            sla,
            severity: sla.severity(),
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

const fn or_dash(value: &str) -> &str {
    if value.is_empty() { "–" } else { value }
}
