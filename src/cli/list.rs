use std::fmt;

use anyhow::Context;
use casebook::{
    listing::{Filters, SortKey, SortSpec},
    CaseQuery, CaseStatus, Category, ListedCase, Page, Priority, Severity, SlaState,
};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::instrument;

use super::{
    parse_category, parse_priority, parse_status,
    terminal::{sla_label, Colorize},
    Desk,
};

/// Command arguments for `casebook list`.
#[derive(Debug, Parser)]
#[command(about = "List cases with search, filters, sorting and pagination")]
pub struct List {
    /// Case-insensitive text to look for in number, subject, parties and order.
    #[arg(long, short)]
    search: Option<String>,

    /// Regular expression to match against subject and order reference.
    #[arg(long)]
    regex: Option<String>,

    /// Filter by status (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "STATUS", value_parser = parse_status)]
    status: Vec<CaseStatus>,

    /// Filter by priority (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "PRIORITY", value_parser = parse_priority)]
    priority: Vec<Priority>,

    /// Filter by category (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "CATEGORY", value_parser = parse_category)]
    category: Vec<Category>,

    /// Filter by SLA state.
    #[arg(long, value_enum, value_delimiter = ',')]
    state: Vec<StateArg>,

    /// Filter by SLA severity.
    #[arg(long, value_enum, value_delimiter = ',')]
    severity: Vec<SeverityArg>,

    /// Hide resolved and closed cases.
    #[arg(long)]
    active: bool,

    /// Sort keys, applied in order (default: sla).
    #[arg(long, value_enum, value_delimiter = ',', value_name = "KEY")]
    sort: Vec<SortField>,

    /// Reverse the order of every sort key.
    #[arg(long)]
    reverse: bool,

    /// Columns to display (comma-separated).
    #[arg(long, value_enum, value_delimiter = ',', value_name = "COL")]
    columns: Vec<ListColumn>,

    /// Page to show, starting at 1.
    #[arg(long, default_value_t = 1, conflicts_with_all = ["offset", "limit"])]
    page: usize,

    /// Cases per page (default: from configuration).
    #[arg(long, conflicts_with_all = ["offset", "limit"])]
    page_size: Option<usize>,

    /// Skip the first N cases.
    #[arg(long)]
    offset: Option<usize>,

    /// Return at most N cases.
    #[arg(long)]
    limit: Option<usize>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and footers for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Sortable fields.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortField {
    Sla,
    Priority,
    Created,
    Status,
    Number,
}

impl From<SortField> for SortKey {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Sla => Self::Sla,
            SortField::Priority => Self::Priority,
            SortField::Created => Self::Created,
            SortField::Status => Self::Status,
            SortField::Number => Self::Number,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StateArg {
    Due,
    Overdue,
}

impl From<StateArg> for SlaState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Due => Self::Due,
            StateArg::Overdue => Self::Overdue,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SeverityArg {
    Critical,
    Warning,
    Caution,
    Normal,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => Self::Critical,
            SeverityArg::Warning => Self::Warning,
            SeverityArg::Caution => Self::Caution,
            SeverityArg::Normal => Self::Normal,
        }
    }
}

/// Available table columns.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum)]
pub enum ListColumn {
    Number,
    Subject,
    Priority,
    Status,
    Category,
    Created,
    Due,
    Sla,
    Requester,
    Counterparty,
    Order,
}

#[derive(Debug, Clone, Serialize)]
struct SerializableRow<'a> {
    number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sla: Option<casebook::SlaResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requester: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    counterparty: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<&'a str>,
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, desk: &Desk) -> anyhow::Result<()> {
        let query = self.query(desk)?;
        let listing = query.run(&desk.store, desk.today);

        match self.output {
            OutputFormat::Table => {
                let rows = self.rows(desk, &listing.items);
                render_table(&self.table_columns(), &rows, self.quiet);
                if !self.quiet {
                    render_footer(&listing);
                }
                Ok(())
            }
            OutputFormat::Json => self.render_json(desk, &listing.items),
            OutputFormat::Csv => {
                self.render_csv(desk, &listing.items);
                Ok(())
            }
        }
    }

    fn query(&self, desk: &Desk) -> anyhow::Result<CaseQuery> {
        let mut query = CaseQuery::for_config(&desk.config);

        if let Some(text) = &self.search {
            query = query.search(text);
        }

        if let Some(pattern) = &self.regex {
            query = query
                .regex(pattern)
                .with_context(|| format!("invalid regex: {pattern}"))?;
        }

        let filters = Filters {
            statuses: self.status.clone(),
            priorities: self.priority.clone(),
            categories: self.category.clone(),
            states: self.state.iter().copied().map(Into::into).collect(),
            severities: self.severity.iter().copied().map(Into::into).collect(),
            active_only: self.active,
        };

        let fields = if self.sort.is_empty() {
            vec![SortField::Sla]
        } else {
            self.sort.clone()
        };
        let sort = fields.into_iter().map(|field| SortSpec {
            key: field.into(),
            reverse: self.reverse,
        });

        let page = if self.offset.is_some() || self.limit.is_some() {
            Page {
                offset: self.offset.unwrap_or(0),
                limit: self.limit,
            }
        } else {
            let size = self
                .page_size
                .filter(|&value| value > 0)
                .unwrap_or_else(|| desk.config.page_size());
            Page::numbered(self.page, size)
        };

        Ok(query.filters(filters).sort(sort).page(page))
    }

    fn table_columns(&self) -> Vec<ListColumn> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        if self.quiet {
            vec![ListColumn::Number]
        } else {
            vec![
                ListColumn::Number,
                ListColumn::Subject,
                ListColumn::Priority,
                ListColumn::Status,
                ListColumn::Due,
                ListColumn::Sla,
            ]
        }
    }

    fn rows(&self, desk: &Desk, items: &[ListedCase<'_>]) -> Vec<Vec<Cell>> {
        let columns = self.table_columns();
        items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|column| Cell {
                        text: column.value(desk, item),
                        severity: (*column == ListColumn::Sla).then_some(item.severity()),
                    })
                    .collect()
            })
            .collect()
    }

    /// Columns for machine-readable output, all of them unless chosen.
    fn output_columns(&self) -> Vec<ListColumn> {
        if self.columns.is_empty() {
            ListColumn::value_variants().to_vec()
        } else {
            self.columns.clone()
        }
    }

    fn render_json(&self, desk: &Desk, items: &[ListedCase<'_>]) -> anyhow::Result<()> {
        let columns = self.output_columns();

        let rows_out: Vec<_> = items
            .iter()
            .map(|item| build_serializable_row(desk, item, &columns))
            .collect();

        serde_json::to_writer_pretty(std::io::stdout(), &rows_out)
            .context("failed to render json output")?;
        println!();
        Ok(())
    }

    fn render_csv(&self, desk: &Desk, items: &[ListedCase<'_>]) {
        for line in self.csv_lines(desk, items) {
            println!("{line}");
        }
    }

    fn csv_lines(&self, desk: &Desk, items: &[ListedCase<'_>]) -> Vec<String> {
        let columns = self.output_columns();
        let mut lines = Vec::with_capacity(items.len() + 1);

        if !self.quiet {
            let header_line = columns
                .iter()
                .map(|column| csv_escape(column.header()))
                .collect::<Vec<_>>()
                .join(",");
            lines.push(header_line);
        }

        for item in items {
            let values = columns
                .iter()
                .map(|column| csv_escape(&column.value(desk, item)))
                .collect::<Vec<_>>();
            lines.push(values.join(","));
        }

        lines
    }
}

/// A table cell, with the severity to colour it by if any.
struct Cell {
    text: String,
    severity: Option<Severity>,
}

fn render_table(columns: &[ListColumn], rows: &[Vec<Cell>], quiet: bool) {
    if quiet {
        for row in rows {
            let values: Vec<_> = row.iter().map(|cell| cell.text.as_str()).collect();
            println!("{}", values.join("\t"));
        }
        return;
    }

    // Determine column widths for alignment.
    let widths = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            rows.iter()
                .map(|row| row[idx].text.chars().count())
                .max()
                .unwrap_or(0)
                .max(column.header().len())
        })
        .collect::<Vec<_>>();

    for (column, &width) in columns.iter().zip(&widths) {
        print!("{:<width$}  ", column.header());
    }
    println!();

    for &width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let padded = format!("{:<width$}", cell.text);
            let styled = cell
                .severity
                .map_or_else(|| padded.clone(), |severity| padded.severity(severity));
            print!("{styled}  ");
        }
        println!();
    }
}

fn render_footer(listing: &casebook::Listing<'_>) {
    if listing.items.is_empty() {
        let message = if listing.total == 0 {
            "No cases match.".to_string()
        } else {
            format!("No cases on this page ({} matches).", listing.total)
        };
        println!("{}", message.dim());
        return;
    }

    let first = listing.page.offset + 1;
    let last = listing.page.offset + listing.items.len();
    println!();
    println!(
        "{}",
        format!("Showing {first}-{last} of {}", listing.total).dim()
    );
}

fn build_serializable_row<'a>(
    desk: &Desk,
    item: &ListedCase<'a>,
    columns: &[ListColumn],
) -> SerializableRow<'a> {
    let case = item.case;
    let mut row = SerializableRow {
        number: format_number(desk, item),
        subject: None,
        priority: None,
        status: None,
        category: None,
        created: None,
        sla: None,
        severity: None,
        requester: None,
        counterparty: None,
        order: None,
    };

    for column in columns {
        match column {
            ListColumn::Number => {}
            ListColumn::Subject => row.subject = Some(case.subject()),
            ListColumn::Priority => row.priority = Some(case.priority()),
            ListColumn::Status => row.status = Some(case.status()),
            ListColumn::Category => row.category = Some(case.category()),
            ListColumn::Created => row.created = Some(case.created().to_string()),
            ListColumn::Due | ListColumn::Sla => {
                row.sla = Some(item.sla);
                row.severity = Some(item.severity());
            }
            ListColumn::Requester => row.requester = Some(case.requester()),
            ListColumn::Counterparty => row.counterparty = Some(case.counterparty()),
            ListColumn::Order => row.order = case.order_reference(),
        }
    }

    row
}

fn format_number(desk: &Desk, item: &ListedCase<'_>) -> String {
    item.case
        .number()
        .display(desk.config.case_prefix(), desk.config.digits())
        .to_string()
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

impl ListColumn {
    const fn header(self) -> &'static str {
        match self {
            Self::Number => "Case",
            Self::Subject => "Subject",
            Self::Priority => "Priority",
            Self::Status => "Status",
            Self::Category => "Category",
            Self::Created => "Created",
            Self::Due => "Due",
            Self::Sla => "SLA",
            Self::Requester => "Requester",
            Self::Counterparty => "Counterparty",
            Self::Order => "Order",
        }
    }

    fn value(self, desk: &Desk, item: &ListedCase<'_>) -> String {
        let case = item.case;
        match self {
            Self::Number => format_number(desk, item),
            Self::Subject => case.subject().to_string(),
            Self::Priority => case.priority().to_string(),
            Self::Status => case.status().to_string(),
            Self::Category => case.category().to_string(),
            Self::Created => case.created().to_string(),
            Self::Due => item.sla.due_date().to_string(),
            Self::Sla => sla_label(&item.sla),
            Self::Requester => case.requester().to_string(),
            Self::Counterparty => case.counterparty().to_string(),
            Self::Order => case.order_reference().unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        })
    }
}
