use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sitebook_util::OutputFormat;

/// Totals, audits and reports for the site back office.
#[derive(Debug, Parser)]
#[command(name = "sitebook", version)]
pub struct Cli {
    /// Output format, overriding APP_OUTPUT (json or text).
    #[arg(long, global = true, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recompute totals for a JSON array of line items.
    Totals {
        /// Input file, or `-` for stdin.
        file: PathBuf,
    },
    /// Load a stored invoice and emit it with recomputed totals.
    Invoice { file: PathBuf },
    /// Check stored invoice totals against their labour details.
    Verify { file: PathBuf },
    /// Compute line and overall totals for a purchase.
    Purchase { file: PathBuf },
    /// Summarise a ledger snapshot.
    Report {
        file: PathBuf,
        /// Month for the dashboard figures, as YYYY-MM. Defaults to the
        /// current month in APP_TIMEZONE.
        #[arg(long)]
        month: Option<String>,
    },
    /// Emit a blank invoice draft.
    NewInvoice {
        #[arg(long)]
        site_id: Option<i64>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Totals { .. } => "totals",
            Self::Invoice { .. } => "invoice",
            Self::Verify { .. } => "verify",
            Self::Purchase { .. } => "purchase",
            Self::Report { .. } => "report",
            Self::NewInvoice { .. } => "new-invoice",
        }
    }
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(value).map_err(|err| err.to_string())
}
