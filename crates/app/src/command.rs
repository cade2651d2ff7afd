use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{de::DeserializeOwned, Deserialize};
use sitebook_core::{
    calendar::{local_date, CalendarError, YearMonth},
    invoice::generate_invoice_number,
    purchase::Purchase,
    report::{AttendanceSummary, DashboardMetrics, Ledger, ReportSummary},
    Invoice, LineItemSheet, PersistedInvoice,
};
use sitebook_util::{AppConfig, OutputFormat};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cli::Command,
    render::{emit, LedgerReport, VerifyReport},
};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// How a successful command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// At least one stored total disagreed with its recomputed value.
    Drift,
}

/// Settings a command runs with, resolved once in `main`.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub timezone: Tz,
    pub invoice_prefix: String,
    pub format: OutputFormat,
    pub now: DateTime<Utc>,
}

impl CommandContext {
    pub fn new(config: &AppConfig, format: Option<OutputFormat>, now: DateTime<Utc>) -> Self {
        Self {
            timezone: config.timezone,
            invoice_prefix: config.invoice_prefix.clone(),
            format: format.unwrap_or(config.output),
            now,
        }
    }
}

/// Invoices may be supplied one at a time or as a batch.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

pub fn execute(
    command: &Command,
    context: &CommandContext,
    out: &mut dyn Write,
) -> Result<Outcome, CommandError> {
    let format = context.format;
    let outcome = match command {
        Command::Totals { file } => {
            let sheet: LineItemSheet = read_json(file)?;
            emit(sheet.totals(), format, out)?;
            Outcome::Clean
        }
        Command::Invoice { file } => {
            let persisted: PersistedInvoice = read_json(file)?;
            let invoice = Invoice::from_persisted(persisted);
            emit(&invoice.to_submission(), format, out)?;
            Outcome::Clean
        }
        Command::Verify { file } => {
            let invoices: OneOrMany<PersistedInvoice> = read_json(file)?;
            let audits = invoices.into_vec().iter().map(Invoice::audit).collect();
            let report = VerifyReport::new(audits);
            emit(&report, format, out)?;
            if report.has_drift() {
                Outcome::Drift
            } else {
                Outcome::Clean
            }
        }
        Command::Purchase { file } => {
            let purchase: Purchase = read_json(file)?;
            emit(&purchase.totals(), format, out)?;
            Outcome::Clean
        }
        Command::Report { file, month } => {
            let ledger: Ledger = read_json(file)?;
            let month = match month {
                Some(raw) => raw.parse::<YearMonth>()?,
                None => YearMonth::containing(context.now, context.timezone),
            };
            let report = LedgerReport {
                summary: ReportSummary::build(&ledger),
                dashboard: DashboardMetrics::build(&ledger, month),
                attendance: AttendanceSummary::build(&ledger.attendance),
            };
            emit(&report, format, out)?;
            Outcome::Clean
        }
        Command::NewInvoice { site_id } => {
            let number = generate_invoice_number(&context.invoice_prefix, context.now);
            let mut invoice = Invoice::draft(number, local_date(context.now, context.timezone));
            if let Some(site_id) = site_id {
                invoice = invoice.with_site(*site_id);
            }
            emit(&invoice.to_submission(), format, out)?;
            Outcome::Clean
        }
    };

    info!(stage = "command", command = command.name(), ?outcome, "command completed");
    Ok(outcome)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let raw = read_input(path)?;
    debug!(stage = "input", path = %path.display(), bytes = raw.len(), "input read");
    Ok(serde_json::from_str(&raw)?)
}

fn read_input(path: &Path) -> Result<String, CommandError> {
    let read_error = |source| CommandError::Read {
        path: path.display().to_string(),
        source,
    };

    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw).map_err(read_error)?;
        return Ok(raw);
    }
    fs::read_to_string(path).map_err(read_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use sitebook_util::Environment;
    use std::{io::Write as _, path::PathBuf};
    use tempfile::NamedTempFile;

    fn context(format: OutputFormat) -> CommandContext {
        let config = AppConfig {
            environment: Environment::Test,
            timezone: chrono_tz::Asia::Kolkata,
            invoice_prefix: "INV".into(),
            output: OutputFormat::Json,
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 20, 0, 0).unwrap();
        CommandContext::new(&config, Some(format), now)
    }

    fn input(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(body.as_bytes()).expect("write input");
        file
    }

    fn amount(value: &Value) -> Decimal {
        value
            .as_str()
            .and_then(|raw| raw.parse().ok())
            .expect("decimal string")
    }

    fn run_json(command: Command) -> (Outcome, Value) {
        let mut out = Vec::new();
        let outcome = execute(&command, &context(OutputFormat::Json), &mut out).expect("execute");
        let value = serde_json::from_slice(&out).expect("json output");
        (outcome, value)
    }

    #[test]
    fn totals_command_recomputes_line_items() {
        let file = input(
            r#"[
                {"pieceworkPayment": "100", "dailyWage": 50, "advancePayment": 20},
                {"pieceworkPayment": 30, "refund": "10"}
            ]"#,
        );
        let (outcome, value) = run_json(Command::Totals {
            file: file.path().to_path_buf(),
        });
        assert_eq!(outcome, Outcome::Clean);
        assert_eq!(amount(&value["totalPiecework"]), dec!(130));
        assert_eq!(amount(&value["grandTotal"]), dec!(170));
    }

    #[test]
    fn invoice_command_ignores_stored_totals() {
        let file = input(
            r#"{
                "id": 7,
                "invoiceNumber": "INV-2024-1",
                "invoiceDate": "2024-05-02",
                "paymentStatus": "paid",
                "grandTotal": "9999",
                "invoiceLabourDetails": [{"pieceworkPayment": "abc", "dailyWage": 25}]
            }"#,
        );
        let (_, value) = run_json(Command::Invoice {
            file: file.path().to_path_buf(),
        });
        assert_eq!(value["id"], 7);
        assert_eq!(value["paymentStatus"], "paid");
        assert_eq!(amount(&value["grandTotal"]), dec!(25));
        assert_eq!(value["invoiceLabourDetails"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn verify_reports_drift_through_outcome() {
        let file = input(
            r#"[
                {"invoiceNumber": "A", "grandTotal": 10, "totalPiecework": 10,
                 "invoiceLabourDetails": [{"pieceworkPayment": 10}]},
                {"invoiceNumber": "B", "grandTotal": 50,
                 "invoiceLabourDetails": [{"pieceworkPayment": 10}]}
            ]"#,
        );
        let (outcome, value) = run_json(Command::Verify {
            file: file.path().to_path_buf(),
        });
        assert_eq!(outcome, Outcome::Drift);
        assert_eq!(value["checked"], 2);
        assert_eq!(value["drifted"], 1);
    }

    #[test]
    fn verify_accepts_single_consistent_invoice() {
        let file = input(r#"{"invoiceNumber": "A", "invoiceLabourDetails": []}"#);
        let (outcome, value) = run_json(Command::Verify {
            file: file.path().to_path_buf(),
        });
        assert_eq!(outcome, Outcome::Clean);
        assert_eq!(value["checked"], 1);
    }

    #[test]
    fn purchase_command_applies_discounts() {
        let file = input(
            r#"{"purchaseProducts": [
                {"name": "cement", "quantity": 10, "unitPrice": "350", "discount": 5},
                {"name": "sand", "quantity": "2", "unitPrice": 100}
            ]}"#,
        );
        let (_, value) = run_json(Command::Purchase {
            file: file.path().to_path_buf(),
        });
        assert_eq!(amount(&value["lines"][0]["singleTotal"]), dec!(3325));
        assert_eq!(amount(&value["totalAmount"]), dec!(3525));
    }

    #[test]
    fn report_defaults_to_month_in_configured_timezone() {
        let file = input(
            r#"{"purchases": [
                {"purchaseDate": "2024-06-01", "totalAmount": 40},
                {"purchaseDate": "2024-05-15", "totalAmount": 60}
            ]}"#,
        );
        let (_, value) = run_json(Command::Report {
            file: file.path().to_path_buf(),
            month: None,
        });
        assert_eq!(value["dashboard"]["month"], "2024-06");
        assert_eq!(amount(&value["dashboard"]["monthlyExpenses"]), dec!(40));
        assert_eq!(amount(&value["summary"]["totalPurchases"]), dec!(100));
    }

    #[test]
    fn report_rejects_malformed_month() {
        let file = input("{}");
        let command = Command::Report {
            file: file.path().to_path_buf(),
            month: Some("May 2024".into()),
        };
        let mut out = Vec::new();
        let err = execute(&command, &context(OutputFormat::Json), &mut out)
            .expect_err("month should be rejected");
        assert!(matches!(err, CommandError::Calendar(CalendarError::InvalidMonth(_))));
    }

    #[test]
    fn new_invoice_starts_with_one_blank_row() {
        let (_, value) = run_json(Command::NewInvoice { site_id: Some(3) });
        let number = value["invoiceNumber"].as_str().expect("number");
        assert!(number.starts_with("INV-2024-"));
        assert_eq!(value["invoiceDate"], "2024-06-01");
        assert_eq!(value["siteId"], 3);
        assert_eq!(value["paymentStatus"], "credit");
        assert_eq!(amount(&value["grandTotal"]), dec!(0));
        assert_eq!(value["invoiceLabourDetails"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn text_format_is_plain() {
        let file = input(r#"[{"dailyWage": 12.5}]"#);
        let command = Command::Totals {
            file: file.path().to_path_buf(),
        };
        let mut out = Vec::new();
        execute(&command, &context(OutputFormat::Text), &mut out).expect("execute");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("12.50"));
        assert!(serde_json::from_str::<Value>(&text).is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let command = Command::Totals {
            file: PathBuf::from("/nonexistent/sitebook/rows.json"),
        };
        let mut out = Vec::new();
        let err = execute(&command, &context(OutputFormat::Json), &mut out)
            .expect_err("missing file");
        assert!(matches!(err, CommandError::Read { .. }));
    }
}
