use std::io::{self, Write};

use rust_decimal::Decimal;
use serde::Serialize;
use sitebook_core::{
    purchase::PurchaseTotals,
    report::{AttendanceSummary, DashboardMetrics, ReportSummary},
    InvoiceAudit, InvoiceSubmission, Totals,
};
use sitebook_util::OutputFormat;

/// Plain-text rendering used when `--format text` is selected.
pub trait TextReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Writes `value` to `out` in the requested format, newline terminated.
pub fn emit<T>(value: &T, format: OutputFormat, out: &mut dyn Write) -> io::Result<()>
where
    T: Serialize + TextReport,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)
        }
        OutputFormat::Text => value.write_text(out),
    }
}

fn row(out: &mut dyn Write, label: &str, amount: Decimal) -> io::Result<()> {
    writeln!(out, "{label:<20}{amount:>14.2}")
}

impl TextReport for Totals {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        row(out, "piecework", self.total_piecework)?;
        row(out, "daily wage", self.total_daily_wage)?;
        row(out, "advance", self.total_advance_payment)?;
        row(out, "refund", self.total_refund)?;
        row(out, "grand total", self.grand_total)
    }
}

impl TextReport for InvoiceSubmission {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "invoice {}", self.invoice_number)?;
        if let Some(date) = self.invoice_date {
            writeln!(out, "date    {date}")?;
        }
        if let Some(site_id) = self.site_id {
            writeln!(out, "site    {site_id}")?;
        }
        writeln!(out, "status  {}", self.payment_status.as_str())?;
        writeln!(out, "rows    {}", self.invoice_labour_details.len())?;
        self.totals.write_text(out)
    }
}

/// Audits for a batch of stored invoices.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    pub checked: usize,
    pub drifted: usize,
    pub invoices: Vec<InvoiceAudit>,
}

impl VerifyReport {
    pub fn new(invoices: Vec<InvoiceAudit>) -> Self {
        let drifted = invoices.iter().filter(|audit| !audit.is_consistent()).count();
        Self {
            checked: invoices.len(),
            drifted,
            invoices,
        }
    }

    pub fn has_drift(&self) -> bool {
        self.drifted > 0
    }
}

impl TextReport for VerifyReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        for audit in &self.invoices {
            if audit.is_consistent() {
                writeln!(out, "{}: ok", audit.invoice_number)?;
                continue;
            }
            writeln!(out, "{}: drift", audit.invoice_number)?;
            for drift in &audit.drift {
                writeln!(
                    out,
                    "  {:<20} stored {:.2} recomputed {:.2}",
                    drift.field.as_str(),
                    drift.stored,
                    drift.recomputed
                )?;
            }
        }
        writeln!(out, "{} checked, {} drifted", self.checked, self.drifted)
    }
}

impl TextReport for PurchaseTotals {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        for line in &self.lines {
            row(out, line.name.as_deref().unwrap_or("(unnamed)"), line.single_total)?;
        }
        row(out, "total", self.total_amount)
    }
}

/// Everything the `report` command prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    pub summary: ReportSummary,
    pub dashboard: DashboardMetrics,
    pub attendance: AttendanceSummary,
}

impl TextReport for LedgerReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        let summary = &self.summary;
        row(out, "purchases", summary.total_purchases)?;
        row(out, "wages", summary.total_wages)?;
        row(out, "invoiced", summary.total_invoiced)?;
        row(out, "paid", summary.total_paid)?;
        writeln!(out, "{:<20}{:>13}%", "collection rate", summary.collection_rate_percent)?;

        for site in &summary.sites {
            writeln!(out)?;
            writeln!(out, "site {} ({})", site.site_name, site.site_id)?;
            row(out, "  purchases", site.purchases)?;
            row(out, "  wages", site.wages)?;
            row(out, "  expenses", site.total_expenses)?;
            row(out, "  budget left", site.budget_remaining)?;
        }

        let labour = &summary.labour;
        writeln!(out)?;
        writeln!(
            out,
            "labour {} (office {}, hire {}, subcontract {})",
            labour.total, labour.office_staff, labour.hire_workers, labour.subcontractors
        )?;

        let dashboard = &self.dashboard;
        writeln!(out)?;
        writeln!(out, "dashboard {}", dashboard.month)?;
        writeln!(out, "  active sites      {}", dashboard.active_sites)?;
        writeln!(out, "  active labour     {}", dashboard.total_labour)?;
        row(out, "  monthly expenses", dashboard.monthly_expenses)?;
        writeln!(out, "  pending invoices  {}", dashboard.pending_invoices)?;
        writeln!(out, "  pending wages     {}", dashboard.pending_wages)?;

        let attendance = &self.attendance;
        writeln!(
            out,
            "attendance: {} present, {} absent, {} half day",
            attendance.present, attendance.absent, attendance.half_day
        )
    }
}
