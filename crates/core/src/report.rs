use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{
    calendar::YearMonth,
    invoice::{PaymentStatus, PersistedInvoice},
    purchase::Purchase,
    records::{Attendance, AttendanceStatus, Labour, LabourType, Site},
    totals::Totals,
    wage::PersistedWage,
};

/// In-memory snapshot of the back-office records used for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ledger {
    pub sites: Vec<Site>,
    pub labour: Vec<Labour>,
    pub purchases: Vec<Purchase>,
    #[serde(alias = "salaries")]
    pub wages: Vec<PersistedWage>,
    pub invoices: Vec<PersistedInvoice>,
    pub attendance: Vec<Attendance>,
}

impl Ledger {
    /// Grand total of an invoice, recomputed from its labour details.
    fn invoice_total(invoice: &PersistedInvoice) -> Decimal {
        Totals::recompute(&invoice.invoice_labour_details).grand_total
    }
}

/// Company-wide figures shown on the reports page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_purchases: Decimal,
    pub total_wages: Decimal,
    pub total_invoiced: Decimal,
    pub total_paid: Decimal,
    /// Share of invoiced value already paid, as a whole percentage.
    pub collection_rate_percent: Decimal,
    pub sites: Vec<SiteBreakdown>,
    pub labour: LabourBreakdown,
}

impl ReportSummary {
    pub fn build(ledger: &Ledger) -> Self {
        let total_purchases = ledger.purchases.iter().map(Purchase::amount).sum();
        let total_wages = ledger.wages.iter().map(|wage| wage.payment_amount).sum();
        let total_invoiced: Decimal = ledger.invoices.iter().map(Ledger::invoice_total).sum();
        let total_paid = ledger
            .invoices
            .iter()
            .filter(|invoice| invoice.payment_status == PaymentStatus::Paid)
            .map(Ledger::invoice_total)
            .sum();

        Self {
            total_purchases,
            total_wages,
            total_invoiced,
            total_paid,
            collection_rate_percent: collection_rate(total_paid, total_invoiced),
            sites: ledger
                .sites
                .iter()
                .map(|site| SiteBreakdown::build(site, ledger))
                .collect(),
            labour: LabourBreakdown::build(&ledger.labour),
        }
    }
}

fn collection_rate(paid: Decimal, invoiced: Decimal) -> Decimal {
    if invoiced.is_zero() {
        return Decimal::ZERO;
    }
    (paid / invoiced * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Spend recorded against one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteBreakdown {
    pub site_id: i64,
    pub site_name: String,
    pub purchases: Decimal,
    pub wages: Decimal,
    pub total_expenses: Decimal,
    pub budget: Decimal,
    pub budget_remaining: Decimal,
}

impl SiteBreakdown {
    fn build(site: &Site, ledger: &Ledger) -> Self {
        let purchases: Decimal = ledger
            .purchases
            .iter()
            .filter(|purchase| purchase.site_id == Some(site.id))
            .map(Purchase::amount)
            .sum();
        let wages: Decimal = ledger
            .wages
            .iter()
            .filter(|wage| wage.site_id == Some(site.id))
            .map(|wage| wage.payment_amount)
            .sum();
        let total_expenses = purchases + wages;

        Self {
            site_id: site.id,
            site_name: site.site_name.clone(),
            purchases,
            wages,
            total_expenses,
            budget: site.budget,
            budget_remaining: site.budget - total_expenses,
        }
    }
}

/// Headcount per labour type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabourBreakdown {
    pub total: usize,
    pub office_staff: usize,
    pub hire_workers: usize,
    pub subcontractors: usize,
}

impl LabourBreakdown {
    pub fn build(labour: &[Labour]) -> Self {
        labour.iter().fold(
            Self {
                total: labour.len(),
                ..Self::default()
            },
            |mut counts, worker| {
                match worker.labour_type {
                    LabourType::OfficeStaff => counts.office_staff += 1,
                    LabourType::HireWorker => counts.hire_workers += 1,
                    LabourType::SubcontractorLabour => counts.subcontractors += 1,
                }
                counts
            },
        )
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub month: YearMonth,
    pub active_sites: usize,
    pub total_labour: usize,
    pub monthly_expenses: Decimal,
    pub pending_invoices: usize,
    pub pending_wages: usize,
}

impl DashboardMetrics {
    pub fn build(ledger: &Ledger, month: YearMonth) -> Self {
        Self {
            month,
            active_sites: ledger.sites.iter().filter(|site| site.is_active()).count(),
            total_labour: ledger.labour.iter().filter(|worker| worker.is_active()).count(),
            monthly_expenses: ledger
                .purchases
                .iter()
                .filter(|purchase| {
                    purchase
                        .purchase_date
                        .map(|date| month.contains(date))
                        .unwrap_or(false)
                })
                .map(Purchase::amount)
                .sum(),
            pending_invoices: ledger
                .invoices
                .iter()
                .filter(|invoice| invoice.payment_status == PaymentStatus::Credit)
                .count(),
            pending_wages: ledger.wages.iter().filter(|wage| wage.is_pending()).count(),
        }
    }
}

/// Attendance counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub half_day: usize,
}

impl AttendanceSummary {
    pub fn build(entries: &[Attendance]) -> Self {
        entries.iter().fold(Self::default(), |mut summary, entry| {
            match entry.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::HalfDay => summary.half_day += 1,
            }
            summary
        })
    }
}
