//! Labour invoices: a header plus a sheet of labour detail rows.
//!
//! Totals are never taken from the stored record. Loading an invoice
//! rebuilds its sheet and recomputes; saving emits the freshly computed
//! totals alongside the rows.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    amount::lenient_id,
    calendar::lenient_date,
    line_item::LineItem,
    sheet::LineItemSheet,
    totals::{StoredTotals, Totals, TotalsDrift},
};

/// Settlement state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Credit,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Credit => "credit",
        }
    }
}

/// Generates invoice numbers of the form `PREFIX-YEAR-EPOCHMILLIS`.
pub fn generate_invoice_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}-{}", now.year(), now.timestamp_millis())
}

/// Invoice as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedInvoice {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub site_id: Option<i64>,
    pub invoice_number: String,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub stored_totals: StoredTotals,
    #[serde(default, alias = "invoiceLabourDetail", alias = "labourDetails")]
    pub invoice_labour_details: Vec<LineItem>,
}

/// Editable invoice. Its totals always derive from its sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: Option<i64>,
    pub site_id: Option<i64>,
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,
    sheet: LineItemSheet,
}

impl Invoice {
    /// Fresh invoice with a generated number, today's date, credit status
    /// and a single blank row ready for input.
    pub fn draft(invoice_number: String, today: NaiveDate) -> Self {
        Self {
            id: None,
            site_id: None,
            invoice_number,
            invoice_date: Some(today),
            payment_status: PaymentStatus::Credit,
            sheet: LineItemSheet::from(vec![LineItem::default()]),
        }
    }

    /// Rebuilds an invoice from storage, recomputing totals from its rows.
    pub fn from_persisted(persisted: PersistedInvoice) -> Self {
        let sheet = LineItemSheet::from(persisted.invoice_labour_details);
        info!(
            stage = "invoice",
            invoice_number = %persisted.invoice_number,
            rows = sheet.len(),
            grand_total = %sheet.totals().grand_total,
            "invoice loaded"
        );
        Self {
            id: persisted.id,
            site_id: persisted.site_id,
            invoice_number: persisted.invoice_number,
            invoice_date: persisted.invoice_date,
            payment_status: persisted.payment_status,
            sheet,
        }
    }

    /// Compares stored totals with totals recomputed from the stored rows.
    pub fn audit(persisted: &PersistedInvoice) -> InvoiceAudit {
        let totals = Totals::recompute(&persisted.invoice_labour_details);
        let drift = totals.drift(&persisted.stored_totals);
        if !drift.is_empty() {
            warn!(
                stage = "invoice",
                invoice_number = %persisted.invoice_number,
                drifted_fields = drift.len(),
                "stored totals disagree with labour details"
            );
        }
        InvoiceAudit {
            id: persisted.id,
            invoice_number: persisted.invoice_number.clone(),
            totals,
            drift,
        }
    }

    pub fn with_site(mut self, site_id: i64) -> Self {
        self.site_id = Some(site_id);
        self
    }

    pub fn sheet(&self) -> &LineItemSheet {
        &self.sheet
    }

    /// Mutable access for row edits; the sheet keeps totals in step.
    pub fn sheet_mut(&mut self) -> &mut LineItemSheet {
        &mut self.sheet
    }

    pub fn totals(&self) -> &Totals {
        self.sheet.totals()
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn mark_paid(&mut self) {
        self.payment_status = PaymentStatus::Paid;
    }

    pub fn mark_credit(&mut self) {
        self.payment_status = PaymentStatus::Credit;
    }

    /// Payload for the save request: header, rows, and current totals.
    pub fn to_submission(&self) -> InvoiceSubmission {
        InvoiceSubmission {
            id: self.id,
            site_id: self.site_id,
            invoice_number: self.invoice_number.clone(),
            invoice_date: self.invoice_date,
            payment_status: self.payment_status,
            totals: *self.sheet.totals(),
            invoice_labour_details: self.sheet.items().to_vec(),
        }
    }
}

/// Flattened invoice body sent to the persistence layer on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub site_id: Option<i64>,
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub totals: Totals,
    pub invoice_labour_details: Vec<LineItem>,
}

/// Result of checking a stored invoice against its own rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceAudit {
    pub id: Option<i64>,
    pub invoice_number: String,
    pub totals: Totals,
    pub drift: Vec<TotalsDrift>,
}

impl InvoiceAudit {
    pub fn is_consistent(&self) -> bool {
        self.drift.is_empty()
    }
}
