use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    amount::{lenient_id, lenient_total},
    calendar::lenient_date,
    line_item::LineItem,
    sheet::LineItemSheet,
    totals::{StoredTotals, Totals, TotalsDrift},
};

const PENDING_PAYMENT_TYPE: &str = "pending";

/// Wage (salary) record as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedWage {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub site_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub labour_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub payment_amount: Decimal,
    #[serde(flatten)]
    pub stored_totals: StoredTotals,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Payroll entry for one labourer. Totals derive from its sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WageRecord {
    pub id: Option<i64>,
    pub site_id: Option<i64>,
    pub labour_id: Option<i64>,
    pub payment_date: Option<NaiveDate>,
    pub payment_type: Option<String>,
    pub remarks: Option<String>,
    pub payment_amount: Decimal,
    sheet: LineItemSheet,
}

impl WageRecord {
    pub fn new(site_id: Option<i64>, labour_id: Option<i64>) -> Self {
        Self {
            id: None,
            site_id,
            labour_id,
            payment_date: None,
            payment_type: None,
            remarks: None,
            payment_amount: Decimal::ZERO,
            sheet: LineItemSheet::new(),
        }
    }

    /// Rebuilds a wage record from storage, recomputing totals from its rows.
    pub fn from_persisted(persisted: PersistedWage) -> Self {
        Self {
            id: persisted.id,
            site_id: persisted.site_id,
            labour_id: persisted.labour_id,
            payment_date: persisted.payment_date,
            payment_type: persisted.payment_type,
            remarks: persisted.remarks,
            payment_amount: persisted.payment_amount,
            sheet: LineItemSheet::from(persisted.line_items),
        }
    }

    /// Drift between stored totals and the stored rows.
    pub fn drift(persisted: &PersistedWage) -> Vec<TotalsDrift> {
        Totals::recompute(&persisted.line_items).drift(&persisted.stored_totals)
    }

    pub fn sheet(&self) -> &LineItemSheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut LineItemSheet {
        &mut self.sheet
    }

    pub fn totals(&self) -> &Totals {
        self.sheet.totals()
    }

    /// `true` when the payment type marks the wage as still owed.
    pub fn is_pending(&self) -> bool {
        is_pending_type(self.payment_type.as_deref())
    }
}

impl PersistedWage {
    pub fn is_pending(&self) -> bool {
        is_pending_type(self.payment_type.as_deref())
    }
}

fn is_pending_type(payment_type: Option<&str>) -> bool {
    payment_type
        .map(|value| value.trim().eq_ignore_ascii_case(PENDING_PAYMENT_TYPE))
        .unwrap_or(false)
}
