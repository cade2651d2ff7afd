use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    amount::{self, lenient, lenient_id, lenient_total},
    calendar::lenient_date,
};

/// One product line of a material purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub quantity: Decimal,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub unit_price: Decimal,
    /// Percentage discount applied to the line, `0..=100`.
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub discount: Decimal,
}

impl PurchaseProduct {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            name: Some(name.into()),
            quantity: amount::normalize(quantity),
            unit_price: amount::normalize(unit_price),
            ..Self::default()
        }
    }

    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount = amount::normalize(percent);
        self
    }

    /// `quantity * unit_price` less the percentage discount.
    pub fn line_total(&self) -> Decimal {
        let gross = self.quantity * self.unit_price;
        amount::round_total(gross - gross * self.discount / Decimal::ONE_HUNDRED)
    }
}

/// Material purchase recorded against a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub site_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, alias = "invoiceNumberORImg")]
    pub invoice_ref: Option<String>,
    #[serde(default)]
    pub item_description: Option<String>,
    /// Amount recorded with the purchase; used only when no products are listed.
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub total_amount: Decimal,
    #[serde(default, alias = "purchaseProducts")]
    pub products: Vec<PurchaseProduct>,
}

impl Purchase {
    /// Sum of product line totals, or the recorded amount for purchases
    /// captured without a product breakdown.
    pub fn amount(&self) -> Decimal {
        if self.products.is_empty() {
            self.total_amount
        } else {
            self.products.iter().map(PurchaseProduct::line_total).sum()
        }
    }

    pub fn totals(&self) -> PurchaseTotals {
        PurchaseTotals {
            id: self.id,
            lines: self
                .products
                .iter()
                .map(|product| PurchaseLine {
                    name: product.name.clone(),
                    single_total: product.line_total(),
                })
                .collect(),
            total_amount: self.amount(),
        }
    }
}

/// Computed purchase figures for display and for the save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTotals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub lines: Vec<PurchaseLine>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub name: Option<String>,
    pub single_total: Decimal,
}
