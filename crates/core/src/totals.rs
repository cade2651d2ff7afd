use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    amount::{self, lenient_total},
    line_item::{LineItem, LineItemField},
};

/// Category sums and grand total derived from a sequence of [`LineItem`]s.
///
/// Never stored as independent state: callers obtain it from [`recompute`]
/// (or a [`crate::sheet::LineItemSheet`], which calls it on every mutation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_piecework: Decimal,
    pub total_daily_wage: Decimal,
    pub total_advance_payment: Decimal,
    pub total_refund: Decimal,
    pub grand_total: Decimal,
}

/// Sums the four monetary fields across `items` and derives the grand total.
pub fn recompute(items: &[LineItem]) -> Totals {
    Totals::recompute(items)
}

impl Totals {
    /// Single pass over `items`; an empty slice yields all zeros.
    pub fn recompute(items: &[LineItem]) -> Self {
        let (piecework, daily_wage, advance, refund) = items.iter().fold(
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(piecework, daily_wage, advance, refund), item| {
                (
                    piecework + item.piecework_payment,
                    daily_wage + item.daily_wage,
                    advance + item.advance_payment,
                    refund + item.refund,
                )
            },
        );

        Self::from_categories(piecework, daily_wage, advance, refund)
    }

    /// Builds totals from category sums.
    pub fn from_categories(
        piecework: Decimal,
        daily_wage: Decimal,
        advance_payment: Decimal,
        refund: Decimal,
    ) -> Self {
        Self {
            total_piecework: piecework,
            total_daily_wage: daily_wage,
            total_advance_payment: advance_payment,
            total_refund: refund,
            grand_total: grand_total_of(piecework, daily_wage, advance_payment, refund),
        }
    }

    /// Returns the category total for `field`.
    pub fn category(&self, field: LineItemField) -> Decimal {
        match field {
            LineItemField::PieceworkPayment => self.total_piecework,
            LineItemField::DailyWage => self.total_daily_wage,
            LineItemField::AdvancePayment => self.total_advance_payment,
            LineItemField::Refund => self.total_refund,
        }
    }

    /// Returns the value held for `field`.
    pub fn get(&self, field: TotalField) -> Decimal {
        match field {
            TotalField::TotalPiecework => self.total_piecework,
            TotalField::TotalDailyWage => self.total_daily_wage,
            TotalField::TotalAdvancePayment => self.total_advance_payment,
            TotalField::TotalRefund => self.total_refund,
            TotalField::GrandTotal => self.grand_total,
        }
    }

    /// Lists every field whose stored value disagrees with `self`.
    ///
    /// Stored values are compared after rounding to the column scale; a
    /// missing stored value counts as zero.
    pub fn drift(&self, stored: &StoredTotals) -> Vec<TotalsDrift> {
        TotalField::ALL
            .iter()
            .filter_map(|field| {
                let recomputed = amount::round_total(self.get(*field));
                let stored = amount::round_total(stored.get(*field));
                (recomputed != stored).then_some(TotalsDrift {
                    field: *field,
                    stored,
                    recomputed,
                })
            })
            .collect()
    }
}

/// `piecework + daily wage - advance payment + refund`, unclamped.
pub fn grand_total_of(
    piecework: Decimal,
    daily_wage: Decimal,
    advance_payment: Decimal,
    refund: Decimal,
) -> Decimal {
    piecework + daily_wage - advance_payment + refund
}

/// Totals block as read back from a persisted record.
///
/// Values are informational only; they are never used in place of a
/// recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTotals {
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub total_piecework: Decimal,
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub total_daily_wage: Decimal,
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub total_advance_payment: Decimal,
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub total_refund: Decimal,
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub grand_total: Decimal,
}

impl StoredTotals {
    pub fn get(&self, field: TotalField) -> Decimal {
        match field {
            TotalField::TotalPiecework => self.total_piecework,
            TotalField::TotalDailyWage => self.total_daily_wage,
            TotalField::TotalAdvancePayment => self.total_advance_payment,
            TotalField::TotalRefund => self.total_refund,
            TotalField::GrandTotal => self.grand_total,
        }
    }
}

impl From<Totals> for StoredTotals {
    fn from(value: Totals) -> Self {
        Self {
            total_piecework: value.total_piecework,
            total_daily_wage: value.total_daily_wage,
            total_advance_payment: value.total_advance_payment,
            total_refund: value.total_refund,
            grand_total: value.grand_total,
        }
    }
}

/// Fields of a [`Totals`] block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TotalField {
    TotalPiecework,
    TotalDailyWage,
    TotalAdvancePayment,
    TotalRefund,
    GrandTotal,
}

impl TotalField {
    pub const ALL: [TotalField; 5] = [
        Self::TotalPiecework,
        Self::TotalDailyWage,
        Self::TotalAdvancePayment,
        Self::TotalRefund,
        Self::GrandTotal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalPiecework => "totalPiecework",
            Self::TotalDailyWage => "totalDailyWage",
            Self::TotalAdvancePayment => "totalAdvancePayment",
            Self::TotalRefund => "totalRefund",
            Self::GrandTotal => "grandTotal",
        }
    }
}

/// A stored total that disagrees with the value recomputed from rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsDrift {
    pub field: TotalField,
    pub stored: Decimal,
    pub recomputed: Decimal,
}
