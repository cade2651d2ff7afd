use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::{self, lenient, lenient_id};

/// One labour row of an invoice or wage record.
///
/// Only the four monetary fields take part in totals; the labour references
/// and the signature text are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labour_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labour_group_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub piecework_payment: Decimal,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub daily_wage: Decimal,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub advance_payment: Decimal,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub refund: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<String>,
}

impl LineItem {
    /// Builds a row from the four amounts, normalising each one.
    pub fn new(
        piecework_payment: Decimal,
        daily_wage: Decimal,
        advance_payment: Decimal,
        refund: Decimal,
    ) -> Self {
        Self {
            piecework_payment: amount::normalize(piecework_payment),
            daily_wage: amount::normalize(daily_wage),
            advance_payment: amount::normalize(advance_payment),
            refund: amount::normalize(refund),
            ..Self::default()
        }
    }

    /// Attaches the labourer and labour group the row pays.
    pub fn for_labour(mut self, labour_id: i64, labour_group_id: Option<i64>) -> Self {
        self.labour_id = Some(labour_id);
        self.labour_group_id = labour_group_id;
        self
    }

    /// Returns the value held in `field`.
    pub fn field(&self, field: LineItemField) -> Decimal {
        match field {
            LineItemField::PieceworkPayment => self.piecework_payment,
            LineItemField::DailyWage => self.daily_wage,
            LineItemField::AdvancePayment => self.advance_payment,
            LineItemField::Refund => self.refund,
        }
    }

    /// Overwrites `field`, normalising the value first.
    pub fn set_field(&mut self, field: LineItemField, value: Decimal) {
        let value = amount::normalize(value);
        match field {
            LineItemField::PieceworkPayment => self.piecework_payment = value,
            LineItemField::DailyWage => self.daily_wage = value,
            LineItemField::AdvancePayment => self.advance_payment = value,
            LineItemField::Refund => self.refund = value,
        }
    }

    /// Overwrites `field` from raw form text.
    pub fn set_field_text(&mut self, field: LineItemField, raw: &str) {
        self.set_field(field, amount::parse_amount(raw));
    }

    /// Returns `true` when every monetary field is zero.
    pub fn is_blank(&self) -> bool {
        LineItemField::ALL
            .iter()
            .all(|field| self.field(*field).is_zero())
    }
}

/// Monetary columns of a [`LineItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineItemField {
    PieceworkPayment,
    DailyWage,
    AdvancePayment,
    Refund,
}

impl LineItemField {
    pub const ALL: [LineItemField; 4] = [
        Self::PieceworkPayment,
        Self::DailyWage,
        Self::AdvancePayment,
        Self::Refund,
    ];

    /// Returns the wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PieceworkPayment => "pieceworkPayment",
            Self::DailyWage => "dailyWage",
            Self::AdvancePayment => "advancePayment",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for LineItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineItemField {
    type Err = UnknownField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pieceworkPayment" | "piecework_payment" | "piecework" => Ok(Self::PieceworkPayment),
            "dailyWage" | "daily_wage" => Ok(Self::DailyWage),
            "advancePayment" | "advance_payment" | "advance" => Ok(Self::AdvancePayment),
            "refund" => Ok(Self::Refund),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// Raised when a field name does not match any [`LineItemField`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown line item field: {0}")]
pub struct UnknownField(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deserializes_form_row_with_string_amounts() {
        let item: LineItem = serde_json::from_str(
            r#"{"labourId":"7","labourGroupId":"","pieceworkPayment":"100.50","dailyWage":"","advancePayment":20,"sign":"ok"}"#,
        )
        .expect("row should deserialize");

        assert_eq!(item.labour_id, Some(7));
        assert_eq!(item.labour_group_id, None);
        assert_eq!(item.piecework_payment, dec!(100.50));
        assert_eq!(item.daily_wage, Decimal::ZERO);
        assert_eq!(item.advance_payment, dec!(20));
        assert_eq!(item.refund, Decimal::ZERO);
        assert_eq!(item.sign.as_deref(), Some("ok"));
    }

    #[test]
    fn null_and_garbage_amounts_become_zero() {
        let item: LineItem = serde_json::from_str(
            r#"{"pieceworkPayment":null,"dailyWage":"abc","advancePayment":{},"refund":false}"#,
        )
        .expect("row should deserialize");
        assert!(item.is_blank());
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let item = LineItem::new(dec!(1), dec!(2), dec!(3), dec!(4)).for_labour(5, Some(6));
        let value = serde_json::to_value(&item).expect("serialize");
        assert_eq!(value["labourId"], 5);
        assert_eq!(value["labourGroupId"], 6);
        assert_eq!(value["pieceworkPayment"], "1");
        assert!(value.get("sign").is_none());
    }

    #[test]
    fn set_field_text_coerces_malformed_input() {
        let mut item = LineItem::new(dec!(10), dec!(10), dec!(0), dec!(0));
        item.set_field_text(LineItemField::DailyWage, "");
        item.set_field_text(LineItemField::Refund, "2.5");
        assert_eq!(item.daily_wage, Decimal::ZERO);
        assert_eq!(item.field(LineItemField::Refund), dec!(2.5));
    }

    #[test]
    fn parses_field_names() {
        assert_eq!(
            "piecework".parse::<LineItemField>(),
            Ok(LineItemField::PieceworkPayment)
        );
        assert_eq!(
            "daily_wage".parse::<LineItemField>(),
            Ok(LineItemField::DailyWage)
        );
        assert!("bonus".parse::<LineItemField>().is_err());
    }
}
