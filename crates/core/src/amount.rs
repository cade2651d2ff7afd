//! Monetary amount coercion.
//!
//! Every amount that reaches the domain layer passes through here. Input that
//! is empty, non-numeric, or outside the `NUMERIC(10,2)` column range is
//! treated as zero instead of being rejected, so aggregation never fails.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number of fractional digits stored for every amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Exclusive upper bound of a `NUMERIC(10,2)` column.
const AMOUNT_LIMIT: i64 = 100_000_000;

/// Exclusive upper bound of a `NUMERIC(15,2)` aggregate column.
const TOTAL_LIMIT: i64 = 10_000_000_000_000;

/// Exclusive upper bound of a `NUMERIC(4,2)` hours column.
const HOURS_LIMIT: i64 = 100;

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(trimmed).ok()
    } else {
        Decimal::from_str(trimmed).ok()
    }
}

fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        _ => None,
    }
}

/// Parses free-form amount text, coercing anything unusable to zero.
pub fn parse_amount(raw: &str) -> Decimal {
    parse_decimal(raw).map(normalize).unwrap_or(Decimal::ZERO)
}

/// Coerces an arbitrary JSON value into a line amount.
///
/// Numbers and numeric strings are accepted; `null`, booleans, arrays and
/// objects become zero.
pub fn coerce_amount(value: &Value) -> Decimal {
    json_decimal(value).map(normalize).unwrap_or(Decimal::ZERO)
}

/// Coerces a JSON value into an aggregate amount (`NUMERIC(15,2)` columns).
pub fn coerce_total(value: &Value) -> Decimal {
    json_decimal(value)
        .map(|value| within(value, TOTAL_LIMIT))
        .unwrap_or(Decimal::ZERO)
}

/// Coerces a JSON value into a worked-hours figure (`NUMERIC(4,2)`).
pub fn coerce_hours(value: &Value) -> Decimal {
    json_decimal(value)
        .map(|value| within(value, HOURS_LIMIT))
        .unwrap_or(Decimal::ZERO)
}

/// Rounds to [`AMOUNT_SCALE`] places and zeroes values outside the column range.
pub fn normalize(value: Decimal) -> Decimal {
    within(value, AMOUNT_LIMIT)
}

/// Rounds `value`, then zeroes it if the rounded value does not fit below `limit`.
fn within(value: Decimal, limit: i64) -> Decimal {
    let rounded = round_total(value);
    if rounded.abs() >= Decimal::from(limit) {
        return Decimal::ZERO;
    }
    rounded
}

/// Rounds an aggregate to [`AMOUNT_SCALE`] places without range clamping.
pub fn round_total(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `deserialize_with` helper for amount fields.
///
/// Pair it with `#[serde(default)]` so a missing key also yields zero.
pub mod lenient {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(coerce_amount).unwrap_or(Decimal::ZERO))
    }
}

/// `deserialize_with` helper for aggregate fields such as stored totals.
pub mod lenient_total {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(coerce_total).unwrap_or(Decimal::ZERO))
    }
}

/// `deserialize_with` helper for worked hours.
pub mod lenient_hours {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(coerce_hours).unwrap_or(Decimal::ZERO))
    }
}

/// `deserialize_with` helper for optional identifiers.
///
/// Form rows carry ids as strings (often empty), the API as numbers.
pub mod lenient_id {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(number)) => number.as_i64(),
            Some(Value::String(text)) => text.trim().parse().ok(),
            _ => None,
        })
    }
}
