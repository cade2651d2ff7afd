use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    line_item::{LineItem, LineItemField},
    totals::Totals,
};

/// Errors raised by row-level edits on a [`LineItemSheet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("line item {index} does not exist (sheet has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered line items of one parent record together with their totals.
///
/// Every mutating method recomputes the totals before returning, so
/// [`LineItemSheet::totals`] always reflects the current rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct LineItemSheet {
    items: Vec<LineItem>,
    totals: Totals,
}

impl LineItemSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    /// Appends a row and returns the refreshed totals.
    pub fn add_item(&mut self, item: LineItem) -> &Totals {
        self.items.push(item);
        self.refresh("add")
    }

    /// Removes the row at `index`, returning it.
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, SheetError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        self.refresh("remove");
        Ok(removed)
    }

    /// Replaces one amount of the row at `index` with coerced form text.
    pub fn edit_item(
        &mut self,
        index: usize,
        field: LineItemField,
        raw: &str,
    ) -> Result<&Totals, SheetError> {
        self.check_index(index)?;
        self.items[index].set_field_text(field, raw);
        Ok(self.refresh("edit"))
    }

    /// Replaces one amount of the row at `index`.
    pub fn set_amount(
        &mut self,
        index: usize,
        field: LineItemField,
        value: Decimal,
    ) -> Result<&Totals, SheetError> {
        self.check_index(index)?;
        self.items[index].set_field(field, value);
        Ok(self.refresh("edit"))
    }

    /// Applies an arbitrary in-place edit to the row at `index`.
    pub fn update_item<F>(&mut self, index: usize, edit: F) -> Result<&Totals, SheetError>
    where
        F: FnOnce(&mut LineItem),
    {
        self.check_index(index)?;
        edit(&mut self.items[index]);
        Ok(self.refresh("edit"))
    }

    /// Drops every row.
    pub fn clear(&mut self) -> &Totals {
        self.items.clear();
        self.refresh("clear")
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    fn check_index(&self, index: usize) -> Result<(), SheetError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(SheetError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    fn refresh(&mut self, mutation: &'static str) -> &Totals {
        self.totals = Totals::recompute(&self.items);
        debug!(
            stage = "sheet",
            mutation,
            rows = self.items.len(),
            grand_total = %self.totals.grand_total,
            "totals recomputed"
        );
        &self.totals
    }
}

impl From<Vec<LineItem>> for LineItemSheet {
    fn from(items: Vec<LineItem>) -> Self {
        let totals = Totals::recompute(&items);
        Self { items, totals }
    }
}

impl From<LineItemSheet> for Vec<LineItem> {
    fn from(sheet: LineItemSheet) -> Self {
        sheet.items
    }
}

impl FromIterator<LineItem> for LineItemSheet {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::recompute;
    use rust_decimal_macros::dec;

    fn row(piecework: Decimal, daily: Decimal, advance: Decimal, refund: Decimal) -> LineItem {
        LineItem::new(piecework, daily, advance, refund)
    }

    #[test]
    fn adding_a_row_increases_each_category_by_its_value() {
        let mut sheet = LineItemSheet::from(vec![row(dec!(100), dec!(50), dec!(20), dec!(0))]);
        let before = *sheet.totals();
        let added = row(dec!(30), dec!(0), dec!(5), dec!(10));

        let after = *sheet.add_item(added.clone());

        for field in LineItemField::ALL {
            assert_eq!(
                after.category(field) - before.category(field),
                added.field(field),
                "{field}"
            );
        }
    }

    #[test]
    fn adding_a_blank_row_leaves_totals_unchanged() {
        let mut sheet = LineItemSheet::from(vec![row(dec!(1), dec!(2), dec!(3), dec!(4))]);
        let before = *sheet.totals();
        sheet.add_item(LineItem::default());
        assert_eq!(*sheet.totals(), before);
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn removing_a_row_decreases_each_category_by_its_value() {
        let mut sheet = LineItemSheet::from(vec![
            row(dec!(100), dec!(50), dec!(20), dec!(0)),
            row(dec!(30), dec!(0), dec!(0), dec!(10)),
        ]);
        let before = *sheet.totals();

        let removed = sheet.remove_item(0).expect("row exists");

        for field in LineItemField::ALL {
            assert_eq!(
                before.category(field) - sheet.totals().category(field),
                removed.field(field)
            );
        }
        assert_eq!(sheet.totals().grand_total, dec!(40));
    }

    #[test]
    fn removing_missing_row_is_an_error() {
        let mut sheet = LineItemSheet::new();
        let err = sheet.remove_item(3).expect_err("empty sheet");
        assert_eq!(err, SheetError::IndexOutOfRange { index: 3, len: 0 });
    }

    #[test]
    fn edits_refresh_totals_and_coerce_text() {
        let mut sheet = LineItemSheet::from(vec![row(dec!(10), dec!(20), dec!(0), dec!(0))]);

        let totals = *sheet
            .edit_item(0, LineItemField::DailyWage, "")
            .expect("edit applies");
        assert_eq!(totals.total_daily_wage, Decimal::ZERO);
        assert_eq!(totals.grand_total, dec!(10));

        sheet
            .update_item(0, |item| item.refund = dec!(5))
            .expect("update applies");
        assert_eq!(sheet.totals().grand_total, dec!(15));

        sheet
            .set_amount(0, LineItemField::AdvancePayment, dec!(25))
            .expect("set applies");
        assert_eq!(sheet.totals().grand_total, dec!(-10));
    }

    #[test]
    fn totals_always_match_a_fresh_recompute() {
        let mut sheet = LineItemSheet::new();
        sheet.add_item(row(dec!(1.10), dec!(0), dec!(0), dec!(0)));
        sheet.add_item(row(dec!(2.20), dec!(3), dec!(1), dec!(0)));
        sheet.edit_item(1, LineItemField::Refund, "0.7").expect("edit");
        sheet.remove_item(0).expect("remove");
        assert_eq!(*sheet.totals(), recompute(sheet.items()));

        sheet.clear();
        assert_eq!(*sheet.totals(), Totals::default());
    }

    #[test]
    fn collects_rows_and_hands_them_back() {
        let sheet: LineItemSheet = vec![
            row(dec!(100), dec!(50), dec!(20), dec!(0)),
            row(dec!(30), dec!(0), dec!(0), dec!(10)),
        ]
        .into_iter()
        .collect();
        assert_eq!(sheet.totals().grand_total, dec!(170));
        assert_eq!(
            sheet.get(1).map(|item| item.refund),
            Some(dec!(10))
        );
        assert!(sheet.get(2).is_none());

        let items = sheet.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].piecework_payment, dec!(100));
    }

    #[test]
    fn deserializes_from_plain_row_array() {
        let sheet: LineItemSheet = serde_json::from_str(
            r#"[{"pieceworkPayment":100,"dailyWage":50,"advancePayment":20},{"pieceworkPayment":"30","refund":10}]"#,
        )
        .expect("sheet");
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.totals().grand_total, dec!(170));
    }
}
