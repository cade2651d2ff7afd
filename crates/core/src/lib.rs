//! Domain layer for the site back office.
//!
//! Everything here is pure and synchronous: amounts are coerced rather than
//! rejected, and every total is derived from the rows it summarises.

pub mod amount;
pub mod calendar;
pub mod invoice;
pub mod line_item;
pub mod purchase;
pub mod records;
pub mod report;
pub mod sheet;
pub mod totals;
pub mod wage;

pub use invoice::{Invoice, InvoiceAudit, InvoiceSubmission, PaymentStatus, PersistedInvoice};
pub use line_item::{LineItem, LineItemField};
pub use sheet::{LineItemSheet, SheetError};
pub use totals::{recompute, StoredTotals, Totals, TotalsDrift};
pub use wage::{PersistedWage, WageRecord};
