//! Invoice arithmetic, payments and status progression.

pub mod error;
pub mod lines;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::InvoiceError;
pub use lines::{LineAmounts, LineInput, LineTotals, price_lines};
pub use service::{InvoiceService, PaymentOutcome};
pub use types::InvoiceStatus;
