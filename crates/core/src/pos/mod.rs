//! Point of sale: tendering, refunds and daily takings.

pub mod error;
pub mod sale;

pub use error::PosError;
pub use sale::{DailySummary, PaymentMethod, SaleRecord, SaleService, SaleStatus, Tender};
