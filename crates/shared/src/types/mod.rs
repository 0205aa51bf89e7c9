//! Common types used across the application.

pub mod money;
pub mod pagination;

pub use money::{BALANCE_TOLERANCE, percent_of, round_base, round_money, within_tolerance};
pub use pagination::{PageMeta, PageRequest, PageResponse};
