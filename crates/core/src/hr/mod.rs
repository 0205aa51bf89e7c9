//! HR leave management: balances, requests and carry-over.

pub mod error;
pub mod leave;

#[cfg(test)]
mod leave_props;

pub use error::LeaveError;
pub use leave::{LeaveBalance, LeavePolicy, LeaveStatus};
