//! Payroll calculation and run lifecycle.

pub mod calculation;
pub mod error;
pub mod types;

#[cfg(test)]
mod calculation_props;

pub use calculation::PayrollCalculator;
pub use error::PayrollError;
pub use types::{
    EmployeePay, EmployeeStatus, PayrollSettings, PayrollStatus, PayslipAmounts, RunTotals,
};
