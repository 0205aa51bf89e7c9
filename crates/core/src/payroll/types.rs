//! Payroll domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PayrollError;

/// Payroll run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    /// Created, no payslips.
    Draft,
    /// Payslips computed; may be recalculated.
    Calculated,
    /// Frozen.
    Approved,
}

/// Employment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed and paid.
    Active,
    /// Employed, temporarily away.
    OnLeave,
    /// No longer employed.
    Terminated,
}

/// Per-organization payroll percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSettings {
    /// Income tax percentage on taxable income.
    pub income_tax_rate: Decimal,
    /// Monthly amount exempt from income tax.
    pub tax_free_allowance: Decimal,
    /// Employee pension percentage of gross.
    pub pension_rate: Decimal,
    /// Employee health insurance percentage of gross.
    pub health_insurance_rate: Decimal,
    /// Employer pension percentage of gross.
    pub employer_pension_rate: Decimal,
    /// Employer health percentage of gross.
    pub employer_health_rate: Decimal,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            income_tax_rate: Decimal::TEN,
            tax_free_allowance: Decimal::ZERO,
            pension_rate: Decimal::from(5_u8),
            health_insurance_rate: Decimal::TWO,
            employer_pension_rate: Decimal::from(5_u8),
            employer_health_rate: Decimal::from(3_u8),
        }
    }
}

impl PayrollSettings {
    /// Validates that percentages are within 0-100 and the allowance is non-negative.
    pub fn validate(&self) -> Result<(), PayrollError> {
        let rates = [
            ("Income tax rate", self.income_tax_rate),
            ("Pension rate", self.pension_rate),
            ("Health insurance rate", self.health_insurance_rate),
            ("Employer pension rate", self.employer_pension_rate),
            ("Employer health rate", self.employer_health_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(PayrollError::InvalidRate(name));
            }
        }
        if self.tax_free_allowance < Decimal::ZERO {
            return Err(PayrollError::NegativeAmount("Tax free allowance"));
        }
        Ok(())
    }
}

/// Pay inputs for one employee in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePay {
    /// Employee being paid.
    pub employee_id: Uuid,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Recurring allowances.
    pub allowances: Decimal,
    /// One-off bonus for this run.
    pub bonus: Decimal,
    /// One-off deductions for this run.
    pub other_deductions: Decimal,
}

/// Calculated payslip amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipAmounts {
    /// Employee paid.
    pub employee_id: Uuid,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Recurring allowances.
    pub allowances: Decimal,
    /// One-off bonus.
    pub bonus: Decimal,
    /// Base + allowances + bonus.
    pub gross: Decimal,
    /// Employee pension.
    pub pension: Decimal,
    /// Employee health insurance.
    pub health_insurance: Decimal,
    /// Income on which tax is charged.
    pub taxable_income: Decimal,
    /// Income tax.
    pub income_tax: Decimal,
    /// One-off deductions.
    pub other_deductions: Decimal,
    /// Pension + health + tax + other.
    pub total_deductions: Decimal,
    /// Gross − deductions.
    pub net: Decimal,
    /// Employer pension.
    pub employer_pension: Decimal,
    /// Employer health.
    pub employer_health: Decimal,
    /// Employer contributions.
    pub employer_total: Decimal,
}

/// Aggregate totals of a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunTotals {
    /// Number of payslips.
    pub employee_count: i32,
    /// Σ gross.
    pub total_gross: Decimal,
    /// Σ deductions.
    pub total_deductions: Decimal,
    /// Σ net.
    pub total_net: Decimal,
    /// Σ employer contributions.
    pub total_employer_contributions: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_settings() {
        let s = PayrollSettings::default();
        assert_eq!(s.income_tax_rate, dec!(10));
        assert_eq!(s.tax_free_allowance, dec!(0));
        assert_eq!(s.pension_rate, dec!(5));
        assert_eq!(s.health_insurance_rate, dec!(2));
        assert_eq!(s.employer_pension_rate, dec!(5));
        assert_eq!(s.employer_health_rate, dec!(3));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let s = PayrollSettings {
            pension_rate: dec!(120),
            ..PayrollSettings::default()
        };
        assert!(matches!(s.validate(), Err(PayrollError::InvalidRate("Pension rate"))));

        let s = PayrollSettings {
            tax_free_allowance: dec!(-1),
            ..PayrollSettings::default()
        };
        assert!(matches!(s.validate(), Err(PayrollError::NegativeAmount(_))));
    }
}
