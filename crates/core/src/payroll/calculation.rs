//! Payslip calculation.
//!
//! Per employee:
//! `gross = base + allowances + bonus`, `pension = gross × pension%`,
//! `health = gross × health%`,
//! `taxable = max(0, gross − pension − health − tax_free_allowance)`,
//! `income_tax = taxable × tax%`,
//! `net = gross − (pension + health + income_tax + other_deductions)`.
//! Employer contributions are charged on gross. All amounts round to 2 dp.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use kontor_shared::types::{percent_of, round_money};

use super::error::PayrollError;
use super::types::{EmployeePay, PayrollSettings, PayrollStatus, PayslipAmounts, RunTotals};

/// Payroll calculator and run transitions.
pub struct PayrollCalculator;

impl PayrollCalculator {
    /// Validates a run period.
    pub fn validate_period(start: NaiveDate, end: NaiveDate) -> Result<(), PayrollError> {
        if end < start {
            return Err(PayrollError::InvalidPeriod);
        }
        Ok(())
    }

    /// Computes one payslip.
    pub fn calculate(
        settings: &PayrollSettings,
        pay: &EmployeePay,
    ) -> Result<PayslipAmounts, PayrollError> {
        if pay.bonus < Decimal::ZERO {
            return Err(PayrollError::NegativeAmount("Bonus"));
        }
        if pay.other_deductions < Decimal::ZERO {
            return Err(PayrollError::NegativeAmount("Other deductions"));
        }

        let gross = round_money(pay.base_salary + pay.allowances + pay.bonus);
        let pension = percent_of(gross, settings.pension_rate);
        let health_insurance = percent_of(gross, settings.health_insurance_rate);
        let taxable_income =
            (gross - pension - health_insurance - settings.tax_free_allowance).max(Decimal::ZERO);
        let income_tax = percent_of(taxable_income, settings.income_tax_rate);
        let other_deductions = round_money(pay.other_deductions);
        let total_deductions = pension + health_insurance + income_tax + other_deductions;

        let employer_pension = percent_of(gross, settings.employer_pension_rate);
        let employer_health = percent_of(gross, settings.employer_health_rate);

        Ok(PayslipAmounts {
            employee_id: pay.employee_id,
            base_salary: pay.base_salary,
            allowances: pay.allowances,
            bonus: pay.bonus,
            gross,
            pension,
            health_insurance,
            taxable_income,
            income_tax,
            other_deductions,
            total_deductions,
            net: gross - total_deductions,
            employer_pension,
            employer_health,
            employer_total: employer_pension + employer_health,
        })
    }

    /// Computes payslips for every employee and the run totals.
    pub fn calculate_run(
        settings: &PayrollSettings,
        employees: &[EmployeePay],
    ) -> Result<(Vec<PayslipAmounts>, RunTotals), PayrollError> {
        if employees.is_empty() {
            return Err(PayrollError::NoActiveEmployees);
        }
        let payslips = employees
            .iter()
            .map(|pay| Self::calculate(settings, pay))
            .collect::<Result<Vec<_>, _>>()?;
        let totals = Self::totals(&payslips);
        Ok((payslips, totals))
    }

    /// Aggregates payslips.
    #[must_use]
    pub fn totals(payslips: &[PayslipAmounts]) -> RunTotals {
        payslips.iter().fold(
            RunTotals {
                employee_count: i32::try_from(payslips.len()).unwrap_or(i32::MAX),
                ..RunTotals::default()
            },
            |acc, p| RunTotals {
                total_gross: acc.total_gross + p.gross,
                total_deductions: acc.total_deductions + p.total_deductions,
                total_net: acc.total_net + p.net,
                total_employer_contributions: acc.total_employer_contributions + p.employer_total,
                ..acc
            },
        )
    }

    /// Validates that a run may be (re)calculated.
    pub fn validate_can_calculate(status: PayrollStatus) -> Result<(), PayrollError> {
        match status {
            PayrollStatus::Draft | PayrollStatus::Calculated => Ok(()),
            PayrollStatus::Approved => Err(PayrollError::CannotRecalculate),
        }
    }

    /// Validates a calculated → approved transition.
    pub fn validate_can_approve(status: PayrollStatus) -> Result<(), PayrollError> {
        if status == PayrollStatus::Calculated {
            Ok(())
        } else {
            Err(PayrollError::NotCalculatedForApprove)
        }
    }

    /// Validates deleting a run.
    pub fn validate_can_delete(status: PayrollStatus) -> Result<(), PayrollError> {
        if status == PayrollStatus::Approved {
            Err(PayrollError::CannotDeleteApproved)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn pay(base: Decimal, allowances: Decimal, bonus: Decimal) -> EmployeePay {
        EmployeePay {
            employee_id: Uuid::new_v4(),
            base_salary: base,
            allowances,
            bonus,
            other_deductions: Decimal::ZERO,
        }
    }

    #[test]
    fn test_default_settings_payslip() {
        let slip =
            PayrollCalculator::calculate(&PayrollSettings::default(), &pay(dec!(4000), dec!(500), dec!(500)))
                .unwrap();

        assert_eq!(slip.gross, dec!(5000.00));
        assert_eq!(slip.pension, dec!(250.00));
        assert_eq!(slip.health_insurance, dec!(100.00));
        assert_eq!(slip.taxable_income, dec!(4650.00));
        assert_eq!(slip.income_tax, dec!(465.00));
        assert_eq!(slip.total_deductions, dec!(815.00));
        assert_eq!(slip.net, dec!(4185.00));
        assert_eq!(slip.employer_pension, dec!(250.00));
        assert_eq!(slip.employer_health, dec!(150.00));
        assert_eq!(slip.employer_total, dec!(400.00));
    }

    #[test]
    fn test_tax_free_allowance_floors_at_zero() {
        let settings = PayrollSettings {
            tax_free_allowance: dec!(10000),
            ..PayrollSettings::default()
        };
        let slip = PayrollCalculator::calculate(&settings, &pay(dec!(1000), dec!(0), dec!(0))).unwrap();
        assert_eq!(slip.taxable_income, Decimal::ZERO);
        assert_eq!(slip.income_tax, Decimal::ZERO);
        assert_eq!(slip.net, dec!(930.00));
    }

    #[test]
    fn test_other_deductions() {
        let mut p = pay(dec!(1000), dec!(0), dec!(0));
        p.other_deductions = dec!(50);
        let slip = PayrollCalculator::calculate(&PayrollSettings::default(), &p).unwrap();
        assert_eq!(slip.total_deductions, dec!(50) + dec!(50) + dec!(20) + dec!(93));
        assert_eq!(slip.net, dec!(787.00));
    }

    #[test]
    fn test_run_totals() {
        let (slips, totals) = PayrollCalculator::calculate_run(
            &PayrollSettings::default(),
            &[pay(dec!(1000), dec!(0), dec!(0)), pay(dec!(2000), dec!(0), dec!(0))],
        )
        .unwrap();

        assert_eq!(slips.len(), 2);
        assert_eq!(totals.employee_count, 2);
        assert_eq!(totals.total_gross, dec!(3000.00));
        assert_eq!(totals.total_net, slips[0].net + slips[1].net);
        assert_eq!(totals.total_employer_contributions, dec!(240.00));
    }

    #[test]
    fn test_empty_run_rejected() {
        assert!(matches!(
            PayrollCalculator::calculate_run(&PayrollSettings::default(), &[]),
            Err(PayrollError::NoActiveEmployees)
        ));
    }

    #[test]
    fn test_transitions() {
        assert!(PayrollCalculator::validate_can_calculate(PayrollStatus::Calculated).is_ok());
        assert!(PayrollCalculator::validate_can_calculate(PayrollStatus::Approved).is_err());
        assert!(PayrollCalculator::validate_can_approve(PayrollStatus::Calculated).is_ok());
        let err = PayrollCalculator::validate_can_approve(PayrollStatus::Draft).unwrap_err();
        assert_eq!(err.to_string(), "Only calculated payroll runs can be approved");
        assert!(PayrollCalculator::validate_can_delete(PayrollStatus::Approved).is_err());
        assert!(PayrollCalculator::validate_can_delete(PayrollStatus::Draft).is_ok());
    }
}
