//! Leave balance arithmetic.
//!
//! Every balance satisfies `remaining = entitled − taken − pending + carried_over`.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LeaveError;

/// Leave request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// Awaiting review; days held as pending.
    Pending,
    /// Granted; days counted as taken.
    Approved,
    /// Declined.
    Rejected,
    /// Withdrawn.
    Cancelled,
}

/// Leave balance for one employee, leave type and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Days granted for the year.
    pub entitled: Decimal,
    /// Days used by approved requests.
    pub taken: Decimal,
    /// Days held by pending requests.
    pub pending: Decimal,
    /// Days brought forward from the previous year.
    pub carried_over: Decimal,
}

impl LeaveBalance {
    /// Creates a fresh balance.
    pub fn new(entitled: Decimal, carried_over: Decimal) -> Result<Self, LeaveError> {
        if entitled < Decimal::ZERO {
            return Err(LeaveError::NegativeDays("Entitled days"));
        }
        if carried_over < Decimal::ZERO {
            return Err(LeaveError::NegativeDays("Carried over days"));
        }
        Ok(Self {
            entitled,
            carried_over,
            ..Self::default()
        })
    }

    /// Days still available.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.entitled - self.taken - self.pending + self.carried_over
    }

    /// Holds `days` for a new request.
    pub fn submit(&self, days: Decimal) -> Result<Self, LeaveError> {
        if self.remaining() < days {
            return Err(LeaveError::InsufficientBalance);
        }
        Ok(Self {
            pending: self.pending + days,
            ..*self
        })
    }

    /// Converts held days into taken days.
    #[must_use]
    pub fn approve(&self, days: Decimal) -> Self {
        Self {
            pending: self.pending - days,
            taken: self.taken + days,
            ..*self
        }
    }

    /// Releases held days.
    #[must_use]
    pub fn release_pending(&self, days: Decimal) -> Self {
        Self {
            pending: self.pending - days,
            ..*self
        }
    }

    /// Returns taken days.
    #[must_use]
    pub fn restore_taken(&self, days: Decimal) -> Self {
        Self {
            taken: self.taken - days,
            ..*self
        }
    }
}

/// Leave rules.
pub struct LeavePolicy;

impl LeavePolicy {
    /// Counts weekdays (Mon-Fri) in `start..=end`.
    #[must_use]
    pub fn working_days(start: NaiveDate, end: NaiveDate) -> Decimal {
        let count = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .count();
        Decimal::from(count)
    }

    /// Validates a request range and returns its working days.
    pub fn validate_request(start: NaiveDate, end: NaiveDate) -> Result<Decimal, LeaveError> {
        if end < start {
            return Err(LeaveError::InvalidDateRange);
        }
        if start.year() != end.year() {
            return Err(LeaveError::SpansYears);
        }
        let days = Self::working_days(start, end);
        if days.is_zero() {
            return Err(LeaveError::NoWorkingDays);
        }
        Ok(days)
    }

    /// Validates approve/reject; `action` names the review for the message.
    pub fn validate_review(status: LeaveStatus, action: &'static str) -> Result<(), LeaveError> {
        if status == LeaveStatus::Pending {
            Ok(())
        } else {
            Err(LeaveError::NotPending(action))
        }
    }

    /// Validates a cancel. Pending requests always; approved ones only before they start.
    pub fn validate_cancel(
        status: LeaveStatus,
        start: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), LeaveError> {
        match status {
            LeaveStatus::Pending => Ok(()),
            LeaveStatus::Approved if start > today => Ok(()),
            _ => Err(LeaveError::CannotCancel),
        }
    }

    /// Days carried into the next year: `min(remaining, max_carry_over)`, never negative.
    #[must_use]
    pub fn carry_over_amount(balance: &LeaveBalance, max_carry_over: Decimal) -> Decimal {
        balance.remaining().min(max_carry_over).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_working_days() {
        // 2026-03-02 is a Monday.
        assert_eq!(LeavePolicy::working_days(date(2026, 3, 2), date(2026, 3, 6)), dec!(5));
        assert_eq!(LeavePolicy::working_days(date(2026, 3, 2), date(2026, 3, 9)), dec!(6));
        assert_eq!(LeavePolicy::working_days(date(2026, 3, 7), date(2026, 3, 8)), dec!(0));
        assert_eq!(LeavePolicy::working_days(date(2026, 3, 4), date(2026, 3, 4)), dec!(1));
    }

    #[test]
    fn test_validate_request() {
        assert_eq!(
            LeavePolicy::validate_request(date(2026, 3, 2), date(2026, 3, 3)).unwrap(),
            dec!(2)
        );
        assert!(matches!(
            LeavePolicy::validate_request(date(2026, 3, 3), date(2026, 3, 2)),
            Err(LeaveError::InvalidDateRange)
        ));
        assert!(matches!(
            LeavePolicy::validate_request(date(2026, 12, 30), date(2027, 1, 2)),
            Err(LeaveError::SpansYears)
        ));
        assert!(matches!(
            LeavePolicy::validate_request(date(2026, 3, 7), date(2026, 3, 8)),
            Err(LeaveError::NoWorkingDays)
        ));
    }

    #[test]
    fn test_request_lifecycle() {
        let balance = LeaveBalance::new(dec!(20), dec!(2)).unwrap();
        assert_eq!(balance.remaining(), dec!(22));

        let held = balance.submit(dec!(5)).unwrap();
        assert_eq!(held.pending, dec!(5));
        assert_eq!(held.remaining(), dec!(17));

        let approved = held.approve(dec!(5));
        assert_eq!(approved.pending, dec!(0));
        assert_eq!(approved.taken, dec!(5));
        assert_eq!(approved.remaining(), dec!(17));

        assert_eq!(approved.restore_taken(dec!(5)), balance);
        assert_eq!(held.release_pending(dec!(5)), balance);
    }

    #[test]
    fn test_insufficient_balance() {
        let balance = LeaveBalance::new(dec!(3), dec!(0)).unwrap();
        let err = balance.submit(dec!(4)).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient leave balance");
    }

    #[test]
    fn test_cancel_rules() {
        let today = date(2026, 5, 1);
        assert!(LeavePolicy::validate_cancel(LeaveStatus::Pending, date(2026, 4, 1), today).is_ok());
        assert!(LeavePolicy::validate_cancel(LeaveStatus::Approved, date(2026, 5, 4), today).is_ok());
        assert!(LeavePolicy::validate_cancel(LeaveStatus::Approved, date(2026, 5, 1), today).is_err());
        assert!(LeavePolicy::validate_cancel(LeaveStatus::Rejected, date(2026, 6, 1), today).is_err());
    }

    #[test]
    fn test_review_only_pending() {
        assert!(LeavePolicy::validate_review(LeaveStatus::Pending, "approved").is_ok());
        let err = LeavePolicy::validate_review(LeaveStatus::Approved, "rejected").unwrap_err();
        assert_eq!(err.to_string(), "Only pending requests can be rejected");
    }

    #[test]
    fn test_carry_over_amount() {
        let balance = LeaveBalance {
            entitled: dec!(20),
            taken: dec!(12),
            pending: dec!(0),
            carried_over: dec!(0),
        };
        assert_eq!(LeavePolicy::carry_over_amount(&balance, dec!(5)), dec!(5));
        assert_eq!(LeavePolicy::carry_over_amount(&balance, dec!(10)), dec!(8));

        let overdrawn = LeaveBalance { taken: dec!(25), ..balance };
        assert_eq!(LeavePolicy::carry_over_amount(&overdrawn, dec!(5)), dec!(0));
    }
}
