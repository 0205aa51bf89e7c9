//! Fiscal calendar: year boundaries, monthly periods and close/reopen rules.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::AccountingError;
use super::types::FiscalStatus;

/// A monthly period to be created inside a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPlan {
    /// Period number within the year (1-12).
    pub period_number: i16,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
}

/// Fiscal calendar calculations.
pub struct FiscalCalendar;

impl FiscalCalendar {
    /// Returns `(start, end)` of the fiscal year containing `date` when years
    /// begin on the first day of `start_month`.
    pub fn year_bounds(
        date: NaiveDate,
        start_month: u32,
    ) -> Result<(NaiveDate, NaiveDate), AccountingError> {
        if !(1..=12).contains(&start_month) {
            return Err(AccountingError::InvalidStartMonth(start_month));
        }

        let start_year = if date.month() >= start_month {
            date.year()
        } else {
            date.year() - 1
        };
        let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)
            .ok_or(AccountingError::InvalidDateRange)?;
        let end = start
            .checked_add_months(Months::new(12))
            .and_then(|d| d.pred_opt())
            .ok_or(AccountingError::InvalidDateRange)?;

        Ok((start, end))
    }

    /// Returns the display name of a fiscal year (`FY 2026` or `FY 2025/2026`).
    #[must_use]
    pub fn year_name(start: NaiveDate, end: NaiveDate) -> String {
        if start.year() == end.year() {
            format!("FY {}", start.year())
        } else {
            format!("FY {}/{}", start.year(), end.year())
        }
    }

    /// Generates monthly periods covering `start..=end`.
    pub fn monthly_periods(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PeriodPlan>, AccountingError> {
        if start > end {
            return Err(AccountingError::InvalidDateRange);
        }

        let mut periods = Vec::with_capacity(12);
        let mut current = start;
        let mut period_number: i16 = 1;

        while current <= end {
            let month_end = Self::last_day_of_month(current.year(), current.month())
                .ok_or(AccountingError::InvalidDateRange)?;
            let period_end = month_end.min(end);

            periods.push(PeriodPlan {
                period_number,
                name: format!("{} {}", Self::month_name(current.month()), current.year()),
                start_date: current,
                end_date: period_end,
            });

            current = match period_end.succ_opt() {
                Some(next) => next,
                None => break,
            };
            period_number += 1;
        }

        Ok(periods)
    }

    /// Returns the last day of a month.
    #[must_use]
    pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, 1)?
            .checked_add_months(Months::new(1))?
            .pred_opt()
    }

    /// Returns month name.
    #[must_use]
    pub const fn month_name(month: u32) -> &'static str {
        match month {
            1 => "January",
            2 => "February",
            3 => "March",
            4 => "April",
            5 => "May",
            6 => "June",
            7 => "July",
            8 => "August",
            9 => "September",
            10 => "October",
            11 => "November",
            12 => "December",
            _ => "Unknown",
        }
    }

    /// Validates closing period `period_number`. `siblings` lists every period
    /// of the same fiscal year as `(period_number, status)`.
    pub fn validate_close(
        period_number: i16,
        status: FiscalStatus,
        siblings: &[(i16, FiscalStatus)],
    ) -> Result<(), AccountingError> {
        if status == FiscalStatus::Closed {
            return Err(AccountingError::PeriodAlreadyClosed);
        }
        let earlier_open = siblings
            .iter()
            .any(|&(n, s)| n < period_number && s == FiscalStatus::Open);
        if earlier_open {
            return Err(AccountingError::EarlierPeriodsOpen);
        }
        Ok(())
    }

    /// Validates reopening period `period_number`; later periods must be open.
    pub fn validate_reopen(
        period_number: i16,
        status: FiscalStatus,
        siblings: &[(i16, FiscalStatus)],
    ) -> Result<(), AccountingError> {
        if status != FiscalStatus::Closed {
            return Err(AccountingError::PeriodNotClosed);
        }
        let later_closed = siblings
            .iter()
            .any(|&(n, s)| n > period_number && s == FiscalStatus::Closed);
        if later_closed {
            return Err(AccountingError::LaterPeriodsClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_year_bounds() {
        let (start, end) = FiscalCalendar::year_bounds(date(2026, 5, 17), 1).unwrap();
        assert_eq!(start, date(2026, 1, 1));
        assert_eq!(end, date(2026, 12, 31));
        assert_eq!(FiscalCalendar::year_name(start, end), "FY 2026");
    }

    #[test]
    fn test_april_start_bounds() {
        let (start, end) = FiscalCalendar::year_bounds(date(2026, 2, 10), 4).unwrap();
        assert_eq!(start, date(2025, 4, 1));
        assert_eq!(end, date(2026, 3, 31));
        assert_eq!(FiscalCalendar::year_name(start, end), "FY 2025/2026");

        let (start, _) = FiscalCalendar::year_bounds(date(2026, 4, 1), 4).unwrap();
        assert_eq!(start, date(2026, 4, 1));
    }

    #[test]
    fn test_invalid_start_month() {
        assert!(matches!(
            FiscalCalendar::year_bounds(date(2026, 1, 1), 13),
            Err(AccountingError::InvalidStartMonth(13))
        ));
    }

    #[test]
    fn test_generate_monthly_periods_full_year() {
        let periods =
            FiscalCalendar::monthly_periods(date(2026, 1, 1), date(2026, 12, 31)).unwrap();

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].name, "January 2026");
        assert_eq!(periods[1].end_date, date(2026, 2, 28));
        assert_eq!(periods[11].period_number, 12);
        assert_eq!(periods[11].end_date, date(2026, 12, 31));
    }

    #[test]
    fn test_generate_monthly_periods_spanning_years() {
        let periods = FiscalCalendar::monthly_periods(date(2025, 7, 1), date(2026, 6, 30)).unwrap();
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[5].name, "December 2025");
        assert_eq!(periods[6].name, "January 2026");
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(FiscalCalendar::last_day_of_month(2024, 2), Some(date(2024, 2, 29)));
        assert_eq!(FiscalCalendar::last_day_of_month(2026, 12), Some(date(2026, 12, 31)));
        assert_eq!(FiscalCalendar::last_day_of_month(2026, 13), None);
    }

    #[test]
    fn test_close_requires_earlier_closed() {
        let siblings = [
            (1, FiscalStatus::Closed),
            (2, FiscalStatus::Open),
            (3, FiscalStatus::Open),
        ];
        assert!(FiscalCalendar::validate_close(2, FiscalStatus::Open, &siblings).is_ok());
        assert!(matches!(
            FiscalCalendar::validate_close(3, FiscalStatus::Open, &siblings),
            Err(AccountingError::EarlierPeriodsOpen)
        ));
        assert!(matches!(
            FiscalCalendar::validate_close(1, FiscalStatus::Closed, &siblings),
            Err(AccountingError::PeriodAlreadyClosed)
        ));
    }

    #[test]
    fn test_reopen_requires_later_open() {
        let siblings = [(1, FiscalStatus::Closed), (2, FiscalStatus::Closed)];
        assert!(matches!(
            FiscalCalendar::validate_reopen(1, FiscalStatus::Closed, &siblings),
            Err(AccountingError::LaterPeriodsClosed)
        ));
        assert!(FiscalCalendar::validate_reopen(2, FiscalStatus::Closed, &siblings).is_ok());
        assert!(matches!(
            FiscalCalendar::validate_reopen(2, FiscalStatus::Open, &siblings),
            Err(AccountingError::PeriodNotClosed)
        ));
    }
}
