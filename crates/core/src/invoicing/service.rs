//! Invoice state transitions and payment application.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;
use super::types::InvoiceStatus;

/// Result of applying a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    /// Cumulative amount paid.
    pub amount_paid: Decimal,
    /// Outstanding balance, always `total − amount_paid`.
    pub amount_due: Decimal,
    /// Status after the payment.
    pub status: InvoiceStatus,
}

impl PaymentOutcome {
    /// Returns true when nothing is outstanding.
    #[must_use]
    pub fn is_fully_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

/// Invoice service for state transitions.
pub struct InvoiceService;

impl InvoiceService {
    /// Validates issue and due dates.
    pub fn validate_dates(issue_date: NaiveDate, due_date: NaiveDate) -> Result<(), InvoiceError> {
        if due_date < issue_date {
            return Err(InvoiceError::InvalidDueDate);
        }
        Ok(())
    }

    /// Validates that an invoice can be edited.
    pub fn validate_can_edit(status: InvoiceStatus) -> Result<(), InvoiceError> {
        if status == InvoiceStatus::Draft {
            Ok(())
        } else {
            Err(InvoiceError::NotDraftForEdit)
        }
    }

    /// Validates that an invoice can be deleted.
    pub fn validate_can_delete(status: InvoiceStatus) -> Result<(), InvoiceError> {
        if status == InvoiceStatus::Draft {
            Ok(())
        } else {
            Err(InvoiceError::NotDraftForDelete)
        }
    }

    /// Validates a draft → sent transition.
    pub fn validate_can_send(
        status: InvoiceStatus,
        line_count: usize,
        total: Decimal,
    ) -> Result<(), InvoiceError> {
        if status != InvoiceStatus::Draft {
            return Err(InvoiceError::NotDraftForSend);
        }
        if line_count == 0 {
            return Err(InvoiceError::NoLines);
        }
        if total <= Decimal::ZERO {
            return Err(InvoiceError::ZeroTotal);
        }
        Ok(())
    }

    /// Applies a payment to an invoice.
    ///
    /// The invoice becomes `paid` when nothing is outstanding. Otherwise it
    /// becomes `partially_paid`, except that an overdue invoice stays overdue.
    pub fn apply_payment(
        status: InvoiceStatus,
        total: Decimal,
        amount_paid: Decimal,
        amount: Decimal,
    ) -> Result<PaymentOutcome, InvoiceError> {
        if !status.accepts_payment() {
            return Err(InvoiceError::PaymentNotAllowed(status));
        }
        if amount <= Decimal::ZERO {
            return Err(InvoiceError::InvalidPaymentAmount);
        }
        if amount.normalize().scale() > 2 {
            return Err(InvoiceError::PaymentPrecision);
        }

        let due = total - amount_paid;
        if amount > due {
            return Err(InvoiceError::Overpayment { amount, due });
        }

        let amount_paid = amount_paid + amount;
        let amount_due = total - amount_paid;
        let status = if amount_due.is_zero() {
            InvoiceStatus::Paid
        } else if status == InvoiceStatus::Overdue {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::PartiallyPaid
        };

        Ok(PaymentOutcome {
            amount_paid,
            amount_due,
            status,
        })
    }

    /// Validates a cancel. Only drafts and sent invoices without payments.
    pub fn validate_can_cancel(
        status: InvoiceStatus,
        amount_paid: Decimal,
    ) -> Result<(), InvoiceError> {
        match status {
            InvoiceStatus::Draft | InvoiceStatus::Sent if amount_paid.is_zero() => Ok(()),
            _ => Err(InvoiceError::CannotCancel),
        }
    }

    /// Returns true if the invoice should be flagged overdue on `as_of`.
    #[must_use]
    pub fn is_overdue(status: InvoiceStatus, due_date: NaiveDate, as_of: NaiveDate) -> bool {
        status.can_become_overdue() && due_date < as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kontor_shared::AppError;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_send_rules() {
        assert!(InvoiceService::validate_can_send(InvoiceStatus::Draft, 1, dec!(10)).is_ok());
        assert!(matches!(
            InvoiceService::validate_can_send(InvoiceStatus::Draft, 0, dec!(0)),
            Err(InvoiceError::NoLines)
        ));
        assert!(matches!(
            InvoiceService::validate_can_send(InvoiceStatus::Draft, 1, dec!(0)),
            Err(InvoiceError::ZeroTotal)
        ));
        assert!(matches!(
            InvoiceService::validate_can_send(InvoiceStatus::Sent, 1, dec!(10)),
            Err(InvoiceError::NotDraftForSend)
        ));
    }

    #[test]
    fn test_partial_then_full_payment() {
        let first =
            InvoiceService::apply_payment(InvoiceStatus::Sent, dec!(100), dec!(0), dec!(40)).unwrap();
        assert_eq!(first.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(first.amount_due, dec!(60));

        let second =
            InvoiceService::apply_payment(first.status, dec!(100), first.amount_paid, dec!(60))
                .unwrap();
        assert_eq!(second.status, InvoiceStatus::Paid);
        assert!(second.is_fully_paid());
        assert_eq!(second.amount_due, Decimal::ZERO);
    }

    #[test]
    fn test_overdue_stays_overdue_until_paid() {
        let partial =
            InvoiceService::apply_payment(InvoiceStatus::Overdue, dec!(100), dec!(0), dec!(10))
                .unwrap();
        assert_eq!(partial.status, InvoiceStatus::Overdue);

        let full =
            InvoiceService::apply_payment(InvoiceStatus::Overdue, dec!(100), dec!(10), dec!(90))
                .unwrap();
        assert_eq!(full.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_payment_rejections() {
        assert!(matches!(
            InvoiceService::apply_payment(InvoiceStatus::Draft, dec!(100), dec!(0), dec!(10)),
            Err(InvoiceError::PaymentNotAllowed(InvoiceStatus::Draft))
        ));
        assert!(matches!(
            InvoiceService::apply_payment(InvoiceStatus::Sent, dec!(100), dec!(0), dec!(0)),
            Err(InvoiceError::InvalidPaymentAmount)
        ));
        assert!(matches!(
            InvoiceService::apply_payment(InvoiceStatus::Sent, dec!(100), dec!(50), dec!(50.01)),
            Err(InvoiceError::Overpayment { .. })
        ));
        assert!(matches!(
            InvoiceService::apply_payment(InvoiceStatus::Sent, dec!(100), dec!(0), dec!(0.00001)),
            Err(InvoiceError::PaymentPrecision)
        ));
        assert!(matches!(
            InvoiceService::apply_payment(InvoiceStatus::Sent, dec!(100), dec!(0), dec!(10.12345)),
            Err(InvoiceError::PaymentPrecision)
        ));

        let trailing =
            InvoiceService::apply_payment(InvoiceStatus::Sent, dec!(100), dec!(0), dec!(10.500))
                .unwrap();
        assert_eq!(trailing.amount_due, dec!(89.50));

        let app: AppError = InvoiceError::PaymentPrecision.into();
        assert_eq!(app.status_code(), 400);
    }

    #[test]
    fn test_cancel_rules() {
        assert!(InvoiceService::validate_can_cancel(InvoiceStatus::Draft, dec!(0)).is_ok());
        assert!(InvoiceService::validate_can_cancel(InvoiceStatus::Sent, dec!(0)).is_ok());
        assert!(InvoiceService::validate_can_cancel(InvoiceStatus::PartiallyPaid, dec!(5)).is_err());
        assert!(InvoiceService::validate_can_cancel(InvoiceStatus::Paid, dec!(0)).is_err());
    }

    #[test]
    fn test_overdue_check() {
        let due = date(2026, 3, 1);
        assert!(InvoiceService::is_overdue(InvoiceStatus::Sent, due, date(2026, 3, 2)));
        assert!(!InvoiceService::is_overdue(InvoiceStatus::Sent, due, date(2026, 3, 1)));
        assert!(InvoiceService::is_overdue(InvoiceStatus::PartiallyPaid, due, date(2026, 4, 1)));
        assert!(!InvoiceService::is_overdue(InvoiceStatus::Paid, due, date(2026, 4, 1)));
        assert!(!InvoiceService::is_overdue(InvoiceStatus::Draft, due, date(2026, 4, 1)));
    }

    #[test]
    fn test_due_date_validation() {
        assert!(InvoiceService::validate_dates(date(2026, 1, 1), date(2026, 1, 31)).is_ok());
        assert!(InvoiceService::validate_dates(date(2026, 1, 31), date(2026, 1, 1)).is_err());
    }
}
