//! Sale tendering and daily summaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PosError;

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Notes and coins; change may be due.
    Cash,
    /// Card terminal; exact amount.
    Card,
    /// Any other exact-amount method.
    Other,
}

/// Sale lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Paid and stock taken.
    Completed,
    /// Money returned and stock restored.
    Refunded,
}

/// Amount tendered and change due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tender {
    /// Amount handed over.
    pub amount_tendered: Decimal,
    /// Amount returned to the customer.
    pub change_due: Decimal,
}

/// The sale fields a daily summary needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Sale total.
    pub total: Decimal,
    /// Tax included in the total.
    pub tax_total: Decimal,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Sale status.
    pub status: SaleStatus,
}

/// Takings for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailySummary {
    /// Completed sales.
    pub sale_count: i64,
    /// Σ total of completed sales.
    pub gross_total: Decimal,
    /// Σ tax of completed sales.
    pub tax_total: Decimal,
    /// Completed cash takings.
    pub cash_total: Decimal,
    /// Completed card takings.
    pub card_total: Decimal,
    /// Completed takings by other methods.
    pub other_total: Decimal,
    /// Refunded sales.
    pub refunded_count: i64,
    /// Σ total of refunded sales.
    pub refunded_total: Decimal,
}

/// Sale rules.
pub struct SaleService;

impl SaleService {
    /// Settles the tender. Cash requires `tendered ≥ total` and returns change;
    /// other methods tender the exact total.
    pub fn tender(
        method: PaymentMethod,
        total: Decimal,
        amount_tendered: Option<Decimal>,
    ) -> Result<Tender, PosError> {
        match method {
            PaymentMethod::Cash => {
                let tendered = amount_tendered.unwrap_or(total);
                if tendered < total {
                    return Err(PosError::InsufficientPayment { tendered, total });
                }
                Ok(Tender {
                    amount_tendered: tendered,
                    change_due: tendered - total,
                })
            }
            PaymentMethod::Card | PaymentMethod::Other => Ok(Tender {
                amount_tendered: total,
                change_due: Decimal::ZERO,
            }),
        }
    }

    /// Validates a completed → refunded transition.
    pub fn validate_can_refund(status: SaleStatus) -> Result<(), PosError> {
        if status == SaleStatus::Completed {
            Ok(())
        } else {
            Err(PosError::NotCompletedForRefund)
        }
    }

    /// Summarizes a day of sales.
    #[must_use]
    pub fn daily_summary(sales: &[SaleRecord]) -> DailySummary {
        let mut s = DailySummary::default();
        for sale in sales {
            match sale.status {
                SaleStatus::Completed => {
                    s.sale_count += 1;
                    s.gross_total += sale.total;
                    s.tax_total += sale.tax_total;
                    match sale.payment_method {
                        PaymentMethod::Cash => s.cash_total += sale.total,
                        PaymentMethod::Card => s.card_total += sale.total,
                        PaymentMethod::Other => s.other_total += sale.total,
                    }
                }
                SaleStatus::Refunded => {
                    s.refunded_count += 1;
                    s.refunded_total += sale.total;
                }
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cash_change() {
        let t = SaleService::tender(PaymentMethod::Cash, dec!(17.35), Some(dec!(20))).unwrap();
        assert_eq!(t.change_due, dec!(2.65));
        assert_eq!(t.amount_tendered, dec!(20));
    }

    #[test]
    fn test_cash_insufficient() {
        let err = SaleService::tender(PaymentMethod::Cash, dec!(17.35), Some(dec!(10))).unwrap_err();
        assert!(err.to_string().starts_with("Insufficient payment"));
    }

    #[test]
    fn test_card_exact() {
        let t = SaleService::tender(PaymentMethod::Card, dec!(17.35), Some(dec!(50))).unwrap();
        assert_eq!(t.amount_tendered, dec!(17.35));
        assert_eq!(t.change_due, Decimal::ZERO);
    }

    #[test]
    fn test_refund_only_completed() {
        assert!(SaleService::validate_can_refund(SaleStatus::Completed).is_ok());
        assert!(matches!(
            SaleService::validate_can_refund(SaleStatus::Refunded),
            Err(PosError::NotCompletedForRefund)
        ));
    }

    #[test]
    fn test_daily_summary() {
        let rec = |total, method, status| SaleRecord {
            total,
            tax_total: dec!(1),
            payment_method: method,
            status,
        };
        let summary = SaleService::daily_summary(&[
            rec(dec!(10), PaymentMethod::Cash, SaleStatus::Completed),
            rec(dec!(20), PaymentMethod::Card, SaleStatus::Completed),
            rec(dec!(5), PaymentMethod::Cash, SaleStatus::Refunded),
        ]);

        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.gross_total, dec!(30));
        assert_eq!(summary.tax_total, dec!(2));
        assert_eq!(summary.cash_total, dec!(10));
        assert_eq!(summary.card_total, dec!(20));
        assert_eq!(summary.refunded_count, 1);
        assert_eq!(summary.refunded_total, dec!(5));
    }
}
