//! Line arithmetic shared by invoices and point-of-sale tickets.
//!
//! `gross = qty × price`, `discount = gross × discount% / 100`,
//! `tax = (gross − discount) × tax% / 100`, `line_total = gross − discount + tax`,
//! each rounded to 2 decimal places.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kontor_shared::types::{percent_of, round_money};

use super::error::InvoiceError;

/// Priced quantity with discount and tax percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Quantity sold.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Discount percentage (0-100).
    pub discount_percent: Decimal,
    /// Tax percentage.
    pub tax_rate: Decimal,
}

/// Derived amounts of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineAmounts {
    /// Quantity × price.
    pub gross: Decimal,
    /// Discount amount.
    pub discount: Decimal,
    /// Tax amount.
    pub tax: Decimal,
    /// Gross − discount + tax.
    pub line_total: Decimal,
}

/// Document totals summed from its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineTotals {
    /// Σ gross.
    pub subtotal: Decimal,
    /// Σ discount.
    pub discount_total: Decimal,
    /// Σ tax.
    pub tax_total: Decimal,
    /// Σ line total.
    pub total: Decimal,
}

impl LineInput {
    /// Validates the line at 1-based position `line_no`.
    pub fn validate(&self, line_no: usize) -> Result<(), InvoiceError> {
        if self.quantity <= Decimal::ZERO {
            return Err(InvoiceError::InvalidQuantity(line_no));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(InvoiceError::NegativePrice(line_no));
        }
        if self.discount_percent < Decimal::ZERO || self.discount_percent > Decimal::ONE_HUNDRED {
            return Err(InvoiceError::InvalidDiscount(line_no));
        }
        if self.tax_rate < Decimal::ZERO {
            return Err(InvoiceError::InvalidTaxRate(line_no));
        }
        Ok(())
    }

    /// Computes the line amounts.
    #[must_use]
    pub fn amounts(&self) -> LineAmounts {
        let gross = round_money(self.quantity * self.unit_price);
        let discount = percent_of(gross, self.discount_percent);
        let tax = percent_of(gross - discount, self.tax_rate);
        LineAmounts {
            gross,
            discount,
            tax,
            line_total: gross - discount + tax,
        }
    }
}

impl LineTotals {
    /// Sums line amounts.
    #[must_use]
    pub fn sum<'a>(lines: impl IntoIterator<Item = &'a LineAmounts>) -> Self {
        lines.into_iter().fold(Self::default(), |acc, l| Self {
            subtotal: acc.subtotal + l.gross,
            discount_total: acc.discount_total + l.discount,
            tax_total: acc.tax_total + l.tax,
            total: acc.total + l.line_total,
        })
    }
}

/// Validates every line and returns the amounts with their totals.
pub fn price_lines(lines: &[LineInput]) -> Result<(Vec<LineAmounts>, LineTotals), InvoiceError> {
    let mut amounts = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        line.validate(idx + 1)?;
        amounts.push(line.amounts());
    }
    let totals = LineTotals::sum(&amounts);
    Ok((amounts, totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal, discount: Decimal, tax: Decimal) -> LineInput {
        LineInput {
            quantity,
            unit_price,
            discount_percent: discount,
            tax_rate: tax,
        }
    }

    #[test]
    fn test_line_amounts() {
        let amounts = line(dec!(3), dec!(19.99), dec!(10), dec!(20)).amounts();
        assert_eq!(amounts.gross, dec!(59.97));
        assert_eq!(amounts.discount, dec!(6.00));
        assert_eq!(amounts.tax, dec!(10.79));
        assert_eq!(amounts.line_total, dec!(64.76));
    }

    #[test]
    fn test_line_without_discount_or_tax() {
        let amounts = line(dec!(2), dec!(50), dec!(0), dec!(0)).amounts();
        assert_eq!(amounts.line_total, dec!(100.00));
        assert_eq!(amounts.tax, Decimal::ZERO);
    }

    #[test]
    fn test_totals_sum_lines() {
        let (amounts, totals) = price_lines(&[
            line(dec!(1), dec!(100), dec!(0), dec!(10)),
            line(dec!(2), dec!(25), dec!(50), dec!(0)),
        ])
        .unwrap();

        assert_eq!(amounts.len(), 2);
        assert_eq!(totals.subtotal, dec!(150.00));
        assert_eq!(totals.discount_total, dec!(25.00));
        assert_eq!(totals.tax_total, dec!(10.00));
        assert_eq!(totals.total, dec!(135.00));
        assert_eq!(
            totals.total,
            totals.subtotal - totals.discount_total + totals.tax_total
        );
    }

    #[test]
    fn test_invalid_lines() {
        assert!(matches!(
            price_lines(&[line(dec!(0), dec!(1), dec!(0), dec!(0))]),
            Err(InvoiceError::InvalidQuantity(1))
        ));
        assert!(matches!(
            price_lines(&[
                line(dec!(1), dec!(1), dec!(0), dec!(0)),
                line(dec!(1), dec!(1), dec!(101), dec!(0)),
            ]),
            Err(InvoiceError::InvalidDiscount(2))
        ));
        assert!(matches!(
            price_lines(&[line(dec!(1), dec!(-1), dec!(0), dec!(0))]),
            Err(InvoiceError::NegativePrice(1))
        ));
    }
}
