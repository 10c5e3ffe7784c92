//! Order pricing engine
//!
//! Pure computation for cashier and customer order placement: per-line
//! discount resolution, line subtotals, base-unit stock requirements, and
//! order-level discount/tax totals. No I/O happens here; the backend order
//! service applies these results inside one database transaction.
//!
//! Discount precedence: an absolute discount value wins outright over a
//! percentage; the percentage is only applied when no absolute value is
//! supplied. Order-level tax is computed on the post-discount amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pricing input errors
///
/// These are schema/range violations; callers surface them as validation
/// failures before anything touches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("quantity must be at least 1")]
    NonPositiveQuantity,

    #[error("unit multiplier must be at least 1")]
    InvalidMultiplier,

    #[error("discount percent must be between 0 and 100")]
    InvalidDiscountPercent,

    #[error("discount value cannot be negative")]
    NegativeDiscountValue,

    #[error("tax percent must be between 0 and 100")]
    InvalidTaxPercent,

    #[error("tax value cannot be negative")]
    NegativeTaxValue,
}

/// A fully priced order line, ready to be persisted as a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Unit price snapshot (the unit's own price, not the base price)
    pub unit_price: Decimal,
    pub unit_multiplier: i64,
    pub quantity: i64,
    /// Requested percent, stored for display even when the absolute wins
    pub discount_percent: Decimal,
    /// Resolved absolute discount per unit
    pub discount_value: Decimal,
    /// Unit price after discount, floored at zero
    pub final_unit_price: Decimal,
    pub subtotal: Decimal,
    /// quantity x multiplier, in base units
    pub required_base_stock: i64,
}

/// Order-level discount/tax parameters as submitted by the caller
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrderAdjustment {
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub discount_value: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[serde(default)]
    pub tax_value: Decimal,
}

/// Resolved order-level monetary totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_value: Decimal,
    pub tax_percent: Decimal,
    pub tax_value: Decimal,
    pub total: Decimal,
}

/// Resolve a discount against a price.
///
/// An absolute value takes precedence; a percentage only applies when the
/// absolute value is absent (zero).
pub fn resolve_discount(price: Decimal, percent: Decimal, value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else if percent > Decimal::ZERO {
        price * percent / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Price a single order line.
///
/// `unit_price` is the product unit's own price (already base price x
/// multiplier at unit creation); `quantity` is in units of that product unit.
pub fn price_line(
    unit_price: Decimal,
    unit_multiplier: i64,
    quantity: i64,
    discount_percent: Decimal,
    discount_value: Decimal,
) -> Result<PricedLine, PricingError> {
    if quantity < 1 {
        return Err(PricingError::NonPositiveQuantity);
    }
    if unit_multiplier < 1 {
        return Err(PricingError::InvalidMultiplier);
    }
    if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
        return Err(PricingError::InvalidDiscountPercent);
    }
    if discount_value < Decimal::ZERO {
        return Err(PricingError::NegativeDiscountValue);
    }

    let resolved = resolve_discount(unit_price, discount_percent, discount_value);
    let final_unit_price = (unit_price - resolved).max(Decimal::ZERO);
    let subtotal = final_unit_price * Decimal::from(quantity);

    Ok(PricedLine {
        unit_price,
        unit_multiplier,
        quantity,
        discount_percent,
        discount_value: resolved,
        final_unit_price,
        subtotal,
        required_base_stock: quantity * unit_multiplier,
    })
}

/// Compute order-level totals from the summed line subtotals.
///
/// The discount is resolved first; tax applies to the post-discount amount.
/// Like the line level, the post-discount amount is floored at zero, so an
/// oversized absolute discount can never produce a negative grand total.
pub fn order_totals(
    subtotal: Decimal,
    adjustment: &OrderAdjustment,
) -> Result<OrderTotals, PricingError> {
    if adjustment.discount_percent < Decimal::ZERO
        || adjustment.discount_percent > Decimal::ONE_HUNDRED
    {
        return Err(PricingError::InvalidDiscountPercent);
    }
    if adjustment.discount_value < Decimal::ZERO {
        return Err(PricingError::NegativeDiscountValue);
    }
    if adjustment.tax_percent < Decimal::ZERO || adjustment.tax_percent > Decimal::ONE_HUNDRED {
        return Err(PricingError::InvalidTaxPercent);
    }
    if adjustment.tax_value < Decimal::ZERO {
        return Err(PricingError::NegativeTaxValue);
    }

    let discount_value = resolve_discount(
        subtotal,
        adjustment.discount_percent,
        adjustment.discount_value,
    );
    let after_discount = (subtotal - discount_value).max(Decimal::ZERO);

    let tax_value = if adjustment.tax_value > Decimal::ZERO {
        adjustment.tax_value
    } else if adjustment.tax_percent > Decimal::ZERO {
        after_discount * adjustment.tax_percent / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    Ok(OrderTotals {
        subtotal,
        discount_percent: adjustment.discount_percent,
        discount_value,
        tax_percent: adjustment.tax_percent,
        tax_value,
        total: after_discount + tax_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn line_without_discount() {
        // barcode 8997035567890, unit multiplier 10, price 50000, qty 3
        let line = price_line(dec(50_000), 10, 3, Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(line.subtotal, dec(150_000));
        assert_eq!(line.required_base_stock, 30);
        assert_eq!(line.discount_value, Decimal::ZERO);
    }

    #[test]
    fn absolute_discount_wins_over_percent() {
        let line = price_line(dec(100), 1, 1, dec(50), dec(10)).unwrap();
        assert_eq!(line.final_unit_price, dec(90));
        assert_eq!(line.subtotal, dec(90));
        // percent kept for display
        assert_eq!(line.discount_percent, dec(50));
        assert_eq!(line.discount_value, dec(10));
    }

    #[test]
    fn percent_discount_applies_when_no_absolute() {
        let line = price_line(dec(200), 1, 2, dec(25), Decimal::ZERO).unwrap();
        assert_eq!(line.discount_value, dec(50));
        assert_eq!(line.final_unit_price, dec(150));
        assert_eq!(line.subtotal, dec(300));
    }

    #[test]
    fn oversized_discount_floors_at_zero() {
        let line = price_line(dec(100), 1, 3, Decimal::ZERO, dec(150)).unwrap();
        assert_eq!(line.final_unit_price, Decimal::ZERO);
        assert_eq!(line.subtotal, Decimal::ZERO);
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let err = price_line(dec(100), 1, 0, Decimal::ZERO, Decimal::ZERO).unwrap_err();
        assert_eq!(err, PricingError::NonPositiveQuantity);
    }

    #[test]
    fn rejects_out_of_range_percent() {
        let err = price_line(dec(100), 1, 1, dec(101), Decimal::ZERO).unwrap_err();
        assert_eq!(err, PricingError::InvalidDiscountPercent);
    }

    #[test]
    fn tax_applies_after_discount() {
        // subtotal 1000, discount 10% -> 900, tax 11% -> 99, total 999
        let adjustment = OrderAdjustment {
            discount_percent: dec(10),
            tax_percent: dec(11),
            ..Default::default()
        };
        let totals = order_totals(dec(1000), &adjustment).unwrap();
        assert_eq!(totals.discount_value, dec(100));
        assert_eq!(totals.tax_value, dec(99));
        assert_eq!(totals.total, dec(999));
    }

    #[test]
    fn oversized_order_discount_floors_total_at_zero() {
        let adjustment = OrderAdjustment {
            discount_value: dec(500),
            tax_percent: dec(10),
            ..Default::default()
        };
        let totals = order_totals(dec(100), &adjustment).unwrap();
        assert_eq!(totals.discount_value, dec(500));
        assert_eq!(totals.tax_value, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn absolute_order_discount_and_tax_win() {
        let adjustment = OrderAdjustment {
            discount_percent: dec(50),
            discount_value: dec(100),
            tax_percent: dec(10),
            tax_value: dec(7),
        };
        let totals = order_totals(dec(1000), &adjustment).unwrap();
        assert_eq!(totals.discount_value, dec(100));
        assert_eq!(totals.tax_value, dec(7));
        assert_eq!(totals.total, dec(907));
    }

    #[test]
    fn zero_adjustment_passes_subtotal_through() {
        let totals = order_totals(dec(150_000), &OrderAdjustment::default()).unwrap();
        assert_eq!(totals.total, dec(150_000));
        assert_eq!(totals.discount_value, Decimal::ZERO);
        assert_eq!(totals.tax_value, Decimal::ZERO);
    }
}
