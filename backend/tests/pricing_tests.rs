//! Pricing engine tests
//!
//! Covers line pricing, discount precedence, order-level totals, and the
//! stock requirement arithmetic the checkout path relies on.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::pricing::{order_totals, price_line, resolve_discount, OrderAdjustment, PricingError};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A plain line: unit price 50000 at multiplier 10, three units
    #[test]
    fn test_line_subtotal_and_stock_requirement() {
        let line = price_line(dec("50000"), 10, 3, Decimal::ZERO, Decimal::ZERO).unwrap();

        assert_eq!(line.subtotal, dec("150000"));
        assert_eq!(line.required_base_stock, 30);
        assert_eq!(line.final_unit_price, dec("50000"));
    }

    /// An absolute discount beats a simultaneous percentage
    #[test]
    fn test_absolute_discount_precedence() {
        // price 100, 50% requested AND absolute 10: absolute wins -> 90
        let line = price_line(dec("100"), 1, 1, dec("50"), dec("10")).unwrap();

        assert_eq!(line.final_unit_price, dec("90"));
        assert_eq!(line.discount_value, dec("10"));
    }

    /// Percentage applies only when no absolute value is given
    #[test]
    fn test_percent_discount_fallback() {
        let line = price_line(dec("80000"), 1, 2, dec("25"), Decimal::ZERO).unwrap();

        assert_eq!(line.discount_value, dec("20000"));
        assert_eq!(line.final_unit_price, dec("60000"));
        assert_eq!(line.subtotal, dec("120000"));
    }

    /// A discount larger than the price floors the line at zero
    #[test]
    fn test_discount_floors_at_zero() {
        let line = price_line(dec("100"), 1, 5, Decimal::ZERO, dec("250")).unwrap();

        assert_eq!(line.final_unit_price, Decimal::ZERO);
        assert_eq!(line.subtotal, Decimal::ZERO);
    }

    /// Order-level tax is computed after the order-level discount
    #[test]
    fn test_tax_after_discount() {
        // subtotal 1000, 10% discount -> 900, 11% tax on 900 -> 99, total 999
        let adjustment = OrderAdjustment {
            discount_percent: dec("10"),
            tax_percent: dec("11"),
            ..Default::default()
        };
        let totals = order_totals(dec("1000"), &adjustment).unwrap();

        assert_eq!(totals.discount_value, dec("100"));
        assert_eq!(totals.tax_value, dec("99"));
        assert_eq!(totals.total, dec("999"));
    }

    /// An order-level discount larger than the subtotal floors the total at
    /// zero instead of charging a negative amount
    #[test]
    fn test_order_discount_floors_at_zero() {
        let adjustment = OrderAdjustment {
            discount_value: dec("500"),
            tax_percent: dec("10"),
            ..Default::default()
        };
        let totals = order_totals(dec("100"), &adjustment).unwrap();

        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.tax_value, Decimal::ZERO);
    }

    /// Absolute order-level discount and tax values win over percentages
    #[test]
    fn test_order_level_absolute_precedence() {
        let adjustment = OrderAdjustment {
            discount_percent: dec("50"),
            discount_value: dec("100"),
            tax_percent: dec("10"),
            tax_value: dec("7"),
        };
        let totals = order_totals(dec("1000"), &adjustment).unwrap();

        assert_eq!(totals.total, dec("907"));
    }

    /// Range violations are rejected before anything is priced
    #[test]
    fn test_input_rejection() {
        assert_eq!(
            price_line(dec("100"), 1, 0, Decimal::ZERO, Decimal::ZERO).unwrap_err(),
            PricingError::NonPositiveQuantity
        );
        assert_eq!(
            price_line(dec("100"), 0, 1, Decimal::ZERO, Decimal::ZERO).unwrap_err(),
            PricingError::InvalidMultiplier
        );
        assert_eq!(
            price_line(dec("100"), 1, 1, dec("101"), Decimal::ZERO).unwrap_err(),
            PricingError::InvalidDiscountPercent
        );
        assert_eq!(
            price_line(dec("100"), 1, 1, Decimal::ZERO, dec("-1")).unwrap_err(),
            PricingError::NegativeDiscountValue
        );

        let bad_tax = OrderAdjustment {
            tax_percent: dec("120"),
            ..Default::default()
        };
        assert_eq!(
            order_totals(dec("100"), &bad_tax).unwrap_err(),
            PricingError::InvalidTaxPercent
        );
    }

    /// resolve_discount is shared between line and order levels
    #[test]
    fn test_resolve_discount() {
        assert_eq!(resolve_discount(dec("200"), dec("10"), Decimal::ZERO), dec("20"));
        assert_eq!(resolve_discount(dec("200"), dec("10"), dec("5")), dec("5"));
        assert_eq!(
            resolve_discount(dec("200"), Decimal::ZERO, Decimal::ZERO),
            Decimal::ZERO
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// required_base_stock is always quantity x multiplier
    #[test]
    fn prop_stock_requirement(quantity in 1i64..1000, multiplier in 1i64..100) {
        let line = price_line(
            dec("1000"),
            multiplier,
            quantity,
            Decimal::ZERO,
            Decimal::ZERO,
        ).unwrap();

        prop_assert_eq!(line.required_base_stock, quantity * multiplier);
    }

    /// The final unit price never goes negative, whatever the discount
    #[test]
    fn prop_final_price_non_negative(
        price in 0i64..1_000_000,
        percent in 0i64..=100,
        value in 0i64..2_000_000,
    ) {
        let line = price_line(
            Decimal::from(price),
            1,
            1,
            Decimal::from(percent),
            Decimal::from(value),
        ).unwrap();

        prop_assert!(line.final_unit_price >= Decimal::ZERO);
        prop_assert!(line.subtotal >= Decimal::ZERO);
    }

    /// When an absolute discount is present the percentage never changes
    /// the result
    #[test]
    fn prop_absolute_discount_ignores_percent(
        price in 1i64..1_000_000,
        percent_a in 0i64..=100,
        percent_b in 0i64..=100,
        value in 1i64..1_000_000,
    ) {
        let a = price_line(
            Decimal::from(price), 1, 1,
            Decimal::from(percent_a), Decimal::from(value),
        ).unwrap();
        let b = price_line(
            Decimal::from(price), 1, 1,
            Decimal::from(percent_b), Decimal::from(value),
        ).unwrap();

        prop_assert_eq!(a.final_unit_price, b.final_unit_price);
        prop_assert_eq!(a.subtotal, b.subtotal);
    }

    /// Without adjustments the order total equals the summed subtotals
    #[test]
    fn prop_identity_adjustment(subtotal in 0i64..10_000_000) {
        let totals = order_totals(
            Decimal::from(subtotal),
            &OrderAdjustment::default(),
        ).unwrap();

        prop_assert_eq!(totals.total, Decimal::from(subtotal));
    }

    /// The grand total never goes negative, whatever the absolute discount
    #[test]
    fn prop_total_non_negative(
        subtotal in 0i64..1_000_000,
        discount_value in 0i64..2_000_000,
        tax_percent in 0i64..=100,
    ) {
        let totals = order_totals(Decimal::from(subtotal), &OrderAdjustment {
            discount_value: Decimal::from(discount_value),
            tax_percent: Decimal::from(tax_percent),
            ..Default::default()
        }).unwrap();

        prop_assert!(totals.total >= Decimal::ZERO);
    }

    /// Order total is never below zero-tax post-discount amount minus
    /// discount, and tax only ever adds
    #[test]
    fn prop_tax_only_adds(
        subtotal in 0i64..1_000_000,
        discount_percent in 0i64..=100,
        tax_percent in 0i64..=100,
    ) {
        let no_tax = order_totals(Decimal::from(subtotal), &OrderAdjustment {
            discount_percent: Decimal::from(discount_percent),
            ..Default::default()
        }).unwrap();
        let with_tax = order_totals(Decimal::from(subtotal), &OrderAdjustment {
            discount_percent: Decimal::from(discount_percent),
            tax_percent: Decimal::from(tax_percent),
            ..Default::default()
        }).unwrap();

        prop_assert!(with_tax.total >= no_tax.total);
    }
}
