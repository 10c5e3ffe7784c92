//! Checkout semantics tests
//!
//! Models the checkout loop over an in-memory stock ledger: all-or-nothing
//! application, stock conservation, guarded decrements under contention, and
//! unit/product association checks. The database path applies the same
//! pricing results inside one transaction with a guarded UPDATE.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use shared::pricing::{order_totals, price_line, OrderAdjustment, PricedLine};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A catalog product with one unit, as checkout sees it
#[derive(Clone)]
struct TestProduct {
    id: u32,
    stock: i64,
    unit_multiplier: i64,
    unit_price: Decimal,
    /// Which product the chosen unit actually belongs to
    unit_owner: u32,
}

struct TestLine {
    product: TestProduct,
    quantity: i64,
}

#[derive(Debug, PartialEq)]
enum CheckoutError {
    UnitMismatch,
    InsufficientStock,
    Pricing,
}

/// Apply a multi-line order against a stock ledger, all-or-nothing
fn simulate_checkout(
    stock: &mut HashMap<u32, i64>,
    lines: &[TestLine],
    adjustment: &OrderAdjustment,
) -> Result<(Vec<PricedLine>, Decimal), CheckoutError> {
    let before = stock.clone();
    let mut priced_lines = Vec::new();
    let mut subtotal = Decimal::ZERO;

    for line in lines {
        if line.product.unit_owner != line.product.id {
            *stock = before;
            return Err(CheckoutError::UnitMismatch);
        }

        let priced = match price_line(
            line.product.unit_price,
            line.product.unit_multiplier,
            line.quantity,
            Decimal::ZERO,
            Decimal::ZERO,
        ) {
            Ok(p) => p,
            Err(_) => {
                *stock = before;
                return Err(CheckoutError::Pricing);
            }
        };

        let available = stock.entry(line.product.id).or_insert(0);
        if *available < priced.required_base_stock {
            *stock = before;
            return Err(CheckoutError::InsufficientStock);
        }
        *available -= priced.required_base_stock;

        subtotal += priced.subtotal;
        priced_lines.push(priced);
    }

    let totals = order_totals(subtotal, adjustment).map_err(|_| {
        *stock = before;
        CheckoutError::Pricing
    })?;

    Ok((priced_lines, totals.total))
}

fn product(id: u32, stock: i64, multiplier: i64, price: &str) -> TestProduct {
    TestProduct {
        id,
        stock,
        unit_multiplier: multiplier,
        unit_price: dec(price),
        unit_owner: id,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Full flow: stock 100, unit of 10 pcs at 50000, quantity 3
    #[test]
    fn test_checkout_round_trip() {
        let p = product(1, 100, 10, "50000");
        let mut stock = HashMap::from([(1, p.stock)]);

        let (lines, total) = simulate_checkout(
            &mut stock,
            &[TestLine { product: p, quantity: 3 }],
            &OrderAdjustment::default(),
        )
        .unwrap();

        assert_eq!(lines[0].subtotal, dec("150000"));
        assert_eq!(total, dec("150000"));
        assert_eq!(stock[&1], 70);
    }

    /// A failing line leaves every earlier decrement undone
    #[test]
    fn test_atomic_rollback() {
        let ok = product(1, 100, 1, "1000");
        let short = product(2, 5, 10, "9000"); // needs 10, has 5
        let mut stock = HashMap::from([(1, 100), (2, 5)]);

        let err = simulate_checkout(
            &mut stock,
            &[
                TestLine { product: ok, quantity: 4 },
                TestLine { product: short, quantity: 1 },
            ],
            &OrderAdjustment::default(),
        )
        .unwrap_err();

        assert_eq!(err, CheckoutError::InsufficientStock);
        assert_eq!(stock[&1], 100);
        assert_eq!(stock[&2], 5);
    }

    /// A unit belonging to another product rejects the whole order
    #[test]
    fn test_unit_product_mismatch() {
        let mut wrong_unit = product(1, 100, 1, "1000");
        wrong_unit.unit_owner = 2;
        let mut stock = HashMap::from([(1, 100)]);

        let err = simulate_checkout(
            &mut stock,
            &[TestLine { product: wrong_unit, quantity: 1 }],
            &OrderAdjustment::default(),
        )
        .unwrap_err();

        assert_eq!(err, CheckoutError::UnitMismatch);
        assert_eq!(stock[&1], 100);
    }

    /// Two orders racing for the same stock: one fits, the other is refused
    #[test]
    fn test_contention_never_oversells() {
        let p = product(1, 15, 10, "5000");
        let mut stock = HashMap::from([(1, p.stock)]);

        let first = simulate_checkout(
            &mut stock,
            &[TestLine { product: p.clone(), quantity: 1 }],
            &OrderAdjustment::default(),
        );
        let second = simulate_checkout(
            &mut stock,
            &[TestLine { product: p, quantity: 1 }],
            &OrderAdjustment::default(),
        );

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), CheckoutError::InsufficientStock);
        assert_eq!(stock[&1], 5);
    }

    /// Two lines of the same product share one stock pool
    #[test]
    fn test_duplicate_product_lines() {
        let p = product(1, 25, 10, "5000");
        let mut stock = HashMap::from([(1, p.stock)]);

        let err = simulate_checkout(
            &mut stock,
            &[
                TestLine { product: p.clone(), quantity: 2 }, // 20 base units
                TestLine { product: p, quantity: 1 },         // 10 more, only 5 left
            ],
            &OrderAdjustment::default(),
        )
        .unwrap_err();

        assert_eq!(err, CheckoutError::InsufficientStock);
        assert_eq!(stock[&1], 25);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Stock conservation: stock_before - stock_after equals the sum of
    /// quantity x multiplier over applied lines, and is zero on failure
    #[test]
    fn prop_stock_conservation(
        initial in 0i64..10_000,
        quantity in 1i64..100,
        multiplier in 1i64..50,
    ) {
        let p = product(1, initial, multiplier, "100");
        let mut stock = HashMap::from([(1, initial)]);

        let result = simulate_checkout(
            &mut stock,
            &[TestLine { product: p, quantity }],
            &OrderAdjustment::default(),
        );

        let consumed = initial - stock[&1];
        match result {
            Ok(_) => prop_assert_eq!(consumed, quantity * multiplier),
            Err(_) => prop_assert_eq!(consumed, 0),
        }
        prop_assert!(stock[&1] >= 0);
    }

    /// Sequential contention: however demand is split across orders, total
    /// consumption never exceeds the initial stock
    #[test]
    fn prop_no_oversell_under_contention(
        initial in 0i64..500,
        demands in prop::collection::vec(1i64..50, 1..10),
    ) {
        let mut stock = HashMap::from([(1, initial)]);

        for quantity in demands {
            let p = product(1, initial, 1, "100");
            let _ = simulate_checkout(
                &mut stock,
                &[TestLine { product: p, quantity }],
                &OrderAdjustment::default(),
            );
        }

        prop_assert!(stock[&1] >= 0);
        prop_assert!(initial - stock[&1] <= initial);
    }

    /// The order total always equals the recomputed sum of its line
    /// subtotals plus adjustments
    #[test]
    fn prop_total_matches_lines(
        quantities in prop::collection::vec(1i64..20, 1..5),
        discount_percent in 0i64..=100,
        tax_percent in 0i64..=100,
    ) {
        let lines: Vec<TestLine> = quantities
            .iter()
            .map(|&q| TestLine { product: product(1, 1_000_000, 1, "750"), quantity: q })
            .collect();
        let mut stock = HashMap::from([(1, 1_000_000i64)]);

        let adjustment = OrderAdjustment {
            discount_percent: Decimal::from(discount_percent),
            tax_percent: Decimal::from(tax_percent),
            ..Default::default()
        };

        let (priced, total) = simulate_checkout(&mut stock, &lines, &adjustment).unwrap();

        let subtotal: Decimal = priced.iter().map(|l| l.subtotal).sum();
        let expected = order_totals(subtotal, &adjustment).unwrap().total;
        prop_assert_eq!(total, expected);
    }
}
