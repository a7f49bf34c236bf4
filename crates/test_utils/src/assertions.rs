//! Custom Test Assertions
//!
//! Checks shared by the pipeline tests.

use domain_aum::{AumTotals, DailyAumAggregate, InvestorAumRow};

/// Asserts two floats agree within a relative tolerance
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance * scale,
        "expected {expected}, got {actual}"
    );
}

/// Asserts an aggregate equals the sum of the investor rows of its date
pub fn assert_aggregate_matches_rows(aggregate: &DailyAumAggregate, rows: &[InvestorAumRow]) {
    let mut totals = AumTotals::default();
    for row in rows.iter().filter(|row| row.date == aggregate.date) {
        totals.add(row);
    }

    assert_close(aggregate.aum_value, totals.aum_value, 1e-9);
    assert_close(aggregate.management_fee, totals.management_fee, 1e-9);
}

/// Asserts every row satisfies the AUM and fee invariants
pub fn assert_row_invariants(row: &InvestorAumRow) {
    assert!(row.units > 0.0, "non-positive units in {row:?}");
    assert!(row.days >= 1, "days below one in {row:?}");
    assert_eq!(row.aum_value, row.units * row.nav_per_unit, "aum mismatch in {row:?}");
}
