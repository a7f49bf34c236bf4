//! Daily AUM and management-fee computation
//!
//! The kernel joins one date's effective holdings with that date's NAVs and
//! the run's reference data. It is pure and single-threaded; all arithmetic
//! is `f64` and the fee expression keeps a fixed evaluation order so repeated
//! runs reproduce the same bits.

use chrono::NaiveDate;
use tracing::trace;

use crate::fund::FundParams;
use crate::holding::EffectiveHolding;
use crate::nav::NavsForDate;
use crate::record::{DateComputation, InvestorAumRow};
use crate::reference::ReferenceData;

/// AUM of a position
pub fn aum_value(units: f64, nav_per_unit: f64) -> f64 {
    units * nav_per_unit
}

/// Management fee accrued on `aum` over `days`
///
/// Evaluated as `(aum * rate / basis) * days` with the basis fallback applied.
pub fn management_fee(aum: f64, params: FundParams, days: i32) -> f64 {
    let basis = params.effective_basis();
    (aum * params.rate() / f64::from(basis)) * f64::from(days)
}

/// Computes every investor row and the totals for `date`
///
/// Holdings whose fund has no NAV on the date, or whose investor has no
/// agent, are skipped silently and only counted.
pub fn compute_date(
    date: NaiveDate,
    holdings: &[EffectiveHolding],
    navs: &NavsForDate,
    reference: &ReferenceData,
) -> DateComputation {
    let mut out = DateComputation {
        rows: Vec::with_capacity(holdings.len()),
        ..Default::default()
    };

    for holding in holdings {
        let Some(&nav_per_unit) = navs.get(&holding.fund_id) else {
            out.skipped_no_nav += 1;
            continue;
        };
        let Some(agent_id) = reference.agent_for(&holding.investor_id) else {
            out.skipped_no_agent += 1;
            continue;
        };

        let params = reference.fund_params(holding.fund_id);
        let days = reference.days(holding.fund_id, date);
        let aum = aum_value(holding.units, nav_per_unit);

        let row = InvestorAumRow {
            investor_id: holding.investor_id.clone(),
            agent_id,
            fund_id: holding.fund_id,
            date,
            units: holding.units,
            nav_per_unit,
            aum_value: aum,
            days,
            management_fee: management_fee(aum, params, days),
        };
        out.totals.add(&row);
        out.rows.push(row);
    }

    trace!(
        %date,
        rows = out.rows.len(),
        skipped_no_nav = out.skipped_no_nav,
        skipped_no_agent = out.skipped_no_agent,
        "Computed date"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use core_kernel::{AgentId, FundId, InvestorId};

    use crate::agent::AgentAssignments;
    use crate::nav::DayGapTable;

    #[test]
    fn test_fee_order_of_operations() {
        let params = FundParams::new(1.5, 365);
        let expected: f64 = (1250.0 * 0.015 / 365.0) * 1.0;
        assert_eq!(management_fee(1250.0, params, 1).to_bits(), expected.to_bits());
    }

    #[test]
    fn test_compute_skips_and_counts() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut agents = HashMap::new();
        agents.insert(InvestorId::new("I1"), AgentId::new(10));
        let reference = ReferenceData::new(
            HashMap::from([(FundId::new(1), FundParams::new(1.5, 365))]),
            AgentAssignments::from_current(agents),
            DayGapTable::default(),
        );
        let navs = NavsForDate::from([(FundId::new(1), 12.5)]);
        let holdings = vec![
            EffectiveHolding::new("I1", FundId::new(1), 100.0),
            EffectiveHolding::new("I1", FundId::new(2), 50.0),
            EffectiveHolding::new("I2", FundId::new(1), 70.0),
        ];

        let out = compute_date(date, &holdings, &navs, &reference);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.skipped_no_nav, 1);
        assert_eq!(out.skipped_no_agent, 1);
        assert_eq!(out.totals.aum_value, 1250.0);
    }
}
