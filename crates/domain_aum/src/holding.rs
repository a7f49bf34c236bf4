//! Holding events and effective-holding selection

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{FundId, InvestorId};

/// An insert-only snapshot of an investor's units after a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingEvent {
    /// Holding row id, used as the tie-breaker
    pub holding_id: i64,
    /// Investor ID
    pub investor_id: InvestorId,
    /// Fund ID
    pub fund_id: FundId,
    /// Units held after the transaction
    pub units_after: f64,
    /// Date of the transaction that produced the snapshot
    pub transaction_date: NaiveDate,
}

/// The units an investor holds in a fund as of a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveHolding {
    /// Investor ID
    pub investor_id: InvestorId,
    /// Fund ID
    pub fund_id: FundId,
    /// Units held (always positive)
    pub units: f64,
}

impl EffectiveHolding {
    /// Creates an effective holding
    pub fn new(investor_id: impl Into<InvestorId>, fund_id: FundId, units: f64) -> Self {
        Self {
            investor_id: investor_id.into(),
            fund_id,
            units,
        }
    }
}

/// Picks the authoritative holding per (investor, fund) as of `as_of`
///
/// The winner is the event with the greatest transaction date not after
/// `as_of`, ties broken by the greatest holding id. Winners with zero or
/// negative units are dropped. Output is ordered by (investor, fund).
pub fn select_effective_holdings<'a>(
    events: impl IntoIterator<Item = &'a HoldingEvent>,
    as_of: NaiveDate,
) -> Vec<EffectiveHolding> {
    let mut latest: HashMap<(&InvestorId, FundId), &HoldingEvent> = HashMap::new();

    for event in events {
        if event.transaction_date > as_of {
            continue;
        }
        let key = (&event.investor_id, event.fund_id);
        match latest.get(&key) {
            Some(current)
                if (current.transaction_date, current.holding_id)
                    >= (event.transaction_date, event.holding_id) => {}
            _ => {
                latest.insert(key, event);
            }
        }
    }

    let mut holdings: Vec<EffectiveHolding> = latest
        .into_values()
        .filter(|event| event.units_after > 0.0)
        .map(|event| EffectiveHolding {
            investor_id: event.investor_id.clone(),
            fund_id: event.fund_id,
            units: event.units_after,
        })
        .collect();
    holdings.sort_by(|a, b| {
        (&a.investor_id, a.fund_id).cmp(&(&b.investor_id, b.fund_id))
    });
    holdings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: i64, investor: &str, fund: i32, units: f64, on: NaiveDate) -> HoldingEvent {
        HoldingEvent {
            holding_id: id,
            investor_id: InvestorId::new(investor),
            fund_id: FundId::new(fund),
            units_after: units,
            transaction_date: on,
        }
    }

    #[test]
    fn test_latest_not_after_as_of_wins() {
        let events = vec![
            event(1, "I1", 1, 100.0, date(2024, 1, 1)),
            event(2, "I1", 1, 150.0, date(2024, 1, 3)),
            event(3, "I1", 1, 175.0, date(2024, 1, 9)),
        ];

        let held = select_effective_holdings(&events, date(2024, 1, 5));
        assert_eq!(held, vec![EffectiveHolding::new("I1", FundId::new(1), 150.0)]);
    }

    #[test]
    fn test_same_day_tie_breaks_on_holding_id() {
        let events = vec![
            event(9, "I1", 1, 90.0, date(2024, 1, 2)),
            event(4, "I1", 1, 40.0, date(2024, 1, 2)),
        ];

        let held = select_effective_holdings(&events, date(2024, 1, 2));
        assert_eq!(held[0].units, 90.0);
    }

    #[test]
    fn test_full_redemption_drops_holding() {
        let events = vec![
            event(1, "I1", 1, 100.0, date(2024, 1, 1)),
            event(2, "I1", 1, 0.0, date(2024, 1, 2)),
        ];

        assert!(select_effective_holdings(&events, date(2024, 1, 3)).is_empty());
        assert_eq!(select_effective_holdings(&events, date(2024, 1, 1)).len(), 1);
    }

    #[test]
    fn test_nothing_before_first_transaction() {
        let events = vec![event(1, "I1", 1, 100.0, date(2024, 1, 10))];
        assert!(select_effective_holdings(&events, date(2024, 1, 9)).is_empty());
    }
}
