//! Pipeline tests over the in-memory store

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use core_kernel::{AgentId, FundId, InvestorId};
use domain_aum::{AumError, InvestorAumRow, ReferenceData};

use aum_pipeline::{BatchWriter, DateProcessor, Generator, PipelineConfig, PipelineError};
use test_utils::{
    assert_aggregate_matches_rows, assert_close, assert_row_invariants, date,
    holding_without_nav, investor_without_agent, many_investors, single_fund_single_investor,
    weekend_gap, zero_basis_fund, Faults, InMemoryAumStore, ONE_DAY_FEE,
};

fn config(workers: usize, batch_size: usize) -> PipelineConfig {
    PipelineConfig {
        database_url: "postgres://unused".into(),
        workers,
        batch_size,
        ..Default::default()
    }
}

fn generator(store: InMemoryAumStore, workers: usize, batch_size: usize) -> Generator<InMemoryAumStore> {
    Generator::new(Arc::new(store), &config(workers, batch_size))
}

// ============================================================================
// Scenario Tests
// ============================================================================

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_investor_happy_path() {
        let generator = generator(single_fund_single_investor().into_memory_store(), 2, 100);

        let summary = generator.generate().await.unwrap();

        assert_eq!(summary.nav_dates, 2);
        assert_eq!(summary.dates_completed, 2);
        assert_eq!(summary.dates_failed, 0);
        assert_eq!(summary.rows_inserted, 2);

        let store = generator.store();
        let rows = store.rows_for(date(2024, 1, 2));
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.agent_id, AgentId::new(10));
        assert_eq!(row.aum_value, 1250.0);
        assert_eq!(row.days, 1);
        assert_close(row.management_fee, ONE_DAY_FEE, 1e-12);

        let aggregate = store.aggregate(date(2024, 1, 2)).unwrap();
        assert_eq!(aggregate.aum_value, 1250.0);
        assert!((aggregate.management_fee - 0.05137).abs() < 1e-5);
        assert!(summary.verification.is_complete());
    }

    #[tokio::test]
    async fn test_weekend_gap_accrues_three_days() {
        let generator = generator(weekend_gap().into_memory_store(), 2, 100);

        generator.generate().await.unwrap();

        let store = generator.store();
        let friday = &store.rows_for(date(2024, 1, 5))[0];
        let monday = &store.rows_for(date(2024, 1, 8))[0];
        assert_eq!(friday.days, 1);
        assert_eq!(monday.days, 3);
        assert_close(monday.management_fee, 3.0 * friday.management_fee, 1e-12);
    }

    #[tokio::test]
    async fn test_investor_without_agent_is_skipped() {
        let generator = generator(investor_without_agent().into_memory_store(), 1, 100);

        let summary = generator.generate().await.unwrap();

        let store = generator.store();
        let rows = store.rows_for(date(2024, 1, 2));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].investor_id, InvestorId::new("I1"));
        assert_eq!(summary.rows_computed, 2);
        assert_eq!(store.aggregate(date(2024, 1, 2)).unwrap().aum_value, 1250.0);
    }

    #[tokio::test]
    async fn test_zero_basis_falls_back_to_365() {
        let generator = generator(zero_basis_fund().into_memory_store(), 1, 100);

        generator.generate().await.unwrap();

        let row = &generator.store().rows_for(date(2024, 1, 2))[0];
        assert_eq!(row.fund_id, FundId::new(2));
        assert_close(row.management_fee, ONE_DAY_FEE, 1e-12);
    }

    #[tokio::test]
    async fn test_holding_without_nav_still_completes_date() {
        let generator = generator(holding_without_nav().into_memory_store(), 1, 100);

        let summary = generator.generate().await.unwrap();

        let store = generator.store();
        assert!(store.rows_for(date(2024, 1, 2)).is_empty());
        let aggregate = store.aggregate(date(2024, 1, 2)).unwrap();
        assert_eq!(aggregate.aum_value, 0.0);
        assert_eq!(aggregate.management_fee, 0.0);

        // Completed for the scheduler, missing for the verifier
        assert_eq!(summary.dates_completed, 1);
        assert_eq!(summary.verification.missing_dates, vec![date(2024, 1, 2)]);

        let again = generator.generate().await.unwrap();
        assert_eq!(again.dates_skipped, 1);
        assert_eq!(again.dates_planned, 0);
    }

    #[tokio::test]
    async fn test_partial_failure_resumes_without_duplicates() {
        let clean = generator(many_investors(25, 1).into_memory_store(), 1, 10);
        clean.generate().await.unwrap();

        let store = many_investors(25, 1).into_memory_store();
        store.set_faults(Faults {
            fail_rows: HashSet::from([(date(2024, 1, 1), InvestorId::new("INV00013"))]),
            ..Default::default()
        });
        let generator = generator(store, 1, 10);

        let first = generator.generate().await.unwrap();

        assert_eq!(first.dates_failed, 1);
        assert_eq!(first.dates_completed, 0);
        assert_eq!(first.rows_inserted, 13);
        let store = generator.store();
        assert_eq!(store.rows_for(date(2024, 1, 1)).len(), 13);
        assert!(store.aggregate(date(2024, 1, 1)).is_none());

        store.clear_faults();
        let second = generator.generate().await.unwrap();

        assert_eq!(second.dates_completed, 1);
        assert_eq!(second.rows_computed, 25);
        assert_eq!(second.rows_inserted, 12);
        let rows = store.rows_for(date(2024, 1, 1));
        assert_eq!(rows.len(), 25);
        assert_aggregate_matches_rows(&store.aggregate(date(2024, 1, 1)).unwrap(), &rows);

        // Resumed output is indistinguishable from an uninterrupted run
        assert_eq!(store.investor_rows(), clean.store().investor_rows());
        let resumed = store.aggregate(date(2024, 1, 1)).unwrap();
        let expected = clean.store().aggregate(date(2024, 1, 1)).unwrap();
        assert_eq!(resumed.totals(), expected.totals());
    }
}

// ============================================================================
// Scheduler Tests
// ============================================================================

mod scheduler_tests {
    use super::*;

    #[tokio::test]
    async fn test_completed_dates_are_skipped() {
        let generator = generator(many_investors(3, 4).into_memory_store(), 2, 100);

        let first = generator.generate().await.unwrap();
        let calls = generator.store().insert_calls();
        let rows = generator.store().investor_rows();
        let aggregates = generator.store().aggregates();
        let second = generator.generate().await.unwrap();

        assert_eq!(first.dates_completed, 4);
        assert_eq!(rows.len(), 12);
        assert_eq!(generator.store().investor_rows(), rows);
        assert_eq!(generator.store().aggregates(), aggregates);
        assert_eq!(second.dates_skipped, 4);
        assert_eq!(second.dates_planned, 0);
        assert_eq!(second.rows_inserted, 0);
        assert_eq!(generator.store().insert_calls(), calls);
    }

    #[tokio::test]
    async fn test_failed_date_does_not_stop_others() {
        let store = many_investors(3, 5).into_memory_store();
        store.set_faults(Faults {
            fail_navs: HashSet::from([date(2024, 1, 3)]),
            ..Default::default()
        });
        let generator = generator(store, 3, 100);

        let summary = generator.generate().await.unwrap();

        assert_eq!(summary.dates_completed, 4);
        assert_eq!(summary.dates_failed, 1);
        let store = generator.store();
        assert!(store.aggregate(date(2024, 1, 3)).is_none());
        assert_eq!(store.aggregates().len(), 4);
        assert_eq!(summary.verification.missing_dates, vec![date(2024, 1, 3)]);

        store.clear_faults();
        let retry = generator.generate().await.unwrap();
        assert_eq!(retry.dates_planned, 1);
        assert_eq!(retry.dates_completed, 1);
        assert!(retry.verification.is_complete());
    }

    #[tokio::test]
    async fn test_failed_aggregate_leaves_date_pending() {
        let store = single_fund_single_investor().into_memory_store();
        store.set_faults(Faults {
            fail_aggregates: HashSet::from([date(2024, 1, 2)]),
            ..Default::default()
        });
        let generator = generator(store, 1, 100);

        let first = generator.generate().await.unwrap();
        assert_eq!(first.dates_failed, 1);
        assert_eq!(generator.store().rows_for(date(2024, 1, 2)).len(), 1);

        generator.store().clear_faults();
        let second = generator.generate().await.unwrap();
        assert_eq!(second.dates_completed, 1);
        assert_eq!(second.rows_inserted, 0);
        assert!(generator.store().aggregate(date(2024, 1, 2)).is_some());
    }

    #[tokio::test]
    async fn test_many_dates_many_workers() {
        let generator = generator(many_investors(50, 20).into_memory_store(), 4, 7);

        let summary = generator.generate().await.unwrap();

        assert_eq!(summary.dates_completed, 20);
        assert_eq!(summary.rows_inserted, 1000);
        let store = generator.store();
        let rows = store.investor_rows();
        assert_eq!(rows.len(), 1000);
        rows.iter().for_each(assert_row_invariants);
        for aggregate in store.aggregates() {
            assert_aggregate_matches_rows(&aggregate, &rows);
        }
        assert!(summary.verification.is_complete());
    }

    #[tokio::test]
    async fn test_shutdown_stops_dispatch() {
        let generator = generator(many_investors(3, 5).into_memory_store(), 2, 100);

        let summary = generator.generate_until(std::future::ready(())).await.unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.dates_planned, 5);
        assert_eq!(summary.dates_completed, 0);
        assert!(generator.store().aggregates().is_empty());
    }

    #[tokio::test]
    async fn test_reference_failure_aborts_run() {
        let store = single_fund_single_investor().into_memory_store();
        store.set_faults(Faults {
            fail_funds: true,
            ..Default::default()
        });
        let generator = generator(store, 1, 100);

        let err = generator.generate().await.unwrap_err();

        assert!(matches!(err, PipelineError::ReferenceLoad { what: "funds", .. }));
        assert!(generator.store().aggregates().is_empty());
        assert!(generator.store().investor_rows().is_empty());
    }
}

// ============================================================================
// Worker Tests
// ============================================================================

mod worker_tests {
    use super::*;

    #[tokio::test]
    async fn test_slow_date_times_out() {
        let store = single_fund_single_investor().into_memory_store();
        store.set_faults(Faults {
            holding_delays: HashMap::from([(date(2024, 1, 2), Duration::from_secs(30))]),
            ..Default::default()
        });
        let processor = DateProcessor::new(BatchWriter::new(100), Duration::from_millis(50));

        let err = processor
            .process(&store, &ReferenceData::default(), date(2024, 1, 2))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AumError::Timeout { timeout, .. } if timeout == Duration::from_millis(50)
        ));
        assert!(err.to_string().ends_with("timed out after 50ms"));
        assert_eq!(err.date(), date(2024, 1, 2));
        assert!(store.aggregate(date(2024, 1, 2)).is_none());
    }

    #[tokio::test]
    async fn test_batch_error_reports_position_in_date() {
        let store = InMemoryAumStore::new();
        store.set_faults(Faults {
            fail_rows: HashSet::from([(date(2024, 1, 2), InvestorId::new("I13"))]),
            ..Default::default()
        });
        let rows: Vec<InvestorAumRow> = (0..25)
            .map(|i| InvestorAumRow {
                investor_id: InvestorId::new(format!("I{i}")),
                agent_id: AgentId::new(1),
                fund_id: FundId::new(1),
                date: date(2024, 1, 2),
                units: 1.0,
                nav_per_unit: 1.0,
                aum_value: 1.0,
                days: 1,
                management_fee: 0.0,
            })
            .collect();

        let err = BatchWriter::new(10)
            .write_rows(&store, date(2024, 1, 2), &rows)
            .await
            .unwrap_err();

        match err {
            AumError::BatchInsert {
                chunk,
                index,
                row,
                inserted,
                ..
            } => {
                assert_eq!(chunk, 1);
                assert_eq!(index, 3);
                assert_eq!(row, 13);
                assert_eq!(inserted, 13);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.investor_rows().len(), 13);
        assert_eq!(store.insert_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_date_writes_zero_aggregate() {
        let store = InMemoryAumStore::new();
        let processor = DateProcessor::new(BatchWriter::new(10), Duration::from_secs(5));

        let outcome = processor
            .process(&store, &ReferenceData::default(), date(2024, 1, 2))
            .await
            .unwrap();

        assert_eq!(outcome.rows_computed, 0);
        assert_eq!(store.insert_calls(), 0);
        assert_eq!(store.aggregate(date(2024, 1, 2)).unwrap().aum_value, 0.0);
    }
}

// ============================================================================
// Verification Tests
// ============================================================================

mod verification_tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_only_never_writes() {
        let generator = generator(many_investors(2, 3).into_memory_store(), 1, 100);

        let report = generator.verify().await.unwrap();

        assert_eq!(report.nav_date_count, 3);
        assert_eq!(report.investor_row_count, 0);
        assert_eq!(report.holding_count, 2);
        assert_eq!(report.missing_dates.len(), 3);
        assert!(generator.store().aggregates().is_empty());
    }

    #[tokio::test]
    async fn test_rows_without_nav_date_are_not_reported() {
        let store = single_fund_single_investor().into_memory_store();
        store.seed_investor_row(InvestorAumRow {
            investor_id: InvestorId::new("I9"),
            agent_id: AgentId::new(1),
            fund_id: FundId::new(1),
            date: date(2023, 6, 1),
            units: 1.0,
            nav_per_unit: 1.0,
            aum_value: 1.0,
            days: 1,
            management_fee: 0.0,
        });
        let generator = generator(store, 1, 100);

        let report = generator.verify().await.unwrap();

        assert_eq!(report.investor_row_count, 1);
        assert_eq!(report.missing_dates, vec![date(2024, 1, 1), date(2024, 1, 2)]);
    }
}
