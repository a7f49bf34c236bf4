//! End-to-end tests against PostgreSQL
//!
//! These start a container through testcontainers and are ignored by
//! default. Run with `cargo test -p aum_pipeline -- --ignored`.

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;

use aum_pipeline::{Generator, PipelineConfig};
use core_kernel::{AgentId, FundId, InvestorId};
use domain_aum::{AumWritePort, InvestorAumRow};
use infra_db::{run_migrations, PostgresAumAdapter};
use test_utils::database::create_isolated_test_database;
use test_utils::{
    assert_close, date, investor_without_agent, many_investors, single_fund_single_investor,
    weekend_gap, ONE_DAY_FEE,
};

fn generator(pool: &PgPool, workers: usize, batch_size: usize) -> Generator<PostgresAumAdapter> {
    let config = PipelineConfig {
        database_url: "postgres://container".into(),
        workers,
        batch_size,
        max_connections: 10,
        ..Default::default()
    };
    Generator::new(Arc::new(PostgresAumAdapter::new(pool.clone())), &config)
}

#[derive(Debug, sqlx::FromRow)]
struct StoredRow {
    investor_id: String,
    agent_id: i32,
    days: i32,
    aum_value: f64,
    management_fee: f64,
}

async fn rows_for(pool: &PgPool, day: NaiveDate) -> Vec<StoredRow> {
    sqlx::query_as::<_, StoredRow>(
        r#"
        SELECT investor_id, agent_id, days,
               aum_value::float8 AS aum_value,
               management_fee::float8 AS management_fee
        FROM aum_investor_daily
        WHERE date = $1
        ORDER BY investor_id
        "#,
    )
    .bind(day)
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn daily_totals(pool: &PgPool, day: NaiveDate) -> Option<(f64, f64)> {
    sqlx::query_as::<_, (f64, f64)>(
        "SELECT aum_value::float8, management_fee::float8 FROM aum_daily WHERE date = $1",
    )
    .bind(day)
    .fetch_optional(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_generate_single_investor() {
    let db = create_isolated_test_database().await.unwrap();
    single_fund_single_investor().seed(db.pool()).await.unwrap();

    let summary = generator(db.pool(), 2, 100).generate().await.unwrap();

    assert_eq!(summary.dates_completed, 2);
    assert_eq!(summary.rows_inserted, 2);
    let rows = rows_for(db.pool(), date(2024, 1, 2)).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].investor_id, "I1");
    assert_eq!(rows[0].agent_id, 10);
    assert_eq!(rows[0].days, 1);
    assert_close(rows[0].aum_value, 1250.0, 1e-12);
    assert_close(rows[0].management_fee, ONE_DAY_FEE, 1e-9);

    let (aum, fee) = daily_totals(db.pool(), date(2024, 1, 2)).await.unwrap();
    assert_close(aum, 1250.0, 1e-12);
    assert_close(fee, ONE_DAY_FEE, 1e-9);
    assert!(summary.verification.is_complete());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_day_gaps_come_from_previous_nav() {
    let db = create_isolated_test_database().await.unwrap();
    weekend_gap().seed(db.pool()).await.unwrap();

    generator(db.pool(), 2, 100).generate().await.unwrap();

    assert_eq!(rows_for(db.pool(), date(2024, 1, 5)).await[0].days, 1);
    assert_eq!(rows_for(db.pool(), date(2024, 1, 8)).await[0].days, 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_rerun_skips_completed_dates() {
    let db = create_isolated_test_database().await.unwrap();
    investor_without_agent().seed(db.pool()).await.unwrap();
    let generator = generator(db.pool(), 1, 100);

    generator.generate().await.unwrap();
    let second = generator.generate().await.unwrap();

    assert_eq!(second.dates_skipped, 2);
    assert_eq!(second.dates_planned, 0);
    assert_eq!(rows_for(db.pool(), date(2024, 1, 2)).await.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_existing_rows_are_not_duplicated() {
    let db = create_isolated_test_database().await.unwrap();
    many_investors(30, 2).seed(db.pool()).await.unwrap();
    sqlx::query(
        r#"
        INSERT INTO aum_investor_daily
            (investor_id, agent_id, fund_id, date, units, nav_per_unit, aum_value, days, management_fee)
        VALUES ('INV00004', 104, 1, '2024-01-01', 10, 11, 110, 1, 0)
        "#,
    )
    .execute(db.pool())
    .await
    .unwrap();

    let summary = generator(db.pool(), 2, 7).generate().await.unwrap();

    assert_eq!(summary.dates_completed, 2);
    assert_eq!(summary.rows_computed, 60);
    assert_eq!(summary.rows_inserted, 59);
    assert_eq!(rows_for(db.pool(), date(2024, 1, 1)).await.len(), 30);
    assert_eq!(summary.verification.investor_row_count, 60);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_migrations_are_idempotent() {
    let db = create_isolated_test_database().await.unwrap();

    run_migrations(db.pool()).await.unwrap();

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pg_constraint WHERE conname = 'aum_investor_daily_investor_fund_date_key'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_adapter_health_check() {
    let db = create_isolated_test_database().await.unwrap();
    let adapter = PostgresAumAdapter::new(db.pool().clone());

    let result = aum_pipeline::ensure_healthy(&adapter).await.unwrap();

    assert!(result.is_healthy());
    assert_eq!(result.adapter_id, "postgres-aum-adapter");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_chunk_failure_reports_offending_row() {
    let db = create_isolated_test_database().await.unwrap();
    let adapter = PostgresAumAdapter::new(db.pool().clone());
    let day = date(2024, 1, 2);
    let rows: Vec<InvestorAumRow> = (0..6)
        .map(|i| InvestorAumRow {
            investor_id: InvestorId::new(format!("I{i}")),
            agent_id: AgentId::new(10),
            fund_id: FundId::new(1),
            date: day,
            units: 100.0,
            nav_per_unit: 12.5,
            aum_value: 1250.0,
            // CHECK (days >= 1) rejects the fourth row
            days: if i == 3 { 0 } else { 1 },
            management_fee: ONE_DAY_FEE,
        })
        .collect();

    let err = adapter.insert_investor_rows(&rows).await.unwrap_err();

    assert_eq!(err.index, 3);
    assert_eq!(err.inserted, 3);
    let stored: Vec<String> = rows_for(db.pool(), day)
        .await
        .into_iter()
        .map(|row| row.investor_id)
        .collect();
    assert_eq!(stored, vec!["I0", "I1", "I2"]);
}
