//! URS AUM generator binary
//!
//! # Usage
//!
//! ```bash
//! # Generate pending dates, then verify
//! URS_DATABASE_URL=postgres://... cargo run --bin urs-aum
//!
//! # Verify only
//! cargo run --bin urs-aum -- --verify
//!
//! # Create aum_investor_daily / aum_daily and exit
//! cargo run --bin urs-aum -- --migrate
//! ```
//!
//! # Environment Variables
//!
//! * `URS_DATABASE_URL` - PostgreSQL connection string (required)
//! * `URS_WORKERS` - Dates processed concurrently (default: 8)
//! * `URS_BATCH_SIZE` - Investor rows per insert chunk (default: 10000)
//! * `URS_MAX_CONNECTIONS` - Pool capacity (default: 32)
//! * `URS_DATE_TIMEOUT_SECS` - Per-date timeout (default: 300)
//! * `URS_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `URS_LOG_FORMAT` - text or json (default: text)
//! * `URS_RUN_MIGRATIONS` - Apply migrations before running (default: false)

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use aum_pipeline::telemetry::init_tracing;
use aum_pipeline::{ensure_healthy, Cli, Generator, Mode, PipelineConfig};
use infra_db::{create_pool, run_migrations, PostgresAumAdapter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env().context("Failed to load configuration")?;
    cli.apply(&mut config);

    init_tracing(&config.log_level, config.log_format);
    config.validate()?;

    tracing::info!(
        workers = config.workers,
        batch_size = config.batch_size,
        max_connections = config.max_connections,
        "Starting URS AUM generator"
    );

    let pool = create_pool(config.database_config())
        .await
        .context("Failed to connect to database")?;

    let mode = cli.mode();
    if mode == Mode::Migrate || config.run_migrations {
        run_migrations(&pool).await?;
        if mode == Mode::Migrate {
            pool.close().await;
            return Ok(());
        }
    }

    let adapter = Arc::new(PostgresAumAdapter::new(pool.clone()));
    if let Err(e) = ensure_healthy(adapter.as_ref()).await {
        pool.close().await;
        return Err(e.into());
    }

    let generator = Generator::new(adapter, &config);

    let outcome = match mode {
        Mode::Verify => generator.verify().await.map(|_| ()),
        _ => generator
            .generate_until(shutdown_signal())
            .await
            .map(|summary| {
                tracing::info!(
                    run_id = %summary.run_id,
                    completed = summary.dates_completed,
                    failed = summary.dates_failed,
                    skipped = summary.dates_skipped,
                    interrupted = summary.interrupted,
                    "Run finished"
                );
            }),
    };

    pool.close().await;
    outcome?;
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// Stops dispatch of new dates; dates already running finish first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
