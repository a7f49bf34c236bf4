//! Test Fixtures
//!
//! Upstream data sets shared by the in-memory and PostgreSQL tests. Each
//! fixture can be loaded into an [`InMemoryAumStore`] or inserted into the
//! read-side tables of a test database.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::memory::InMemoryAumStore;

/// Fee of 100 units at NAV 12.5 in a 1.5% / 365 fund over one day
pub const ONE_DAY_FEE: f64 = 0.051_369_863_013_698_63;

/// Builds a date, panicking on an invalid one
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// A NAV row
#[derive(Debug, Clone)]
pub struct NavFixture {
    pub fund_id: i32,
    pub date: NaiveDate,
    pub nav_per_unit: f64,
}

/// A fund row
#[derive(Debug, Clone)]
pub struct FundFixture {
    pub id: i32,
    pub management_fee_rate: f64,
    pub valuation_basis: i32,
}

/// An agent assignment row
#[derive(Debug, Clone)]
pub struct AgentFixture {
    pub investor_id: String,
    pub agent_id: i32,
    pub effective_date: NaiveDate,
}

/// A holding snapshot and its transaction
#[derive(Debug, Clone)]
pub struct HoldingFixture {
    pub investor_id: String,
    pub fund_id: i32,
    pub units_after: f64,
    pub transaction_date: NaiveDate,
}

/// Read-side data for one test
#[derive(Debug, Clone, Default)]
pub struct UpstreamData {
    pub navs: Vec<NavFixture>,
    pub funds: Vec<FundFixture>,
    pub agents: Vec<AgentFixture>,
    pub holdings: Vec<HoldingFixture>,
}

impl UpstreamData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nav(mut self, fund_id: i32, date: NaiveDate, nav_per_unit: f64) -> Self {
        self.navs.push(NavFixture {
            fund_id,
            date,
            nav_per_unit,
        });
        self
    }

    pub fn fund(mut self, id: i32, management_fee_rate: f64, valuation_basis: i32) -> Self {
        self.funds.push(FundFixture {
            id,
            management_fee_rate,
            valuation_basis,
        });
        self
    }

    pub fn agent(mut self, investor_id: &str, agent_id: i32, effective_date: NaiveDate) -> Self {
        self.agents.push(AgentFixture {
            investor_id: investor_id.to_string(),
            agent_id,
            effective_date,
        });
        self
    }

    pub fn holding(
        mut self,
        investor_id: &str,
        fund_id: i32,
        units_after: f64,
        transaction_date: NaiveDate,
    ) -> Self {
        self.holdings.push(HoldingFixture {
            investor_id: investor_id.to_string(),
            fund_id,
            units_after,
            transaction_date,
        });
        self
    }

    /// Loads the data into a fresh in-memory store
    pub fn into_memory_store(self) -> InMemoryAumStore {
        let mut store = InMemoryAumStore::new();
        for fund in self.funds {
            store = store.with_fund(fund.id, fund.management_fee_rate, fund.valuation_basis);
        }
        for nav in self.navs {
            store = store.with_nav(nav.fund_id, nav.date, nav.nav_per_unit);
        }
        for agent in self.agents {
            store = store.with_agent(&agent.investor_id, agent.agent_id, agent.effective_date);
        }
        for holding in self.holdings {
            store = store.with_holding(
                &holding.investor_id,
                holding.fund_id,
                holding.units_after,
                holding.transaction_date,
            );
        }
        store
    }

    /// Inserts the data into the read-side tables
    pub async fn seed(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        for fund in &self.funds {
            sqlx::query(
                "INSERT INTO funds (id, name, management_fee_rate, valuation_basis) VALUES ($1, $2, $3, $4)",
            )
            .bind(fund.id)
            .bind(format!("Fund {}", fund.id))
            .bind(fund.management_fee_rate)
            .bind(fund.valuation_basis)
            .execute(pool)
            .await?;
        }

        for nav in &self.navs {
            sqlx::query("INSERT INTO fund_navs (fund_id, date, nav_per_unit) VALUES ($1, $2, $3)")
                .bind(nav.fund_id)
                .bind(nav.date)
                .bind(nav.nav_per_unit)
                .execute(pool)
                .await?;
        }

        for agent in &self.agents {
            sqlx::query(
                "INSERT INTO agent_investors (investor_id, agent_id, effective_date) VALUES ($1, $2, $3)",
            )
            .bind(&agent.investor_id)
            .bind(agent.agent_id)
            .bind(agent.effective_date)
            .execute(pool)
            .await?;
        }

        for holding in &self.holdings {
            let transaction_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO transactions (investor_id, fund_id, transaction_date)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(&holding.investor_id)
            .bind(holding.fund_id)
            .bind(holding.transaction_date)
            .fetch_one(pool)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO investor_holdings (investor_id, fund_id, transaction_id, units_after)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&holding.investor_id)
            .bind(holding.fund_id)
            .bind(transaction_id)
            .bind(holding.units_after)
            .execute(pool)
            .await?;
        }

        Ok(())
    }
}

/// Fund 1 (1.5%, basis 365) with NAVs of 12.5 on 2024-01-01 and 2024-01-02; I1 holds 100 units via agent 10
pub fn single_fund_single_investor() -> UpstreamData {
    UpstreamData::new()
        .fund(1, 1.5, 365)
        .nav(1, date(2024, 1, 1), 12.5)
        .nav(1, date(2024, 1, 2), 12.5)
        .agent("I1", 10, date(2023, 12, 1))
        .holding("I1", 1, 100.0, date(2024, 1, 1))
}

/// NAVs on Friday 2024-01-05 and Monday 2024-01-08
pub fn weekend_gap() -> UpstreamData {
    UpstreamData::new()
        .fund(1, 1.5, 365)
        .nav(1, date(2024, 1, 5), 12.5)
        .nav(1, date(2024, 1, 8), 12.5)
        .agent("I1", 10, date(2023, 12, 1))
        .holding("I1", 1, 100.0, date(2024, 1, 1))
}

/// I2 holds units but has no agent
pub fn investor_without_agent() -> UpstreamData {
    single_fund_single_investor().holding("I2", 1, 500.0, date(2024, 1, 1))
}

/// Fund 2 leaves its valuation basis at zero
pub fn zero_basis_fund() -> UpstreamData {
    UpstreamData::new()
        .fund(2, 1.5, 0)
        .nav(2, date(2024, 1, 2), 12.5)
        .agent("I1", 10, date(2023, 12, 1))
        .holding("I1", 2, 100.0, date(2024, 1, 1))
}

/// Only fund 2 publishes a NAV on 2024-01-02; I1 holds fund 1
pub fn holding_without_nav() -> UpstreamData {
    UpstreamData::new()
        .fund(1, 1.5, 365)
        .fund(2, 1.5, 365)
        .nav(2, date(2024, 1, 2), 10.0)
        .agent("I1", 10, date(2023, 12, 1))
        .holding("I1", 1, 100.0, date(2024, 1, 1))
}

/// `investors` investors with 10 units each in fund 1 over `days` consecutive NAV dates from 2024-01-01
pub fn many_investors(investors: usize, days: u32) -> UpstreamData {
    let mut data = UpstreamData::new().fund(1, 2.0, 365);
    for day in 1..=days {
        data = data.nav(1, date(2024, 1, day), 10.0 + f64::from(day));
    }
    for i in 0..investors {
        let investor = format!("INV{i:05}");
        data = data
            .agent(&investor, 100 + (i % 7) as i32, date(2023, 12, 1))
            .holding(&investor, 1, 10.0, date(2023, 12, 31));
    }
    data
}
