//! Fund fee parameters

use serde::{Deserialize, Serialize};

/// Day-count denominator used when a fund leaves its basis unspecified
pub const DEFAULT_VALUATION_BASIS: i32 = 365;

/// The two fund attributes the fee accrual needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundParams {
    /// Management fee in percent per annum (1.5 means 1.5%)
    pub management_fee_rate: f64,
    /// Day-count denominator; zero means unspecified
    pub valuation_basis: i32,
}

impl FundParams {
    /// Creates fund parameters
    pub fn new(management_fee_rate: f64, valuation_basis: i32) -> Self {
        Self {
            management_fee_rate,
            valuation_basis,
        }
    }

    /// Fee rate as a fraction (percent / 100)
    pub fn rate(&self) -> f64 {
        self.management_fee_rate / 100.0
    }

    /// Valuation basis with the unspecified case resolved to 365
    pub fn effective_basis(&self) -> i32 {
        if self.valuation_basis == 0 {
            DEFAULT_VALUATION_BASIS
        } else {
            self.valuation_basis
        }
    }
}

impl Default for FundParams {
    /// Parameters for a fund missing from the funds table: no fee accrues
    fn default() -> Self {
        Self::new(0.0, 0)
    }
}
