//! Command line interface

use clap::Parser;

use crate::config::PipelineConfig;

/// What the binary does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generate pending dates, then verify
    Generate,
    /// Verify only
    Verify,
    /// Apply write-side migrations and exit
    Migrate,
}

/// Generate daily AUM and management fees from fund NAVs and investor holdings
#[derive(Debug, Parser)]
#[command(name = "urs-aum", version, about)]
pub struct Cli {
    /// Only verify coverage, do not generate
    #[arg(long, conflicts_with = "migrate")]
    pub verify: bool,

    /// Apply the aum_investor_daily / aum_daily migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Number of dates processed concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    /// Investor rows per insert chunk
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.migrate {
            Mode::Migrate
        } else if self.verify {
            Mode::Verify
        } else {
            Mode::Generate
        }
    }

    /// Applies command line overrides on top of the environment
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_generates() {
        let cli = Cli::try_parse_from(["urs-aum"]).unwrap();
        assert_eq!(cli.mode(), Mode::Generate);
    }

    #[test]
    fn test_verify_flag() {
        let cli = Cli::try_parse_from(["urs-aum", "--verify"]).unwrap();
        assert_eq!(cli.mode(), Mode::Verify);
    }

    #[test]
    fn test_verify_conflicts_with_migrate() {
        assert!(Cli::try_parse_from(["urs-aum", "--verify", "--migrate"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from(["urs-aum", "--workers", "4", "--batch-size", "250"]).unwrap();
        let mut config = PipelineConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.workers, 4);
        assert_eq!(config.batch_size, 250);
    }
}
