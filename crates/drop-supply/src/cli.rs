//! Command-line front-end. Every flag is optional and overrides the
//! environment, which overrides the built-in defaults.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{parse_decimal, ConfigError, SupplyConfig};
use crate::domain::CurrencyCode;
use crate::telemetry::LogConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "drop-supply")]
#[command(author, version, about = "Publish the circulating supply of an XRPL token", long_about = None)]
pub struct Cli {
    /// Issuer account
    #[arg(long)]
    pub issuer: Option<String>,

    /// Currency symbol or 40-character hex code
    #[arg(long)]
    pub currency: Option<String>,

    /// Fractional digits in the published figures
    #[arg(long)]
    pub decimals: Option<u32>,

    /// Fixed total supply
    #[arg(long = "total-supply")]
    pub total_supply: Option<String>,

    /// Account whose holdings are not circulating (repeatable); replaces the
    /// environment list
    #[arg(long = "exclude", value_name = "ACCOUNT")]
    pub exclude: Vec<String>,

    /// Ledger node URL (ws://, wss://, http:// or https://)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// account_lines page size
    #[arg(long)]
    pub page_limit: Option<u32>,

    /// Output file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Whole-run deadline in seconds
    #[arg(long)]
    pub run_deadline_secs: Option<u64>,

    /// Compute and compare without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "drop_supply=trace")
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Apply the flags that were given on top of `config`.
    pub fn apply_to(&self, config: &mut SupplyConfig) -> Result<(), ConfigError> {
        if let Some(issuer) = &self.issuer {
            config.issuer = issuer.trim().to_string();
        }
        if let Some(currency) = &self.currency {
            config.token.currency = CurrencyCode::parse(currency)?;
        }
        if let Some(decimals) = self.decimals {
            config.token.decimals = decimals;
        }
        if let Some(total) = &self.total_supply {
            config.token.total_supply = parse_decimal("--total-supply", total)?;
        }
        if !self.exclude.is_empty() {
            config.excluded_accounts = self.exclude.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(limit) = self.page_limit {
            config.page_limit = limit;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.run_deadline_secs {
            config.run_deadline = Duration::from_secs(secs);
        }
        if self.dry_run {
            config.dry_run = true;
        }
        Ok(())
    }

    /// Defaults, then `lookup` (the environment), then these flags, then
    /// validation.
    pub fn resolve<F>(&self, lookup: F) -> Result<SupplyConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SupplyConfig::default();
        config.apply_env(lookup)?;
        self.apply_to(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Log settings: flags over `DROP_SUPPLY_*` over defaults.
    pub fn log_config<F>(&self, lookup: F) -> LogConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LogConfig::from_lookup(lookup);
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if self.json_logs {
            config.json_logs = true;
        }
        config
    }
}
