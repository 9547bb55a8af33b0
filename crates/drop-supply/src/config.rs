//! # Supply Configuration
//!
//! One immutable [`SupplyConfig`] is built at startup and handed to the
//! aggregator and publisher.
//!
//! ## Layering
//!
//! 1. [`SupplyConfig::default`]: the DROP token on XRPL mainnet
//! 2. Environment overrides ([`SupplyConfig::apply_env`])
//! 3. Command-line overrides (`cli.rs`)
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DROP_SUPPLY_ISSUER` | `rszenFJoDdiGjyezQc8pME9KWDQH43Tswh` | Issuer account |
//! | `DROP_SUPPLY_CURRENCY` | `DROP` | Symbol or 40-char hex code |
//! | `DROP_SUPPLY_DECIMALS` | `6` | Published fractional digits |
//! | `DROP_SUPPLY_TOTAL` | `1000000` | Fixed total supply |
//! | `DROP_SUPPLY_EXCLUDED` | empty | Comma-separated excluded accounts |
//! | `DROP_SUPPLY_ENDPOINT` | `wss://xrplcluster.com` | `ws(s)://` or `http(s)://` node URL |
//! | `DROP_SUPPLY_PAGE_LIMIT` | `400` | `account_lines` page size |
//! | `DROP_SUPPLY_OUTPUT` | `docs/supply.json` | Output file |
//! | `DROP_SUPPLY_REQUEST_TIMEOUT_SECS` | `20` | Per-request timeout |
//! | `DROP_SUPPLY_RUN_DEADLINE_SECS` | `120` | Whole-run deadline |

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{AccountId, CurrencyCode, CurrencyError, TokenConfig, MAX_DECIMALS};

pub const DEFAULT_ISSUER: &str = "rszenFJoDdiGjyezQc8pME9KWDQH43Tswh";
pub const DEFAULT_SYMBOL: &str = "DROP";
pub const DEFAULT_DECIMALS: u32 = 6;
pub const DEFAULT_TOTAL_SUPPLY: i64 = 1_000_000;
pub const DEFAULT_ENDPOINT: &str = "wss://xrplcluster.com";
pub const DEFAULT_OUTPUT: &str = "docs/supply.json";
pub const DEFAULT_EXPLORER_BASE: &str = "https://xrpscan.com/account/";

/// `account_lines` accepts limits in this range.
pub const MIN_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 400;

const ENV_PREFIX: &str = "DROP_SUPPLY_";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid currency: {0}")]
    Currency(#[from] CurrencyError),

    #[error("Issuer {0:?} is not a classic XRPL address")]
    InvalidIssuer(String),

    #[error("Decimals must be at most {max}, got {value}")]
    DecimalsOutOfRange { value: u32, max: u32 },

    #[error("Total supply must not be negative, got {0}")]
    NegativeTotalSupply(Decimal),

    #[error("Page limit must be within {min}..={max}, got {value}")]
    PageLimitOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Issuer {0} cannot also be an excluded account")]
    IssuerExcluded(AccountId),

    #[error("Excluded account {0} is listed twice")]
    DuplicateExcluded(AccountId),

    #[error("Unsupported endpoint {0:?}: expected ws://, wss://, http:// or https://")]
    UnsupportedEndpoint(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Wire protocol implied by the endpoint scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    WebSocket,
    JsonRpc,
}

impl Transport {
    pub fn for_endpoint(endpoint: &str) -> Option<Self> {
        let scheme = endpoint.split_once("://")?.0.to_ascii_lowercase();
        match scheme.as_str() {
            "ws" | "wss" => Some(Self::WebSocket),
            "http" | "https" => Some(Self::JsonRpc),
            _ => None,
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyConfig {
    /// Account that issues the token.
    pub issuer: AccountId,
    /// Currency, precision and cap.
    pub token: TokenConfig,
    /// Treasury/team accounts whose holdings are not circulating. Order is
    /// preserved in the published snapshot.
    pub excluded_accounts: Vec<AccountId>,
    /// Ledger node URL.
    pub endpoint: String,
    /// `account_lines` page size.
    pub page_limit: u32,
    /// Where the snapshot is published.
    pub output_path: PathBuf,
    /// Bound on each ledger round-trip.
    pub request_timeout: Duration,
    /// Bound on the whole run.
    pub run_deadline: Duration,
    /// Explorer URL prefix for `info.xrpscan`.
    pub explorer_base: String,
    /// Compute and compare but never write.
    pub dry_run: bool,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            token: TokenConfig {
                currency: CurrencyCode::known(DEFAULT_SYMBOL),
                decimals: DEFAULT_DECIMALS,
                total_supply: Decimal::from(DEFAULT_TOTAL_SUPPLY),
            },
            excluded_accounts: Vec::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_limit: MAX_PAGE_LIMIT,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            request_timeout: Duration::from_secs(20),
            run_deadline: Duration::from_secs(120),
            explorer_base: DEFAULT_EXPLORER_BASE.to_string(),
            dry_run: false,
        }
    }
}

impl SupplyConfig {
    /// Apply `DROP_SUPPLY_*` overrides read through `lookup`.
    ///
    /// Unlike the node's port overrides, an unparseable value is an error
    /// rather than silently ignored: a typo must not publish wrong figures.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((_, value)) = var("ISSUER") {
            self.issuer = value.trim().to_string();
        }
        if let Some((_, value)) = var("CURRENCY") {
            self.token.currency = CurrencyCode::parse(&value)?;
        }
        if let Some((key, value)) = var("DECIMALS") {
            self.token.decimals = parse_value(&key, &value)?;
        }
        if let Some((key, value)) = var("TOTAL") {
            self.token.total_supply = parse_decimal(&key, &value)?;
        }
        if let Some((_, value)) = var("EXCLUDED") {
            self.excluded_accounts = split_accounts(&value);
        }
        if let Some((_, value)) = var("ENDPOINT") {
            self.endpoint = value.trim().to_string();
        }
        if let Some((key, value)) = var("PAGE_LIMIT") {
            self.page_limit = parse_value(&key, &value)?;
        }
        if let Some((_, value)) = var("OUTPUT") {
            self.output_path = PathBuf::from(value.trim());
        }
        if let Some((key, value)) = var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout = Duration::from_secs(parse_value(&key, &value)?);
        }
        if let Some((key, value)) = var("RUN_DEADLINE_SECS") {
            self.run_deadline = Duration::from_secs(parse_value(&key, &value)?);
        }

        Ok(())
    }

    /// Check the configuration before any network I/O happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_classic_address(&self.issuer) {
            return Err(ConfigError::InvalidIssuer(self.issuer.clone()));
        }
        if self.token.decimals > MAX_DECIMALS {
            return Err(ConfigError::DecimalsOutOfRange {
                value: self.token.decimals,
                max: MAX_DECIMALS,
            });
        }
        if self.token.total_supply.is_sign_negative() && !self.token.total_supply.is_zero() {
            return Err(ConfigError::NegativeTotalSupply(self.token.total_supply));
        }
        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&self.page_limit) {
            return Err(ConfigError::PageLimitOutOfRange {
                value: self.page_limit,
                min: MIN_PAGE_LIMIT,
                max: MAX_PAGE_LIMIT,
            });
        }

        let mut seen = HashSet::new();
        for account in &self.excluded_accounts {
            if *account == self.issuer {
                return Err(ConfigError::IssuerExcluded(account.clone()));
            }
            if !seen.insert(account.as_str()) {
                return Err(ConfigError::DuplicateExcluded(account.clone()));
            }
        }

        if self.transport().is_none() {
            return Err(ConfigError::UnsupportedEndpoint(self.endpoint.clone()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }
        if self.run_deadline.is_zero() {
            return Err(ConfigError::ZeroDuration("run deadline"));
        }
        Ok(())
    }

    pub fn transport(&self) -> Option<Transport> {
        Transport::for_endpoint(&self.endpoint)
    }

    /// Explorer link for the issuer.
    pub fn explorer_url(&self) -> String {
        format!("{}{}", self.explorer_base, self.issuer)
    }
}

/// Split a comma/whitespace separated account list, dropping empties.
pub fn split_accounts(raw: &str) -> Vec<AccountId> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Classic addresses are base58 (ripple alphabet), start with `r` and are
/// 25 to 35 characters long.
fn is_classic_address(account: &str) -> bool {
    const ALPHABET: &str = "rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz";
    account.starts_with('r')
        && (25..=35).contains(&account.len())
        && account.chars().all(|c| ALPHABET.contains(c))
}
