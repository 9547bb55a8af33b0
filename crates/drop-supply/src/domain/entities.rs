//! # Domain Entities
//!
//! Trustlines as read from the ledger, the aggregated totals, and the
//! published snapshot record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::amount::{format_fixed, parse_balance, round_fixed};
use super::value_objects::AccountId;

/// One trustline as seen from the queried account.
///
/// `balance` is the ledger's decimal text, signed from that account's
/// perspective: negative on the issuer side means tokens issued to
/// `counterparty`, positive on a holder side means tokens held. It is only
/// parsed for lines that count toward a total, so an exotic amount in some
/// other currency never stops a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustLine {
    pub counterparty: AccountId,
    pub currency: String,
    pub balance: String,
}

impl TrustLine {
    /// The balance as a decimal, or `None` if it is not a usable number.
    pub fn amount(&self) -> Option<Decimal> {
        parse_balance(&self.balance)
    }
}

/// Opaque pagination marker returned by the ledger.
///
/// Never constructed from a falsy value, so a cursor that exists is always
/// one that must be sent back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PageCursor(Value);

impl PageCursor {
    /// Interpret a response `marker` field. Absent, `null`, `false`, `0`
    /// and `""` all mean the listing is complete.
    pub fn from_marker(marker: Option<Value>) -> Option<Self> {
        let marker = marker?;
        let falsy = match &marker {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(_) | Value::Object(_) => false,
        };
        if falsy {
            None
        } else {
            Some(Self(marker))
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A single `account_lines` response page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrustlinePage {
    pub lines: Vec<TrustLine>,
    pub cursor: Option<PageCursor>,
}

/// Aggregated balances for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupplyTotals {
    /// Sum of the issuer's negative balances, as a positive number.
    pub issued: Decimal,
    /// Sum of what excluded accounts hold on trustlines to the issuer.
    pub excluded_held: Decimal,
}

impl SupplyTotals {
    /// `issued - excluded_held`. May be negative on an inconsistent ledger
    /// view; the publisher refuses to publish that.
    pub fn circulating(&self) -> Decimal {
        self.issued - self.excluded_held
    }

    /// Both totals rounded to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            issued: round_fixed(self.issued, decimals),
            excluded_held: round_fixed(self.excluded_held, decimals),
        }
    }

    pub fn issued_fixed(&self, decimals: u32) -> String {
        format_fixed(self.issued, decimals)
    }

    pub fn excluded_held_fixed(&self, decimals: u32) -> String {
        format_fixed(self.excluded_held, decimals)
    }

    /// Difference of the rounded totals, so the published figures always
    /// satisfy `circulating = issued - excluded` digit for digit.
    pub fn circulating_fixed(&self, decimals: u32) -> String {
        format_fixed(self.rounded(decimals).circulating(), decimals)
    }
}

/// Auxiliary links published next to the figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub xrpscan: String,
}

/// The published `supply.json` record. Field order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplySnapshot {
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: String,
    pub circulating_supply: String,
    pub issued_supply: String,
    pub excluded_accounts: Vec<AccountId>,
    pub issuer: AccountId,
    pub updated_at: String,
    pub info: SnapshotInfo,
}

impl SupplySnapshot {
    /// Member excluded from change detection.
    pub const TIMESTAMP_FIELD: &'static str = "updated_at";
}

/// Result of a publish step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The snapshot differed (or none existed) and was written.
    Updated,
    /// The snapshot matched the published one; nothing was written.
    Unchanged,
    /// Dry run: nothing was written either way.
    DryRun { changed: bool },
}

impl WriteOutcome {
    pub fn changed(&self) -> bool {
        match self {
            Self::Updated => true,
            Self::Unchanged => false,
            Self::DryRun { changed } => *changed,
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub snapshot: SupplySnapshot,
    pub outcome: WriteOutcome,
}
