//! Trustline Aggregator
//!
//! Walks every `account_lines` page of the issuer and of each excluded
//! account and folds the balances into [`SupplyTotals`].

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SupplyConfig;
use crate::domain::{AccountId, AggregationError, CurrencyCode, SupplyTotals, TrustLine};
use crate::ports::TrustlineSource;
use crate::service::pages::TrustlinePages;

/// Sums issued and excluded balances for one token.
pub struct TrustlineAggregator<S: TrustlineSource + ?Sized> {
    /// Ledger data source (driven port)
    source: Arc<S>,
    issuer: AccountId,
    currency: CurrencyCode,
    excluded: Vec<AccountId>,
    decimals: u32,
    page_limit: u32,
}

impl<S: TrustlineSource + ?Sized> TrustlineAggregator<S> {
    pub fn new(source: Arc<S>, config: &SupplyConfig) -> Self {
        Self {
            source,
            issuer: config.issuer.clone(),
            currency: config.token.currency.clone(),
            excluded: config.excluded_accounts.clone(),
            decimals: config.token.decimals,
            page_limit: config.page_limit,
        }
    }

    /// Issued supply and excluded holdings, all pages of all accounts, each
    /// rounded to the token's published precision.
    ///
    /// Any failed page aborts the whole aggregation: partial totals are
    /// never returned.
    pub async fn aggregate(&self) -> Result<SupplyTotals, AggregationError> {
        let issued = self.issued_supply().await?;

        let mut excluded_held = Decimal::ZERO;
        for account in &self.excluded {
            let held = self.excluded_holdings(account).await?;
            excluded_held = excluded_held
                .checked_add(held)
                .ok_or_else(|| AggregationError::Overflow {
                    account: account.clone(),
                })?;
        }

        let totals = SupplyTotals {
            issued,
            excluded_held,
        }
        .rounded(self.decimals);
        info!(
            issued = %totals.issued,
            excluded_held = %totals.excluded_held,
            excluded_accounts = self.excluded.len(),
            "Aggregated trustline balances"
        );
        Ok(totals)
    }

    /// Sum of the issuer's negative balances in the token, as a positive
    /// amount. Positive balances on the issuer side are ignored.
    pub async fn issued_supply(&self) -> Result<Decimal, AggregationError> {
        let currency = &self.currency;
        self.walk(
            &self.issuer,
            |line| currency.matches(&line.currency),
            |balance| (balance < Decimal::ZERO).then(|| -balance),
        )
        .await
    }

    /// What `account` holds of the token on trustlines to the issuer.
    pub async fn excluded_holdings(&self, account: &str) -> Result<Decimal, AggregationError> {
        let currency = &self.currency;
        let issuer = self.issuer.as_str();
        self.walk(
            account,
            |line| line.counterparty == issuer && currency.matches(&line.currency),
            |balance| (balance > Decimal::ZERO).then_some(balance),
        )
        .await
    }

    /// Fold every page of `account`. Lines outside `in_scope` are skipped
    /// unparsed; the balance of every other line goes through `count`.
    async fn walk<F, G>(
        &self,
        account: &str,
        in_scope: F,
        count: G,
    ) -> Result<Decimal, AggregationError>
    where
        F: Fn(&TrustLine) -> bool,
        G: Fn(Decimal) -> Option<Decimal>,
    {
        let mut pages = TrustlinePages::new(self.source.as_ref(), account, self.page_limit);
        let mut total = Decimal::ZERO;
        let mut counted = 0usize;

        loop {
            let page = match pages.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(source) => {
                    return Err(AggregationError::Source {
                        account: account.to_string(),
                        page: pages.pages_fetched() + 1,
                        source,
                    })
                }
            };

            for line in page.lines.iter().filter(|line| in_scope(line)) {
                let balance = line.amount().ok_or_else(|| AggregationError::InvalidBalance {
                    account: account.to_string(),
                    counterparty: line.counterparty.clone(),
                    value: line.balance.clone(),
                })?;
                let Some(amount) = count(balance) else {
                    continue;
                };
                total = total
                    .checked_add(amount)
                    .ok_or_else(|| AggregationError::Overflow {
                        account: account.to_string(),
                    })?;
                counted += 1;
            }
        }

        debug!(
            account,
            pages = pages.pages_fetched(),
            counted,
            total = %total,
            "Walked account trustlines"
        );
        Ok(total)
    }
}
