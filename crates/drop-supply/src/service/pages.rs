//! Trustline pagination.
//!
//! A lazy, finite, restartable walk over one account's `account_lines`
//! pages. The first request never carries a marker; every later request
//! carries exactly the marker of the previous response; a response without
//! one ends the walk.

use crate::domain::{PageCursor, SourceError, TrustlinePage};
use crate::ports::{AccountLinesRequest, TrustlineSource};

#[derive(Debug, Clone, PartialEq)]
enum PagerState {
    Start,
    Continue(PageCursor),
    Exhausted,
}

/// Page sequence for a single account.
pub struct TrustlinePages<'a, S: TrustlineSource + ?Sized> {
    source: &'a S,
    account: &'a str,
    limit: u32,
    state: PagerState,
    fetched: usize,
}

impl<'a, S: TrustlineSource + ?Sized> TrustlinePages<'a, S> {
    pub fn new(source: &'a S, account: &'a str, limit: u32) -> Self {
        Self {
            source,
            account,
            limit,
            state: PagerState::Start,
            fetched: 0,
        }
    }

    /// Fetch the next page, or `Ok(None)` once the source signalled the end.
    ///
    /// A failed request leaves the position unchanged.
    pub async fn next_page(&mut self) -> Result<Option<TrustlinePage>, SourceError> {
        let request = match &self.state {
            PagerState::Start => AccountLinesRequest::first_page(self.account, self.limit),
            PagerState::Continue(cursor) => {
                AccountLinesRequest::after(self.account, self.limit, cursor.clone())
            }
            PagerState::Exhausted => return Ok(None),
        };

        let page = self.source.account_lines(&request).await?;
        self.fetched += 1;
        self.state = match &page.cursor {
            Some(cursor) => PagerState::Continue(cursor.clone()),
            None => PagerState::Exhausted,
        };

        tracing::debug!(
            account = self.account,
            page = self.fetched,
            lines = page.lines.len(),
            more = page.cursor.is_some(),
            "Fetched trustline page"
        );

        Ok(Some(page))
    }

    /// Go back to the first page.
    pub fn restart(&mut self) {
        self.state = PagerState::Start;
        self.fetched = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == PagerState::Exhausted
    }

    /// Successfully fetched pages since the start (or last restart).
    pub fn pages_fetched(&self) -> usize {
        self.fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryTrustlineSource;
    use crate::domain::TrustLine;
    use serde_json::json;

    fn line(balance: i64) -> TrustLine {
        TrustLine {
            counterparty: "rHolder".into(),
            currency: "DROP".into(),
            balance: balance.to_string(),
        }
    }

    #[tokio::test]
    async fn test_cursor_triggers_exactly_one_more_request() {
        let source = InMemoryTrustlineSource::new();
        source.set_pages("rIssuer", vec![vec![line(-1)], vec![line(-2)]]);

        let mut pages = TrustlinePages::new(&source, "rIssuer", 400);
        let first = pages.next_page().await.unwrap().unwrap();
        assert!(first.cursor.is_some());
        let second = pages.next_page().await.unwrap().unwrap();
        assert!(second.cursor.is_none());
        assert!(pages.is_exhausted());
        assert!(pages.next_page().await.unwrap().is_none());

        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].marker, None);
        assert_eq!(
            requests[1].marker.as_ref().map(|c| c.as_value().clone()),
            first.cursor.map(|c| c.as_value().clone())
        );
        assert!(requests.iter().all(|r| r.limit == 400 && r.ledger_index == "validated"));
    }

    #[tokio::test]
    async fn test_single_page_ends_after_one_request() {
        let source = InMemoryTrustlineSource::new();
        source.set_pages("rIssuer", vec![vec![line(-1)]]);

        let mut pages = TrustlinePages::new(&source, "rIssuer", 50);
        assert!(pages.next_page().await.unwrap().is_some());
        assert!(pages.next_page().await.unwrap().is_none());
        assert_eq!(source.requests().len(), 1);
        assert_eq!(pages.pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_restart_begins_without_marker() {
        let source = InMemoryTrustlineSource::new();
        source.set_pages("rIssuer", vec![vec![line(-1)], vec![line(-2)]]);

        let mut pages = TrustlinePages::new(&source, "rIssuer", 400);
        pages.next_page().await.unwrap();
        pages.restart();
        assert_eq!(pages.pages_fetched(), 0);
        pages.next_page().await.unwrap();

        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].marker, None);
    }

    #[tokio::test]
    async fn test_failed_request_keeps_position() {
        let source = InMemoryTrustlineSource::new();
        source.fail_account("rBroken", "missing result.lines");

        let mut pages = TrustlinePages::new(&source, "rBroken", 400);
        let err = pages.next_page().await.unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
        assert!(!pages.is_exhausted());
        assert_eq!(pages.pages_fetched(), 0);
    }

    #[test]
    fn test_marker_is_serialized_only_when_present() {
        let cursor = PageCursor::from_marker(Some(json!("X"))).unwrap();
        let first = serde_json::to_value(AccountLinesRequest::first_page("r", 10)).unwrap();
        let next = serde_json::to_value(AccountLinesRequest::after("r", 10, cursor)).unwrap();
        assert!(first.get("marker").is_none());
        assert_eq!(next["marker"], json!("X"));
    }
}
