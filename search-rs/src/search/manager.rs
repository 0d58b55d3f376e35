//! Metered search execution
//!
//! Runs a quota-checked, paginated search for one account and records usage.
//! A request is charged exactly one query no matter how many upstream pages
//! the pagination loop fetched; a failed request is never charged and never
//! logged.

use crate::accounts::AccountStore;
use crate::error::{Result, SearchError};
use std::sync::Arc;
use tracing::{debug, info};

use super::provider::SearchProvider;
use super::types::{ResultItem, SearchOutcome};

/// Upstream pagination ceiling: offsets past 100 are rejected by the API
pub const MAX_START_INDEX: u32 = 100;

/// Upstream per-call item ceiling
pub const MAX_PAGE_SIZE: u32 = 10;

pub struct SearchManager {
    store: AccountStore,
    provider: Arc<dyn SearchProvider>,
}

impl SearchManager {
    pub fn new(store: AccountStore, provider: Arc<dyn SearchProvider>) -> Self {
        Self { store, provider }
    }

    /// Execute a metered search on behalf of an account.
    ///
    /// `results_override` can lower the result target below the account's
    /// tier cap; it can never raise it. On success the account is charged one
    /// query and a history record is written, both in one transaction.
    pub async fn search(
        &self,
        account_id: i64,
        query: &str,
        results_override: Option<u32>,
    ) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(SearchError::AccountNotFound)?;

        // Fast path: an exhausted account never triggers an upstream call.
        // The authoritative check is the conditional UPDATE at commit time.
        if account.is_quota_exhausted() {
            debug!(
                "Account {} rejected: {}/{} queries used",
                account_id, account.queries_used, account.allowed_queries
            );
            return Err(SearchError::QuotaExceeded);
        }

        let tier_cap = account.results_per_query.max(0) as u32;
        let target = match results_override {
            Some(n) => n.max(1).min(tier_cap),
            None => tier_cap,
        };

        let results = self.paginate(query, target).await?;

        let usage = self
            .store
            .commit_search(account_id, query, results.len() as i64)
            .await?;

        info!(
            "Search for account {} returned {} results ({}/{} queries used)",
            account_id,
            results.len(),
            usage.queries_used,
            usage.allowed_queries
        );

        Ok(SearchOutcome {
            results,
            queries_used: usage.queries_used,
            queries_remaining: usage.queries_remaining(),
            results_per_query: usage.results_per_query,
        })
    }

    /// Accumulate up to `target` items from the upstream, page by page.
    ///
    /// Pages are fetched sequentially: each request needs the continuation
    /// cursor of the previous one. The loop ends when the target is met, the
    /// upstream runs dry, the cursor disappears, or the offset ceiling is
    /// reached. Any upstream failure aborts the whole search.
    async fn paginate(&self, query: &str, target: u32) -> Result<Vec<ResultItem>> {
        let mut results: Vec<ResultItem> = Vec::new();
        let mut start_index: u32 = 1;

        while (results.len() as u32) < target && start_index <= MAX_START_INDEX {
            let page_size = MAX_PAGE_SIZE.min(target - results.len() as u32);
            let page = self.provider.fetch_page(query, start_index, page_size).await?;

            if page.items.is_empty() {
                break;
            }
            results.extend(page.items);

            match page.next_start {
                Some(next) => start_index = next,
                None => break,
            }
        }

        // A single page may overshoot the remaining target
        results.truncate(target as usize);

        Ok(results)
    }
}
