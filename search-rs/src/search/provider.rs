//! Upstream search provider abstraction

use crate::error::Result;

use super::types::ResultItem;

/// One page of upstream results
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Parsed items, in upstream order
    pub items: Vec<ResultItem>,
    /// 1-based offset of the next page, if the upstream advertised one
    pub next_start: Option<u32>,
}

/// A paginated upstream search API
///
/// `start_index` is 1-based; `page_size` never exceeds the upstream's
/// per-call ceiling of 10 items. Implementations return the continuation
/// cursor exactly as the upstream reported it; the pagination policy (offset
/// ceiling, accumulation target) lives in the caller.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch up to `page_size` results for `query` starting at `start_index`
    async fn fetch_page(&self, query: &str, start_index: u32, page_size: u32)
        -> Result<SearchPage>;
}
