//! Google Custom Search JSON API provider
//!
//! Protocol constraints: at most 10 items per call, offsets are 1-based, and
//! the API stops paginating past offset 100. Pagination continues through the
//! `queries.nextPage[0].startIndex` cursor in each response.

use crate::error::{Result, SearchError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::provider::{SearchPage, SearchProvider};
use super::types::ResultItem;

/// Production search provider backed by the Custom Search JSON API
pub struct GoogleSearchProvider {
    api_key: String,
    engine_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleSearchProvider {
    pub fn new(api_key: String, engine_id: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            engine_id,
            base_url: "https://www.googleapis.com".to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

/// Custom Search response envelope
#[derive(Debug, Deserialize)]
struct CseResponse {
    items: Option<Vec<CseItem>>,
    queries: Option<CseQueries>,
}

#[derive(Debug, Deserialize)]
struct CseQueries {
    #[serde(rename = "nextPage")]
    next_page: Option<Vec<CsePage>>,
}

#[derive(Debug, Deserialize)]
struct CsePage {
    #[serde(rename = "startIndex")]
    start_index: u32,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    pagemap: Option<CsePageMap>,
}

#[derive(Debug, Deserialize)]
struct CsePageMap {
    cse_thumbnail: Option<Vec<CseThumbnail>>,
}

#[derive(Debug, Deserialize)]
struct CseThumbnail {
    src: Option<String>,
}

impl CseItem {
    fn into_result_item(self) -> ResultItem {
        let image = self
            .pagemap
            .and_then(|p| p.cse_thumbnail)
            .and_then(|thumbs| thumbs.into_iter().next())
            .and_then(|t| t.src);

        ResultItem::from_raw(
            self.title.as_deref().unwrap_or(""),
            self.link,
            self.snippet,
            image,
        )
    }
}

#[async_trait::async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn fetch_page(
        &self,
        query: &str,
        start_index: u32,
        page_size: u32,
    ) -> Result<SearchPage> {
        debug!(
            "Requesting {} results for '{}' from offset {}",
            page_size, query, start_index
        );

        let url = format!("{}/customsearch/v1", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("start", &start_index.to_string()),
                ("num", &page_size.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::UpstreamUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream search request failed with status {}", status);
            return Err(SearchError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body: CseResponse = response
            .json()
            .await
            .map_err(|e| SearchError::UpstreamUnreachable(format!("invalid response body: {}", e)))?;

        let items: Vec<ResultItem> = body
            .items
            .unwrap_or_default()
            .into_iter()
            .map(CseItem::into_result_item)
            .collect();

        let next_start = body
            .queries
            .and_then(|q| q.next_page)
            .and_then(|pages| pages.into_iter().next())
            .map(|p| p.start_index);

        debug!(
            "Upstream returned {} items, next offset {:?}",
            items.len(),
            next_start
        );

        Ok(SearchPage { items, next_start })
    }
}
