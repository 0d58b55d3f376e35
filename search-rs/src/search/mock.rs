//! Mock search provider for testing
//!
//! Serves scripted pages (or synthesized full pages) without touching the
//! network, and counts how many upstream calls the pagination loop issued.

use crate::error::{Result, SearchError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::provider::{SearchPage, SearchProvider};
use super::types::ResultItem;

enum Behavior {
    /// Serve the scripted pages in order; once exhausted, either serve empty
    /// pages or fail with the given status
    Scripted {
        pages: Mutex<VecDeque<SearchPage>>,
        then_status: Option<u16>,
    },
    /// Always serve `items_per_page` items with a next-page cursor at +10
    Endless { items_per_page: u32 },
    /// Always fail with the given upstream status
    Failing { status: u16 },
}

pub struct MockSearchProvider {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockSearchProvider {
    /// Serve the given pages in order; once exhausted, return empty pages
    pub fn with_pages(pages: Vec<SearchPage>) -> Self {
        Self {
            behavior: Behavior::Scripted {
                pages: Mutex::new(pages.into()),
                then_status: None,
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve the given pages in order, then fail with the given status
    pub fn with_pages_then_fail(pages: Vec<SearchPage>, status: u16) -> Self {
        Self {
            behavior: Behavior::Scripted {
                pages: Mutex::new(pages.into()),
                then_status: Some(status),
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Endless result set: every call returns `items_per_page` items and
    /// advertises the next page at `start_index + 10`
    pub fn endless(items_per_page: u32) -> Self {
        Self {
            behavior: Behavior::Endless { items_per_page },
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with the given upstream status
    pub fn failing(status: u16) -> Self {
        Self {
            behavior: Behavior::Failing { status },
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetch_page calls issued so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Build a page of synthesized items
    pub fn page(count: u32, next_start: Option<u32>) -> SearchPage {
        let items = (0..count)
            .map(|i| {
                ResultItem::from_raw(
                    &format!("Site {} - Result {}", i, i),
                    Some(format!("https://example.test/{}", i)),
                    Some(format!("Snippet {}", i)),
                    None,
                )
            })
            .collect();

        SearchPage { items, next_start }
    }
}

#[async_trait::async_trait]
impl SearchProvider for MockSearchProvider {
    async fn fetch_page(
        &self,
        _query: &str,
        start_index: u32,
        _page_size: u32,
    ) -> Result<SearchPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::Scripted { pages, then_status } => {
                let mut pages = pages.lock().expect("mock pages lock poisoned");
                match pages.pop_front() {
                    Some(page) => Ok(page),
                    None => match then_status {
                        Some(status) => Err(SearchError::UpstreamStatus { status: *status }),
                        None => Ok(SearchPage::default()),
                    },
                }
            }
            Behavior::Endless { items_per_page } => Ok(Self::page(
                *items_per_page,
                Some(start_index + 10),
            )),
            Behavior::Failing { status } => Err(SearchError::UpstreamStatus { status: *status }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_pages_then_empty() {
        let provider = MockSearchProvider::with_pages(vec![MockSearchProvider::page(4, None)]);

        let first = provider.fetch_page("q", 1, 10).await.unwrap();
        assert_eq!(first.items.len(), 4);

        let second = provider.fetch_page("q", 1, 10).await.unwrap();
        assert!(second.items.is_empty());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_endless_pages_advance_cursor() {
        let provider = MockSearchProvider::endless(10);

        let page = provider.fetch_page("q", 21, 10).await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.next_start, Some(31));
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockSearchProvider::failing(429);

        let result = provider.fetch_page("q", 1, 10).await;
        assert!(matches!(
            result,
            Err(SearchError::UpstreamStatus { status: 429 })
        ));
    }
}
