//! Integration tests for the metered search pipeline: plan resolution,
//! quota enforcement, pagination, and usage accounting working together.

use search_rs::accounts::AccountStore;
use search_rs::error::SearchError;
use search_rs::plans::resolve_plan;
use search_rs::search::{MockSearchProvider, SearchManager};
use std::sync::Arc;

async fn setup(plan: &str) -> (AccountStore, i64) {
    let store = AccountStore::in_memory().await.unwrap();
    let quota = resolve_plan(plan, None, None).unwrap();
    let id = store
        .create_account("Jane", "jane@example.com", "hash", &quota)
        .await
        .unwrap();
    (store, id)
}

#[tokio::test]
async fn search_lifecycle_consumes_and_records() {
    let (store, id) = setup("free").await;
    let provider = Arc::new(MockSearchProvider::endless(10));
    let manager = SearchManager::new(store.clone(), provider);

    let first = manager.search(id, "rust web framework", None).await.unwrap();
    assert_eq!(first.results.len(), 5);
    assert_eq!(first.queries_used, 1);
    assert_eq!(first.queries_remaining, 1);

    let second = manager.search(id, "sqlite pooling", None).await.unwrap();
    assert_eq!(second.queries_used, 2);
    assert_eq!(second.queries_remaining, 0);

    let history = store.history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    // Newest first
    assert_eq!(history[0].query, "sqlite pooling");
    assert_eq!(history[1].query, "rust web framework");
}

#[tokio::test]
async fn exhausted_account_is_rejected_without_side_effects() {
    let (store, id) = setup("free").await;
    let provider = Arc::new(MockSearchProvider::endless(10));
    let manager = SearchManager::new(store.clone(), provider.clone());

    manager.search(id, "one", None).await.unwrap();
    manager.search(id, "two", None).await.unwrap();

    let calls_before = provider.call_count();
    let result = manager.search(id, "three", None).await;
    assert!(matches!(result, Err(SearchError::QuotaExceeded)));

    assert_eq!(provider.call_count(), calls_before);
    let account = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.queries_used, 2);
    assert_eq!(store.history(id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn plan_change_grants_a_fresh_window() {
    let (store, id) = setup("free").await;
    let provider = Arc::new(MockSearchProvider::endless(10));
    let manager = SearchManager::new(store.clone(), provider);

    manager.search(id, "one", None).await.unwrap();
    manager.search(id, "two", None).await.unwrap();
    assert!(matches!(
        manager.search(id, "three", None).await,
        Err(SearchError::QuotaExceeded)
    ));

    let sub3 = resolve_plan("sub3", None, None).unwrap();
    store.set_plan(id, &sub3).await.unwrap();

    let outcome = manager.search(id, "three", None).await.unwrap();
    assert_eq!(outcome.queries_used, 1);
    assert_eq!(outcome.queries_remaining, 29);
    // sub3 caps at 25 results per query
    assert_eq!(outcome.results.len(), 25);
}

#[tokio::test]
async fn upstream_failure_leaves_quota_untouched() {
    let (store, id) = setup("sub1").await;
    let provider = Arc::new(MockSearchProvider::failing(502));
    let manager = SearchManager::new(store.clone(), provider);

    let result = manager.search(id, "rust", None).await;
    assert!(matches!(
        result,
        Err(SearchError::UpstreamStatus { status: 502 })
    ));

    let account = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.queries_used, 0);
    assert!(store.history(id).await.unwrap().is_empty());

    // The failed attempt did not burn the window: a healthy retry succeeds
    let healthy = Arc::new(MockSearchProvider::endless(10));
    let manager = SearchManager::new(store.clone(), healthy);
    let outcome = manager.search(id, "rust", None).await.unwrap();
    assert_eq!(outcome.queries_used, 1);
}

#[tokio::test]
async fn short_result_sets_are_charged_like_full_ones() {
    let (store, id) = setup("sub2").await;
    let provider = Arc::new(MockSearchProvider::with_pages(vec![
        MockSearchProvider::page(4, Some(5)),
    ]));
    let manager = SearchManager::new(store.clone(), provider);

    let outcome = manager.search(id, "very obscure phrase", None).await.unwrap();
    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.queries_used, 1);

    let history = store.history(id).await.unwrap();
    assert_eq!(history[0].result_count, 4);
}

#[tokio::test]
async fn concurrent_searches_never_exceed_the_allowance() {
    let (store, id) = setup("free").await;

    // Burn one query so a single slot remains
    let provider = Arc::new(MockSearchProvider::endless(10));
    let manager = Arc::new(SearchManager::new(store.clone(), provider));
    manager.search(id, "warmup", None).await.unwrap();

    let a = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.search(id, "race a", None).await })
    };
    let b = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.search(id, "race b", None).await })
    };

    let _ = a.await.unwrap();
    let _ = b.await.unwrap();

    let account = store.find_by_id(id).await.unwrap().unwrap();
    assert!(account.queries_used <= account.allowed_queries);
    // Every charge corresponds to exactly one history record
    assert_eq!(
        store.history(id).await.unwrap().len() as i64,
        account.queries_used
    );
}

#[tokio::test]
async fn plan_switch_during_search_leaves_row_consistent() {
    let (store, id) = setup("sub1").await;
    let provider = Arc::new(MockSearchProvider::endless(10));
    let manager = Arc::new(SearchManager::new(store.clone(), provider));

    let sub4 = resolve_plan("sub4", None, None).unwrap();
    let search = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.search(id, "racing", None).await })
    };
    let switch = {
        let store = store.clone();
        let sub4 = sub4.clone();
        tokio::spawn(async move { store.set_plan(id, &sub4).await })
    };

    let _ = search.await.unwrap();
    switch.await.unwrap().unwrap();

    // Last writer wins: the plan fields always match sub4 as a unit, and the
    // counter is either freshly reset or holds the single charge
    let account = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.plan_type, "sub4");
    assert_eq!(account.allowed_queries, 20);
    assert_eq!(account.results_per_query, 50);
    assert!(account.queries_used == 0 || account.queries_used == 1);
}
