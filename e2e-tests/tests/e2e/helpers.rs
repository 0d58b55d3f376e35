//! Shared helpers for the end-to-end suite
//!
//! Each test spawns the whole stack in-process: a stub upstream serving
//! Custom-Search-shaped JSON on an ephemeral port, and the real API server
//! wired against it with an in-memory account store.

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use search_rs::accounts::AccountStore;
use search_rs::api::auth::JwtConfig;
use search_rs::api::ApiServer;
use search_rs::search::GoogleSearchProvider;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Total results the stub upstream pretends to have
pub const STUB_TOTAL_RESULTS: u32 = 23;

/// A running stack: API server + stub upstream
pub struct TestApp {
    pub api_url: String,
    pub client: reqwest::Client,
}

/// Stubbed Custom Search endpoint
///
/// Serves deterministic items `1..=STUB_TOTAL_RESULTS` honoring the `start`
/// and `num` parameters, with a `nextPage` cursor while more remain.
async fn stub_search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let start: u32 = params
        .get("start")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    let num: u32 = params
        .get("num")
        .and_then(|s| s.parse().ok())
        .unwrap_or(10)
        .min(10);

    let mut items = Vec::new();
    let mut index = start;
    while index < start + num && index <= STUB_TOTAL_RESULTS {
        items.push(json!({
            "title": format!("Example Site {} - Result {}", index, index),
            "link": format!("https://example.test/{}", index),
            "snippet": format!("Snippet for result {}", index),
            "pagemap": {
                "cse_thumbnail": [
                    { "src": format!("https://example.test/thumb/{}.png", index) }
                ]
            }
        }));
        index += 1;
    }

    let mut body = json!({ "items": items });
    let next = start + num;
    if next <= STUB_TOTAL_RESULTS {
        body["queries"] = json!({ "nextPage": [ { "startIndex": next } ] });
    }

    Json(body)
}

impl TestApp {
    /// Spawn the stub upstream and the API server on ephemeral ports
    pub async fn spawn() -> Self {
        // Stub upstream
        let upstream = Router::new().route("/customsearch/v1", get(stub_search));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let upstream_addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });

        // The service under test
        let store = AccountStore::in_memory().await.unwrap();
        let provider = Arc::new(
            GoogleSearchProvider::new(
                "e2e-test-key".to_string(),
                "e2e-test-cx".to_string(),
                Duration::from_secs(5),
            )
            .unwrap()
            .with_base_url(format!("http://{}", upstream_addr)),
        );
        let server = ApiServer::new(
            store,
            provider,
            JwtConfig::new("e2e-test-secret".to_string(), 1),
            "127.0.0.1:0".to_string(),
        );
        let router = server.router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let api_addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            api_url: format!("http://{}", api_addr),
            client: reqwest::Client::new(),
        }
    }

    /// Register an account and return its login token
    pub async fn signup_and_login(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/auth/signup", self.api_url))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert!(
            response.status().is_success(),
            "signup failed: {}",
            response.status()
        );

        self.login(email, password).await
    }

    /// Log in and return the JWT token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.api_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert!(
            response.status().is_success(),
            "login failed: {}",
            response.status()
        );

        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Run an authenticated search, returning (status, body)
    pub async fn search(&self, token: &str, query: &str) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}/api/search", self.api_url))
            .bearer_auth(token)
            .json(&json!({ "query": query }))
            .send()
            .await
            .unwrap();

        let status = response.status().as_u16();
        let body: Value = response.json().await.unwrap();
        (status, body)
    }
}
