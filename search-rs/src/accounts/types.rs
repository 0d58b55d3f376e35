//! Account types and data structures

use serde::Serialize;
use sqlx::FromRow;

/// A registered account row
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub plan_type: String,
    pub allowed_queries: i64,
    pub results_per_query: i64,
    pub queries_used: i64,
    pub created_at: String,
}

impl Account {
    /// Remaining queries under the current plan window
    pub fn queries_remaining(&self) -> i64 {
        (self.allowed_queries - self.queries_used).max(0)
    }

    /// Quota check: has this account used up its plan?
    pub fn is_quota_exhausted(&self) -> bool {
        self.queries_used >= self.allowed_queries
    }

    /// Plan/usage view returned by the API
    pub fn plan_status(&self) -> PlanStatus {
        PlanStatus {
            plan_type: self.plan_type.clone(),
            allowed_queries: self.allowed_queries,
            results_per_query: self.results_per_query,
            queries_used: self.queries_used,
            queries_remaining: self.queries_remaining(),
        }
    }
}

/// Plan and usage counters for one account
#[derive(Debug, Clone, Serialize)]
pub struct PlanStatus {
    pub plan_type: String,
    pub allowed_queries: i64,
    pub results_per_query: i64,
    pub queries_used: i64,
    pub queries_remaining: i64,
}

/// One completed search, as logged in the history table
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SearchRecord {
    pub id: i64,
    pub account_id: i64,
    pub query: String,
    pub result_count: i64,
    pub created_at: String,
}

/// Usage counters refreshed after a search was charged
#[derive(Debug, Clone, Copy)]
pub struct UsageSnapshot {
    pub queries_used: i64,
    pub allowed_queries: i64,
    pub results_per_query: i64,
}

impl UsageSnapshot {
    pub fn queries_remaining(&self) -> i64 {
        (self.allowed_queries - self.queries_used).max(0)
    }
}
