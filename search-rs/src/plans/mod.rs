//! Subscription plan registry
//!
//! Maps a plan identifier (plus optional custom parameters for the
//! enterprise tier) to concrete quota parameters. Plans are not stored
//! anywhere: resolution is a pure function applied when an account picks or
//! changes its plan.

use crate::error::{Result, SearchError};
use serde::Serialize;

/// Plan assigned to every account at signup
pub const DEFAULT_PLAN: &str = "free";

const ENTERPRISE_MIN_QUERIES: i64 = 1;
const ENTERPRISE_MAX_QUERIES: i64 = 10_000;
const ENTERPRISE_MIN_RESULTS: i64 = 1;
const ENTERPRISE_MAX_RESULTS: i64 = 100;
const ENTERPRISE_USD_PER_RESULT: f64 = 0.04;

/// Quota parameters of a resolved plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanQuota {
    pub plan_type: String,
    pub allowed_queries: i64,
    pub results_per_query: i64,
    pub price_usd: f64,
}

impl PlanQuota {
    fn fixed(plan_type: &str, allowed_queries: i64, results_per_query: i64, price_usd: f64) -> Self {
        Self {
            plan_type: plan_type.to_string(),
            allowed_queries,
            results_per_query,
            price_usd,
        }
    }
}

/// Resolve a plan identifier to its quota parameters.
///
/// The five fixed tiers ignore the custom parameters. The enterprise tier
/// clamps them into its allowed ranges; missing values fall back to 1 query
/// and 5 results before clamping. Any other identifier is rejected.
pub fn resolve_plan(
    plan: &str,
    custom_queries: Option<i64>,
    custom_results: Option<i64>,
) -> Result<PlanQuota> {
    let quota = match plan {
        "free" => PlanQuota::fixed("free", 2, 5, 0.0),
        "sub1" => PlanQuota::fixed("sub1", 30, 20, 21.18),
        "sub2" => PlanQuota::fixed("sub2", 30, 50, 52.94),
        "sub3" => PlanQuota::fixed("sub3", 30, 25, 26.47),
        "sub4" => PlanQuota::fixed("sub4", 20, 50, 35.29),
        "enterprise" => {
            let allowed_queries = custom_queries
                .unwrap_or(ENTERPRISE_MIN_QUERIES)
                .clamp(ENTERPRISE_MIN_QUERIES, ENTERPRISE_MAX_QUERIES);
            let results_per_query = custom_results
                .unwrap_or(5)
                .clamp(ENTERPRISE_MIN_RESULTS, ENTERPRISE_MAX_RESULTS);
            let price_usd =
                round2(allowed_queries as f64 * results_per_query as f64 * ENTERPRISE_USD_PER_RESULT);

            PlanQuota {
                plan_type: "enterprise".to_string(),
                allowed_queries,
                results_per_query,
                price_usd,
            }
        }
        other => return Err(SearchError::UnknownPlan(other.to_string())),
    };

    Ok(quota)
}

/// Round to two decimal places (USD cents)
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
