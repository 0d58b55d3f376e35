//! API request handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::accounts::{AccountStore, PlanStatus, SearchRecord};
use crate::api::auth::{Claims, JwtConfig};
use crate::error::SearchError;
use crate::plans;
use crate::search::{ResultItem, SearchManager};
use crate::security;

/// Shared application state
pub struct AppState {
    pub store: AccountStore,
    pub search: SearchManager,
    pub jwt_config: JwtConfig,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

type HandlerError = (StatusCode, Json<ApiError>);

/// Map a domain error onto an HTTP status + JSON body
fn error_response(err: SearchError) -> HandlerError {
    let status = match &err {
        SearchError::InvalidQuery
        | SearchError::UnknownPlan(_)
        | SearchError::EmailTaken => StatusCode::BAD_REQUEST,
        SearchError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        SearchError::QuotaExceeded => StatusCode::FORBIDDEN,
        SearchError::AccountNotFound => StatusCode::NOT_FOUND,
        SearchError::UpstreamStatus { .. } | SearchError::UpstreamUnreachable(_) => {
            StatusCode::BAD_GATEWAY
        }
        SearchError::Database(_)
        | SearchError::Config(_)
        | SearchError::PasswordHash(_)
        | SearchError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        warn!("Request failed: {}", err);
    }

    (status, Json(ApiError::new(&err.to_string())))
}

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password reset request body
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

/// Plan selection request body
#[derive(Debug, Deserialize)]
pub struct SetPlanRequest {
    pub plan: String,
    /// Enterprise only: requested query count
    pub queries: Option<i64>,
    /// Enterprise only: requested results per query
    pub results: Option<i64>,
}

/// Search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Optional lower result target; the plan cap is the ceiling
    pub results: Option<u32>,
}

/// Account summary embedded in the login response
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountSummary,
    pub plan: PlanStatus,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: PlanStatus,
}

#[derive(Debug, Serialize)]
pub struct SetPlanResponse {
    pub plan: String,
    pub allowed_queries: i64,
    pub results_per_query: i64,
    pub price_usd: f64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<ResultItem>,
    pub queries_used: i64,
    pub queries_remaining: i64,
    pub results_per_query: i64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<SearchRecord>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /api/health - Service and database health
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, HandlerError> {
    state.store.health_check().await.map_err(error_response)?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET / - Liveness message
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "search-rs backend is running".to_string(),
    })
}

/// POST /api/auth/signup - Register a new account on the free plan
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("Missing fields")),
        ));
    }

    let password_hash = security::hash_password(&req.password).map_err(error_response)?;
    let free = plans::resolve_plan(plans::DEFAULT_PLAN, None, None).map_err(error_response)?;

    state
        .store
        .create_account(name, email, &password_hash, &free)
        .await
        .map_err(error_response)?;

    Ok(Json(MessageResponse {
        message: "Account registered".to_string(),
    }))
}

/// POST /api/auth/login - Authenticate and get a JWT token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HandlerError> {
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("Invalid credentials")),
        )
    };

    let account = state
        .store
        .find_by_email(req.email.trim())
        .await
        .map_err(error_response)?
        .ok_or_else(invalid)?;

    let verified =
        security::verify_password(&req.password, &account.password_hash).unwrap_or(false);
    if !verified {
        warn!("Login failed for {}", account.email);
        return Err(invalid());
    }

    let token = state
        .jwt_config
        .create_token(account.id, &account.email)
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Failed to create token")),
            )
        })?;

    Ok(Json(LoginResponse {
        token,
        user: AccountSummary {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
        },
        plan: account.plan_status(),
    }))
}

/// POST /api/auth/reset-password - Replace the password for an email
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let email = req.email.trim();
    if email.is_empty() || req.new_password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("Missing fields")),
        ));
    }

    let account = state
        .store
        .find_by_email(email)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new("No account found with that email")),
            )
        })?;

    let password_hash = security::hash_password(&req.new_password).map_err(error_response)?;
    state
        .store
        .update_password(account.id, &password_hash)
        .await
        .map_err(error_response)?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

/// GET /api/plan - Current plan and usage counters
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    claims: Claims,
) -> Result<Json<PlanResponse>, HandlerError> {
    let account = state
        .store
        .find_by_id(claims.uid)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(SearchError::AccountNotFound))?;

    Ok(Json(PlanResponse {
        plan: account.plan_status(),
    }))
}

/// POST /api/plan - Switch plan (resets usage)
pub async fn set_plan(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Json(req): Json<SetPlanRequest>,
) -> Result<Json<SetPlanResponse>, HandlerError> {
    let quota =
        plans::resolve_plan(&req.plan, req.queries, req.results).map_err(error_response)?;

    state
        .store
        .set_plan(claims.uid, &quota)
        .await
        .map_err(error_response)?;

    Ok(Json(SetPlanResponse {
        plan: quota.plan_type.clone(),
        allowed_queries: quota.allowed_queries,
        results_per_query: quota.results_per_query,
        price_usd: quota.price_usd,
        message: "Plan updated successfully".to_string(),
    }))
}

/// POST /api/search - Quota-checked metered search
pub async fn run_search(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, HandlerError> {
    let outcome = state
        .search
        .search(claims.uid, &req.query, req.results)
        .await
        .map_err(error_response)?;

    Ok(Json(SearchResponse {
        count: outcome.results.len(),
        results: outcome.results,
        queries_used: outcome.queries_used,
        queries_remaining: outcome.queries_remaining,
        results_per_query: outcome.results_per_query,
    }))
}

/// GET /api/searches - Search history, newest first
pub async fn search_history(
    State(state): State<Arc<AppState>>,
    claims: Claims,
) -> Result<Json<HistoryResponse>, HandlerError> {
    let history = state
        .store
        .history(claims.uid)
        .await
        .map_err(error_response)?;

    Ok(Json(HistoryResponse { history }))
}
