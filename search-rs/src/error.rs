use thiserror::Error;

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Missing query")]
    InvalidQuery,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Query limit reached for this plan")]
    QuotaExceeded,

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Upstream search API error {status}")]
    UpstreamStatus { status: u16 },

    #[error("Upstream search API unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
