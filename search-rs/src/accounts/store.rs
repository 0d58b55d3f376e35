//! SQLite-backed account store
//!
//! Holds the only mutable shared state in the system: the account rows with
//! their plan parameters and usage counter, plus the append-only search
//! history. The quota charge is a single conditional UPDATE so that two
//! concurrent searches can never push an account past its allowed count.

use crate::error::{Result, SearchError};
use crate::plans::PlanQuota;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use super::types::{Account, SearchRecord, UsageSnapshot};

#[derive(Clone)]
pub struct AccountStore {
    pub db: Arc<SqlitePool>,
}

impl AccountStore {
    /// Open (creating if missing) the database at the given URL
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let db = SqlitePool::connect_with(options).await?;
        Self::with_pool(db).await
    }

    /// In-memory store for tests and local experiments
    ///
    /// A single connection is enforced: each pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(db).await
    }

    async fn with_pool(db: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                plan_type TEXT NOT NULL,
                allowed_queries INTEGER NOT NULL,
                results_per_query INTEGER NOT NULL,
                queries_used INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                query TEXT NOT NULL,
                result_count INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Register a new account under the given (already resolved) plan
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        plan: &PlanQuota,
    ) -> Result<i64> {
        info!("Creating account: {}", email);

        let result = sqlx::query(
            r#"
            INSERT INTO accounts
                (name, email, password_hash, plan_type, allowed_queries, results_per_query, queries_used, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, datetime('now'))
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(&plan.plan_type)
        .bind(plan.allowed_queries)
        .bind(plan.results_per_query)
        .execute(&*self.db)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(e)) if e.message().contains("UNIQUE") => {
                Err(SearchError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, plan_type,
                   allowed_queries, results_per_query, queries_used, created_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, plan_type,
                   allowed_queries, results_per_query, queries_used, created_at
            FROM accounts
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&*self.db)
        .await?;

        Ok(account)
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let done = sqlx::query("UPDATE accounts SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&*self.db)
            .await?;

        if done.rows_affected() == 0 {
            return Err(SearchError::AccountNotFound);
        }

        Ok(())
    }

    /// Assign a new plan, overwriting the quota parameters and resetting the
    /// usage counter. A plan change always grants a fresh quota window.
    pub async fn set_plan(&self, id: i64, plan: &PlanQuota) -> Result<()> {
        info!("Setting plan {} for account {}", plan.plan_type, id);

        let done = sqlx::query(
            r#"
            UPDATE accounts
            SET plan_type = ?, allowed_queries = ?, results_per_query = ?, queries_used = 0
            WHERE id = ?
            "#,
        )
        .bind(&plan.plan_type)
        .bind(plan.allowed_queries)
        .bind(plan.results_per_query)
        .bind(id)
        .execute(&*self.db)
        .await?;

        if done.rows_affected() == 0 {
            return Err(SearchError::AccountNotFound);
        }

        Ok(())
    }

    /// Charge exactly one query and append the history record, atomically.
    ///
    /// The increment only applies while `queries_used < allowed_queries`;
    /// zero affected rows means another request won the last slot (or the
    /// account vanished) and the transaction rolls back without writing a
    /// record.
    pub async fn commit_search(
        &self,
        account_id: i64,
        query: &str,
        result_count: i64,
    ) -> Result<UsageSnapshot> {
        let mut tx = self.db.begin().await?;

        let charged = sqlx::query(
            r#"
            UPDATE accounts
            SET queries_used = queries_used + 1
            WHERE id = ? AND queries_used < allowed_queries
            "#,
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

        if charged.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("Search charge rejected for account {}", account_id);
            return Err(SearchError::QuotaExceeded);
        }

        sqlx::query(
            r#"
            INSERT INTO search_history (account_id, query, result_count, created_at)
            VALUES (?, ?, ?, datetime('now'))
            "#,
        )
        .bind(account_id)
        .bind(query)
        .bind(result_count)
        .execute(&mut *tx)
        .await?;

        let (queries_used, allowed_queries, results_per_query): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT queries_used, allowed_queries, results_per_query
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UsageSnapshot {
            queries_used,
            allowed_queries,
            results_per_query,
        })
    }

    /// Search history for one account, newest first
    pub async fn history(&self, account_id: i64) -> Result<Vec<SearchRecord>> {
        let records = sqlx::query_as::<_, SearchRecord>(
            r#"
            SELECT id, account_id, query, result_count, created_at
            FROM search_history
            WHERE account_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(records)
    }

    /// List all accounts (for the admin CLI)
    ///
    /// Returns (id, name, email, plan_type, queries_used, allowed_queries)
    pub async fn list_accounts(&self) -> Result<Vec<(i64, String, String, String, i64, i64)>> {
        let accounts = sqlx::query_as::<_, (i64, String, String, String, i64, i64)>(
            r#"
            SELECT id, name, email, plan_type, queries_used, allowed_queries
            FROM accounts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(accounts)
    }

    /// Health check - verify database connectivity
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&*self.db).await?;

        Ok(())
    }
}
