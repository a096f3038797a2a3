//! # PostgreSQL adapter
//!
//! Implements the repository ports with `sqlx`. Row mapping is done by hand
//! so that enum columns stored as TEXT are parsed into their domain types.
//! Multi-table changes (category and board soft delete) run inside one
//! transaction.

mod boards;
mod categories;
mod comments;
mod goals;
mod users;

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use domains::{DomainError, OrderBy, Result, SortField};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let start = Instant::now();
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(db_err)?;
        info!(
            subsystem = "database",
            op = "connect",
            max_connections,
            duration_ms = start.elapsed().as_millis() as u64,
            "Database pool ready"
        );
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(format!("migration failed: {e}")))?;
        info!(subsystem = "database", op = "migrate", "Migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps driver errors onto the domain: unique violations become conflicts,
/// foreign-key violations become `Protected`.
pub(crate) fn db_err(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DomainError::Conflict(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return DomainError::Protected(db.message().to_string());
        }
    }
    DomainError::Internal(format!("database error: {err}"))
}

/// `%term%` for ILIKE, with the pattern metacharacters escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Maps a sort key to its qualified column.
pub(crate) trait SortColumn: SortField {
    fn column(&self) -> &'static str;
}

/// Appends ` ORDER BY ...` with an id tie-breaker.
pub(crate) fn push_order<F: SortColumn>(
    qb: &mut QueryBuilder<'_, Postgres>,
    ordering: &[OrderBy<F>],
    id_column: &str,
) {
    qb.push(" ORDER BY ");
    for order in ordering {
        qb.push(order.field.column());
        qb.push(if order.descending { " DESC, " } else { " ASC, " });
    }
    qb.push(id_column);
    qb.push(" ASC");
}

/// Appends ` LIMIT/OFFSET` for the window.
pub(crate) fn push_window(qb: &mut QueryBuilder<'_, Postgres>, window: &domains::Window) {
    if let Some(limit) = window.limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(limit));
    }
    if window.offset > 0 {
        qb.push(" OFFSET ");
        qb.push_bind(i64::from(window.offset));
    }
}
