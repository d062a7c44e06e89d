//! PostgreSQL session backed by a single sqlx connection.
//!
//! # Module Structure
//! - `connection`: Connect options, timeouts and session settings
//! - `type_mapping`: Rendering of PostgreSQL cells as text
//!
//! # Security Guarantees
//! - Sessions run with `default_transaction_read_only = on`
//! - A server-side `statement_timeout` bounds every query
//! - A fetch dropped before completing cancels its query on the server
//! - Connection details in errors never include the password

mod cancel;
mod connection;
mod type_mapping;

#[cfg(test)]
mod tests;

use super::helpers::map_sqlx_query_error;
use cancel::{BackendHandle, CancelOnDrop};
use super::{BindValue, DatabaseSession, Dialect, Statement, TextRow};
use crate::Result;
use async_trait::async_trait;
use sqlx::postgres::PgConnection;

pub use type_mapping::{cell_to_text, row_to_text};

/// One open PostgreSQL connection.
pub struct PostgresSession {
    connection: PgConnection,
    backend: BackendHandle,
}

impl std::fmt::Debug for PostgresSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSession")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseSession for PostgresSession {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn ping(&mut self) -> Result<()> {
        let rows = self.fetch_rows(&Statement::new(Dialect::Postgres.ping_sql())).await?;
        if rows.len() == 1 {
            Ok(())
        } else {
            Err(crate::error::PatternAnalyzerError::query_failed(
                "Basic connectivity test failed: unexpected result",
            ))
        }
    }

    async fn fetch_rows(&mut self, statement: &Statement) -> Result<Vec<TextRow>> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "Executing query");

        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = match param {
                BindValue::Text(value) => query.bind(value.clone()),
                BindValue::Integer(value) => query.bind(*value),
            };
        }

        let mut guard = CancelOnDrop::new(&self.backend);
        let fetched = query.fetch_all(&mut self.connection).await;
        guard.disarm();

        let rows = fetched.map_err(|e| map_sqlx_query_error("Query failed", &e))?;

        tracing::debug!(rows = rows.len(), "Query returned rows");
        rows.iter().map(row_to_text).collect()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.shutdown().await
    }
}
