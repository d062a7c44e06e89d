//! Oracle session backed by the `oracle` crate.
//!
//! Requires Oracle Instant Client at runtime. Queries run on tokio's blocking
//! pool; if the awaiting future is dropped (cancellation or timeout) the
//! in-flight call is interrupted with `break_execution`.
//!
//! # Security Guarantees
//! - Every session runs inside `SET TRANSACTION READ ONLY`
//! - The password is handed to the driver and never kept on the session

mod connection;

use super::{BindValue, DatabaseSession, Dialect, Statement, TextRow};
use crate::{Result, error::PatternAnalyzerError};
use async_trait::async_trait;
use oracle::sql_type::ToSql;
use std::sync::Arc;

/// One open Oracle connection.
pub struct OracleSession {
    connection: Arc<oracle::Connection>,
}

impl std::fmt::Debug for OracleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSession").finish_non_exhaustive()
    }
}

/// Interrupts the server call unless disarmed before drop.
struct BreakOnDrop {
    connection: Arc<oracle::Connection>,
    armed: bool,
}

impl BreakOnDrop {
    fn new(connection: Arc<oracle::Connection>) -> Self {
        Self {
            connection,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for BreakOnDrop {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("Interrupting in-flight Oracle call");
            if let Err(e) = self.connection.break_execution() {
                tracing::warn!(error = %e, "Failed to interrupt Oracle call");
            }
        }
    }
}

/// Maps an Oracle error, recognizing ORA-01031 (insufficient privileges).
fn map_oracle_error(operation: &str, error: &oracle::Error) -> PatternAnalyzerError {
    let message = error.to_string();
    if message.contains("ORA-01031") {
        PatternAnalyzerError::insufficient_privileges(format!("{operation}: {message}"))
    } else {
        PatternAnalyzerError::query_failed(format!("{operation}: {message}"))
    }
}

fn query_blocking(
    connection: &oracle::Connection,
    sql: &str,
    params: &[BindValue],
) -> Result<Vec<TextRow>> {
    let binds: Vec<&dyn ToSql> = params
        .iter()
        .map(|param| match param {
            BindValue::Text(value) => value as &dyn ToSql,
            BindValue::Integer(value) => value as &dyn ToSql,
        })
        .collect();

    let result_set = connection
        .query(sql, &binds)
        .map_err(|e| map_oracle_error("Query failed", &e))?;

    let mut rows = Vec::new();
    for row in result_set {
        let row = row.map_err(|e| map_oracle_error("Failed to fetch row", &e))?;
        let cells = (0..row.sql_values().len())
            .map(|index| {
                row.get::<usize, Option<String>>(index)
                    .map_err(|e| map_oracle_error("Failed to render column as text", &e))
            })
            .collect::<Result<TextRow>>()?;
        rows.push(cells);
    }
    Ok(rows)
}

#[async_trait]
impl DatabaseSession for OracleSession {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    async fn ping(&mut self) -> Result<()> {
        let rows = self.fetch_rows(&Statement::new(Dialect::Oracle.ping_sql())).await?;
        if rows.len() == 1 {
            Ok(())
        } else {
            Err(PatternAnalyzerError::query_failed(
                "Basic connectivity test failed: unexpected result",
            ))
        }
    }

    async fn fetch_rows(&mut self, statement: &Statement) -> Result<Vec<TextRow>> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "Executing query");

        let connection = Arc::clone(&self.connection);
        let sql = statement.sql.clone();
        let params = statement.params.clone();

        let mut guard = BreakOnDrop::new(Arc::clone(&self.connection));
        let outcome =
            tokio::task::spawn_blocking(move || query_blocking(&connection, &sql, &params)).await;
        guard.disarm();

        let rows = outcome.map_err(|e| {
            PatternAnalyzerError::query_failed(format!("Oracle query task failed: {e}"))
        })??;

        tracing::debug!(rows = rows.len(), "Query returned rows");
        Ok(rows)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.shutdown().await
    }
}
