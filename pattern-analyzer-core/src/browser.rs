//! Schema browsing: schemas, tables and columns of one database.
//!
//! Every operation opens its own session, runs a single dialect template
//! and closes the session again. Results keep the database's own ordering
//! and are capped at [`SamplingConfig::metadata_row_cap`].
//!
//! # Security
//! - Schema and table filters travel as bound parameters
//! - Sessions are read-only; nothing is retried

use crate::adapters::helpers::run_cancellable;
use crate::adapters::{
    ConnectionConfig, ConnectionDescriptor, SamplingConfig, Statement, TextRow, open_session,
    query_once,
};
use crate::models::{ColumnRef, ConnectionTestOutcome, TableRef};
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Lists catalog objects for one connection.
#[derive(Debug, Clone)]
pub struct SchemaBrowser {
    descriptor: ConnectionDescriptor,
    connection_config: ConnectionConfig,
    sampling_config: SamplingConfig,
}

impl SchemaBrowser {
    /// Creates a browser for `descriptor`.
    pub fn new(
        descriptor: ConnectionDescriptor,
        connection_config: ConnectionConfig,
        sampling_config: SamplingConfig,
    ) -> Self {
        Self {
            descriptor,
            connection_config,
            sampling_config,
        }
    }

    /// The target this browser inspects.
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    /// Checks that a session can be opened and answers a trivial query.
    ///
    /// Never fails: connectivity problems become `success == false` with a
    /// sanitized message, and cancellation sets `cancelled`.
    pub async fn test_connection(&self, cancel: &CancellationToken) -> ConnectionTestOutcome {
        let operation = format!("test connection to {}", self.descriptor);
        let outcome = run_cancellable(&operation, self.operation_timeout(), cancel, async {
            let mut session = open_session(&self.descriptor, &self.connection_config).await?;
            let ping = session.ping().await;
            if let Err(e) = session.close().await {
                tracing::warn!(error = %e, "Failed to close database session cleanly");
            }
            ping
        })
        .await;

        match outcome {
            Ok(()) => {
                tracing::info!(target_db = %self.descriptor, "Connection test succeeded");
                ConnectionTestOutcome::succeeded(format!(
                    "Connected to {}",
                    self.descriptor.label()
                ))
            }
            Err(e) if e.is_cancelled() => ConnectionTestOutcome::cancelled(),
            Err(e) => {
                tracing::info!(target_db = %self.descriptor, error = %e, "Connection test failed");
                ConnectionTestOutcome::failed(describe(&e))
            }
        }
    }

    /// Lists non-system schemas.
    ///
    /// # Errors
    /// Returns an introspection error, or `Cancelled`/`Timeout`
    pub async fn list_schemas(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let cap = self.sampling_config.metadata_row_cap;
        let statement = self.descriptor.dialect.list_schemas_sql(cap);

        let rows = self.fetch("list schemas", &statement, cancel).await?;
        let schemas: Vec<String> = rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect();

        tracing::info!(count = schemas.len(), "Listed schemas");
        Ok(schemas)
    }

    /// Lists non-system tables, optionally restricted to one schema.
    ///
    /// # Errors
    /// Returns an introspection error, or `Cancelled`/`Timeout`
    pub async fn list_tables(
        &self,
        schema: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<TableRef>> {
        let cap = self.sampling_config.metadata_row_cap;
        let statement = self.descriptor.dialect.list_tables_sql(schema, cap);

        let rows = self.fetch("list tables", &statement, cancel).await?;
        let tables: Vec<TableRef> = rows
            .into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                let schema = cells.next().flatten()?;
                let name = cells.next().flatten()?;
                Some(TableRef::new(schema, name))
            })
            .collect();

        tracing::info!(count = tables.len(), schema = ?schema, "Listed tables");
        Ok(tables)
    }

    /// Lists the columns of one table in catalog order.
    ///
    /// # Errors
    /// Returns an introspection error, or `Cancelled`/`Timeout`
    pub async fn list_columns(
        &self,
        schema: &str,
        table: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ColumnRef>> {
        let dialect = self.descriptor.dialect;
        let cap = self.sampling_config.metadata_row_cap;
        let statement = dialect.list_columns_sql(schema, table, cap);

        let rows = self.fetch("list columns", &statement, cancel).await?;
        let table_ref = TableRef::new(schema, table);
        let columns: Vec<ColumnRef> = rows
            .into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                let name = cells.next().flatten()?;
                let data_type = cells.next().flatten().unwrap_or_default();
                let nullable = cells
                    .next()
                    .flatten()
                    .is_some_and(|raw| dialect.parse_nullable(&raw));
                Some(ColumnRef::new(table_ref.clone(), name, data_type, nullable))
            })
            .collect();

        tracing::info!(count = columns.len(), table = %table_ref, "Listed columns");
        Ok(columns)
    }

    async fn fetch(
        &self,
        operation: &str,
        statement: &Statement,
        cancel: &CancellationToken,
    ) -> Result<Vec<TextRow>> {
        tracing::debug!(operation, sql = %statement.sql, "Running catalog query");

        let mut rows = run_cancellable(
            operation,
            self.operation_timeout(),
            cancel,
            query_once(&self.descriptor, &self.connection_config, statement),
        )
        .await
        .map_err(|e| e.into_introspection(format!("Failed to {operation}")))?;

        rows.truncate(self.sampling_config.metadata_row_cap as usize);
        Ok(rows)
    }

    fn operation_timeout(&self) -> std::time::Duration {
        self.connection_config.connect_timeout + self.connection_config.query_timeout
    }
}

/// Error text with its source chain, for operator-facing messages.
fn describe(error: &crate::error::PatternAnalyzerError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Dialect;
    use crate::error::PatternAnalyzerError;
    use crate::security::Credentials;
    use std::time::Duration;

    fn unreachable_browser() -> SchemaBrowser {
        let descriptor = ConnectionDescriptor::new(Dialect::Postgres, "127.0.0.1", "app")
            .with_port(1)
            .with_credentials(Credentials::new(
                "reader".to_string(),
                Some("do-not-leak".to_string()),
            ));
        let config = ConnectionConfig::new().with_connect_timeout(Duration::from_secs(2));
        SchemaBrowser::new(descriptor, config, SamplingConfig::default())
    }

    #[tokio::test]
    async fn test_connection_pre_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = unreachable_browser().test_connection(&cancel).await;
        assert!(outcome.cancelled);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "operation cancelled");
    }

    #[tokio::test]
    async fn test_list_schemas_pre_cancelled_is_not_introspection_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = unreachable_browser()
            .list_schemas(&cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[cfg(feature = "postgresql")]
    #[tokio::test]
    async fn test_connection_failure_is_an_answer() {
        let outcome = unreachable_browser()
            .test_connection(&CancellationToken::new())
            .await;

        assert!(!outcome.success);
        assert!(!outcome.cancelled);
        assert!(!outcome.message.is_empty());
        assert!(!outcome.message.contains("do-not-leak"));
    }

    #[cfg(feature = "postgresql")]
    #[tokio::test]
    async fn test_list_tables_wraps_connection_failure() {
        let err = unreachable_browser()
            .list_tables(None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PatternAnalyzerError::Introspection { .. } | PatternAnalyzerError::Timeout { .. }
        ));
        assert!(!err.to_string().contains("do-not-leak"));
    }

    #[test]
    fn test_describe_includes_source() {
        let err = PatternAnalyzerError::introspection_failed(
            "Failed to list tables",
            std::io::Error::other("relation missing"),
        );
        assert_eq!(
            describe(&err),
            "Introspection failed: Failed to list tables: relation missing"
        );
    }
}
