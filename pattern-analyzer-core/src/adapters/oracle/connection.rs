//! Oracle connection setup.
//!
//! The `oracle` driver is synchronous (ODPI-C), so connect runs on the
//! blocking pool under the configured connect timeout.

use super::OracleSession;
use crate::adapters::{ConnectionConfig, ConnectionDescriptor, Dialect};
use crate::{Result, error::PatternAnalyzerError};
use std::sync::Arc;

impl OracleSession {
    /// Opens a dedicated connection, bounds each server round trip by the
    /// query timeout, and starts a read-only transaction.
    ///
    /// # Errors
    /// Returns error if:
    /// - The connect timeout elapses
    /// - The listener or login rejects the connection
    /// - Oracle Instant Client cannot be loaded
    pub async fn connect(
        descriptor: &ConnectionDescriptor,
        config: &ConnectionConfig,
    ) -> Result<Self> {
        let username = descriptor.credentials.username().to_string();
        let password = zeroize::Zeroizing::new(
            descriptor
                .credentials
                .password()
                .unwrap_or_default()
                .to_string(),
        );
        let data_source = Dialect::Oracle.data_source(descriptor);
        let setup = Dialect::Oracle.session_setup_sql(config);
        let call_timeout = config.query_timeout;

        let task = tokio::task::spawn_blocking(move || -> Result<oracle::Connection> {
            let connection = oracle::Connection::connect(&username, password.as_str(), &data_source)
                .map_err(|e| {
                    PatternAnalyzerError::connection_failed_with("Failed to connect to Oracle", e)
                })?;
            connection.set_call_timeout(Some(call_timeout)).map_err(|e| {
                PatternAnalyzerError::connection_failed_with("Failed to set call timeout", e)
            })?;
            for statement in &setup {
                connection.execute(statement, &[]).map_err(|e| {
                    PatternAnalyzerError::connection_failed_with(
                        "Failed to apply session settings",
                        e,
                    )
                })?;
            }
            Ok(connection)
        });

        let connection = tokio::time::timeout(config.connect_timeout, task)
            .await
            .map_err(|_| {
                PatternAnalyzerError::timeout(
                    format!("connect to {descriptor}"),
                    config.connect_timeout,
                )
            })?
            .map_err(|e| PatternAnalyzerError::connection_failed_with("Oracle connect task failed", e))??;

        tracing::debug!(target_db = %descriptor, "Oracle session established");
        Ok(Self {
            connection: Arc::new(connection),
        })
    }

    /// Ends the read-only transaction and closes the connection.
    pub(crate) async fn shutdown(self) -> Result<()> {
        let connection = self.connection;
        tokio::task::spawn_blocking(move || {
            // The transaction is read-only; rollback just ends it
            let _ = connection.rollback();
            connection.close()
        })
        .await
        .map_err(|e| PatternAnalyzerError::connection_failed_with("Oracle close task failed", e))?
        .map_err(PatternAnalyzerError::connection_failed)
    }
}
