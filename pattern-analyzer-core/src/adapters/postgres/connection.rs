//! PostgreSQL connection setup.
//!
//! # Security Features
//! - One dedicated connection per session, never pooled
//! - Connect is bounded by the configured connect timeout
//! - `statement_timeout` and read-only mode are applied before first use
//! - The backend pid is recorded so dropped queries can be cancelled

use super::PostgresSession;
use super::cancel::BackendHandle;
use crate::adapters::{ConnectionConfig, ConnectionDescriptor, Dialect};
use crate::{Result, error::PatternAnalyzerError};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor};

impl PostgresSession {
    /// Opens a dedicated connection and applies session settings.
    ///
    /// # Errors
    /// Returns error if:
    /// - The connect timeout elapses
    /// - The server rejects the connection or login
    /// - A session setting cannot be applied
    pub async fn connect(
        descriptor: &ConnectionDescriptor,
        config: &ConnectionConfig,
    ) -> Result<Self> {
        let options = Self::connect_options(descriptor);

        let mut connection = tokio::time::timeout(
            config.connect_timeout,
            PgConnection::connect_with(&options),
        )
        .await
        .map_err(|_| {
            PatternAnalyzerError::timeout(format!("connect to {descriptor}"), config.connect_timeout)
        })?
        .map_err(|e| {
            PatternAnalyzerError::connection_failed_with(
                format!("Failed to connect to {descriptor}"),
                e,
            )
        })?;

        let pid: i32 = sqlx::query_scalar("SELECT pg_backend_pid()")
            .fetch_one(&mut connection)
            .await
            .map_err(|e| {
                PatternAnalyzerError::connection_failed_with("Failed to read backend pid", e)
            })?;

        let backend = BackendHandle::new(options, pid, config.connect_timeout);
        let mut session = Self {
            connection,
            backend,
        };
        session.apply_session_settings(config).await?;

        tracing::debug!(
            target_db = %descriptor,
            pid = session.backend.pid(),
            "PostgreSQL session established"
        );
        Ok(session)
    }

    /// Builds driver options from a descriptor.
    ///
    /// The password lives only in the driver's options, which the session
    /// keeps for its cancel connection.
    pub fn connect_options(descriptor: &ConnectionDescriptor) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&descriptor.host)
            .port(descriptor.effective_port())
            .database(&descriptor.database);

        let username = descriptor.credentials.username();
        if !username.is_empty() {
            options = options.username(username);
        }
        if let Some(password) = descriptor.credentials.password() {
            options = options.password(password);
        }

        options
    }

    /// Applies statement timeout, application name and read-only mode.
    async fn apply_session_settings(&mut self, config: &ConnectionConfig) -> Result<()> {
        for statement in Dialect::Postgres.session_setup_sql(config) {
            (&mut self.connection)
                .execute(statement.as_str())
                .await
                .map_err(|e| {
                    PatternAnalyzerError::connection_failed_with(
                        "Failed to apply session settings",
                        e,
                    )
                })?;
        }
        Ok(())
    }

    /// Closes the connection gracefully.
    pub(crate) async fn shutdown(self) -> Result<()> {
        self.connection
            .close()
            .await
            .map_err(PatternAnalyzerError::connection_failed)
    }
}
