//! Database session trait and factory for dialect-abstracted data access.
//!
//! A [`DatabaseSession`] is one live connection used for exactly one
//! operation and then closed. The schema browser and sampler never talk to a
//! driver directly: they obtain a session from [`open_session`], run the
//! statements produced by [`Dialect`], and receive rows of optional text.
//!
//! # Module Structure
//! - `config`: Connection descriptor, session settings, sampling limits
//! - `dialect`: SQL templates, quoting and limit clauses per dialect
//! - `helpers`: Cancellation/timeout racing and driver error mapping
//! - `postgres`, `oracle`: Driver-backed sessions (feature-gated)

use crate::Result;
use async_trait::async_trait;

pub mod config;
pub mod dialect;
pub mod helpers;

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "oracle")]
pub mod oracle;

pub use config::{ConnectionConfig, ConnectionDescriptor, SamplingConfig};
pub use dialect::{Dialect, Statement};

/// A positional bind value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    /// Bound as a text parameter
    Text(String),
    /// Bound as a 64-bit integer parameter
    Integer(i64),
}

/// One result row; `None` is SQL NULL.
pub type TextRow = Vec<Option<String>>;

/// A single open database connection.
///
/// # Security Guarantees
/// - Sessions are opened read-only unless the config says otherwise
/// - A server-side statement timeout is applied at open time
/// - Credentials are never stored on the session
///
/// # Object Safety
/// This trait is object-safe; sessions are handed out as
/// `Box<dyn DatabaseSession>`.
#[async_trait]
pub trait DatabaseSession: Send {
    /// The dialect this session speaks.
    fn dialect(&self) -> Dialect;

    /// Runs the dialect's trivial round-trip query.
    ///
    /// # Errors
    /// Returns error if the query fails
    async fn ping(&mut self) -> Result<()>;

    /// Executes a query and returns every row with each cell rendered as text.
    ///
    /// # Errors
    /// Returns a query-execution error carrying the driver's message, or
    /// insufficient privileges when the server reports a permission failure
    async fn fetch_rows(&mut self, statement: &Statement) -> Result<Vec<TextRow>>;

    /// Closes the connection.
    ///
    /// Dropping a session also releases the connection; `close` additionally
    /// performs the protocol-level goodbye.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens a session for the descriptor's dialect.
///
/// # Security
/// - Validates the descriptor and config before connecting
/// - Never logs the connection string or password
///
/// # Errors
/// Returns error if:
/// - The descriptor or config is invalid
/// - The dialect's driver is not compiled in
/// - The connection fails or times out
pub async fn open_session(
    descriptor: &ConnectionDescriptor,
    config: &ConnectionConfig,
) -> Result<Box<dyn DatabaseSession>> {
    descriptor.validate()?;
    config.validate()?;

    tracing::debug!(target_db = %descriptor, "Opening database session");

    match descriptor.dialect {
        #[cfg(feature = "postgresql")]
        Dialect::Postgres => {
            let session = postgres::PostgresSession::connect(descriptor, config).await?;
            Ok(Box::new(session))
        }
        #[cfg(not(feature = "postgresql"))]
        Dialect::Postgres => Err(crate::error::PatternAnalyzerError::unsupported_feature(
            "PostgreSQL driver",
            "Compile with --features postgresql to enable PostgreSQL support",
        )),
        #[cfg(feature = "oracle")]
        Dialect::Oracle => {
            let session = oracle::OracleSession::connect(descriptor, config).await?;
            Ok(Box::new(session))
        }
        #[cfg(not(feature = "oracle"))]
        Dialect::Oracle => Err(crate::error::PatternAnalyzerError::unsupported_feature(
            "Oracle driver",
            "Compile with --features oracle to enable Oracle support",
        )),
    }
}

/// Opens a session, runs one statement, and closes the session.
///
/// The session is released on every exit path: explicitly on success or
/// query failure, and by drop when the surrounding future is cancelled.
/// A failed goodbye after a successful query is logged, not returned.
///
/// # Errors
/// Returns error if the session cannot be opened or the query fails
pub async fn query_once(
    descriptor: &ConnectionDescriptor,
    config: &ConnectionConfig,
    statement: &Statement,
) -> Result<Vec<TextRow>> {
    let mut session = open_session(descriptor, config).await?;
    let rows = session.fetch_rows(statement).await;

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Failed to close database session cleanly");
    }

    let rows = rows?;
    tracing::debug!(rows = rows.len(), "Query returned rows");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternAnalyzerError;

    #[tokio::test]
    async fn test_open_session_rejects_invalid_descriptor() {
        let descriptor = ConnectionDescriptor::new(Dialect::Postgres, "", "app");
        let result = open_session(&descriptor, &ConnectionConfig::default()).await;
        assert!(matches!(
            result,
            Err(PatternAnalyzerError::Configuration { .. })
        ));
    }

    #[cfg(not(feature = "oracle"))]
    #[tokio::test]
    async fn test_open_session_oracle_without_driver() {
        let descriptor = ConnectionDescriptor::new(Dialect::Oracle, "localhost", "XEPDB1");
        let result = open_session(&descriptor, &ConnectionConfig::default()).await;
        assert!(matches!(
            result,
            Err(PatternAnalyzerError::UnsupportedFeature { .. })
        ));
        assert!(!Dialect::Oracle.is_driver_available());
    }
}
