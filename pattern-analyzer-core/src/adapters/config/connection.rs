//! Database connection configuration.
//!
//! `ConnectionDescriptor` says *where* to connect; `ConnectionConfig` says
//! *how* a session behaves once connected (timeouts, read-only mode).

use crate::adapters::Dialect;
use crate::error::PatternAnalyzerError;
use crate::security::Credentials;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use zeroize::Zeroizing;

/// Runtime settings applied to every database session.
///
/// # Example
/// ```rust
/// use pattern_analyzer_core::adapters::ConnectionConfig;
/// use std::time::Duration;
///
/// let config = ConnectionConfig::new()
///     .with_connect_timeout(Duration::from_secs(5))
///     .with_query_timeout(Duration::from_secs(60));
///
/// assert!(config.validate().is_ok());
/// assert!(config.read_only);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Query timeout duration
    pub query_timeout: Duration,
    /// Whether to enforce read-only mode
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            read_only: true,
        }
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with safe defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if either timeout is zero
    pub fn validate(&self) -> crate::Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(PatternAnalyzerError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.is_zero() {
            return Err(PatternAnalyzerError::configuration(
                "query_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Target database for a session.
///
/// # Security
/// The password inside `credentials` is never serialized and `Display` omits
/// both username and password, so a descriptor is safe to log.
///
/// # Example
/// ```rust
/// use pattern_analyzer_core::adapters::{ConnectionDescriptor, Dialect};
/// use pattern_analyzer_core::security::Credentials;
///
/// let descriptor = ConnectionDescriptor::new(Dialect::Postgres, "db.internal", "sales")
///     .with_port(6432)
///     .with_credentials(Credentials::new("reader".to_string(), Some("pw".to_string())));
///
/// assert!(descriptor.validate().is_ok());
/// assert_eq!(descriptor.to_string(), "postgres://db.internal:6432/sales");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// Database family
    pub dialect: Dialect,
    /// Server hostname or address
    pub host: String,
    /// Port; the dialect default is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Database name (Postgres) or service name (Oracle)
    pub database: String,
    /// Login; the password is never serialized
    #[serde(default)]
    pub credentials: Credentials,
    /// Human-friendly label shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ConnectionDescriptor {
    /// Creates a descriptor without credentials on the dialect's default port.
    pub fn new(dialect: Dialect, host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            dialect,
            host: host.into(),
            port: None,
            database: database.into(),
            credentials: Credentials::default(),
            display_name: None,
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Builder method to set a display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The port actually used to connect.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.dialect.default_port())
    }

    /// Label for listings: the display name if set, otherwise the safe target.
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.to_string())
    }

    /// Assembles the dialect's `Key=Value;` connection string.
    ///
    /// The result contains the password and must never be logged; use
    /// [`crate::error::redact_connection_string`] first.
    pub fn connection_string(&self) -> Zeroizing<String> {
        self.dialect.connection_string(self)
    }

    /// Validates the descriptor.
    ///
    /// # Errors
    /// Returns error if host or database is empty or the port is 0
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(PatternAnalyzerError::configuration("host cannot be empty"));
        }

        if self.port == Some(0) {
            return Err(PatternAnalyzerError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.database.trim().is_empty() {
            return Err(PatternAnalyzerError::configuration(format!(
                "{} cannot be empty",
                self.dialect.database_label()
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Username and password are intentionally omitted
        write!(
            f,
            "{}://{}:{}/{}",
            self.dialect,
            self.host,
            self.effective_port(),
            self.database
        )
    }
}
