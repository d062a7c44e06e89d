//! Unit tests for the PostgreSQL session that need no server.

use super::*;
use crate::adapters::{ConnectionConfig, ConnectionDescriptor};
use crate::error::PatternAnalyzerError;
use crate::security::Credentials;
use std::time::Duration;

fn descriptor() -> ConnectionDescriptor {
    ConnectionDescriptor::new(Dialect::Postgres, "db.internal", "warehouse")
        .with_port(6543)
        .with_credentials(Credentials::new(
            "reporter".to_string(),
            Some("do-not-leak".to_string()),
        ))
}

#[test]
fn test_connect_options_from_descriptor() {
    let options = PostgresSession::connect_options(&descriptor());

    assert_eq!(options.get_host(), "db.internal");
    assert_eq!(options.get_port(), 6543);
    assert_eq!(options.get_database(), Some("warehouse"));
    assert_eq!(options.get_username(), "reporter");
}

#[test]
fn test_connect_options_default_port() {
    let descriptor = ConnectionDescriptor::new(Dialect::Postgres, "localhost", "app");
    let options = PostgresSession::connect_options(&descriptor);
    assert_eq!(options.get_port(), 5432);
}

#[tokio::test]
async fn test_connect_failure_is_sanitized() {
    // Nothing listens on port 1
    let descriptor = ConnectionDescriptor::new(Dialect::Postgres, "127.0.0.1", "app")
        .with_port(1)
        .with_credentials(Credentials::new(
            "reporter".to_string(),
            Some("do-not-leak".to_string()),
        ));
    let config = ConnectionConfig::new().with_connect_timeout(Duration::from_secs(5));

    let err = PostgresSession::connect(&descriptor, &config)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PatternAnalyzerError::Connection { .. } | PatternAnalyzerError::Timeout { .. }
    ));
    assert!(!err.to_string().contains("do-not-leak"));
    assert!(!format!("{err:?}").contains("do-not-leak"));
}

#[test]
fn test_privilege_error_mapping_for_non_database_errors() {
    let err = map_sqlx_query_error("Query failed", &sqlx::Error::RowNotFound);
    assert!(matches!(err, PatternAnalyzerError::QueryExecution { .. }));
    assert!(err.to_string().contains("Query failed"));
}

#[test]
fn test_backend_handle_debug_hides_options() {
    let backend = cancel::BackendHandle::new(
        PostgresSession::connect_options(&descriptor()),
        4242,
        Duration::from_secs(1),
    );

    let debug = format!("{backend:?}");
    assert!(debug.contains("4242"));
    assert!(!debug.contains("do-not-leak"));
}

#[test]
fn test_armed_cancel_guard_outside_runtime_does_not_panic() {
    let backend = cancel::BackendHandle::new(
        PostgresSession::connect_options(&descriptor()),
        4242,
        Duration::from_secs(1),
    );

    drop(cancel::CancelOnDrop::new(&backend));

    let mut disarmed = cancel::CancelOnDrop::new(&backend);
    disarmed.disarm();
    drop(disarmed);
}
