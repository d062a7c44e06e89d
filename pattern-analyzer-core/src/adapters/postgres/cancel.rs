//! Server-side cancellation of in-flight PostgreSQL queries.
//!
//! Dropping a `PgConnection` mid-query only closes the client socket; the
//! backend keeps running the statement. When a fetch future is dropped before
//! completing, a short-lived side connection asks the server to cancel the
//! session's backend with `pg_cancel_backend`.

use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use std::time::Duration;

/// Everything a side connection needs to cancel one backend.
#[derive(Clone)]
pub(super) struct BackendHandle {
    options: PgConnectOptions,
    pid: i32,
    connect_timeout: Duration,
}

impl BackendHandle {
    pub(super) fn new(options: PgConnectOptions, pid: i32, connect_timeout: Duration) -> Self {
        Self {
            options,
            pid,
            connect_timeout,
        }
    }

    pub(super) fn pid(&self) -> i32 {
        self.pid
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

/// Cancels the backend's running query unless disarmed before drop.
pub(super) struct CancelOnDrop {
    backend: Option<BackendHandle>,
}

impl CancelOnDrop {
    pub(super) fn new(backend: &BackendHandle) -> Self {
        Self {
            backend: Some(backend.clone()),
        }
    }

    pub(super) fn disarm(&mut self) {
        self.backend = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        let Some(backend) = self.backend.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::debug!(pid = backend.pid, "Cancelling in-flight PostgreSQL query");
                runtime.spawn(cancel_backend(backend));
            }
            Err(_) => {
                tracing::warn!(
                    pid = backend.pid,
                    "No async runtime available to cancel PostgreSQL query"
                );
            }
        }
    }
}

/// Sends `pg_cancel_backend` for `backend` over a fresh connection.
async fn cancel_backend(backend: BackendHandle) {
    let connection =
        tokio::time::timeout(backend.connect_timeout, PgConnection::connect_with(&backend.options))
            .await;

    let mut connection = match connection {
        Ok(Ok(connection)) => connection,
        Ok(Err(e)) => {
            tracing::warn!(pid = backend.pid, error = %e, "Failed to open cancel connection");
            return;
        }
        Err(_) => {
            tracing::warn!(pid = backend.pid, "Timed out opening cancel connection");
            return;
        }
    };

    match sqlx::query_scalar::<_, bool>("SELECT pg_cancel_backend($1)")
        .bind(backend.pid)
        .fetch_one(&mut connection)
        .await
    {
        Ok(signalled) => {
            tracing::debug!(pid = backend.pid, signalled, "Cancel request sent");
        }
        Err(e) => {
            tracing::warn!(pid = backend.pid, error = %e, "Cancel request failed");
        }
    }

    if let Err(e) = connection.close().await {
        tracing::debug!(error = %e, "Failed to close cancel connection");
    }
}
