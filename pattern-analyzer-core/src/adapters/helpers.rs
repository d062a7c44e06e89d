//! Helper utilities shared by the database sessions and their callers.
//!
//! Provides the cancellation/timeout race every I/O operation goes through
//! and consistent mapping of driver errors.

use crate::{Result, error::PatternAnalyzerError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs `future` until it completes, the token fires, or `timeout` elapses.
///
/// A fired token yields [`PatternAnalyzerError::Cancelled`] and an elapsed
/// timer yields [`PatternAnalyzerError::Timeout`]. In both cases the future
/// is dropped, which releases any session it owns.
///
/// # Example
/// ```rust
/// use pattern_analyzer_core::adapters::helpers::run_cancellable;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let token = CancellationToken::new();
/// token.cancel();
///
/// let result = run_cancellable("noop", Duration::from_secs(1), &token, async { Ok(()) }).await;
/// assert!(result.unwrap_err().is_cancelled());
/// # }
/// ```
///
/// # Errors
/// Returns the future's own error, `Cancelled`, or `Timeout`.
pub async fn run_cancellable<T, F>(
    operation: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(PatternAnalyzerError::cancelled(operation));
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!(operation, "Operation cancelled by caller");
            Err(PatternAnalyzerError::cancelled(operation))
        }
        outcome = tokio::time::timeout(timeout, future) => match outcome {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, ?timeout, "Operation timed out");
                Err(PatternAnalyzerError::timeout(operation, timeout))
            }
        },
    }
}

/// Extension trait for extracting typed values from database rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use pattern_analyzer_core::adapters::helpers::RowExt;
///
/// let count: i64 = row.get_field(0, "row count")?;
/// ```
#[cfg(feature = "postgresql")]
pub trait RowExt {
    /// Extracts a typed cell by position with the given context in errors.
    ///
    /// # Errors
    /// Returns a query-execution error if the cell cannot be decoded as `T`
    fn get_field<'r, T>(&'r self, index: usize, context: &str) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

#[cfg(feature = "postgresql")]
impl RowExt for sqlx::postgres::PgRow {
    fn get_field<'r, T>(&'r self, index: usize, context: &str) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        use sqlx::Row;
        self.try_get(index).map_err(|e| {
            PatternAnalyzerError::query_failed(format!(
                "Failed to decode column {index} ({context}): {e}"
            ))
        })
    }
}

/// Maps a sqlx query error, recognizing permission failures (SQLSTATE 42501).
#[cfg(feature = "postgresql")]
pub fn map_sqlx_query_error(operation: &str, error: &sqlx::Error) -> PatternAnalyzerError {
    match error {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("42501") => {
            PatternAnalyzerError::insufficient_privileges(format!(
                "{operation}: {}",
                db_err.message()
            ))
        }
        sqlx::Error::Database(db_err) => {
            PatternAnalyzerError::query_failed(format!("{operation}: {}", db_err.message()))
        }
        other => PatternAnalyzerError::query_failed(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_normally() {
        let token = CancellationToken::new();
        let value = run_cancellable("add", Duration::from_secs(1), &token, async { Ok(2 + 2) })
            .await
            .unwrap();
        assert_eq!(value, 4);
    }

    #[tokio::test]
    async fn test_propagates_inner_error() {
        let token = CancellationToken::new();
        let result: Result<()> = run_cancellable("fail", Duration::from_secs(1), &token, async {
            Err(PatternAnalyzerError::query_failed("syntax error"))
        })
        .await;
        assert!(matches!(
            result,
            Err(PatternAnalyzerError::QueryExecution { .. })
        ));
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<()> =
            run_cancellable("sample", Duration::from_secs(1), &token, async { Ok(()) }).await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_pending() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result: Result<()> = run_cancellable("sample", Duration::from_secs(60), &token, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_distinct_from_cancel() {
        let token = CancellationToken::new();
        let result: Result<()> = run_cancellable("list tables", Duration::from_secs(1), &token, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(!err.is_cancelled());
        assert!(matches!(err, PatternAnalyzerError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_drop_releases_owned_resource() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        struct Guard(Arc<AtomicBool>);
        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let released = Arc::new(AtomicBool::new(false));
        let guard = Guard(Arc::clone(&released));
        let token = CancellationToken::new();
        token.cancel();

        let result: Result<()> = run_cancellable("hold", Duration::from_secs(1), &token, async move {
            let _held = guard;
            std::future::pending::<()>().await;
            Ok(())
        })
        .await;

        assert!(result.unwrap_err().is_cancelled());
        assert!(released.load(Ordering::SeqCst));
    }
}
