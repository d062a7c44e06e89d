//! Bounded column sampling.
//!
//! The sampler returns values as text, sorted ascending by the column's own
//! ordering and capped at a row limit. Sorted order is what makes the
//! sequence strategy's gap detection meaningful.
//!
//! # Security
//! - Column projections quote every identifier and bind range bounds
//! - [`Sampler::run_custom_query`] executes caller SQL as given; only the
//!   limit clause is appended. Do not route untrusted input through it.

use crate::adapters::helpers::run_cancellable;
use crate::adapters::{
    ConnectionConfig, ConnectionDescriptor, SamplingConfig, Statement, TextRow, query_once,
};
use crate::error::PatternAnalyzerError;
use crate::models::{AnalysisRequest, ColumnRef, ValueRange};
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Pulls value samples from one connection.
#[derive(Debug, Clone)]
pub struct Sampler {
    descriptor: ConnectionDescriptor,
    connection_config: ConnectionConfig,
    sampling_config: SamplingConfig,
}

impl Sampler {
    /// Creates a sampler for `descriptor`.
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

    /// The sampling limits in effect.
    pub fn sampling_config(&self) -> &SamplingConfig {
        &self.sampling_config
    }

    /// Samples up to `limit` non-null values of `column`, sorted ascending.
    ///
    /// # Errors
    /// Returns error if the limit is 0, the session cannot be opened, the
    /// query fails, or the operation is cancelled or times out
    pub async fn sample(
        &self,
        column: &ColumnRef,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        self.sample_within(
            &column.table.schema,
            &column.table.name,
            &column.name,
            ValueRange::default(),
            limit,
            cancel,
        )
        .await
    }

    /// Samples a column restricted to an inclusive value range.
    ///
    /// Bounds are integers bound as parameters; a non-numeric column
    /// surfaces the database's type error as a query failure.
    ///
    /// # Errors
    /// Same as [`Sampler::sample`]
    pub async fn sample_within(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        range: ValueRange,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let limit = self.sampling_config.effective_limit(limit)?;
        let bounded = !range.is_unbounded();
        let statement = self
            .descriptor
            .dialect
            .sample_column_sql(schema, table, column, range, limit);

        let rows = self.fetch_statement("sample column", &statement, cancel).await?;
        let values: Vec<String> = rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect();

        tracing::info!(
            column = %format!("{schema}.{table}.{column}"),
            values = values.len(),
            limit,
            bounded,
            "Sampled column"
        );
        Ok(values)
    }

    /// Runs caller-supplied SQL with a dialect limit clause appended.
    ///
    /// Each row contributes its first non-null cell; rows that are entirely
    /// NULL are skipped.
    ///
    /// # Errors
    /// Returns a configuration error for empty SQL or a zero limit, and a
    /// query-execution error carrying the database message for bad SQL
    pub async fn run_custom_query(
        &self,
        sql: &str,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        if sql.trim().is_empty() {
            return Err(PatternAnalyzerError::configuration(
                "custom SQL cannot be empty",
            ));
        }

        let limit = self.sampling_config.effective_limit(limit)?;
        let statement = Statement::new(self.descriptor.dialect.append_limit(sql, limit));

        let rows = self.fetch_statement("run custom query", &statement, cancel).await?;
        let values: Vec<String> = rows
            .into_iter()
            .filter_map(|row| row.into_iter().flatten().next())
            .collect();

        tracing::info!(values = values.len(), limit, "Custom query returned values");
        Ok(values)
    }

    /// Fetches the sample an analysis request describes.
    ///
    /// Uses the custom SQL path when the request's flag is set, otherwise
    /// the quoted column projection with the request's range bounds.
    ///
    /// # Errors
    /// Returns error if the request is invalid or sampling fails
    pub async fn fetch(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        request.validate()?;

        match (request.use_custom_sql, request.custom_sql.as_deref()) {
            (true, Some(sql)) => self.run_custom_query(sql, request.limit, cancel).await,
            _ => {
                self.sample_within(
                    &request.schema,
                    &request.table,
                    &request.column,
                    request.range(),
                    request.limit,
                    cancel,
                )
                .await
            }
        }
    }

    async fn fetch_statement(
        &self,
        operation: &str,
        statement: &Statement,
        cancel: &CancellationToken,
    ) -> Result<Vec<TextRow>> {
        tracing::debug!(
            operation,
            sql = %statement.sql,
            params = statement.params.len(),
            "Running sampling query"
        );

        let timeout = self.connection_config.connect_timeout + self.connection_config.query_timeout;
        run_cancellable(
            operation,
            timeout,
            cancel,
            query_once(&self.descriptor, &self.connection_config, statement),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Dialect;
    use crate::models::{AnalysisType, TableRef};

    fn sampler() -> Sampler {
        Sampler::new(
            ConnectionDescriptor::new(Dialect::Postgres, "127.0.0.1", "app").with_port(1),
            ConnectionConfig::default(),
            SamplingConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_zero_limit_rejected_before_connecting() {
        let column = ColumnRef::new(TableRef::new("public", "t"), "id", "integer", false);
        let err = sampler()
            .sample(&column, 0, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PatternAnalyzerError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_empty_custom_sql_rejected() {
        let err = sampler()
            .run_custom_query("  ", 10, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PatternAnalyzerError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_fetch_validates_request() {
        let request = AnalysisRequest::new(
            ConnectionDescriptor::new(Dialect::Postgres, "127.0.0.1", "app"),
            AnalysisType::Prefix,
        );
        let err = sampler()
            .fetch(&request, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PatternAnalyzerError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_sampling() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = sampler()
            .sample_within("public", "t", "id", ValueRange::default(), 10, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
