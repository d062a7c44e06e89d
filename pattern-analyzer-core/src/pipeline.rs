//! Sample-then-analyze for a single request.

use crate::analysis::Analyzer;
use crate::error::PatternAnalyzerError;
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::sampler::Sampler;
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fetches a request's sample and runs the analyzer over it.
///
/// Strategies run on tokio's blocking pool so large samples never stall the
/// caller's runtime thread.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    sampler: Sampler,
    analyzer: Arc<Analyzer>,
}

impl AnalysisPipeline {
    /// Creates a pipeline from explicit collaborators.
    pub fn new(sampler: Sampler, analyzer: Arc<Analyzer>) -> Self {
        Self { sampler, analyzer }
    }

    /// Runs one request end to end.
    ///
    /// Pattern problems (empty or invalid regex, no strategy) come back as a
    /// failed [`AnalysisResult`]; only data-access problems are errors.
    ///
    /// # Errors
    /// Returns error if the request is invalid, sampling fails, or the
    /// caller cancels
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let sample = self.sampler.fetch(request, cancel).await?;
        tracing::info!(
            column = request.result_column_name(),
            analysis_type = %request.analysis_type,
            values = sample.len(),
            "Analyzing sample"
        );

        let analyzer = Arc::clone(&self.analyzer);
        let owned_request = request.clone();
        let task = tokio::task::spawn_blocking(move || analyzer.analyze(&sample, &owned_request));

        let mut result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(PatternAnalyzerError::cancelled("analyze sample"));
            }
            joined = task => match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "Analysis task did not complete");
                    AnalysisResult::failure(
                        request.result_column_name(),
                        request.analysis_type,
                        format!("analysis task failed: {e}"),
                    )
                }
            },
        };

        result.column_name = request.result_column_name().to_string();
        tracing::info!(
            success = result.success,
            matches = result.match_count,
            total = result.total_rows_analyzed,
            "Analysis complete"
        );
        Ok(result)
    }
}
