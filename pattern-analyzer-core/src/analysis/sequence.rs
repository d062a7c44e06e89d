//! Consecutive integer sequence detection.

use super::strategy::AnalysisStrategy;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisType};

/// Checks that parsed integers increase by exactly one.
///
/// Values that do not parse as integers are counted in
/// `total_rows_analyzed` but never match. The sample is expected in the
/// sampler's ascending order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceStrategy;

impl SequenceStrategy {
    /// Runs sequence detection over `sample`.
    pub fn analyze(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        let mut result = AnalysisResult::success(
            request.result_column_name(),
            AnalysisType::Sequence,
            String::new(),
        );
        result.total_rows_analyzed = sample.len();

        // i128 holds any 64-bit value with room for the +1 step
        let parsed: Vec<i128> = sample
            .iter()
            .filter_map(|value| value.trim().parse::<i128>().ok())
            .collect();

        let mut violations = 0_usize;
        if let Some(&first) = parsed.first() {
            result.match_count = 1;
            for pair in parsed.windows(2) {
                let (previous, current) = (pair[0], pair[1]);
                if previous.checked_add(1) == Some(current) {
                    result.match_count += 1;
                } else {
                    violations += 1;
                    result.record_violation(format!("{previous} -> {current}"));
                }
            }
            tracing::trace!(first, parsed = parsed.len(), violations, "Sequence scan complete");
        }

        result.is_sequential = violations == 0;
        result.message = match (parsed.len(), violations) {
            (0, _) => "no integer values to analyze".to_string(),
            (1, _) => "single integer value, trivially sequential".to_string(),
            (n, 0) => format!("{n} values form a consecutive sequence"),
            (_, v) => format!("sequence broken in {v} places"),
        };

        result
    }
}

impl AnalysisStrategy for SequenceStrategy {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn can_handle(&self, analysis_type: AnalysisType) -> bool {
        analysis_type == AnalysisType::Sequence
    }

    fn execute(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        self.analyze(sample, request)
    }
}
