//! Regular-expression matching over a sample.

use super::strategy::AnalysisStrategy;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisType};
use regex::RegexBuilder;

/// Compiled program size ceiling for user-supplied patterns.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Matches every value against the request's pattern.
///
/// Matching uses substring search: a match anywhere in the value counts
/// unless the pattern is anchored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexStrategy;

impl RegexStrategy {
    /// Runs regex matching over `sample`.
    pub fn analyze(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        let column = request.result_column_name();

        let pattern = request.regex_pattern.as_deref().unwrap_or_default();
        if pattern.trim().is_empty() {
            return AnalysisResult::failure(column, AnalysisType::Regex, "pattern is empty");
        }

        let regex = match RegexBuilder::new(pattern)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => regex,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected regular expression");
                return AnalysisResult::failure(
                    column,
                    AnalysisType::Regex,
                    format!("invalid pattern: {e}"),
                );
            }
        };

        let mut result = AnalysisResult::success(column, AnalysisType::Regex, String::new());
        result.total_rows_analyzed = sample.len();
        for value in sample {
            if regex.is_match(value) {
                result.match_count += 1;
            } else {
                result.record_violation(value.clone());
            }
        }
        result.message = format!(
            "{} of {} values match '{pattern}'",
            result.match_count, result.total_rows_analyzed
        );

        result
    }
}

impl AnalysisStrategy for RegexStrategy {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn can_handle(&self, analysis_type: AnalysisType) -> bool {
        analysis_type == AnalysisType::Regex
    }

    fn execute(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        self.analyze(sample, request)
    }
}
