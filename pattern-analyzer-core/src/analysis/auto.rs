//! Heuristic selection between sequence and prefix detection.
//!
//! Precedence is fixed: a consecutive integer sequence wins over a shared
//! prefix, and a shared prefix wins over "no pattern". The order is a
//! heuristic carried over as-is, not a proven-optimal ranking.

use super::prefix::PrefixStrategy;
use super::sequence::SequenceStrategy;
use super::strategy::AnalysisStrategy;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisType};

/// Composes [`SequenceStrategy`] and [`PrefixStrategy`] in a fixed order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoStrategy {
    sequence: SequenceStrategy,
    prefix: PrefixStrategy,
}

impl AutoStrategy {
    /// Creates the strategy over explicit collaborators.
    pub fn new(sequence: SequenceStrategy, prefix: PrefixStrategy) -> Self {
        Self { sequence, prefix }
    }

    /// Runs detection over `sample`; see [`detect_pattern`].
    pub fn analyze(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        detect_pattern(&self.sequence, &self.prefix, sample, request)
    }
}

/// Picks the first pattern that applies, in precedence order.
///
/// 1. Sequence, when it is sequential over at least one parsed integer.
/// 2. Prefix, when the common prefix is non-empty.
/// 3. Otherwise a successful "no pattern detected" with zero matches.
///
/// Chosen results are re-tagged as [`AnalysisType::Auto`] with the
/// detection reason appended to the message.
pub fn detect_pattern(
    sequence: &SequenceStrategy,
    prefix: &PrefixStrategy,
    sample: &[String],
    request: &AnalysisRequest,
) -> AnalysisResult {
    let by_sequence = sequence.analyze(sample, request);
    if by_sequence.is_sequential && by_sequence.match_count > 0 {
        return retag(by_sequence, "detected as consecutive integer sequence");
    }

    let by_prefix = prefix.analyze(sample, request);
    if by_prefix
        .common_prefix
        .as_deref()
        .is_some_and(|p| !p.is_empty())
    {
        return retag(by_prefix, "detected as shared prefix");
    }

    let mut result = AnalysisResult::success(
        request.result_column_name(),
        AnalysisType::Auto,
        "no pattern detected",
    );
    result.total_rows_analyzed = sample.len();
    result
}

fn retag(mut result: AnalysisResult, reason: &str) -> AnalysisResult {
    result.analysis_type = AnalysisType::Auto;
    result.message = format!("{} ({reason})", result.message);
    result
}

impl AnalysisStrategy for AutoStrategy {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn can_handle(&self, analysis_type: AnalysisType) -> bool {
        analysis_type == AnalysisType::Auto
    }

    fn execute(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        self.analyze(sample, request)
    }
}
