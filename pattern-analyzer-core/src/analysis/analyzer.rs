//! Strategy dispatcher.
//!
//! The `Analyzer` owns an ordered registry of strategies and hands each
//! request to the first one that can handle its analysis type.

use super::auto::AutoStrategy;
use super::pattern::RegexStrategy;
use super::prefix::PrefixStrategy;
use super::preview::detect_value_shapes;
use super::sequence::SequenceStrategy;
use super::strategy::AnalysisStrategy;
use crate::models::{AnalysisRequest, AnalysisResult, MAX_PREVIEW_VALUES};

/// Dispatches analysis requests to registered strategies.
///
/// Every result, including failures, carries the preview pass: detected
/// value shapes and up to ten sample values.
///
/// # Example
///
/// ```rust
/// use pattern_analyzer_core::adapters::{ConnectionDescriptor, Dialect};
/// use pattern_analyzer_core::analysis::Analyzer;
/// use pattern_analyzer_core::models::{AnalysisRequest, AnalysisType};
///
/// let descriptor = ConnectionDescriptor::new(Dialect::Postgres, "localhost", "app");
/// let request = AnalysisRequest::new(descriptor, AnalysisType::Prefix)
///     .with_column("public", "orders", "order_no");
///
/// let sample = ["ABC001", "ABC002", "ABC999"].map(String::from);
/// let result = Analyzer::new().analyze(&sample, &request);
///
/// assert!(result.success);
/// assert_eq!(result.common_prefix.as_deref(), Some("ABC"));
/// assert!((result.match_percentage() - 100.0).abs() < f64::EPSILON);
/// ```
pub struct Analyzer {
    strategies: Vec<Box<dyn AnalysisStrategy>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Analyzer {
    /// Creates an analyzer with the prefix, sequence, regex and auto
    /// strategies registered.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(PrefixStrategy),
            Box::new(SequenceStrategy),
            Box::new(RegexStrategy),
            Box::new(AutoStrategy::new(SequenceStrategy, PrefixStrategy)),
        ])
    }

    /// Creates an analyzer over an explicit strategy list, scanned in order.
    pub fn with_strategies(strategies: Vec<Box<dyn AnalysisStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the registered strategies, in scan order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Analyzes `sample` with the first strategy that handles the request's
    /// analysis type.
    ///
    /// When no strategy matches, returns a failed result with the message
    /// "no suitable strategy found".
    pub fn analyze(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        let strategy = self
            .strategies
            .iter()
            .find(|strategy| strategy.can_handle(request.analysis_type));

        let mut result = match strategy {
            Some(strategy) => {
                tracing::debug!(
                    strategy = strategy.name(),
                    values = sample.len(),
                    "Running analysis strategy"
                );
                strategy.execute(sample, request)
            }
            None => {
                tracing::warn!(analysis_type = %request.analysis_type, "No strategy registered");
                AnalysisResult::failure(
                    request.result_column_name(),
                    request.analysis_type,
                    "no suitable strategy found",
                )
            }
        };

        result.detected_patterns = detect_value_shapes(sample);
        result.sample_values = sample.iter().take(MAX_PREVIEW_VALUES).cloned().collect();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{request, sample};
    use crate::models::AnalysisType;

    #[test]
    fn test_dispatch_by_type() {
        let analyzer = Analyzer::new();
        let values = sample(&["1", "2", "3"]);

        for analysis_type in [AnalysisType::Prefix, AnalysisType::Sequence, AnalysisType::Auto] {
            let result = analyzer.analyze(&values, &request(analysis_type));
            assert_eq!(result.analysis_type, analysis_type);
            assert!(result.success);
        }
    }

    #[test]
    fn test_no_suitable_strategy() {
        let analyzer = Analyzer::with_strategies(vec![Box::new(PrefixStrategy)]);
        let result = analyzer.analyze(&sample(&["a"]), &request(AnalysisType::Sequence));

        assert!(!result.success);
        assert_eq!(result.message, "no suitable strategy found");
        assert_eq!(result.analysis_type, AnalysisType::Sequence);
    }

    #[test]
    fn test_preview_attached_and_capped() {
        let values: Vec<String> = (1..=25).map(|i| i.to_string()).collect();
        let result = Analyzer::new().analyze(&values, &request(AnalysisType::Sequence));

        assert_eq!(result.sample_values.len(), MAX_PREVIEW_VALUES);
        assert_eq!(result.sample_values[0], "1");
        assert_eq!(result.detected_patterns, vec!["Numeric".to_string()]);
    }

    #[test]
    fn test_preview_attached_to_failures() {
        let result = Analyzer::new().analyze(&sample(&["abc"]), &request(AnalysisType::Regex));
        assert!(!result.success);
        assert_eq!(result.sample_values, vec!["abc".to_string()]);
        assert_eq!(result.detected_patterns, vec!["Alphabetic".to_string()]);
    }

    #[test]
    fn test_first_registered_strategy_wins() {
        struct Shadow;
        impl AnalysisStrategy for Shadow {
            fn name(&self) -> &'static str {
                "shadow"
            }
            fn can_handle(&self, _: AnalysisType) -> bool {
                true
            }
            fn execute(&self, _: &[String], request: &AnalysisRequest) -> AnalysisResult {
                AnalysisResult::success(request.result_column_name(), request.analysis_type, "shadowed")
            }
        }

        let analyzer = Analyzer::with_strategies(vec![Box::new(Shadow), Box::new(PrefixStrategy)]);
        let result = analyzer.analyze(&sample(&["a"]), &request(AnalysisType::Prefix));
        assert_eq!(result.message, "shadowed");
        assert_eq!(analyzer.strategy_names(), vec!["shadow", "prefix"]);
    }
}
