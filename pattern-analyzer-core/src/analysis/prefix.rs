//! Longest-common-prefix detection.

use super::strategy::AnalysisStrategy;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisType};

/// Finds the longest prefix shared by every sampled value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixStrategy;

/// Computes the longest common prefix, comparing by character.
///
/// Starts from the first value and shrinks the running prefix against each
/// later value, stopping as soon as it is empty. Returns `None` for an empty
/// sample.
///
/// # Example
/// ```rust
/// use pattern_analyzer_core::analysis::longest_common_prefix;
///
/// let values = ["ABC001", "ABC002", "ABC999"].map(String::from);
/// assert_eq!(longest_common_prefix(&values), Some("ABC"));
/// ```
pub fn longest_common_prefix(values: &[String]) -> Option<&str> {
    let (first, rest) = values.split_first()?;
    let mut prefix: &str = first;

    for value in rest {
        if prefix.is_empty() {
            break;
        }
        let matched = prefix
            .char_indices()
            .zip(value.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((index, c), _)| index + c.len_utf8());
        prefix = &prefix[..matched];
    }

    Some(prefix)
}

impl PrefixStrategy {
    /// Runs prefix detection over `sample`.
    pub fn analyze(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        let column = request.result_column_name();

        let Some(prefix) = longest_common_prefix(sample) else {
            return AnalysisResult::success(column, AnalysisType::Prefix, "no data");
        };

        let mut result = AnalysisResult::success(column, AnalysisType::Prefix, "");
        result.total_rows_analyzed = sample.len();
        result.match_count = sample.iter().filter(|v| v.starts_with(prefix)).count();
        result.message = if prefix.is_empty() {
            "no common prefix found".to_string()
        } else {
            format!("common prefix '{prefix}' found in {} values", result.match_count)
        };
        result.common_prefix = Some(prefix.to_string());

        if result.match_count != result.total_rows_analyzed {
            tracing::warn!(
                matched = result.match_count,
                total = result.total_rows_analyzed,
                "Prefix self-check failed"
            );
        }

        result
    }
}

impl AnalysisStrategy for PrefixStrategy {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn can_handle(&self, analysis_type: AnalysisType) -> bool {
        analysis_type == AnalysisType::Prefix
    }

    fn execute(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult {
        self.analyze(sample, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{request, sample};

    #[test]
    fn test_shared_prefix() {
        let result = PrefixStrategy.analyze(
            &sample(&["ABC001", "ABC002", "ABC999"]),
            &request(AnalysisType::Prefix),
        );

        assert!(result.success);
        assert_eq!(result.common_prefix.as_deref(), Some("ABC"));
        assert_eq!(result.match_count, 3);
        assert_eq!(result.total_rows_analyzed, 3);
    }

    #[test]
    fn test_no_shared_prefix() {
        let result = PrefixStrategy.analyze(
            &sample(&["ABC", "DEF", "GHI"]),
            &request(AnalysisType::Prefix),
        );

        assert!(result.success);
        assert_eq!(result.common_prefix.as_deref(), Some(""));
        assert_eq!(result.match_count, 3);
    }

    #[test]
    fn test_empty_sample() {
        let result = PrefixStrategy.analyze(&[], &request(AnalysisType::Prefix));

        assert!(result.success);
        assert_eq!(result.common_prefix, None);
        assert_eq!(result.message, "no data");
        assert_eq!(result.total_rows_analyzed, 0);
    }

    #[test]
    fn test_single_value_is_its_own_prefix() {
        let values = sample(&["ORD-7"]);
        assert_eq!(longest_common_prefix(&values), Some("ORD-7"));
    }

    #[test]
    fn test_shorter_value_bounds_prefix() {
        let values = sample(&["INV-2024-001", "INV-2024", "INV-2024-9"]);
        assert_eq!(longest_common_prefix(&values), Some("INV-2024"));
    }

    #[test]
    fn test_multibyte_characters() {
        let values = sample(&["résumé-1", "résumé-2", "rés"]);
        assert_eq!(longest_common_prefix(&values), Some("rés"));

        let values = sample(&["é1", "è1"]);
        assert_eq!(longest_common_prefix(&values), Some(""));
    }

    #[test]
    fn test_can_handle() {
        assert!(PrefixStrategy.can_handle(AnalysisType::Prefix));
        assert!(!PrefixStrategy.can_handle(AnalysisType::Auto));
    }
}
