//! The capability contract shared by every analysis algorithm.

use crate::models::{AnalysisRequest, AnalysisResult, AnalysisType};

/// A self-contained pattern-detection algorithm.
///
/// Strategies operate on an already-fetched, in-memory sample and perform no
/// I/O. They are stateless, so running one twice on the same sample yields
/// identical results.
pub trait AnalysisStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this strategy implements `analysis_type`.
    fn can_handle(&self, analysis_type: AnalysisType) -> bool;

    /// Analyzes `sample` and reports against `request`'s column.
    ///
    /// Invalid user input (for example a malformed regex) yields a failed
    /// result rather than an error.
    fn execute(&self, sample: &[String], request: &AnalysisRequest) -> AnalysisResult;
}
