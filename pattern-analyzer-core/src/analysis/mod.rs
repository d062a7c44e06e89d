//! Column pattern analysis.
//!
//! This module provides the pattern-detection strategies and the dispatcher
//! that selects among them:
//! - **Prefix**: longest common prefix of all values
//! - **Sequence**: integers increasing by exactly one
//! - **Regex**: user-supplied regular expression, substring semantics
//! - **Auto**: sequence, then prefix, then "no pattern"
//!
//! Strategies are CPU-only and work on an in-memory sample. Bad user input
//! becomes a failed [`AnalysisResult`](crate::models::AnalysisResult), never
//! an error.
//!
//! # Example
//! ```rust
//! use pattern_analyzer_core::adapters::{ConnectionDescriptor, Dialect};
//! use pattern_analyzer_core::analysis::Analyzer;
//! use pattern_analyzer_core::models::{AnalysisRequest, AnalysisType};
//!
//! let descriptor = ConnectionDescriptor::new(Dialect::Postgres, "localhost", "app");
//! let request = AnalysisRequest::new(descriptor, AnalysisType::Sequence)
//!     .with_column("public", "invoices", "id");
//!
//! let sample = ["1", "2", "4", "5"].map(String::from);
//! let result = Analyzer::new().analyze(&sample, &request);
//! assert!(!result.is_sequential);
//! assert_eq!(result.sample_violations, vec!["2 -> 4".to_string()]);
//! ```

mod analyzer;
mod auto;
mod pattern;
mod prefix;
mod preview;
mod sequence;
mod strategy;

// Re-export public API
pub use analyzer::Analyzer;
pub use auto::{AutoStrategy, detect_pattern};
pub use pattern::RegexStrategy;
pub use prefix::{PrefixStrategy, longest_common_prefix};
pub use preview::detect_value_shapes;
pub use sequence::SequenceStrategy;
pub use strategy::AnalysisStrategy;
