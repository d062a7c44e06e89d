//! Core data access and pattern analysis for Pattern Analyzer.
//!
//! This crate browses a relational database, pulls a bounded sample of
//! values from one column, and checks whether those values follow a
//! structural pattern: a shared prefix, a consecutive integer sequence, or a
//! user-supplied regular expression. The `pattern-analyzer` binary is a thin
//! boundary over it.
//!
//! # Security Guarantees
//! - All database sessions are opened read-only
//! - Credentials are zeroized on drop and never serialized or logged
//! - Identifiers are quoted; values only ever travel as bound parameters
//! - Sampling is always bounded by a row limit
//!
//! # Architecture
//! - [`adapters`]: dialect SQL templates and one-shot driver sessions
//! - [`browser`], [`sampler`]: introspection and sampling over a session
//! - [`analysis`]: CPU-only strategies and the dispatcher
//! - [`pipeline`]: sample-then-analyze for one request
//! - [`presets`]: named requests persisted as JSON

pub mod adapters;
pub mod analysis;
pub mod browser;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod presets;
pub mod sampler;
pub mod security;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, ConnectionDescriptor, Dialect, SamplingConfig};
pub use analysis::{AnalysisStrategy, Analyzer};
pub use browser::SchemaBrowser;
pub use error::{PatternAnalyzerError, Result};
pub use models::{
    AnalysisRequest, AnalysisResult, AnalysisType, ColumnRef, ConnectionTestOutcome, TableRef,
    ValueRange,
};
pub use pipeline::AnalysisPipeline;
pub use presets::{Preset, PresetStore};
pub use sampler::Sampler;
pub use security::Credentials;
