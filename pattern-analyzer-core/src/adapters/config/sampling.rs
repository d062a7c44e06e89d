//! Data sampling configuration.
//!
//! Bounds how many rows the sampler pulls and how many catalog rows the
//! schema browser returns.

use crate::error::PatternAnalyzerError;
use crate::models::DEFAULT_ROW_LIMIT;
use serde::{Deserialize, Serialize};

/// Configuration for sampling and introspection limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Row limit applied when a request does not set one
    pub default_row_limit: u32,
    /// Hard ceiling; larger requests are clamped
    pub max_row_limit: u32,
    /// Ceiling on schema, table and column listings
    pub metadata_row_cap: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_row_limit: DEFAULT_ROW_LIMIT,
            max_row_limit: 100_000,
            metadata_row_cap: 1000,
        }
    }
}

impl SamplingConfig {
    /// Creates a new sampling config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the default row limit.
    pub fn with_default_row_limit(mut self, limit: u32) -> Self {
        self.default_row_limit = limit;
        self
    }

    /// Builder method to set the maximum row limit.
    pub fn with_max_row_limit(mut self, limit: u32) -> Self {
        self.max_row_limit = limit;
        self
    }

    /// Builder method to set the metadata listing cap.
    pub fn with_metadata_row_cap(mut self, cap: u32) -> Self {
        self.metadata_row_cap = cap;
        self
    }

    /// Resolves the effective row limit for a request.
    ///
    /// Limits above `max_row_limit` are clamped with a warning.
    ///
    /// # Errors
    /// Returns a configuration error when `requested` is 0
    pub fn effective_limit(&self, requested: u32) -> crate::Result<u32> {
        if requested == 0 {
            return Err(PatternAnalyzerError::configuration(
                "row limit must be greater than 0",
            ));
        }

        if requested > self.max_row_limit {
            tracing::warn!(
                requested,
                max = self.max_row_limit,
                "Row limit exceeds maximum, clamping"
            );
            return Ok(self.max_row_limit);
        }

        Ok(requested)
    }

    /// Validates sampling configuration parameters.
    ///
    /// # Errors
    /// Returns error if any limit is zero or the default exceeds the maximum
    pub fn validate(&self) -> crate::Result<()> {
        if self.default_row_limit == 0 || self.max_row_limit == 0 || self.metadata_row_cap == 0 {
            return Err(PatternAnalyzerError::configuration(
                "sampling limits must be greater than 0",
            ));
        }

        if self.default_row_limit > self.max_row_limit {
            return Err(PatternAnalyzerError::configuration(format!(
                "default_row_limit ({}) exceeds max_row_limit ({})",
                self.default_row_limit, self.max_row_limit
            )));
        }

        Ok(())
    }
}
