//! Core data models for column pattern analysis.
//!
//! This module defines the value objects shared by the schema browser, the
//! sampler and the analysis strategies. All models are serializable; none of
//! them carry a password in serialized form.

use crate::adapters::ConnectionDescriptor;
use serde::{Deserialize, Serialize};

/// Maximum number of violating values recorded on a result.
pub const MAX_SAMPLE_VIOLATIONS: usize = 5;

/// Maximum number of sample values attached to a result for preview.
pub const MAX_PREVIEW_VALUES: usize = 10;

/// Row limit used when a request does not specify one.
pub const DEFAULT_ROW_LIMIT: u32 = 1000;

/// Identifies a table uniquely within a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Owning schema (Oracle: owner)
    pub schema: String,
    /// Table name as stored in the catalog
    pub name: String,
}

impl TableRef {
    /// Creates a table reference.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Column metadata as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Column name as stored in the catalog
    pub name: String,
    /// Type name reported by the database
    pub data_type: String,
    /// Whether the column accepts NULL
    pub is_nullable: bool,
    /// Table the column belongs to
    pub table: TableRef,
}

impl ColumnRef {
    /// Creates a column reference owned by `table`.
    pub fn new(
        table: TableRef,
        name: impl Into<String>,
        data_type: impl Into<String>,
        is_nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable,
            table,
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// The pattern-detection algorithm requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Longest common prefix
    Prefix,
    /// Strictly increasing integers with step 1
    Sequence,
    /// User-supplied regular expression
    Regex,
    /// Let the analyzer pick between sequence and prefix
    Auto,
}

impl AnalysisType {
    /// All analysis types in declaration order.
    pub const ALL: [Self; 4] = [Self::Prefix, Self::Sequence, Self::Regex, Self::Auto];

    /// Lowercase tag used in serialized requests and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Sequence => "sequence",
            Self::Regex => "regex",
            Self::Auto => "auto",
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisType {
    type Err = crate::error::PatternAnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "sequence" | "seq" => Ok(Self::Sequence),
            "regex" | "pattern" => Ok(Self::Regex),
            "auto" => Ok(Self::Auto),
            other => Err(crate::error::PatternAnalyzerError::configuration(format!(
                "Unknown analysis type '{other}' (expected prefix, sequence, regex or auto)"
            ))),
        }
    }
}

/// Optional inclusive bounds applied to the sampled column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Inclusive lower bound
    pub start: Option<i64>,
    /// Inclusive upper bound
    pub end: Option<i64>,
}

impl ValueRange {
    /// Returns true when neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

fn default_row_limit() -> u32 {
    DEFAULT_ROW_LIMIT
}

/// Everything needed to sample one column and analyze it.
///
/// When `use_custom_sql` is set the schema, table and column names are not
/// used to build the query, but the result is still reported against
/// `column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Database to sample from
    pub connection: ConnectionDescriptor,
    /// Schema of the target table
    #[serde(default)]
    pub schema: String,
    /// Target table
    #[serde(default)]
    pub table: String,
    /// Target column, also the name results are reported against
    #[serde(default)]
    pub column: String,
    /// Caller-supplied SQL, used when `use_custom_sql` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_sql: Option<String>,
    /// Sample through `custom_sql` instead of the column projection
    #[serde(default)]
    pub use_custom_sql: bool,
    /// Inclusive lower bound on the sampled column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_start: Option<i64>,
    /// Inclusive upper bound on the sampled column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_end: Option<i64>,
    /// Maximum number of sampled rows
    #[serde(default = "default_row_limit")]
    pub limit: u32,
    /// Strategy to run over the sample
    pub analysis_type: AnalysisType,
    /// Pattern for regex analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,
}

impl AnalysisRequest {
    /// Creates a request against `connection` with the default row limit and
    /// no target column.
    pub fn new(connection: ConnectionDescriptor, analysis_type: AnalysisType) -> Self {
        Self {
            connection,
            schema: String::new(),
            table: String::new(),
            column: String::new(),
            custom_sql: None,
            use_custom_sql: false,
            range_start: None,
            range_end: None,
            limit: DEFAULT_ROW_LIMIT,
            analysis_type,
            regex_pattern: None,
        }
    }

    /// Builder method to set the target column.
    pub fn with_column(
        mut self,
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.schema = schema.into();
        self.table = table.into();
        self.column = column.into();
        self
    }

    /// Builder method to route sampling through caller-supplied SQL.
    pub fn with_custom_sql(mut self, sql: impl Into<String>) -> Self {
        self.custom_sql = Some(sql.into());
        self.use_custom_sql = true;
        self
    }

    /// Builder method to set inclusive range bounds.
    pub fn with_range(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.range_start = start;
        self.range_end = end;
        self
    }

    /// Builder method to set the row limit.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Builder method to set the regular expression.
    pub fn with_regex_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.regex_pattern = Some(pattern.into());
        self
    }

    /// The table holding the target column.
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.schema, &self.table)
    }

    /// The range bounds as a single value.
    pub fn range(&self) -> ValueRange {
        ValueRange {
            start: self.range_start,
            end: self.range_end,
        }
    }

    /// Name the result is reported against.
    ///
    /// Falls back to `"query"` for custom SQL requests without a column name.
    pub fn result_column_name(&self) -> &str {
        if self.column.is_empty() && self.use_custom_sql {
            "query"
        } else {
            &self.column
        }
    }

    /// Validates that the request names something to sample.
    ///
    /// # Errors
    /// Returns a configuration error when the custom SQL flag is set without
    /// SQL, when schema, table or column is missing otherwise, or when the
    /// range bounds are inverted.
    pub fn validate(&self) -> crate::Result<()> {
        use crate::error::PatternAnalyzerError;

        if self.use_custom_sql {
            if self.custom_sql.as_deref().is_none_or(|sql| sql.trim().is_empty()) {
                return Err(PatternAnalyzerError::configuration(
                    "custom SQL is enabled but no query was supplied",
                ));
            }
        } else {
            for (field, value) in [
                ("schema", &self.schema),
                ("table", &self.table),
                ("column", &self.column),
            ] {
                if value.trim().is_empty() {
                    return Err(PatternAnalyzerError::configuration(format!(
                        "{field} cannot be empty"
                    )));
                }
            }
        }

        if let (Some(start), Some(end)) = (self.range_start, self.range_end)
            && start > end
        {
            return Err(PatternAnalyzerError::configuration(format!(
                "range start {start} is greater than range end {end}"
            )));
        }

        Ok(())
    }
}

/// Outcome of running one strategy over a sample.
///
/// Failures are values, not errors: `success == false` with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Column the result is reported against
    pub column_name: String,
    /// Strategy that produced the result
    pub analysis_type: AnalysisType,
    /// False when the strategy could not analyze the sample
    pub success: bool,
    /// Human-readable summary or failure reason
    pub message: String,
    /// Number of values in the sample
    pub total_rows_analyzed: usize,
    /// Number of values matching the detected pattern
    pub match_count: usize,
    /// Longest prefix shared by every value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_prefix: Option<String>,
    /// Whether the values form an unbroken +1 run
    #[serde(default)]
    pub is_sequential: bool,
    /// First few values that broke the pattern
    #[serde(default)]
    pub sample_violations: Vec<String>,
    /// Value-shape labels seen in the sample
    #[serde(default)]
    pub detected_patterns: Vec<String>,
    /// Leading values of the sample for preview
    #[serde(default)]
    pub sample_values: Vec<String>,
}

impl AnalysisResult {
    /// Creates a successful result with no matches recorded yet.
    pub fn success(
        column_name: impl Into<String>,
        analysis_type: AnalysisType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            analysis_type,
            success: true,
            message: message.into(),
            total_rows_analyzed: 0,
            match_count: 0,
            common_prefix: None,
            is_sequential: false,
            sample_violations: Vec::new(),
            detected_patterns: Vec::new(),
            sample_values: Vec::new(),
        }
    }

    /// Creates a failed result carrying `message`.
    pub fn failure(
        column_name: impl Into<String>,
        analysis_type: AnalysisType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            ..Self::success(column_name, analysis_type, message)
        }
    }

    /// Percentage of analyzed rows that matched, in `[0, 100]`.
    ///
    /// Defined as 0 when no rows were analyzed.
    pub fn match_percentage(&self) -> f64 {
        if self.total_rows_analyzed == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let percentage = self.match_count as f64 / self.total_rows_analyzed as f64 * 100.0;
        percentage.clamp(0.0, 100.0)
    }

    /// Records a violating value unless the cap has been reached.
    ///
    /// Returns whether the value was recorded.
    pub fn record_violation(&mut self, value: impl Into<String>) -> bool {
        if self.sample_violations.len() >= MAX_SAMPLE_VIOLATIONS {
            return false;
        }
        self.sample_violations.push(value.into());
        true
    }
}

/// Yes/no answer of a connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTestOutcome {
    /// Whether the database answered the ping
    pub success: bool,
    /// Connection label on success, error text otherwise
    pub message: String,
    /// Set when the test was aborted by the caller rather than failing
    #[serde(default)]
    pub cancelled: bool,
}

impl ConnectionTestOutcome {
    /// A successful test.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            cancelled: false,
        }
    }

    /// A failed test.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            cancelled: false,
        }
    }

    /// A test aborted by cancellation.
    pub fn cancelled() -> Self {
        Self {
            success: false,
            message: "operation cancelled".to_string(),
            cancelled: true,
        }
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
