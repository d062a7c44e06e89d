//! Rendering of command results as text or JSON.

use clap::ValueEnum;
use pattern_analyzer_core::{AnalysisResult, ColumnRef, Preset, TableRef};
use serde_json::Value;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Renders an analysis result.
///
/// JSON output carries the derived `match_percentage` next to the stored
/// fields.
pub fn render_result(result: &AnalysisResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(result)?;
            if let Value::Object(fields) = &mut value {
                fields.insert(
                    "match_percentage".to_string(),
                    Value::from(result.match_percentage()),
                );
            }
            Ok(serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Text => Ok(render_result_text(result)),
    }
}

fn render_result_text(result: &AnalysisResult) -> String {
    let mut lines = vec![
        format!("Column:         {}", result.column_name),
        format!("Analysis:       {}", result.analysis_type),
        format!(
            "Status:         {}",
            if result.success { "success" } else { "failed" }
        ),
        format!("Message:        {}", result.message),
        format!("Rows analyzed:  {}", result.total_rows_analyzed),
        format!(
            "Matches:        {} ({:.2}%)",
            result.match_count,
            result.match_percentage()
        ),
    ];

    if let Some(prefix) = &result.common_prefix {
        lines.push(format!("Common prefix:  '{prefix}'"));
    }
    if result.analysis_type == pattern_analyzer_core::AnalysisType::Sequence || result.is_sequential {
        lines.push(format!(
            "Sequential:     {}",
            if result.is_sequential { "yes" } else { "no" }
        ));
    }
    if !result.sample_violations.is_empty() {
        lines.push("Violations:".to_string());
        lines.extend(result.sample_violations.iter().map(|v| format!("  - {v}")));
    }
    if !result.detected_patterns.is_empty() {
        lines.push(format!("Value shapes:   {}", result.detected_patterns.join(", ")));
    }
    if !result.sample_values.is_empty() {
        lines.push(format!("Sample values:  {}", result.sample_values.join(", ")));
    }

    lines.join("\n")
}

/// Renders a plain list of names.
pub fn render_names(names: &[String], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(names)?),
        OutputFormat::Text => Ok(names.join("\n")),
    }
}

/// Renders a table listing.
pub fn render_tables(tables: &[TableRef], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(tables)?),
        OutputFormat::Text => Ok(tables
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Renders a column listing.
pub fn render_columns(columns: &[ColumnRef], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(columns)?),
        OutputFormat::Text => {
            let width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
            Ok(columns
                .iter()
                .map(|c| {
                    format!(
                        "{:<width$}  {}{}",
                        c.name,
                        c.data_type,
                        if c.is_nullable { "" } else { " NOT NULL" }
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

/// Renders a preset listing.
pub fn render_presets(presets: &[Preset], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(presets)?),
        OutputFormat::Text => Ok(presets
            .iter()
            .map(|p| {
                let target = if p.request.use_custom_sql {
                    "custom SQL".to_string()
                } else {
                    format!("{}.{}.{}", p.request.schema, p.request.table, p.request.column)
                };
                format!(
                    "{}  {} on {} @ {} (saved {})",
                    p.name,
                    p.request.analysis_type,
                    target,
                    p.request.connection.label(),
                    p.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
