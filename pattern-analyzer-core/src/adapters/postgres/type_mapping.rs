//! Rendering PostgreSQL cells as text.
//!
//! Sampling queries already cast to text, but custom queries and catalog
//! queries may return any type. Cells are decoded by their wire type name and
//! formatted the way `psql` would print them for the common scalar types.

use crate::adapters::TextRow;
use crate::adapters::helpers::RowExt;
use crate::{Result, error::PatternAnalyzerError};
use sqlx::postgres::PgRow;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Row, TypeInfo, ValueRef};

/// Renders every cell of a row.
///
/// # Errors
/// Returns error if any cell has a type that cannot be rendered
pub fn row_to_text(row: &PgRow) -> Result<TextRow> {
    (0..row.len()).map(|index| cell_to_text(row, index)).collect()
}

/// Renders one cell; SQL NULL becomes `None`.
///
/// # Errors
/// Returns a query-execution error for types without a text rendering
/// (arrays, JSON, geometric types); cast those to `text` in the query.
pub fn cell_to_text(row: &PgRow, index: usize) -> Result<Option<String>> {
    let raw = row.try_get_raw(index).map_err(|e| {
        PatternAnalyzerError::query_failed(format!("Failed to read column {index}: {e}"))
    })?;
    if raw.is_null() {
        return Ok(None);
    }
    let type_name = raw.type_info().name().to_string();

    let text = match type_name.as_str() {
        "BOOL" => row.get_field::<bool>(index, &type_name)?.to_string(),
        "INT2" => row.get_field::<i16>(index, &type_name)?.to_string(),
        "INT4" => row.get_field::<i32>(index, &type_name)?.to_string(),
        "INT8" => row.get_field::<i64>(index, &type_name)?.to_string(),
        "FLOAT4" => row.get_field::<f32>(index, &type_name)?.to_string(),
        "FLOAT8" => row.get_field::<f64>(index, &type_name)?.to_string(),
        "NUMERIC" => row
            .get_field::<sqlx::types::BigDecimal>(index, &type_name)?
            .to_string(),
        "UUID" => row
            .get_field::<sqlx::types::Uuid>(index, &type_name)?
            .to_string(),
        "DATE" => row.get_field::<NaiveDate>(index, &type_name)?.to_string(),
        "TIME" => row.get_field::<NaiveTime>(index, &type_name)?.to_string(),
        "TIMESTAMP" => row
            .get_field::<NaiveDateTime>(index, &type_name)?
            .to_string(),
        "TIMESTAMPTZ" => row
            .get_field::<DateTime<Utc>>(index, &type_name)?
            .to_rfc3339(),
        _ => row.try_get::<String, _>(index).map_err(|_| {
            PatternAnalyzerError::query_failed(format!(
                "Column {index} has type {type_name}, which cannot be sampled as text; \
                 cast it to text in the query"
            ))
        })?,
    };

    Ok(Some(text))
}

