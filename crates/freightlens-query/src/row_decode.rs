use freightlens_core::dates::parse_iso_date;
use freightlens_core::warehouse::{Row, SqlValue};
use time::Date;

fn cell<'a>(row: &'a Row, idx: usize, name: &str) -> Result<&'a SqlValue, String> {
    row.get(idx)
        .ok_or_else(|| format!("result row missing column `{name}`"))
}

pub(crate) fn col_text(row: &Row, idx: usize, name: &str) -> Result<String, String> {
    match cell(row, idx, name)? {
        SqlValue::Text(v) => Ok(v.clone()),
        other => Err(format!("column `{name}` expected text, got {other:?}")),
    }
}

pub(crate) fn col_opt_text(row: &Row, idx: usize, name: &str) -> Result<Option<String>, String> {
    match cell(row, idx, name)? {
        SqlValue::Null => Ok(None),
        SqlValue::Text(v) if v.is_empty() => Ok(None),
        SqlValue::Text(v) => Ok(Some(v.clone())),
        other => Err(format!("column `{name}` expected text, got {other:?}")),
    }
}

pub(crate) fn col_u64(row: &Row, idx: usize, name: &str) -> Result<u64, String> {
    match cell(row, idx, name)? {
        SqlValue::Int(v) if *v >= 0 => Ok(*v as u64),
        other => Err(format!(
            "column `{name}` expected non-negative integer, got {other:?}"
        )),
    }
}

pub(crate) fn col_opt_f64(row: &Row, idx: usize, name: &str) -> Result<Option<f64>, String> {
    match cell(row, idx, name)? {
        SqlValue::Null => Ok(None),
        SqlValue::Float(v) => Ok(Some(*v)),
        SqlValue::Int(v) => Ok(Some(*v as f64)),
        other => Err(format!("column `{name}` expected real, got {other:?}")),
    }
}

pub(crate) fn col_date(row: &Row, idx: usize, name: &str) -> Result<Date, String> {
    parse_iso_date(&col_text(row, idx, name)?)
        .map_err(|e| format!("column `{name}` holds a malformed date: {e}"))
}

pub(crate) fn col_opt_date(row: &Row, idx: usize, name: &str) -> Result<Option<Date>, String> {
    match col_opt_text(row, idx, name)? {
        None => Ok(None),
        Some(raw) => parse_iso_date(&raw)
            .map(Some)
            .map_err(|e| format!("column `{name}` holds a malformed date: {e}")),
    }
}

/// Decodes a JSON-array column produced by the top-routes/top-carriers CTEs.
pub(crate) fn col_string_array(row: &Row, idx: usize, name: &str) -> Result<Vec<String>, String> {
    let raw = col_text(row, idx, name)?;
    serde_json::from_str::<Vec<String>>(&raw)
        .map_err(|e| format!("column `{name}` holds malformed JSON: {e}"))
}
