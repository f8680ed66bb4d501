use super::ColumnSource;
use crate::sample::Sample;
use binlens_common::{BinLensError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

type Column = BTreeMap<String, Value>;

/// Column map as produced by the report generator:
/// `{ "<column>": { "<row>": number | "numeric string", ... }, ... }`.
/// A document wrapped as `{ "json_source": { ... } }` is unwrapped.
#[derive(Debug, Clone, Default)]
pub struct JsonColumnSource {
    columns: BTreeMap<String, Column>,
}

impl JsonColumnSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(content)?;
        Self::from_value(doc)
    }

    pub fn from_value(doc: Value) -> Result<Self> {
        let Value::Object(mut root) = doc else {
            return Err(BinLensError::InvalidInput("expected a JSON object of columns".into()));
        };
        if let Some(Value::Object(inner)) = root.remove("json_source") {
            root = inner;
        }
        let mut columns = BTreeMap::new();
        for (name, col) in root {
            columns.insert(name.clone(), column_from(&name, col)?);
        }
        Ok(Self { columns })
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| BinLensError::ColumnNotFound(name.to_owned()))
    }
}

fn column_from(name: &str, col: Value) -> Result<Column> {
    match col {
        Value::Object(rows) => Ok(rows.into_iter().collect()),
        // plain arrays are keyed by position
        Value::Array(cells) => Ok(cells
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect()),
        other => Err(BinLensError::InvalidInput(format!(
            "column '{name}' must be an object or array, found {}",
            type_name(&other)
        ))),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `Ok(None)` for null or blank cells.
fn cell_value(column: &str, row: &str, v: &Value) -> Result<Option<f64>> {
    let invalid = || {
        BinLensError::InvalidInput(format!(
            "column '{column}' row {row}: {} is not numeric",
            match v {
                Value::String(s) => format!("\"{s}\""),
                other => type_name(other).to_owned(),
            }
        ))
    };
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(invalid),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn is_numeric(name: &str, col: &Column) -> bool {
    col.iter().all(|(row, v)| cell_value(name, row, v).is_ok())
}

impl ColumnSource for JsonColumnSource {
    fn column_names(&self) -> Result<Vec<String>> {
        Ok(self.columns.keys().cloned().collect())
    }

    fn numeric_columns(&self) -> Result<Vec<String>> {
        Ok(self
            .columns
            .iter()
            .filter(|(name, col)| is_numeric(name, col))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn paired_columns(&self, x: &str, y: &str) -> Result<Vec<Sample>> {
        let xs = self.column(x)?;
        let ys = self.column(y)?;
        let mut samples = Vec::with_capacity(xs.len());
        let mut skipped = 0usize;
        for (row, xv) in xs {
            let Some(yv) = ys.get(row) else {
                skipped += 1;
                continue;
            };
            match (cell_value(x, row, xv)?, cell_value(y, row, yv)?) {
                (Some(xf), Some(yf)) => samples.push(Sample::new(xf, yf)),
                _ => skipped += 1,
            }
        }
        skipped += ys.keys().filter(|row| !xs.contains_key(*row)).count();
        if skipped > 0 {
            warn!(x, y, skipped, "skipped rows with a missing cell");
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> JsonColumnSource {
        JsonColumnSource::from_value(json!({
            "age": { "0": 23, "1": 35, "2": "41", "3": null },
            "deposit": { "0": 100.5, "1": 250, "2": 80, "3": 10 },
            "job": { "0": "admin", "1": "technician", "2": "admin", "3": "retired" }
        }))
        .unwrap()
    }

    #[test]
    fn pairs_rows_by_key_and_skips_nulls() {
        let mut samples = source().paired_columns("age", "deposit").unwrap();
        samples.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(
            samples,
            vec![Sample::new(23.0, 100.5), Sample::new(35.0, 250.0), Sample::new(41.0, 80.0)]
        );
    }

    #[test]
    fn rows_missing_from_one_column_are_skipped() {
        let src = JsonColumnSource::from_value(json!({
            "x": { "0": 1, "1": 2, "5": 3 },
            "y": { "0": 10, "1": 20, "9": 30 }
        }))
        .unwrap();
        assert_eq!(src.paired_columns("x", "y").unwrap().len(), 2);
    }

    #[test]
    fn unwraps_report_envelope_and_arrays() {
        let src = JsonColumnSource::from_value(json!({
            "json_source": { "x": [1, 2, 3], "y": [4, 5, 6] }
        }))
        .unwrap();
        assert_eq!(src.column_names().unwrap(), vec!["x", "y"]);
        assert_eq!(src.paired_columns("x", "y").unwrap().len(), 3);
    }

    #[test]
    fn numeric_columns_exclude_text() {
        assert_eq!(source().numeric_columns().unwrap(), vec!["age", "deposit"]);
    }

    #[test]
    fn text_cells_are_invalid_input() {
        let err = source().paired_columns("job", "deposit").unwrap_err();
        match err {
            BinLensError::InvalidInput(msg) => assert!(msg.contains("job"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_column_is_reported() {
        assert!(matches!(
            source().paired_columns("salary", "deposit"),
            Err(BinLensError::ColumnNotFound(c)) if c == "salary"
        ));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(JsonColumnSource::parse("[1, 2, 3]").is_err());
        assert!(JsonColumnSource::parse("{\"x\": 5}").is_err());
    }
}
