// src/table/mod.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, StringArray},
    csv::ReaderBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, io::Cursor, sync::Arc};

pub const COUNTRY_COLUMN: &str = "Country";
pub const ISO3_COLUMN: &str = "ISO3";
pub const INDICATOR_COLUMN: &str = "Indicator";

/// One source record: column name → raw string cell.
///
/// Missing cells read back as empty strings so downstream code never has to
/// distinguish "absent" from "blank" at this layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(HashMap<String, String>);

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        RawRow(iter.into_iter().collect())
    }
}

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse delimited text with a header row into `RawRow`s.
///
/// Every column is read as Utf8; typing happens later, during indicator
/// extraction. The header line supplies the column names.
pub fn read_rows(csv_text: &str) -> Result<Vec<RawRow>> {
    let header_line = csv_text
        .lines()
        .next()
        .ok_or_else(|| anyhow!("table has no header row"))?;
    let headers: Vec<String> = header_line.split(',').map(clean_str).collect();

    // String schema for parsing
    let fields: Vec<Field> = headers
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let cursor = Cursor::new(csv_text.as_bytes());
    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .with_batch_size(1024)
        .with_quote(b'"')
        .with_delimiter(b',')
        .build(cursor)
        .context("creating CSV reader")?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.context("reading CSV batch")?;
        append_batch_rows(&mut rows, &batch, &headers)?;
    }

    Ok(rows)
}

fn append_batch_rows(rows: &mut Vec<RawRow>, batch: &RecordBatch, headers: &[String]) -> Result<()> {
    let columns: Vec<&StringArray> = batch
        .columns()
        .iter()
        .map(|c| {
            c.as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("expected Utf8 column in CSV batch"))
        })
        .collect::<Result<_>>()?;

    for i in 0..batch.num_rows() {
        let mut row = HashMap::with_capacity(headers.len());
        for (header, column) in headers.iter().zip(&columns) {
            let value = if column.is_valid(i) {
                column.value(i).to_string()
            } else {
                String::new()
            };
            row.insert(header.clone(), value);
        }
        rows.push(RawRow(row));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_whitespace() {
        assert_eq!(clean_str("  Country "), "Country");
        assert_eq!(clean_str("\"1990\""), "1990");
        assert_eq!(clean_str("\""), "\"");
    }

    #[test]
    fn read_rows_maps_headers_to_cells() -> Result<()> {
        let csv = "Country,ISO3,Indicator,1990,1991\n\
                   Afghanistan,AFG,\"Number of Floods\",2,\n\
                   Albania,ALB,Number of Storms,,3\n";
        let rows = read_rows(csv)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Country"), Some("Afghanistan"));
        assert_eq!(rows[0].get("Indicator"), Some("Number of Floods"));
        assert_eq!(rows[0].get("1990"), Some("2"));
        assert_eq!(rows[0].get("1991"), Some(""));
        assert_eq!(rows[1].get("ISO3"), Some("ALB"));
        assert_eq!(rows[1].get("1991"), Some("3"));
        Ok(())
    }

    #[test]
    fn read_rows_rejects_empty_input() {
        assert!(read_rows("").is_err());
    }
}
