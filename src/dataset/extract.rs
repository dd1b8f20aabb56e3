// src/dataset/extract.rs

use crate::dataset::types::{IndicatorKind, IndicatorSeries, YearValue};
use crate::table::{RawRow, INDICATOR_COLUMN};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static YEAR_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("year-label regex"));

/// Ordered-priority lookup from decorated source indicator labels to
/// canonical kinds, computed once per reload.
///
/// Source labels are decorated (e.g. "Climate related disasters frequency,
/// Number of Disasters: Flood"), so a label resolves to the first kind in
/// presentation order whose pattern it contains as a substring. Labels that
/// match no kind resolve to nothing and their rows are ignored.
pub struct IndicatorTable<K> {
    by_label: HashMap<String, K>,
}

impl<K: IndicatorKind> IndicatorTable<K> {
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let mut by_label: HashMap<String, K> = HashMap::new();
        for row in rows {
            let label = row.get(INDICATOR_COLUMN).unwrap_or_default();
            if label.is_empty() || by_label.contains_key(label) {
                continue;
            }
            if let Some(kind) = K::all().iter().copied().find(|k| label.contains(k.pattern())) {
                by_label.insert(label.to_string(), kind);
            }
        }
        IndicatorTable { by_label }
    }

    pub fn resolve(&self, label: &str) -> Option<K> {
        self.by_label.get(label).copied()
    }
}

/// Extract one `IndicatorSeries` per kind from one country's rows, in kind
/// order.
///
/// For each kind the first matching row wins, ties broken by row order. A
/// kind with no matching row still gets a series, with empty yearly values.
pub fn extract_indicators<K: IndicatorKind>(
    country_rows: &[RawRow],
    table: &IndicatorTable<K>,
) -> Vec<IndicatorSeries<K>> {
    K::all()
        .iter()
        .map(|&kind| {
            let row = country_rows.iter().find(|r| {
                r.get(INDICATOR_COLUMN)
                    .and_then(|label| table.resolve(label))
                    == Some(kind)
            });
            match row {
                Some(row) => IndicatorSeries {
                    kind,
                    yearly_values: year_values(row, K::metadata_columns()),
                },
                None => IndicatorSeries::empty(kind),
            }
        })
        .collect()
}

/// Pull the yearly readings out of one row, ascending by year.
///
/// A column counts as a year when it is not a metadata column and its label
/// is a four-digit year; this holds for both tables even though they carry
/// different metadata column sets. Cells that fail to parse as numbers map
/// to 0.0, so the output never contains a NaN.
fn year_values(row: &RawRow, metadata_columns: &[&str]) -> Vec<YearValue> {
    let mut values: Vec<YearValue> = row
        .columns()
        .filter(|(name, _)| !metadata_columns.contains(name))
        .filter_map(|(name, cell)| {
            if !YEAR_LABEL.is_match(name) {
                return None;
            }
            let year: i32 = name.parse().ok()?;
            let parsed = cell.trim().parse::<f64>().unwrap_or(0.0);
            let value = if parsed.is_finite() { parsed } else { 0.0 };
            Some(YearValue { year, value })
        })
        .collect();
    values.sort_by_key(|v| v.year);
    values
}
