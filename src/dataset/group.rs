// src/dataset/group.rs

use crate::table::{RawRow, COUNTRY_COLUMN};
use std::collections::HashMap;

/// Group raw rows by their `Country` cell.
///
/// First-seen country order is preserved, as is row order within a country.
/// No row is dropped, renamed, or deduplicated here; rows without a `Country`
/// cell group under the empty string and flow through like any other.
pub fn group_by_country(rows: Vec<RawRow>) -> Vec<(String, Vec<RawRow>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<RawRow>)> = Vec::new();

    for row in rows {
        let country = row.get(COUNTRY_COLUMN).unwrap_or_default().to_string();
        match index.get(&country) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(country.clone(), groups.len());
                groups.push((country, vec![row]));
            }
        }
    }

    groups
}
