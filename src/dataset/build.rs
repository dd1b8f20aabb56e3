// src/dataset/build.rs

use crate::dataset::extract::{extract_indicators, IndicatorTable};
use crate::dataset::group::group_by_country;
use crate::dataset::types::{CarbonKind, CountryRecord, Dataset, DisasterKind, IndicatorKind};
use crate::table::{RawRow, ISO3_COLUMN};
use tracing::debug;

/// One synchronous pass of grouping + indicator extraction over both source
/// tables.
///
/// Deterministic and idempotent: identical inputs produce field-for-field
/// equal `Dataset`s, so re-running a reload is always safe.
pub fn build_dataset(disaster_rows: Vec<RawRow>, carbon_rows: Vec<RawRow>) -> Dataset {
    let dataset = Dataset {
        disasters: build_records::<DisasterKind>(disaster_rows),
        carbon: build_records::<CarbonKind>(carbon_rows),
    };
    debug!(
        disasters = dataset.disasters.len(),
        carbon = dataset.carbon.len(),
        "built dataset"
    );
    dataset
}

fn build_records<K: IndicatorKind>(rows: Vec<RawRow>) -> Vec<CountryRecord<K>> {
    let table = IndicatorTable::from_rows(&rows);
    group_by_country(rows)
        .into_iter()
        .map(|(country, country_rows)| {
            // ISO3 comes from the first row seen for the country; well-formed
            // input never disagrees across rows.
            let iso3 = country_rows
                .first()
                .and_then(|r| r.get(ISO3_COLUMN))
                .unwrap_or_default()
                .to_string();
            CountryRecord {
                country,
                iso3,
                indicators: extract_indicators(&country_rows, &table),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::DisasterKind;
    use crate::table::read_rows;
    use anyhow::Result;

    const DISASTERS: &str = "\
Country,ISO2,ISO3,Indicator,Unit,Source,1990,1991
Testland,TS,TST,\"Number of Floods\",Number,EM-DAT,2,x
Testland,TS,TST,\"Number of Disasters: TOTAL\",Number,EM-DAT,3,1
Otherland,OT,OTH,\"Number of Storms\",Number,EM-DAT,,4
";

    const CARBON: &str = "\
Country,ISO2,ISO3,Indicator,2015,2016
Testland,TS,TST,Land area (1000 ha),100,100
Testland,TS,TST,Carbon stocks in forests,12.5,13
";

    #[test]
    fn end_to_end_extraction() -> Result<()> {
        let dataset = build_dataset(read_rows(DISASTERS)?, read_rows(CARBON)?);

        assert_eq!(dataset.disasters.len(), 2);
        let test = dataset.disaster_record("TST").unwrap();
        assert_eq!(test.country, "Testland");
        let flood = test.indicator(DisasterKind::Flood).unwrap();
        let points: Vec<(i32, f64)> = flood.yearly_values.iter().map(|v| (v.year, v.value)).collect();
        assert_eq!(points, vec![(1990, 2.0), (1991, 0.0)]);
        assert!(test.indicator(DisasterKind::Wildfire).unwrap().is_empty());

        let carbon = dataset.carbon_record("TST").unwrap();
        let land = carbon
            .indicator(crate::dataset::types::CarbonKind::LandArea)
            .unwrap();
        assert_eq!(land.yearly_values.len(), 2);
        Ok(())
    }

    #[test]
    fn build_is_idempotent() -> Result<()> {
        let first = build_dataset(read_rows(DISASTERS)?, read_rows(CARBON)?);
        let second = build_dataset(read_rows(DISASTERS)?, read_rows(CARBON)?);
        assert_eq!(first, second);
        Ok(())
    }
}
