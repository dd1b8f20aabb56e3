// src/dataset/store.rs

use crate::dataset::build::build_dataset;
use crate::dataset::types::Dataset;
use crate::fetch::{DataLoadError, SourceTables};
use tracing::info;

/// Holds the current derived `Dataset` between reloads.
///
/// A reload swaps the dataset in only after both tables were fetched and the
/// build completed; a failed load leaves the previous dataset untouched, so
/// a retry after an outage never blanks the charts.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: Option<Dataset>,
}

impl DatasetStore {
    pub fn new() -> Self {
        DatasetStore::default()
    }

    pub fn current(&self) -> Option<&Dataset> {
        self.current.as_ref()
    }

    /// Rebuild from a fetch result, replacing the held dataset on success.
    pub fn reload(
        &mut self,
        tables: Result<SourceTables, DataLoadError>,
    ) -> Result<&Dataset, DataLoadError> {
        let tables = tables?;
        let dataset = build_dataset(tables.disasters, tables.carbon);
        info!(
            disaster_countries = dataset.disasters.len(),
            carbon_countries = dataset.carbon.len(),
            "dataset reloaded"
        );
        Ok(self.current.insert(dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_rows;
    use anyhow::Result;

    const DISASTERS: &str = "\
Country,ISO2,ISO3,Indicator,Unit,Source,1990
Testland,TS,TST,Number of Floods,Number,EM-DAT,2
";

    const CARBON: &str = "\
Country,ISO2,ISO3,Indicator,2015
Testland,TS,TST,Land area (1000 ha),100
";

    fn tables() -> Result<SourceTables> {
        Ok(SourceTables {
            disasters: read_rows(DISASTERS)?,
            carbon: read_rows(CARBON)?,
        })
    }

    #[test]
    fn reload_replaces_dataset() -> Result<()> {
        let mut store = DatasetStore::new();
        assert!(store.current().is_none());

        store.reload(Ok(tables()?)).unwrap();
        assert_eq!(store.current().unwrap().disasters.len(), 1);
        Ok(())
    }

    #[test]
    fn failed_reload_keeps_previous_dataset() -> Result<()> {
        let mut store = DatasetStore::new();
        store.reload(Ok(tables()?)).unwrap();
        let before = store.current().unwrap().clone();

        let err = store.reload(Err(DataLoadError::EmptyBody {
            url: "https://example.invalid/t.csv".to_string(),
        }));
        assert!(err.is_err());
        assert_eq!(store.current(), Some(&before));
        Ok(())
    }

    #[test]
    fn repeated_reloads_are_idempotent() -> Result<()> {
        let mut store = DatasetStore::new();
        store.reload(Ok(tables()?)).unwrap();
        let first = store.current().unwrap().clone();
        store.reload(Ok(tables()?)).unwrap();
        assert_eq!(store.current(), Some(&first));
        Ok(())
    }
}
