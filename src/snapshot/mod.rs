// src/snapshot/mod.rs
//
// Persists the derived dataset as a long-form parquet table plus a small
// JSON manifest, so tools and charts can re-read the last good aggregate
// without refetching the sources.

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{DateTime, Utc};
use glob::glob;
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::{BrotliLevel, Compression},
    file::properties::WriterProperties,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

use crate::dataset::{CountryRecord, Dataset, IndicatorKind};

/// One long-form output row: a single yearly reading of one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub dataset: String,
    pub country: String,
    pub iso3: String,
    pub indicator: String,
    pub year: i32,
    pub value: f64,
}

/// Sidecar metadata written next to every snapshot parquet.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub written_at: DateTime<Utc>,
    pub disaster_countries: usize,
    pub carbon_countries: usize,
    pub rows: usize,
}

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("dataset", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("iso3", DataType::Utf8, false),
        Field::new("indicator", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("value", DataType::Float64, false),
    ]))
}

fn push_records<K: IndicatorKind>(
    rows: &mut Vec<SnapshotRow>,
    dataset: &str,
    records: &[CountryRecord<K>],
) {
    for record in records {
        for series in &record.indicators {
            for yv in &series.yearly_values {
                rows.push(SnapshotRow {
                    dataset: dataset.to_string(),
                    country: record.country.clone(),
                    iso3: record.iso3.clone(),
                    indicator: series.kind.label().to_string(),
                    year: yv.year,
                    value: yv.value,
                });
            }
        }
    }
}

/// Flatten the dataset to long form.
pub fn dataset_rows(dataset: &Dataset) -> Vec<SnapshotRow> {
    let mut rows = Vec::new();
    push_records(&mut rows, "disasters", &dataset.disasters);
    push_records(&mut rows, "carbon", &dataset.carbon);
    rows
}

/// Write `dataset` to `dir` as `dataset-<ts>.parquet` + `dataset-<ts>.json`.
///
/// The parquet is written to a `.tmp` path and renamed into place so a
/// crashed run never leaves a half-written snapshot behind. Returns the
/// final parquet path.
pub fn write_snapshot(dataset: &Dataset, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating snapshot directory {}", dir.display()))?;

    let now = Utc::now();
    let ts = now.timestamp_micros();
    let final_path = dir.join(format!("dataset-{ts}.parquet"));
    let tmp_path = dir.join(format!("dataset-{ts}.parquet.tmp"));

    let rows = dataset_rows(dataset);
    let batch = rows_to_batch(&rows)?;

    let file = File::create(&tmp_path)
        .with_context(|| format!("creating temporary file {}", tmp_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .build();
    let mut writer = ArrowWriter::try_new(file, snapshot_schema(), Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing snapshot batch")?;
    writer.close().context("closing parquet writer")?;

    fs::rename(&tmp_path, &final_path).with_context(|| {
        format!(
            "renaming {} to {}",
            tmp_path.display(),
            final_path.display()
        )
    })?;

    let manifest = Manifest {
        written_at: now,
        disaster_countries: dataset.disasters.len(),
        carbon_countries: dataset.carbon.len(),
        rows: rows.len(),
    };
    let manifest_path = dir.join(format!("dataset-{ts}.json"));
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("writing manifest {}", manifest_path.display()))?;

    info!(path = %final_path.display(), rows = rows.len(), "wrote snapshot");
    Ok(final_path)
}

fn rows_to_batch(rows: &[SnapshotRow]) -> Result<RecordBatch> {
    let dataset: StringArray = rows.iter().map(|r| Some(r.dataset.as_str())).collect();
    let country: StringArray = rows.iter().map(|r| Some(r.country.as_str())).collect();
    let iso3: StringArray = rows.iter().map(|r| Some(r.iso3.as_str())).collect();
    let indicator: StringArray = rows.iter().map(|r| Some(r.indicator.as_str())).collect();
    let year = Int32Array::from_iter_values(rows.iter().map(|r| r.year));
    let value = Float64Array::from_iter_values(rows.iter().map(|r| r.value));

    RecordBatch::try_new(
        snapshot_schema(),
        vec![
            Arc::new(dataset),
            Arc::new(country),
            Arc::new(iso3),
            Arc::new(indicator),
            Arc::new(year),
            Arc::new(value),
        ],
    )
    .context("building snapshot batch")
}

/// Read a snapshot parquet back into long-form rows.
pub fn read_snapshot(path: &Path) -> Result<Vec<SnapshotRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of {}", path.display()))?
        .with_batch_size(1024)
        .build()
        .context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.context("reading snapshot batch")?;
        append_rows(&mut rows, &batch)?;
    }
    Ok(rows)
}

fn append_rows(rows: &mut Vec<SnapshotRow>, batch: &RecordBatch) -> Result<()> {
    fn utf8<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
        batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow!("missing Utf8 column `{name}` in snapshot"))
    }

    let dataset = utf8(batch, "dataset")?;
    let country = utf8(batch, "country")?;
    let iso3 = utf8(batch, "iso3")?;
    let indicator = utf8(batch, "indicator")?;
    let year = batch
        .column_by_name("year")
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| anyhow!("missing Int32 column `year` in snapshot"))?;
    let value = batch
        .column_by_name("value")
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| anyhow!("missing Float64 column `value` in snapshot"))?;

    for i in 0..batch.num_rows() {
        rows.push(SnapshotRow {
            dataset: dataset.value(i).to_string(),
            country: country.value(i).to_string(),
            iso3: iso3.value(i).to_string(),
            indicator: indicator.value(i).to_string(),
            year: year.value(i),
            value: value.value(i),
        });
    }
    Ok(())
}

/// Delete all but the newest `keep` snapshots in `dir`, manifests included.
/// Returns how many parquet files were removed.
pub fn prune_snapshots(dir: &Path, keep: usize) -> Result<usize> {
    let pattern = format!("{}/dataset-*.parquet", dir.display());
    let mut stamped: Vec<(i64, PathBuf)> = Vec::new();

    for entry in glob(&pattern).context("invalid snapshot glob")? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                debug!("skipping unreadable glob entry: {e:?}");
                continue;
            }
        };
        let Some(name) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        let ts_str = name
            .trim_start_matches("dataset-")
            .trim_end_matches(".parquet");
        if let Ok(ts) = ts_str.parse::<i64>() {
            stamped.push((ts, path));
        }
    }

    stamped.sort_by_key(|(ts, _)| std::cmp::Reverse(*ts));

    let mut removed = 0;
    for (ts, path) in stamped.into_iter().skip(keep) {
        fs::remove_file(&path)
            .with_context(|| format!("deleting snapshot {}", path.display()))?;
        let manifest = dir.join(format!("dataset-{ts}.json"));
        if manifest.is_file() {
            fs::remove_file(&manifest)
                .with_context(|| format!("deleting manifest {}", manifest.display()))?;
        }
        removed += 1;
    }

    if removed > 0 {
        info!(removed, "pruned old snapshots");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::build_dataset;
    use crate::table::read_rows;
    use std::{thread, time::Duration};
    use tempfile::tempdir;

    const DISASTERS: &str = "\
Country,ISO2,ISO3,Indicator,Unit,Source,1990,1991
Testland,TS,TST,Number of Floods,Number,EM-DAT,2,1
";

    const CARBON: &str = "\
Country,ISO2,ISO3,Indicator,2015
Testland,TS,TST,Land area (1000 ha),100
";

    fn sample_dataset() -> Result<Dataset> {
        Ok(build_dataset(read_rows(DISASTERS)?, read_rows(CARBON)?))
    }

    #[test]
    fn snapshot_round_trips_through_parquet() -> Result<()> {
        let dir = tempdir()?;
        let dataset = sample_dataset()?;

        let path = write_snapshot(&dataset, dir.path())?;
        assert!(path.is_file());

        let rows = read_snapshot(&path)?;
        assert_eq!(rows, dataset_rows(&dataset));
        assert!(rows.iter().any(|r| r.dataset == "disasters"
            && r.indicator == "Flood"
            && r.year == 1990
            && r.value == 2.0));
        Ok(())
    }

    #[test]
    fn manifest_counts_match() -> Result<()> {
        let dir = tempdir()?;
        let dataset = sample_dataset()?;
        let path = write_snapshot(&dataset, dir.path())?;

        let manifest_path = path.with_extension("json");
        let manifest: Manifest = serde_json::from_str(&fs::read_to_string(manifest_path)?)?;
        assert_eq!(manifest.disaster_countries, 1);
        assert_eq!(manifest.carbon_countries, 1);
        assert_eq!(manifest.rows, dataset_rows(&dataset).len());
        Ok(())
    }

    #[test]
    fn prune_keeps_newest() -> Result<()> {
        let dir = tempdir()?;
        let dataset = sample_dataset()?;

        let mut paths = Vec::new();
        for _ in 0..3 {
            paths.push(write_snapshot(&dataset, dir.path())?);
            thread::sleep(Duration::from_millis(2));
        }

        let removed = prune_snapshots(dir.path(), 1)?;
        assert_eq!(removed, 2);
        assert!(!paths[0].is_file());
        assert!(!paths[1].is_file());
        assert!(paths[2].is_file());
        assert!(paths[2].with_extension("json").is_file());
        Ok(())
    }
}
