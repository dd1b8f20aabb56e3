use anyhow::Result;
use climdash::{
    config::Config,
    dataset::{
        latest_value, normalize_by_area, sum_indicator, CarbonKind, Dataset, DatasetStore,
        DisasterKind,
    },
    fetch::fetch_source_tables,
    snapshot::{prune_snapshots, write_snapshot},
};
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Land area arrives in 1000-hectare units; scale rates up so small island
/// states don't vanish into rounding.
const AREA_SCALE: f64 = 1_000.0;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) load config ──────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "climdash.yaml".to_string());
    let config = Config::load_or_default(&config_path)?;
    info!(
        disasters = config.disasters.name(),
        carbon = config.carbon.name(),
        "configured sources"
    );

    // ─── 3) fetch both tables & rebuild the dataset ──────────────────
    let client = Client::new();
    let mut store = DatasetStore::new();
    let fetched = fetch_source_tables(&client, &config.disasters, &config.carbon).await;
    let dataset = store.reload(fetched)?.clone();

    // ─── 4) log a summary of the derived collections ─────────────────
    summarize(&dataset);

    // ─── 5) snapshot the aggregate & prune old ones ──────────────────
    let path = write_snapshot(&dataset, &config.snapshot_dir)?;
    info!(snapshot = %path.display(), "snapshot written");
    prune_snapshots(&config.snapshot_dir, config.keep_snapshots)?;

    info!("all done");
    Ok(())
}

fn summarize(dataset: &Dataset) {
    let total_disasters: f64 = dataset
        .disasters
        .iter()
        .filter_map(|r| r.indicator(DisasterKind::Total))
        .map(sum_indicator)
        .sum();
    info!(
        countries = dataset.disasters.len(),
        total_disasters, "disaster table aggregated"
    );

    // Per-area disaster rates; countries without a usable land area are
    // dropped from the normalized view.
    let mut normalized = 0usize;
    let mut skipped = 0usize;
    for record in &dataset.disasters {
        let total = record
            .indicator(DisasterKind::Total)
            .map(sum_indicator)
            .unwrap_or(0.0);
        let area = dataset
            .carbon_record(&record.iso3)
            .and_then(|c| c.indicator(CarbonKind::LandArea))
            .and_then(latest_value);
        match normalize_by_area(total, area, AREA_SCALE) {
            Some(_) => normalized += 1,
            None => {
                warn!(
                    country = %record.country,
                    iso3 = %record.iso3,
                    "no usable land area, dropped from normalized view"
                );
                skipped += 1;
            }
        }
    }
    info!(normalized, skipped, "normalized disaster rates");
}
