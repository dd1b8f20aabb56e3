use climdash::snapshot::read_snapshot;
use std::{collections::BTreeMap, env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to a snapshot Parquet file.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <SNAPSHOT_PARQUET>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let rows = read_snapshot(path)?;

    // (dataset, country) → reading count
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for row in &rows {
        *counts
            .entry((row.dataset.clone(), row.country.clone()))
            .or_default() += 1;
    }

    println!("=== Snapshot: {} ===", path.display());
    println!("Total readings: {}", rows.len());
    println!();
    for ((dataset, country), count) in &counts {
        println!("{:<10} | {:<40} | {:>6}", dataset, country, count);
    }

    Ok(())
}
