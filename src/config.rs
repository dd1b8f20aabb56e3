// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::info;

/// Where one source table comes from. When `path` is set it overrides the
/// URL, which keeps offline runs and tests off the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableEndpoint {
    pub url: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl TableEndpoint {
    /// Short display name for logs, derived from the URL's final path
    /// segment.
    pub fn name(&self) -> &str {
        self.url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub disasters: TableEndpoint,
    pub carbon: TableEndpoint,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_keep_snapshots")]
    pub keep_snapshots: usize,
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

fn default_keep_snapshots() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            disasters: TableEndpoint {
                url: "https://opendata.arcgis.com/datasets/b13b69ee0dde43a99c811f592af4e821_0.csv"
                    .to_string(),
                path: None,
            },
            carbon: TableEndpoint {
                url: "https://opendata.arcgis.com/datasets/66dad9817da847b385d3b2323ce1be57_0.csv"
                    .to_string(),
                path: None,
            },
            snapshot_dir: default_snapshot_dir(),
            keep_snapshots: default_keep_snapshots(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load `path` if it exists, otherwise fall back to the built-in
    /// endpoints.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            info!(config = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_yaml_with_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            "disasters:\n  url: https://example.com/disasters.csv\n\
             carbon:\n  url: https://example.com/carbon.csv\n  path: fixtures/carbon.csv\n"
        )?;

        let cfg = Config::load(file.path())?;
        assert_eq!(cfg.disasters.name(), "disasters.csv");
        assert_eq!(cfg.carbon.path.as_deref(), Some(Path::new("fixtures/carbon.csv")));
        assert_eq!(cfg.snapshot_dir, PathBuf::from("snapshots"));
        assert_eq!(cfg.keep_snapshots, 5);
        Ok(())
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let cfg = Config::load_or_default("/nonexistent/climdash.yaml")?;
        assert!(cfg.disasters.url.starts_with("https://"));
        Ok(())
    }
}
