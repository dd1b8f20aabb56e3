// src/fetch/mod.rs

use crate::config::TableEndpoint;
use crate::table::{read_rows, RawRow};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};
use url::Url;

const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Failure to acquire or parse either source table. A reload fails as a
/// whole on the first of these; the previously held dataset stays in place.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("invalid table url `{url}`: {source}")]
    BadUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request for {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{url} returned an empty body")]
    EmptyBody { url: String },

    #[error("reading local table {path}: {source}")]
    LocalRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing table from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },
}

/// Both raw tables, fetched and parsed but not yet aggregated.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub disasters: Vec<RawRow>,
    pub carbon: Vec<RawRow>,
}

/// Fetch both source tables concurrently. Either failure fails the whole
/// load.
pub async fn fetch_source_tables(
    client: &Client,
    disasters: &TableEndpoint,
    carbon: &TableEndpoint,
) -> Result<SourceTables, DataLoadError> {
    let (disaster_text, carbon_text) =
        tokio::try_join!(load_table(client, disasters), load_table(client, carbon))?;

    let disaster_rows = parse_table(&disaster_text, disasters.name())?;
    let carbon_rows = parse_table(&carbon_text, carbon.name())?;
    info!(
        disaster_rows = disaster_rows.len(),
        carbon_rows = carbon_rows.len(),
        "loaded source tables"
    );

    Ok(SourceTables {
        disasters: disaster_rows,
        carbon: carbon_rows,
    })
}

fn parse_table(text: &str, source_name: &str) -> Result<Vec<RawRow>, DataLoadError> {
    read_rows(text).map_err(|e| DataLoadError::Parse {
        source_name: source_name.to_string(),
        message: format!("{e:#}"),
    })
}

/// Load one table body, from the local override path when configured,
/// otherwise over HTTP with a bounded retry loop.
pub async fn load_table(
    client: &Client,
    endpoint: &TableEndpoint,
) -> Result<String, DataLoadError> {
    if let Some(path) = &endpoint.path {
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DataLoadError::LocalRead {
                path: path.display().to_string(),
                source,
            });
    }

    let url = Url::parse(&endpoint.url).map_err(|source| DataLoadError::BadUrl {
        url: endpoint.url.clone(),
        source,
    })?;

    let mut attempt = 0;
    loop {
        attempt += 1;
        let resp = client.get(url.as_str()).send().await;
        match resp {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) if !body.trim().is_empty() => return Ok(body),
                Ok(_) => {
                    return Err(DataLoadError::EmptyBody {
                        url: url.to_string(),
                    })
                }
                Err(_) if attempt < MAX_RETRIES => {
                    warn!(url = %url, attempt, "body read failed, retrying");
                    sleep(RETRY_DELAY).await;
                }
                Err(source) => {
                    return Err(DataLoadError::Transport {
                        url: url.to_string(),
                        source,
                    })
                }
            },
            Ok(resp) if resp.status().is_server_error() && attempt < MAX_RETRIES => {
                warn!(url = %url, status = %resp.status(), attempt, "server error, retrying");
                sleep(RETRY_DELAY).await;
            }
            Ok(resp) => {
                return Err(DataLoadError::Status {
                    url: url.to_string(),
                    status: resp.status(),
                })
            }
            Err(_) if attempt < MAX_RETRIES => {
                warn!(url = %url, attempt, "request failed, retrying");
                sleep(RETRY_DELAY).await;
            }
            Err(source) => {
                return Err(DataLoadError::Transport {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }
}
