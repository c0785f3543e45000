// src/fetch/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tokio::{fs, sync::Semaphore, task};
use tracing::{error, info, warn};
use url::Url;

use crate::{config::Config, region::RegionDirectory};

/// Timestamp embedded in downloaded file names.
pub const TIMESTAMP_FORMAT: &str = "%d%m%Y%H%M%S";

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Downloaded(PathBuf),
    /// A file with the same name already exists; nothing was fetched.
    Skipped(PathBuf),
}

/// Per-region result of a download pass, in region id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchSummary {
    pub downloaded: Vec<u8>,
    pub skipped: Vec<u8>,
    pub failed: Vec<(u8, String)>,
}

/// `{prefix}_id_{region_id}_{timestamp}.{ext}`
pub fn file_name_for(cfg: &Config, region_id: u8, at: &DateTime<Local>) -> String {
    format!(
        "{}_id_{}_{}.{}",
        cfg.file_prefix,
        region_id,
        at.format(TIMESTAMP_FORMAT),
        cfg.file_extension
    )
}

/// Download one region's export into `cfg.data_dir`, stamped with the current time.
pub async fn download_region(client: &Client, cfg: &Config, region_id: u8) -> Result<FetchOutcome> {
    download_region_at(client, cfg, region_id, &Local::now()).await
}

/// Same as [`download_region`] with an explicit timestamp for the file name.
pub async fn download_region_at(
    client: &Client,
    cfg: &Config,
    region_id: u8,
    at: &DateTime<Local>,
) -> Result<FetchOutcome> {
    let dest = cfg.data_dir.join(file_name_for(cfg, region_id, at));
    if fs::try_exists(&dest).await.unwrap_or(false) {
        info!(file = %dest.display(), "already exists; skipping");
        return Ok(FetchOutcome::Skipped(dest));
    }

    let url_str = cfg.source_url_for(region_id);
    let url = Url::parse(&url_str).with_context(|| format!("parsing source URL {}", url_str))?;
    fs::create_dir_all(&cfg.data_dir)
        .await
        .with_context(|| format!("creating {}", cfg.data_dir.display()))?;

    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    write_file(&dest, &bytes).await?;

    Ok(FetchOutcome::Downloaded(dest))
}

async fn write_file(dest: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(dest, bytes)
        .await
        .with_context(|| format!("writing {}", dest.display()))
}

/// Download every region, `cfg.download_concurrency` at a time. A failed
/// region is logged and recorded; it never stops the others.
pub async fn download_all(client: &Client, cfg: &Config) -> Result<FetchSummary> {
    let start = Instant::now();
    let cfg = Arc::new(cfg.clone());
    let sem = Arc::new(Semaphore::new(cfg.download_concurrency));
    let mut handles = Vec::new();

    for region_id in RegionDirectory::ids() {
        let client = client.clone();
        let cfg = Arc::clone(&cfg);
        let sem = Arc::clone(&sem);
        handles.push(task::spawn(async move {
            let _permit = sem.acquire_owned().await?;
            download_region(&client, &cfg, region_id).await
        }));
    }

    let mut summary = FetchSummary::default();
    for (region_id, handle) in RegionDirectory::ids().zip(handles) {
        match handle.await? {
            Ok(FetchOutcome::Downloaded(path)) => {
                info!(region = region_id, file = %path.display(), "downloaded");
                summary.downloaded.push(region_id);
            }
            Ok(FetchOutcome::Skipped(_)) => summary.skipped.push(region_id),
            Err(e) => {
                error!(region = region_id, "download failed: {:#}", e);
                summary.failed.push((region_id, format!("{:#}", e)));
            }
        }
    }

    if !summary.failed.is_empty() {
        warn!(failed = summary.failed.len(), "some regions were not downloaded");
    }
    info!(
        downloaded = summary.downloaded.len(),
        skipped = summary.skipped.len(),
        elapsed = ?start.elapsed(),
        "fetch done"
    );
    Ok(summary)
}
