// src/dataset/mod.rs
pub mod types;

pub use types::{ObservationRow, UnifiedDataset};

use anyhow::{Context, Result};
use glob::glob;
use rayon::prelude::*;
use serde::Serialize;
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{error, info, instrument, warn};

use crate::{
    config::Config,
    error::IngestError,
    process::{
        self,
        utils::{file_name_of, region_id_from_file_name},
        RawRecord, RegionTable,
    },
};

/// What happened to each input during a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub files_seen: usize,
    pub files_parsed: usize,
    /// Files whose name did not decode to a region id.
    pub misnamed: Vec<String>,
    /// Misnamed files actually deleted from the data directory.
    pub removed: Vec<String>,
    /// Files that failed to read or parse, with the reason.
    pub failed: Vec<(String, String)>,
    pub rows: usize,
    pub rows_dropped: usize,
    /// Region ids present in the data but missing from the directory.
    pub unknown_regions: BTreeSet<u8>,
}

/// Scan `cfg.data_dir` for raw exports and build the unified dataset.
///
/// Misnamed files are removed (when `prune_misnamed` is set) and skipped;
/// unreadable or unparsable files contribute nothing. Only a bad glob pattern
/// fails the whole build.
#[instrument(level = "info", skip(cfg), fields(dir = %cfg.data_dir.display()))]
pub fn build_from_dir(cfg: &Config) -> Result<(UnifiedDataset, BuildReport)> {
    let start = Instant::now();
    let pattern = cfg.file_pattern();
    let mut paths: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("invalid glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut report = BuildReport {
        files_seen: paths.len(),
        ..BuildReport::default()
    };

    let (named, misnamed): (Vec<PathBuf>, Vec<PathBuf>) = paths
        .into_iter()
        .partition(|p| region_id_from_file_name(&file_name_of(p), &cfg.file_prefix).is_some());

    for path in misnamed {
        let name = file_name_of(&path);
        warn!(file = %name, "{}", IngestError::Naming { file: name.clone() });
        if cfg.prune_misnamed {
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!(file = %name, "removed misnamed file");
                    report.removed.push(name.clone());
                }
                Err(e) => error!(file = %name, "failed to remove misnamed file: {}", e),
            }
        }
        report.misnamed.push(name);
    }

    let results: Vec<(String, Result<RegionTable, IngestError>)> = named
        .par_iter()
        .map(|path| (file_name_of(path), process::parse_file(path, &cfg.file_prefix)))
        .collect();

    let dataset = assemble(results, &mut report);
    info!(
        files = report.files_parsed,
        rows = report.rows,
        elapsed = ?start.elapsed(),
        "dataset built"
    );
    Ok((dataset, report))
}

/// Build from contents already in memory, one record per source file.
#[instrument(level = "info", skip(records), fields(records = records.len()))]
pub fn build_from_records(records: &[RawRecord]) -> (UnifiedDataset, BuildReport) {
    let mut report = BuildReport {
        files_seen: records.len(),
        ..BuildReport::default()
    };
    let results: Vec<(String, Result<RegionTable, IngestError>)> = records
        .par_iter()
        .map(|r| (r.source.clone(), process::parse_record(r)))
        .collect();
    let dataset = assemble(results, &mut report);
    (dataset, report)
}

/// Concatenate per-file tables in (region id, source) order and attach names.
fn assemble(
    results: Vec<(String, Result<RegionTable, IngestError>)>,
    report: &mut BuildReport,
) -> UnifiedDataset {
    let mut tables = Vec::with_capacity(results.len());
    for (source, result) in results {
        match result {
            Ok(table) => tables.push(table),
            Err(e) => {
                warn!(file = %source, "skipping file: {}", e);
                if let IngestError::Naming { .. } = e {
                    report.misnamed.push(source);
                } else {
                    report.failed.push((source, e.to_string()));
                }
            }
        }
    }
    tables.sort_by(|a, b| (a.region_id, &a.source).cmp(&(b.region_id, &b.source)));

    report.files_parsed = tables.len();
    let mut rows = Vec::with_capacity(tables.iter().map(|t| t.rows.len()).sum());
    for table in tables {
        report.rows_dropped += table.dropped;
        let first = rows.len();
        rows.extend(
            table
                .rows
                .iter()
                .map(|r| ObservationRow::new(table.region_id, r.year, r.week, r.vhi)),
        );
        if rows[first..].iter().any(|r| !r.region_name.is_known()) {
            report.unknown_regions.insert(table.region_id);
        }
    }
    for id in &report.unknown_regions {
        warn!(region = id, "region id has no directory entry; rows carry the unknown-region name");
    }
    report.rows = rows.len();

    if rows.is_empty() {
        info!("no rows parsed; dataset is empty");
    }
    UnifiedDataset::from_rows(rows)
}

/// Convenience for callers that only hold a directory path.
pub fn build_from_path<P: AsRef<Path>>(dir: P) -> Result<(UnifiedDataset, BuildReport)> {
    let cfg = Config {
        data_dir: dir.as_ref().to_path_buf(),
        ..Config::default()
    };
    build_from_dir(&cfg)
}
