// src/config.rs

use anyhow::{Context, Result};
use glob::Pattern;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

const CONFIG_ENV: &str = "VHI_CONFIG";
const DATA_DIR_ENV: &str = "VHI_DATA_DIR";
const DEFAULT_CONFIG_FILE: &str = "vhi.yaml";

/// Runtime settings. Every field has a default so a partial YAML file works.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the raw per-region exports.
    pub data_dir: PathBuf,
    pub file_prefix: String,
    pub file_extension: String,
    /// Source URL with `{id}`, `{year_start}` and `{year_end}` placeholders.
    pub source_url: String,
    pub year_start: i32,
    pub year_end: i32,
    pub download_concurrency: usize,
    /// Delete files whose name does not decode to a region id.
    pub prune_misnamed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_prefix: "vhi".into(),
            file_extension: "csv".into(),
            source_url: "https://www.star.nesdis.noaa.gov/smcd/emb/vci/VH/get_TS_admin.php?country=UKR&provinceID={id}&year1={year_start}&year2={year_end}&type=Mean".into(),
            year_start: 1981,
            year_end: 2024,
            download_concurrency: 3,
            prune_misnamed: true,
        }
    }
}

impl Config {
    /// Resolve the config: `$VHI_CONFIG`, else `./vhi.yaml` if present, else
    /// defaults. `$VHI_DATA_DIR` overrides `data_dir` in every case.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            cfg.data_dir = PathBuf::from(dir);
        }
        Ok(cfg)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_yaml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        if cfg.download_concurrency == 0 {
            anyhow::bail!("download_concurrency must be at least 1");
        }
        Ok(cfg)
    }

    /// Glob pattern matching candidate raw files inside `data_dir`. Literal
    /// parts are escaped so `[`, `*` or `?` in paths match themselves.
    pub fn file_pattern(&self) -> String {
        format!(
            "{}/{}_id_*.{}",
            Pattern::escape(&self.data_dir.to_string_lossy()),
            Pattern::escape(&self.file_prefix),
            Pattern::escape(&self.file_extension)
        )
    }

    pub fn source_url_for(&self, region_id: u8) -> String {
        self.source_url
            .replace("{id}", &region_id.to_string())
            .replace("{year_start}", &self.year_start.to_string())
            .replace("{year_end}", &self.year_end.to_string())
    }
}
