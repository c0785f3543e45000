// src/dataset/types.rs

use serde::Serialize;
use std::collections::BTreeSet;

use crate::region::{RegionDirectory, RegionName};

/// A single cleaned weekly observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationRow {
    pub region_id: u8,
    pub region_name: RegionName,
    pub year: i32,
    /// Reporting period within the year, when the source gave a usable one.
    pub week: Option<u16>,
    pub vhi: f64,
}

impl ObservationRow {
    /// Build a row, resolving the display name through the region directory.
    pub fn new(region_id: u8, year: i32, week: Option<u16>, vhi: f64) -> Self {
        Self {
            region_id,
            region_name: RegionDirectory::resolve(region_id),
            year,
            week,
            vhi,
        }
    }
}

/// All valid observations across regions. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnifiedDataset {
    rows: Vec<ObservationRow>,
}

impl UnifiedDataset {
    pub fn from_rows(rows: Vec<ObservationRow>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn region_ids(&self) -> BTreeSet<u8> {
        self.rows.iter().map(|r| r.region_id).collect()
    }

    pub fn years(&self) -> BTreeSet<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }
}
