// src/query/drought.rs

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::{
    dataset::ObservationRow,
    error::ValidationError,
    region::{RegionDirectory, RegionName, TOTAL_REGIONS},
};

/// A reading strictly below this is a drought observation.
pub const DROUGHT_VHI: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffectedRegion {
    pub region_id: u8,
    pub region_name: RegionName,
    /// Worst (lowest) drought reading of the region in that year.
    pub min_vhi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroughtYear {
    pub year: i32,
    pub affected: Vec<AffectedRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroughtReport {
    pub percent: f64,
    pub threshold_count: usize,
    pub total_regions: u8,
    /// Qualifying years in ascending order; empty when none qualify.
    pub years: Vec<DroughtYear>,
}

/// Distinct-region count a year needs, `floor(percent * 25 / 100)`.
/// `percent` must be finite and lie in `(0, 100]`.
pub fn threshold_count(percent: f64) -> Result<usize, ValidationError> {
    if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
        return Err(ValidationError::PercentOutOfRange(percent));
    }
    Ok((percent * TOTAL_REGIONS as f64 / 100.0).floor() as usize)
}

pub(crate) fn detect(rows: &[ObservationRow], percent: f64, threshold_count: usize) -> DroughtReport {
    // year -> region -> lowest drought reading
    let mut worst: BTreeMap<i32, BTreeMap<u8, f64>> = BTreeMap::new();
    for r in rows.iter().filter(|r| r.vhi < DROUGHT_VHI) {
        worst
            .entry(r.year)
            .or_default()
            .entry(r.region_id)
            .and_modify(|v| *v = v.min(r.vhi))
            .or_insert(r.vhi);
    }

    let years: Vec<DroughtYear> = worst
        .into_iter()
        .filter(|(_, regions)| regions.len() >= threshold_count)
        .map(|(year, regions)| DroughtYear {
            year,
            affected: regions
                .into_iter()
                .map(|(region_id, min_vhi)| AffectedRegion {
                    region_id,
                    region_name: RegionDirectory::resolve(region_id),
                    min_vhi,
                })
                .collect(),
        })
        .collect();

    debug!(threshold_count, qualifying = years.len(), "drought scan");
    DroughtReport {
        percent,
        threshold_count,
        total_regions: TOTAL_REGIONS,
        years,
    }
}
