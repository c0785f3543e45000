// src/query/mod.rs
pub mod drought;
pub mod stats;

pub use drought::{AffectedRegion, DroughtReport, DroughtYear, DROUGHT_VHI};
pub use stats::GroupStats;

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

use crate::{
    dataset::{ObservationRow, UnifiedDataset},
    error::ValidationError,
    region::{RegionDirectory, RegionName},
};

/// Parameters for [`QueryEngine::point_lookup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLookup {
    pub region_id: i64,
    pub year: i32,
}

/// Parameters for [`QueryEngine::grouped_statistics`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedStatistics {
    pub region_ids: BTreeSet<i64>,
    pub years: BTreeSet<i32>,
}

/// Parameters for [`QueryEngine::ranged_series`]; bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct RangedSeries {
    pub region_ids: BTreeSet<i64>,
    pub year_start: i32,
    pub year_end: i32,
}

/// Parameters for [`QueryEngine::drought_years`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroughtYears {
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekReading {
    pub week: Option<u16>,
    pub vhi: f64,
}

/// One region's readings for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSeries {
    pub region_id: u8,
    pub region_name: RegionName,
    pub year: i32,
    pub readings: Vec<WeekReading>,
}

/// Read-only queries over a built dataset. Every operation validates its
/// parameters before touching any rows.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    dataset: &'a UnifiedDataset,
}

impl<'a> QueryEngine<'a> {
    pub fn new(dataset: &'a UnifiedDataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &'a UnifiedDataset {
        self.dataset
    }

    /// Weekly readings of one region in one year. No match is an empty
    /// series, not an error.
    #[instrument(level = "debug", skip(self))]
    pub fn point_lookup(&self, params: &PointLookup) -> Result<YearSeries, ValidationError> {
        let region_id = validate_region(params.region_id)?;
        let readings: Vec<WeekReading> = self
            .dataset
            .rows()
            .iter()
            .filter(|r| r.region_id == region_id && r.year == params.year)
            .map(|r| WeekReading {
                week: r.week,
                vhi: r.vhi,
            })
            .collect();
        debug!(matches = readings.len(), "point lookup");
        Ok(YearSeries {
            region_id,
            region_name: RegionDirectory::resolve(region_id),
            year: params.year,
            readings,
        })
    }

    /// min/max/mean/median per present (region, year), ordered by region then year.
    #[instrument(level = "debug", skip(self))]
    pub fn grouped_statistics(
        &self,
        params: &GroupedStatistics,
    ) -> Result<Vec<GroupStats>, ValidationError> {
        let regions = validate_regions(&params.region_ids)?;
        if params.years.is_empty() {
            return Err(ValidationError::EmptySelection("year"));
        }
        Ok(stats::grouped(self.dataset.rows().iter().filter(|r| {
            regions.contains(&r.region_id) && params.years.contains(&r.year)
        })))
    }

    /// Rows for the selected regions with `year_start <= year <= year_end`.
    /// An inverted range matches nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn ranged_series(
        &self,
        params: &RangedSeries,
    ) -> Result<Vec<&'a ObservationRow>, ValidationError> {
        let regions = validate_regions(&params.region_ids)?;
        let span = params.year_start..=params.year_end;
        Ok(self
            .dataset
            .rows()
            .iter()
            .filter(|r| regions.contains(&r.region_id) && span.contains(&r.year))
            .collect())
    }

    /// Years in which at least `percent`% of all 25 regions had a drought
    /// observation, with each affected region's worst reading.
    #[instrument(level = "debug", skip(self))]
    pub fn drought_years(&self, params: &DroughtYears) -> Result<DroughtReport, ValidationError> {
        let threshold_count = drought::threshold_count(params.percent)?;
        Ok(drought::detect(
            self.dataset.rows(),
            params.percent,
            threshold_count,
        ))
    }
}

fn validate_region(id: i64) -> Result<u8, ValidationError> {
    if !RegionDirectory::contains(id) {
        return Err(ValidationError::RegionOutOfRange(id));
    }
    u8::try_from(id).map_err(|_| ValidationError::RegionOutOfRange(id))
}

fn validate_regions(ids: &BTreeSet<i64>) -> Result<BTreeSet<u8>, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptySelection("region"));
    }
    ids.iter().map(|&id| validate_region(id)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(region_id: u8, year: i32, week: u16, vhi: f64) -> ObservationRow {
        ObservationRow::new(region_id, year, Some(week), vhi)
    }

    fn sample() -> UnifiedDataset {
        UnifiedDataset::from_rows(vec![
            row(1, 2020, 1, 10.0),
            row(1, 2020, 2, 20.0),
            row(1, 2020, 3, 30.0),
            row(1, 2012, 1, 55.0),
            row(2, 2010, 1, 44.0),
            row(2, 2015, 1, 41.0),
            row(2, 2016, 1, 40.0),
        ])
    }

    fn ids(v: &[i64]) -> BTreeSet<i64> {
        v.iter().copied().collect()
    }

    #[test]
    fn point_lookup_returns_weeks() {
        let ds = sample();
        let q = QueryEngine::new(&ds);
        let series = q
            .point_lookup(&PointLookup {
                region_id: 1,
                year: 2020,
            })
            .unwrap();
        assert_eq!(series.region_name.as_str(), "Вінницька");
        let weeks: Vec<Option<u16>> = series.readings.iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn point_lookup_without_match_is_empty() {
        let ds = sample();
        let series = QueryEngine::new(&ds)
            .point_lookup(&PointLookup {
                region_id: 9,
                year: 1999,
            })
            .unwrap();
        assert!(series.readings.is_empty());
    }

    #[test]
    fn point_lookup_rejects_bad_region() {
        let ds = sample();
        let err = QueryEngine::new(&ds)
            .point_lookup(&PointLookup {
                region_id: 26,
                year: 2020,
            })
            .unwrap_err();
        assert_eq!(err, ValidationError::RegionOutOfRange(26));
    }

    #[test]
    fn grouped_statistics_for_region_one() {
        let ds = sample();
        let out = QueryEngine::new(&ds)
            .grouped_statistics(&GroupedStatistics {
                region_ids: ids(&[1, 2]),
                years: [2020].into_iter().collect(),
            })
            .unwrap();
        assert_eq!(out.len(), 1, "region 2 has no 2020 rows and must be absent");
        let g = &out[0];
        assert_eq!((g.region_id, g.year), (1, 2020));
        assert_eq!((g.min, g.max, g.mean, g.median), (10.0, 30.0, 20.0, 20.0));
    }

    #[test]
    fn grouped_statistics_rejects_empty_selection() {
        let ds = sample();
        let q = QueryEngine::new(&ds);
        let err = q
            .grouped_statistics(&GroupedStatistics {
                region_ids: BTreeSet::new(),
                years: [2020].into_iter().collect(),
            })
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptySelection("region"));
        let err = q
            .grouped_statistics(&GroupedStatistics {
                region_ids: ids(&[1]),
                years: BTreeSet::new(),
            })
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptySelection("year"));
    }

    #[test]
    fn ranged_series_is_inclusive() {
        let ds = sample();
        let rows = QueryEngine::new(&ds)
            .ranged_series(&RangedSeries {
                region_ids: ids(&[2]),
                year_start: 2010,
                year_end: 2015,
            })
            .unwrap();
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2010, 2015]);
    }

    #[test]
    fn ranged_series_inverted_range_is_empty() {
        let ds = sample();
        let rows = QueryEngine::new(&ds)
            .ranged_series(&RangedSeries {
                region_ids: ids(&[1]),
                year_start: 2015,
                year_end: 2010,
            })
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn queries_over_empty_dataset() {
        let ds = UnifiedDataset::empty();
        let q = QueryEngine::new(&ds);
        assert!(q
            .grouped_statistics(&GroupedStatistics {
                region_ids: ids(&[1]),
                years: [2000].into_iter().collect(),
            })
            .unwrap()
            .is_empty());
        assert!(q.drought_years(&DroughtYears { percent: 50.0 }).unwrap().years.is_empty());
    }
}
