use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::ObservationRow;

/// VHI summary for one (region, year) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub region_id: u8,
    pub year: i32,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Group rows by (region, year). The BTreeMap key order fixes the output order.
pub fn grouped<'a, I>(rows: I) -> Vec<GroupStats>
where
    I: IntoIterator<Item = &'a ObservationRow>,
{
    let mut groups: BTreeMap<(u8, i32), Vec<f64>> = BTreeMap::new();
    for r in rows {
        groups.entry((r.region_id, r.year)).or_default().push(r.vhi);
    }
    groups
        .into_iter()
        .filter_map(|((region_id, year), values)| summarize(region_id, year, values))
        .collect()
}

fn summarize(region_id: u8, year: i32, mut values: Vec<f64>) -> Option<GroupStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    Some(GroupStats {
        region_id,
        year,
        count,
        min: values[0],
        max: values[count - 1],
        mean,
        median: median_sorted(&values),
    })
}

/// Median of a sorted, non-empty slice; even lengths average the middle pair.
fn median_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests::row;

    #[test]
    fn even_median_averages_middle() {
        assert_eq!(median_sorted(&[1.0, 2.0, 4.0, 10.0]), 3.0);
        assert_eq!(median_sorted(&[7.0]), 7.0);
    }

    #[test]
    fn groups_are_sorted_region_then_year() {
        let rows = vec![
            row(3, 2001, 1, 50.0),
            row(1, 2005, 1, 20.0),
            row(1, 2001, 1, 30.0),
            row(1, 2001, 2, 10.0),
        ];
        let out = grouped(&rows);
        let keys: Vec<(u8, i32)> = out.iter().map(|g| (g.region_id, g.year)).collect();
        assert_eq!(keys, vec![(1, 2001), (1, 2005), (3, 2001)]);
        assert_eq!(out[0].count, 2);
        assert_eq!(out[0].median, 20.0);
        assert_eq!(out[0].min, 10.0);
    }
}
