use std::{collections::BTreeSet, fs, path::Path};

use tempfile::tempdir;
use vhiscraper::{
    dataset,
    query::{DroughtYears, GroupedStatistics, PointLookup, RangedSeries},
    Config, QueryEngine,
};

fn write_export(dir: &Path, name: &str, rows: &[(i32, u16, &str)]) {
    let mut s = String::from("<tt><pre>1981-2024 Province VHI, mean<br>\n");
    s.push_str("year,week, SMN,SMT,VCI,TCI, VHI<br>\n");
    for (y, w, v) in rows {
        s.push_str(&format!("{},{:3}, 0.050,262.00, 40.00, 30.00, {},<br>\n", y, w, v));
    }
    s.push_str("</pre></tt>\n");
    fs::write(dir.join(name), s).unwrap();
}

#[test]
fn directory_to_drought_report() {
    let dir = tempdir().unwrap();
    // five regions in drought during 2007, four during 2008
    for id in 1..=5u8 {
        let vhi_2008 = if id < 5 { "11.00" } else { "35.00" };
        write_export(
            dir.path(),
            &format!("vhi_id_{}_17102026101500.csv", id),
            &[
                (2007, 30, "14.50"),
                (2007, 31, "8.25"),
                (2008, 30, vhi_2008),
                (2008, 31, "N/A"),
                (2009, 1, "-1.00"),
            ],
        );
    }
    write_export(dir.path(), "vhi_id_bad_17102026101500.csv", &[(2007, 1, "1.00")]);
    fs::write(
        dir.path().join("vhi_id_6_17102026101500.csv"),
        "meta\nyear,week,VHI\n2007,1,N/A\n2007,2,N/A\n",
    )
    .unwrap();

    let cfg = Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let (data, report) = dataset::build_from_dir(&cfg).unwrap();

    assert_eq!(report.files_seen, 7);
    assert_eq!(report.files_parsed, 6);
    assert_eq!(report.removed, vec!["vhi_id_bad_17102026101500.csv".to_string()]);
    assert!(!dir.path().join("vhi_id_bad_17102026101500.csv").exists());
    assert_eq!(data.len(), 15);
    assert!(data
        .rows()
        .iter()
        .all(|r| r.vhi >= 0.0 && r.region_name.is_known()));

    let engine = QueryEngine::new(&data);
    let report = engine.drought_years(&DroughtYears { percent: 20.0 }).unwrap();
    assert_eq!(report.threshold_count, 5);
    assert_eq!(report.years.len(), 1);
    assert_eq!(report.years[0].year, 2007);
    assert!(report.years[0].affected.iter().all(|a| a.min_vhi == 8.25));

    let series = engine
        .point_lookup(&PointLookup {
            region_id: 3,
            year: 2007,
        })
        .unwrap();
    assert_eq!(series.readings.len(), 2);

    let stats = engine
        .grouped_statistics(&GroupedStatistics {
            region_ids: [1, 5].into_iter().collect(),
            years: [2008].into_iter().collect(),
        })
        .unwrap();
    let maxes: Vec<f64> = stats.iter().map(|g| g.max).collect();
    assert_eq!(maxes, vec![11.0, 35.0]);

    let rows = engine
        .ranged_series(&RangedSeries {
            region_ids: BTreeSet::from([2]),
            year_start: 2008,
            year_end: 2009,
        })
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn rebuilding_is_stable() {
    let dir = tempdir().unwrap();
    write_export(
        dir.path(),
        "vhi_id_9_01012024000000.csv",
        &[(2000, 1, "50.00"), (2000, 2, "12.00")],
    );
    let (first, _) = dataset::build_from_path(dir.path()).unwrap();
    let (second, _) = dataset::build_from_path(dir.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}
