use chrono::NaiveDate;
use cropwx_pipeline::models::{WeatherObservation, WeatherYearStat, YieldRecord};
use cropwx_pipeline::pipeline::Pipeline;
use cropwx_pipeline::store::{StatsFilter, WeatherStore};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    wx_dir: PathBuf,
    yield_file: PathBuf,
    database: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let wx_dir = dir.path().join("wx_data");
    fs::create_dir(&wx_dir).unwrap();
    let yield_file = dir.path().join("US_corn_grain_yield.txt");
    fs::write(&yield_file, "2020 1000\n").unwrap();
    let database = dir.path().join("weather.db");
    Fixture {
        _dir: dir,
        wx_dir,
        yield_file,
        database,
    }
}

fn run_pipeline(f: &Fixture) -> cropwx_pipeline::pipeline::RunSummary {
    let mut store = WeatherStore::open(&f.database).unwrap();
    Pipeline::new(&f.wx_dir, &f.yield_file)
        .with_max_workers(2)
        .run(&mut store, None)
        .unwrap()
}

fn dump(
    database: &Path,
) -> (
    Vec<WeatherObservation>,
    Vec<WeatherYearStat>,
    Vec<YieldRecord>,
) {
    let store = WeatherStore::open(database).unwrap();
    (
        store.observations().unwrap(),
        store.stats_page(&StatsFilter::default()).unwrap(),
        store.yields().unwrap(),
    )
}

#[test]
fn test_end_to_end_example() {
    let f = fixture();
    fs::write(
        f.wx_dir.join("A.txt"),
        "20200101 150 -50 0\n20200102 -9999 -30 100\n",
    )
    .unwrap();

    let summary = run_pipeline(&f);
    assert_eq!(summary.weather.rows_written, 2);
    assert_eq!(summary.yields.rows_written, 1);
    assert_eq!(summary.stats_rows, 1);

    let (weather, stats, yields) = dump(&f.database);

    assert_eq!(
        weather,
        vec![
            WeatherObservation::new(
                "A",
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                Some(15.0),
                Some(-5.0),
                Some(0.0),
            ),
            WeatherObservation::new(
                "A",
                NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                None,
                Some(-3.0),
                Some(10.0),
            ),
        ]
    );
    assert_eq!(
        stats,
        vec![WeatherYearStat::new(
            "A",
            2020,
            Some(15.0),
            Some(-4.0),
            Some(1.0)
        )]
    );
    assert_eq!(yields, vec![YieldRecord::new(2020, 1000)]);
}

#[test]
fn test_pipeline_is_idempotent() {
    let f = fixture();
    fs::write(
        f.wx_dir.join("A.txt"),
        "20200101 150 -50 0\n20200102 -9999 -30 100\n",
    )
    .unwrap();
    fs::write(
        f.wx_dir.join("B.txt"),
        "20190701 300 180 -9999\n20200701 310 190 25\n",
    )
    .unwrap();

    run_pipeline(&f);
    let first = dump(&f.database);

    run_pipeline(&f);
    let second = dump(&f.database);

    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

#[test]
fn test_malformed_line_is_isolated() {
    let f = fixture();
    fs::write(f.wx_dir.join("A.txt"), "20200101 150 -50 0\n20200102 150 -50\n").unwrap();

    let summary = run_pipeline(&f);

    assert_eq!(summary.weather.rows_written, 1);
    assert_eq!(summary.weather.failures.len(), 1);

    let (weather, _, _) = dump(&f.database);
    assert_eq!(weather.len(), 1);
}

#[test]
fn test_aggregation_drops_stale_station_years() {
    let f = fixture();
    fs::write(f.wx_dir.join("A.txt"), "20200101 150 -50 0\n").unwrap();
    fs::write(f.wx_dir.join("GONE.txt"), "19990101 100 0 0\n").unwrap();

    run_pipeline(&f);
    let (_, stats, _) = dump(&f.database);
    assert_eq!(stats.len(), 2);

    // The observation source disappears, but its already-ingested rows remain;
    // only stations absent from the weather table lose their stats rows. Make
    // the rebuild observable by removing the stored rows out of band.
    {
        let conn = rusqlite::Connection::open(&f.database).unwrap();
        conn.execute("DELETE FROM weather WHERE station_id = 'GONE'", [])
            .unwrap();
    }
    fs::remove_file(f.wx_dir.join("GONE.txt")).unwrap();

    run_pipeline(&f);
    let (_, stats, _) = dump(&f.database);

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].station_id, "A");
}

#[test]
fn test_all_null_precipitation_group_is_null() {
    let f = fixture();
    fs::write(
        f.wx_dir.join("S.txt"),
        "20200101 150 -50 -9999\n20200102 160 -40 -9999\n",
    )
    .unwrap();

    run_pipeline(&f);
    let (_, stats, _) = dump(&f.database);

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total_precip_cm, None);
    assert_eq!(stats[0].avg_max_temp_c, Some(15.5));
}
