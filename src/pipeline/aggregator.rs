use crate::error::Result;
use crate::models::{WeatherObservation, WeatherYearStat};
use crate::store::WeatherStore;
use crate::utils::constants::MM_PER_CM;
use std::collections::BTreeMap;

/// Rebuilds the yearly per-station statistics from the stored observations.
///
/// Every run is a full, order-independent recomputation: the complete result
/// set replaces the previous one atomically, so stale station/years never
/// survive and correctness does not depend on prior run state.
pub struct AggregationEngine;

impl AggregationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Read all observations, aggregate by `(station_id, year)`, and replace
    /// the statistics table with the result. Returns the number of rows
    /// written.
    pub fn recompute(&self, store: &mut WeatherStore) -> Result<usize> {
        let observations = store.observations()?;
        let stats = compute_year_stats(&observations);
        store.replace_year_stats(&stats)
    }
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Group observations by station and calendar year and fold each group into a
/// yearly statistic. Missing values are skipped, never treated as zero; a
/// group with no data for a field yields `None` for that field.
pub fn compute_year_stats(observations: &[WeatherObservation]) -> Vec<WeatherYearStat> {
    let mut groups: BTreeMap<(String, i32), GroupAccumulator> = BTreeMap::new();

    for obs in observations {
        let acc = groups.entry(obs.station_year()).or_default();
        acc.add(obs.max_temp_c, obs.min_temp_c, obs.precipitation_mm);
    }

    groups
        .into_iter()
        .map(|((station_id, year), acc)| acc.into_stat(station_id, year))
        .collect()
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    max_temp_sum: f64,
    max_temp_count: usize,
    min_temp_sum: f64,
    min_temp_count: usize,
    precip_sum_mm: f64,
    precip_count: usize,
}

impl GroupAccumulator {
    fn add(&mut self, max_temp: Option<f64>, min_temp: Option<f64>, precip_mm: Option<f64>) {
        if let Some(v) = max_temp {
            self.max_temp_sum += v;
            self.max_temp_count += 1;
        }
        if let Some(v) = min_temp {
            self.min_temp_sum += v;
            self.min_temp_count += 1;
        }
        if let Some(v) = precip_mm {
            self.precip_sum_mm += v;
            self.precip_count += 1;
        }
    }

    fn into_stat(self, station_id: String, year: i32) -> WeatherYearStat {
        WeatherYearStat {
            station_id,
            year,
            avg_max_temp_c: mean(self.max_temp_sum, self.max_temp_count),
            avg_min_temp_c: mean(self.min_temp_sum, self.min_temp_count),
            total_precip_cm: (self.precip_count > 0).then(|| self.precip_sum_mm / MM_PER_CM),
        }
    }
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn obs(
        station: &str,
        ymd: (i32, u32, u32),
        max: Option<f64>,
        min: Option<f64>,
        prcp: Option<f64>,
    ) -> WeatherObservation {
        WeatherObservation::new(
            station,
            NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            max,
            min,
            prcp,
        )
    }

    #[test]
    fn test_average_skips_missing_values() {
        let observations = vec![
            obs("S", (2020, 1, 1), Some(15.0), None, None),
            obs("S", (2020, 1, 2), None, None, None),
        ];

        let stats = compute_year_stats(&observations);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].avg_max_temp_c, Some(15.0));
        assert_eq!(stats[0].avg_min_temp_c, None);
    }

    #[test]
    fn test_all_missing_precipitation_is_none_not_zero() {
        let observations = vec![
            obs("S", (2020, 1, 1), Some(1.0), Some(0.0), None),
            obs("S", (2020, 1, 2), Some(2.0), Some(1.0), None),
        ];

        let stats = compute_year_stats(&observations);

        assert_eq!(stats[0].total_precip_cm, None);
    }

    #[test]
    fn test_precipitation_total_converts_mm_to_cm() {
        let observations = vec![
            obs("S", (2020, 1, 1), None, None, Some(4.0)),
            obs("S", (2020, 1, 2), None, None, Some(6.0)),
        ];

        let stats = compute_year_stats(&observations);

        assert_eq!(stats[0].total_precip_cm, Some(1.0));
    }

    #[test]
    fn test_groups_by_station_and_year() {
        let observations = vec![
            obs("A", (2019, 12, 31), Some(10.0), None, None),
            obs("A", (2020, 1, 1), Some(20.0), None, None),
            obs("B", (2020, 1, 1), Some(30.0), None, None),
        ];

        let stats = compute_year_stats(&observations);

        assert_eq!(stats.len(), 3);
        assert_eq!(
            stats[0],
            WeatherYearStat::new("A", 2019, Some(10.0), None, None)
        );
        assert_eq!(
            stats[1],
            WeatherYearStat::new("A", 2020, Some(20.0), None, None)
        );
        assert_eq!(
            stats[2],
            WeatherYearStat::new("B", 2020, Some(30.0), None, None)
        );
    }

    #[test]
    fn test_order_independent() {
        let mut forward = vec![
            obs("A", (2020, 1, 1), Some(15.0), Some(-5.0), Some(0.0)),
            obs("A", (2020, 1, 2), None, Some(-3.0), Some(10.0)),
        ];
        let stats_forward = compute_year_stats(&forward);
        forward.reverse();
        let stats_reverse = compute_year_stats(&forward);

        assert_eq!(stats_forward, stats_reverse);
        assert_eq!(
            stats_forward[0],
            WeatherYearStat::new("A", 2020, Some(15.0), Some(-4.0), Some(1.0))
        );
    }

    #[test]
    fn test_recompute_replaces_prior_stats() {
        let mut store = WeatherStore::open_in_memory().unwrap();
        store
            .replace_year_stats(&[WeatherYearStat::new("STALE", 1999, None, None, None)])
            .unwrap();
        store
            .upsert_weather(&obs("A", (2020, 1, 1), Some(15.0), Some(-5.0), Some(0.0)))
            .unwrap();

        let written = AggregationEngine::new().recompute(&mut store).unwrap();

        assert_eq!(written, 1);
        let stats = store
            .stats_page(&crate::store::StatsFilter::default())
            .unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].station_id, "A");
    }
}
