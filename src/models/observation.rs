use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One station's measurement for one calendar day.
///
/// `(station_id, date)` uniquely identifies an observation; re-ingesting the
/// same key replaces the prior values. Missing measurements are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub station_id: String,
    pub date: NaiveDate,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

impl WeatherObservation {
    pub fn new(
        station_id: impl Into<String>,
        date: NaiveDate,
        max_temp_c: Option<f64>,
        min_temp_c: Option<f64>,
        precipitation_mm: Option<f64>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            max_temp_c,
            min_temp_c,
            precipitation_mm,
        }
    }

    /// Grouping key for yearly aggregation.
    pub fn station_year(&self) -> (String, i32) {
        (self.station_id.clone(), self.date.year())
    }

    pub fn has_any_data(&self) -> bool {
        self.max_temp_c.is_some() || self.min_temp_c.is_some() || self.precipitation_mm.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_year_key() {
        let date = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();
        let obs = WeatherObservation::new("USC001", date, Some(15.0), None, Some(0.0));

        assert_eq!(obs.station_year(), ("USC001".to_string(), 2020));
        assert!(obs.has_any_data());
    }

    #[test]
    fn test_all_missing() {
        let date = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();
        let obs = WeatherObservation::new("USC001", date, None, None, None);

        assert!(!obs.has_any_data());
    }
}
