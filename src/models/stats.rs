use serde::{Deserialize, Serialize};

/// Derived yearly summary for one station.
///
/// The full set of rows is a pure function of the stored observations and is
/// regenerated wholesale by every aggregation pass. A field is `None` when
/// every contributing value in the group was missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherYearStat {
    pub station_id: String,
    pub year: i32,
    pub avg_max_temp_c: Option<f64>,
    pub avg_min_temp_c: Option<f64>,
    pub total_precip_cm: Option<f64>,
}

impl WeatherYearStat {
    pub fn new(
        station_id: impl Into<String>,
        year: i32,
        avg_max_temp_c: Option<f64>,
        avg_min_temp_c: Option<f64>,
        total_precip_cm: Option<f64>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            year,
            avg_max_temp_c,
            avg_min_temp_c,
            total_precip_cm,
        }
    }
}
