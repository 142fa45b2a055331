pub mod observation;
pub mod stats;
pub mod yield_record;

pub use observation::WeatherObservation;
pub use stats::WeatherYearStat;
pub use yield_record::YieldRecord;
