pub mod discovery;
pub mod weather_reader;
pub mod yield_reader;

pub use discovery::{discover_station_files, StationFile};
pub use weather_reader::{StationBatch, WeatherReader};
pub use yield_reader::{YieldBatch, YieldReader};
