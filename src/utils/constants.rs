/// Sentinel encoding "missing" in weather source files
pub const MISSING_SENTINEL: &str = "-9999";

/// Weather values are fixed-point integers in tenths of a unit
pub const FIXED_POINT_DIVISOR: f64 = 10.0;

/// Millimeters per centimeter, for the precipitation total conversion
pub const MM_PER_CM: f64 = 10.0;

/// Default source and store locations (deployment layout)
pub const DEFAULT_WX_DIR: &str = "wx_data";
pub const DEFAULT_YIELD_FILE: &str = "yld_data/US_corn_grain_yield.txt";
pub const DEFAULT_DATABASE: &str = "weather.db";

/// Pagination defaults for the query-service read surface
pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 50;
