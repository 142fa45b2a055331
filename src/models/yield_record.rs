use serde::{Deserialize, Serialize};

/// National annual total crop yield. `year` is the unique key; re-ingestion
/// overwrites the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldRecord {
    pub year: i32,
    pub total_yield: i64,
}

impl YieldRecord {
    pub fn new(year: i32, total_yield: i64) -> Self {
        Self { year, total_yield }
    }
}
