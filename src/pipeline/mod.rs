pub mod aggregator;
pub mod orchestrator;
pub mod summary;

pub use aggregator::AggregationEngine;
pub use orchestrator::Pipeline;
pub use summary::{PhaseReport, RunSummary};
