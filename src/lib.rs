pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod readers;
pub mod store;
pub mod utils;

pub use error::{PipelineError, Result};
