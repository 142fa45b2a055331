use crate::error::{PipelineError, Result};
use crate::models::YieldRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug)]
pub struct YieldBatch {
    pub records: Vec<YieldRecord>,
    pub failures: Vec<PipelineError>,
}

/// Parses yield source lines: `<year> <total_yield>`, plain integers.
pub struct YieldReader;

impl YieldReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_file(&self, path: &Path) -> Result<YieldBatch> {
        let file = File::open(path).map_err(|e| PipelineError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let file_label = path.display().to_string();

        let mut records = Vec::new();
        let mut failures = Vec::new();

        for (idx, line_result) in BufReader::new(file).lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_line(&line, &file_label, idx + 1) {
                Ok(record) => records.push(record),
                Err(e) => failures.push(e),
            }
        }

        Ok(YieldBatch { records, failures })
    }

    pub fn parse_line(&self, line: &str, file: &str, line_no: usize) -> Result<YieldRecord> {
        let malformed = |reason: String| PipelineError::MalformedRecord {
            file: file.to_string(),
            line_no,
            line: line.to_string(),
            reason,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(malformed(format!(
                "expected 2 fields, found {}",
                tokens.len()
            )));
        }

        let year: i32 = tokens[0]
            .parse()
            .map_err(|_| malformed(format!("invalid year token '{}'", tokens[0])))?;
        let total_yield: i64 = tokens[1]
            .parse()
            .map_err(|_| malformed(format!("invalid yield token '{}'", tokens[1])))?;

        Ok(YieldRecord::new(year, total_yield))
    }
}

impl Default for YieldReader {
    fn default() -> Self {
        Self::new()
    }
}
