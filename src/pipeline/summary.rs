use crate::error::PipelineError;

/// Outcome of one ingestion phase: rows committed plus the per-line parse
/// failures that were skipped. A non-empty failure list is reported, not
/// fatal.
#[derive(Debug, Default)]
pub struct PhaseReport {
    pub rows_written: usize,
    pub failures: Vec<PipelineError>,
}

/// What one full pipeline run did, phase by phase.
#[derive(Debug)]
pub struct RunSummary {
    pub weather_files: usize,
    pub weather: PhaseReport,
    pub yields: PhaseReport,
    pub stats_rows: usize,
}

impl RunSummary {
    pub fn failure_count(&self) -> usize {
        self.weather.failures.len() + self.yields.failures.len()
    }

    /// Operator-facing report printed at the end of a run.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Pipeline Summary\n");
        out.push_str("================\n");
        out.push_str(&format!(
            "Weather ingestion:  {} rows upserted from {} station files\n",
            self.weather.rows_written, self.weather_files
        ));
        out.push_str(&format!(
            "Yield ingestion:    {} rows upserted\n",
            self.yields.rows_written
        ));
        out.push_str(&format!(
            "Aggregation:        {} station-year statistics written\n",
            self.stats_rows
        ));
        out.push_str(&format!(
            "Parse failures:     {} lines skipped\n",
            self.failure_count()
        ));
        for failure in self.weather.failures.iter().chain(&self.yields.failures) {
            out.push_str(&format!("  - {}\n", failure));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_failures() {
        let summary = RunSummary {
            weather_files: 2,
            weather: PhaseReport {
                rows_written: 5,
                failures: vec![PipelineError::MalformedRecord {
                    file: "wx/A.txt".to_string(),
                    line_no: 3,
                    line: "bad line".to_string(),
                    reason: "expected 4 fields, found 2".to_string(),
                }],
            },
            yields: PhaseReport {
                rows_written: 1,
                failures: vec![],
            },
            stats_rows: 1,
        };

        let text = summary.render();
        assert!(text.contains("5 rows upserted from 2 station files"));
        assert!(text.contains("1 lines skipped"));
        assert!(text.contains("wx/A.txt:3"));
    }
}
