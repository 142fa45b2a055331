use crate::error::{PipelineError, Result};
use crate::models::WeatherObservation;
use crate::readers::StationFile;
use crate::utils::constants::{FIXED_POINT_DIVISOR, MISSING_SENTINEL};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Everything parsed out of one station file: the well-formed observations in
/// line order, plus one error per malformed line. Malformed lines are isolated
/// here and never abort the run.
#[derive(Debug)]
pub struct StationBatch {
    pub station_id: String,
    pub observations: Vec<WeatherObservation>,
    pub failures: Vec<PipelineError>,
}

/// Parses weather source lines: `<yyyymmdd> <tmax> <tmin> <prcp>`, integer
/// tokens in tenths of a unit, `-9999` meaning missing.
pub struct WeatherReader;

impl WeatherReader {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse an entire station file.
    ///
    /// An unreadable file is a fatal source fault; a bad line only adds to
    /// `failures`.
    pub fn read_station_file(&self, station: &StationFile) -> Result<StationBatch> {
        let file = File::open(&station.path).map_err(|e| PipelineError::SourceUnavailable {
            path: station.path.clone(),
            reason: e.to_string(),
        })?;
        let file_label = station.path.display().to_string();

        let mut observations = Vec::new();
        let mut failures = Vec::new();

        for (idx, line_result) in BufReader::new(file).lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_line(&line, &station.station_id, &file_label, idx + 1) {
                Ok(obs) => observations.push(obs),
                Err(e) => failures.push(e),
            }
        }

        Ok(StationBatch {
            station_id: station.station_id.clone(),
            observations,
            failures,
        })
    }

    /// Parse one line into an observation. Pure function of its input.
    pub fn parse_line(
        &self,
        line: &str,
        station_id: &str,
        file: &str,
        line_no: usize,
    ) -> Result<WeatherObservation> {
        let malformed = |reason: String| PipelineError::MalformedRecord {
            file: file.to_string(),
            line_no,
            line: line.to_string(),
            reason,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(malformed(format!(
                "expected 4 fields, found {}",
                tokens.len()
            )));
        }

        let date = parse_date(tokens[0]).map_err(&malformed)?;
        let max_temp_c = parse_value(tokens[1]).map_err(&malformed)?;
        let min_temp_c = parse_value(tokens[2]).map_err(&malformed)?;
        let precipitation_mm = parse_value(tokens[3]).map_err(&malformed)?;

        Ok(WeatherObservation::new(
            station_id,
            date,
            max_temp_c,
            min_temp_c,
            precipitation_mm,
        ))
    }
}

impl Default for WeatherReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Dates are exactly 8 digits, `YYYYMMDD`, and must form a real calendar date.
fn parse_date(token: &str) -> std::result::Result<NaiveDate, String> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid date token '{}'", token));
    }
    NaiveDate::parse_from_str(token, "%Y%m%d")
        .map_err(|_| format!("invalid calendar date '{}'", token))
}

/// Decode one measurement token: the sentinel maps to missing, any other
/// integer is tenths of a unit.
fn parse_value(token: &str) -> std::result::Result<Option<f64>, String> {
    if token == MISSING_SENTINEL {
        return Ok(None);
    }
    let raw: i64 = token
        .parse()
        .map_err(|_| format!("invalid integer token '{}'", token))?;
    Ok(Some(raw as f64 / FIXED_POINT_DIVISOR))
}
