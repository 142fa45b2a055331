use crate::error::{PipelineError, Result};
use crate::pipeline::aggregator::AggregationEngine;
use crate::pipeline::summary::{PhaseReport, RunSummary};
use crate::readers::{discover_station_files, StationBatch, WeatherReader, YieldReader};
use crate::store::WeatherStore;
use crate::utils::progress::ProgressReporter;
use std::path::PathBuf;
use tracing::{info, warn};

/// Sequences the three pipeline phases: weather ingestion, yield ingestion,
/// aggregation. Each phase commits fully before the next begins, so the
/// aggregation pass always reads a complete ingested snapshot.
pub struct Pipeline {
    wx_dir: PathBuf,
    yield_file: PathBuf,
    max_workers: usize,
}

impl Pipeline {
    pub fn new(wx_dir: impl Into<PathBuf>, yield_file: impl Into<PathBuf>) -> Self {
        Self {
            wx_dir: wx_dir.into(),
            yield_file: yield_file.into(),
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Run all three phases in order. Per-line parse failures are collected
    /// into the summary; the first fatal error aborts the remaining phases.
    pub fn run(
        &self,
        store: &mut WeatherStore,
        progress: Option<&ProgressReporter>,
    ) -> Result<RunSummary> {
        let (weather_files, weather) = self.ingest_weather(store, progress)?;
        info!(
            rows = weather.rows_written,
            files = weather_files,
            "weather ingestion complete"
        );

        let yields = self.ingest_yield(store)?;
        info!(rows = yields.rows_written, "yield ingestion complete");

        // Barrier: both ingestion phases have committed before this read.
        if let Some(p) = progress {
            p.set_message("Recomputing yearly statistics...");
        }
        let stats_rows = AggregationEngine::new().recompute(store)?;
        info!(rows = stats_rows, "statistics recomputed");

        Ok(RunSummary {
            weather_files,
            weather,
            yields,
            stats_rows,
        })
    }

    /// Discover station files, parse them on a bounded worker pool, and upsert
    /// each file's batch in its own transaction.
    ///
    /// Workers only parse; every write goes through the single store handle on
    /// this thread, so concurrent same-key writes cannot interleave. Files
    /// hold disjoint station keys, so completion order does not affect the
    /// final state.
    fn ingest_weather(
        &self,
        store: &mut WeatherStore,
        progress: Option<&ProgressReporter>,
    ) -> Result<(usize, PhaseReport)> {
        let files = discover_station_files(&self.wx_dir)?;
        if let Some(p) = progress {
            p.set_message(&format!("Ingesting {} station files...", files.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let (tx, rx) = crossbeam::channel::bounded::<Result<StationBatch>>(self.max_workers);

        let mut report = PhaseReport::default();
        let mut fatal: Option<PipelineError> = None;

        let files_ref = &files;
        pool.in_place_scope(|scope| {
            scope.spawn(move |_| {
                use rayon::prelude::*;
                files_ref.par_iter().for_each_with(tx, |tx, file| {
                    let reader = WeatherReader::new();
                    // send failure means the consumer bailed; nothing to do
                    let _ = tx.send(reader.read_station_file(file));
                });
            });

            for result in &rx {
                match result {
                    Ok(batch) => {
                        for failure in &batch.failures {
                            warn!(station = %batch.station_id, "{}", failure);
                        }
                        report.failures.extend(batch.failures);
                        match store.upsert_weather_batch(&batch.observations) {
                            Ok(written) => {
                                report.rows_written += written;
                                if let Some(p) = progress {
                                    p.increment(1);
                                }
                            }
                            Err(e) => {
                                fatal = Some(e);
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        fatal = Some(e);
                        break;
                    }
                }
            }
            // Dropping the receiver unblocks any producer still sending.
            drop(rx);
        });

        match fatal {
            Some(e) => Err(e),
            None => Ok((files.len(), report)),
        }
    }

    fn ingest_yield(&self, store: &mut WeatherStore) -> Result<PhaseReport> {
        let batch = YieldReader::new().read_file(&self.yield_file)?;
        for failure in &batch.failures {
            warn!("{}", failure);
        }
        let rows_written = store.upsert_yield_batch(&batch.records)?;
        Ok(PhaseReport {
            rows_written,
            failures: batch.failures,
        })
    }
}
