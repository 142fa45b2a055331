use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::pipeline::{AggregationEngine, Pipeline};
use crate::store::{StatsFilter, WeatherFilter, WeatherStore};
use crate::utils::progress::ProgressReporter;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            wx_dir,
            yield_file,
            database,
            max_workers,
        } => {
            println!("Ingesting weather and yield data...");
            println!("Weather directory: {}", wx_dir.display());
            println!("Yield file: {}", yield_file.display());
            println!("Database: {}", database.display());

            let mut store = WeatherStore::open(&database)?;
            let pipeline = Pipeline::new(wx_dir, yield_file).with_max_workers(max_workers);

            let progress = ProgressReporter::new_spinner("Running pipeline...", cli.quiet);
            let summary = tokio::task::spawn_blocking(move || {
                let summary = pipeline.run(&mut store, Some(&progress))?;
                progress.finish_with_message("Pipeline complete");
                Ok::<_, crate::PipelineError>(summary)
            })
            .await??;

            println!("\n{}", summary.render());
        }

        Commands::Recompute { database } => {
            println!("Recomputing yearly statistics...");

            let mut store = WeatherStore::open(&database)?;
            let written = AggregationEngine::new().recompute(&mut store)?;

            println!("Wrote {} station-year statistics", written);
        }

        Commands::Info {
            database,
            sample,
            station_id,
            json,
        } => {
            let store = WeatherStore::open(&database)?;

            let weather = store.weather_page(&WeatherFilter {
                station_id: station_id.clone(),
                page_size: Some(sample),
                ..Default::default()
            })?;
            let stats = store.stats_page(&StatsFilter {
                station_id,
                page_size: Some(sample),
                ..Default::default()
            })?;
            let yields = store.yields()?;

            if json {
                let doc = serde_json::json!({
                    "counts": {
                        "weather": store.weather_count()?,
                        "weather_stats": store.stats_count()?,
                        "yield": store.yield_count()?,
                    },
                    "weather": weather,
                    "weather_stats": stats,
                    "yield": yields.iter().take(sample).collect::<Vec<_>>(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&doc)
                        .map_err(|e| crate::PipelineError::Config(e.to_string()))?
                );
                return Ok(());
            }

            println!("Database: {}", database.display());
            println!("  weather:       {} rows", store.weather_count()?);
            println!("  weather_stats: {} rows", store.stats_count()?);
            println!("  yield:         {} rows", store.yield_count()?);

            if sample == 0 {
                return Ok(());
            }

            if !weather.is_empty() {
                println!("\nObservations (first {}):", weather.len());
                for obs in &weather {
                    println!(
                        "  {} {}: max={} min={} prcp={}",
                        obs.station_id,
                        obs.date,
                        fmt_opt(obs.max_temp_c),
                        fmt_opt(obs.min_temp_c),
                        fmt_opt(obs.precipitation_mm),
                    );
                }
            }

            if !stats.is_empty() {
                println!("\nYearly statistics (first {}):", stats.len());
                for stat in &stats {
                    println!(
                        "  {} {}: avg_max={} avg_min={} total_prcp_cm={}",
                        stat.station_id,
                        stat.year,
                        fmt_opt(stat.avg_max_temp_c),
                        fmt_opt(stat.avg_min_temp_c),
                        fmt_opt(stat.total_precip_cm),
                    );
                }
            }

            if !yields.is_empty() {
                println!("\nYield records:");
                for record in yields.iter().take(sample) {
                    println!("  {}: {}", record.year, record.total_yield);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Ignore the error if a subscriber is already installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "null".to_string(),
    }
}
