use crate::error::{PipelineError, Result};
use crate::models::{WeatherObservation, WeatherYearStat, YieldRecord};
use crate::utils::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA: &str = r#"
    PRAGMA journal_mode=WAL;
    CREATE TABLE IF NOT EXISTS weather (
        station_id       TEXT NOT NULL,
        date             TEXT NOT NULL,
        max_temp_c       REAL,
        min_temp_c       REAL,
        precipitation_mm REAL,
        PRIMARY KEY (station_id, date)
    );
    CREATE TABLE IF NOT EXISTS weather_stats (
        station_id      TEXT NOT NULL,
        year            INTEGER NOT NULL,
        avg_max_temp_c  REAL,
        avg_min_temp_c  REAL,
        total_precip_cm REAL,
        PRIMARY KEY (station_id, year)
    );
    CREATE TABLE IF NOT EXISTS yield (
        year        INTEGER PRIMARY KEY,
        total_yield INTEGER NOT NULL
    );
"#;

const UPSERT_WEATHER: &str = "INSERT INTO weather \
     (station_id, date, max_temp_c, min_temp_c, precipitation_mm) \
     VALUES (?1, ?2, ?3, ?4, ?5) \
     ON CONFLICT(station_id, date) DO UPDATE SET \
     max_temp_c = excluded.max_temp_c, \
     min_temp_c = excluded.min_temp_c, \
     precipitation_mm = excluded.precipitation_mm";

const UPSERT_YIELD: &str = "INSERT INTO yield (year, total_yield) VALUES (?1, ?2) \
     ON CONFLICT(year) DO UPDATE SET total_yield = excluded.total_yield";

/// Range/equality filter plus pagination for the `weather` table, matching the
/// query surface the external read service exposes.
#[derive(Debug, Default, Clone)]
pub struct WeatherFilter {
    pub station_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Filter plus pagination for the `weather_stats` table.
#[derive(Debug, Default, Clone)]
pub struct StatsFilter {
    pub station_id: Option<String>,
    pub year: Option<i32>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn limit_offset(page: Option<usize>, page_size: Option<usize>) -> (i64, i64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    (size as i64, ((page - 1) * size) as i64)
}

/// Durable owner of the `weather`, `weather_stats` and `yield` tables.
///
/// All writes are idempotent: row upserts replace non-key fields on conflict,
/// and the statistics refresh is a single delete-then-insert transaction, so
/// re-running any phase leaves the same final state.
pub struct WeatherStore {
    conn: Connection,
}

impl WeatherStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| PipelineError::store("open database", e))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| PipelineError::store("open database", e))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(|e| PipelineError::store("initialize schema", e))
    }

    /// Insert-or-replace one observation by its `(station_id, date)` key.
    pub fn upsert_weather(&self, obs: &WeatherObservation) -> Result<()> {
        self.conn
            .execute(
                UPSERT_WEATHER,
                params![
                    obs.station_id,
                    obs.date,
                    obs.max_temp_c,
                    obs.min_temp_c,
                    obs.precipitation_mm
                ],
            )
            .map_err(|e| PipelineError::store("upsert weather", e))?;
        Ok(())
    }

    /// Upsert a batch of observations in one transaction. Nothing is committed
    /// if any row fails.
    pub fn upsert_weather_batch(&mut self, batch: &[WeatherObservation]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| PipelineError::store("upsert weather batch", e))?;
        {
            let mut stmt = tx
                .prepare_cached(UPSERT_WEATHER)
                .map_err(|e| PipelineError::store("upsert weather batch", e))?;
            for obs in batch {
                stmt.execute(params![
                    obs.station_id,
                    obs.date,
                    obs.max_temp_c,
                    obs.min_temp_c,
                    obs.precipitation_mm
                ])
                .map_err(|e| PipelineError::store("upsert weather batch", e))?;
            }
        }
        tx.commit()
            .map_err(|e| PipelineError::store("upsert weather batch", e))?;
        Ok(batch.len())
    }

    /// Insert-or-replace one yield record by its year.
    pub fn upsert_yield(&self, record: &YieldRecord) -> Result<()> {
        self.conn
            .execute(UPSERT_YIELD, params![record.year, record.total_yield])
            .map_err(|e| PipelineError::store("upsert yield", e))?;
        Ok(())
    }

    /// Upsert yield records in one transaction, keyed by year.
    pub fn upsert_yield_batch(&mut self, batch: &[YieldRecord]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| PipelineError::store("upsert yield batch", e))?;
        {
            let mut stmt = tx
                .prepare_cached(UPSERT_YIELD)
                .map_err(|e| PipelineError::store("upsert yield batch", e))?;
            for record in batch {
                stmt.execute(params![record.year, record.total_yield])
                    .map_err(|e| PipelineError::store("upsert yield batch", e))?;
            }
        }
        tx.commit()
            .map_err(|e| PipelineError::store("upsert yield batch", e))?;
        Ok(batch.len())
    }

    /// Atomically replace the entire `weather_stats` table with `stats`.
    ///
    /// Delete and insert share one transaction so no reader ever observes an
    /// empty or partially rebuilt statistics table.
    pub fn replace_year_stats(&mut self, stats: &[WeatherYearStat]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| PipelineError::store("replace year stats", e))?;
        tx.execute("DELETE FROM weather_stats", [])
            .map_err(|e| PipelineError::store("replace year stats", e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO weather_stats \
                     (station_id, year, avg_max_temp_c, avg_min_temp_c, total_precip_cm) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| PipelineError::store("replace year stats", e))?;
            for stat in stats {
                stmt.execute(params![
                    stat.station_id,
                    stat.year,
                    stat.avg_max_temp_c,
                    stat.avg_min_temp_c,
                    stat.total_precip_cm
                ])
                .map_err(|e| PipelineError::store("replace year stats", e))?;
            }
        }
        tx.commit()
            .map_err(|e| PipelineError::store("replace year stats", e))?;
        Ok(stats.len())
    }

    /// All stored observations, ordered by station then date, for the
    /// aggregation pass.
    pub fn observations(&self) -> Result<Vec<WeatherObservation>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT station_id, date, max_temp_c, min_temp_c, precipitation_mm \
                 FROM weather ORDER BY station_id, date",
            )
            .map_err(|e| PipelineError::store("read observations", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(WeatherObservation {
                    station_id: row.get(0)?,
                    date: row.get(1)?,
                    max_temp_c: row.get(2)?,
                    min_temp_c: row.get(3)?,
                    precipitation_mm: row.get(4)?,
                })
            })
            .map_err(|e| PipelineError::store("read observations", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PipelineError::store("read observations", e))
    }

    /// Filtered, paginated observations (query-service contract).
    pub fn weather_page(&self, filter: &WeatherFilter) -> Result<Vec<WeatherObservation>> {
        let (limit, offset) = limit_offset(filter.page, filter.page_size);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT station_id, date, max_temp_c, min_temp_c, precipitation_mm FROM weather \
                 WHERE (?1 IS NULL OR station_id = ?1) \
                 AND (?2 IS NULL OR date >= ?2) \
                 AND (?3 IS NULL OR date <= ?3) \
                 ORDER BY station_id, date LIMIT ?4 OFFSET ?5",
            )
            .map_err(|e| PipelineError::store("query weather", e))?;
        let rows = stmt
            .query_map(
                params![
                    filter.station_id,
                    filter.start_date,
                    filter.end_date,
                    limit,
                    offset
                ],
                |row| {
                    Ok(WeatherObservation {
                        station_id: row.get(0)?,
                        date: row.get(1)?,
                        max_temp_c: row.get(2)?,
                        min_temp_c: row.get(3)?,
                        precipitation_mm: row.get(4)?,
                    })
                },
            )
            .map_err(|e| PipelineError::store("query weather", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PipelineError::store("query weather", e))
    }

    /// Filtered, paginated yearly statistics (query-service contract).
    pub fn stats_page(&self, filter: &StatsFilter) -> Result<Vec<WeatherYearStat>> {
        let (limit, offset) = limit_offset(filter.page, filter.page_size);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT station_id, year, avg_max_temp_c, avg_min_temp_c, total_precip_cm \
                 FROM weather_stats \
                 WHERE (?1 IS NULL OR station_id = ?1) \
                 AND (?2 IS NULL OR year = ?2) \
                 ORDER BY station_id, year LIMIT ?3 OFFSET ?4",
            )
            .map_err(|e| PipelineError::store("query stats", e))?;
        let rows = stmt
            .query_map(
                params![filter.station_id, filter.year, limit, offset],
                |row| {
                    Ok(WeatherYearStat {
                        station_id: row.get(0)?,
                        year: row.get(1)?,
                        avg_max_temp_c: row.get(2)?,
                        avg_min_temp_c: row.get(3)?,
                        total_precip_cm: row.get(4)?,
                    })
                },
            )
            .map_err(|e| PipelineError::store("query stats", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PipelineError::store("query stats", e))
    }

    /// All yield records ordered by year.
    pub fn yields(&self) -> Result<Vec<YieldRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT year, total_yield FROM yield ORDER BY year")
            .map_err(|e| PipelineError::store("query yield", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(YieldRecord {
                    year: row.get(0)?,
                    total_yield: row.get(1)?,
                })
            })
            .map_err(|e| PipelineError::store("query yield", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PipelineError::store("query yield", e))
    }

    pub fn weather_count(&self) -> Result<usize> {
        self.count("weather")
    }

    pub fn stats_count(&self) -> Result<usize> {
        self.count("weather_stats")
    }

    pub fn yield_count(&self) -> Result<usize> {
        self.count("yield")
    }

    fn count(&self, table: &str) -> Result<usize> {
        // table names are fixed internal identifiers, never user input
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| PipelineError::store(format!("count {}", table), e))?;
        Ok(n as usize)
    }
}
