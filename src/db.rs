use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, warn};

const DB_PATH: &str = "data/adzuna_jobs.sqlite";

pub fn connect() -> Result<Connection> {
    std::fs::create_dir_all("data")?;
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id                  TEXT PRIMARY KEY NOT NULL,
            title               TEXT,
            company             TEXT,
            area_list           TEXT,
            location            TEXT,
            category            TEXT,
            salary_min          REAL,
            salary_max          REAL,
            salary_is_predicted TEXT,
            latitude            REAL,
            longitude           REAL,
            contract_type       TEXT,
            contract_time       TEXT,
            description         TEXT,
            created             TEXT,
            redirect_url        TEXT,
            fetched_at          TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_category ON jobs(category);
        ",
    )?;
    Ok(())
}

/// The flat, persisted form of one listing. Everything except `id` is
/// nullable; `id` is the external identifier the store dedups on.
#[derive(Debug, Clone, Default)]
pub struct JobRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub area_list: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_is_predicted: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contract_type: Option<String>,
    pub contract_time: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Skipped,
}

/// Insert-or-ignore one record. A novel id reports `Inserted`; an id already
/// present leaves the stored row untouched and reports `Skipped`.
pub fn upsert(conn: &Connection, job: &JobRecord) -> Result<UpsertOutcome> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO jobs (
            id, title, company, area_list, location, category,
            salary_min, salary_max, salary_is_predicted, latitude, longitude,
            contract_type, contract_time, description, created, redirect_url,
            fetched_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )?;
    let changed = stmt.execute(params![
        job.id,
        job.title,
        job.company,
        job.area_list,
        job.location,
        job.category,
        job.salary_min,
        job.salary_max,
        job.salary_is_predicted,
        job.latitude,
        job.longitude,
        job.contract_type,
        job.contract_time,
        job.description,
        job.created,
        job.redirect_url,
        Utc::now().to_rfc3339(),
    ])?;
    Ok(if changed == 1 {
        UpsertOutcome::Inserted
    } else {
        UpsertOutcome::Skipped
    })
}

#[derive(Debug, Default)]
pub struct IngestStats {
    pub inserted: usize,
    pub skipped: usize,
}

/// Ingest a batch of records. A failure on one record (missing id, malformed
/// value) is logged and counted as skipped; the rest of the batch proceeds.
pub fn ingest(conn: &Connection, records: &[JobRecord]) -> Result<IngestStats> {
    let tx = conn.unchecked_transaction()?;
    let mut stats = IngestStats::default();
    for job in records {
        match upsert(&tx, job) {
            Ok(UpsertOutcome::Inserted) => {
                debug!("Inserted job id {:?}", job.id);
                stats.inserted += 1;
            }
            Ok(UpsertOutcome::Skipped) => {
                debug!("Skipped duplicate job id {:?}", job.id);
                stats.skipped += 1;
            }
            Err(e) => {
                warn!("Error inserting job id {:?}: {}", job.id, e);
                stats.skipped += 1;
            }
        }
    }
    tx.commit()?;
    Ok(stats)
}

/// Full-table read, in stable id order. The read side derives role, area and
/// salary average from these rows; nothing derived is stored.
pub fn fetch_all_jobs(conn: &Connection) -> Result<Vec<JobRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, company, area_list, location, category,
                salary_min, salary_max, salary_is_predicted, latitude, longitude,
                contract_type, contract_time, description, created, redirect_url
         FROM jobs ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(JobRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                company: row.get(2)?,
                area_list: row.get(3)?,
                location: row.get(4)?,
                category: row.get(5)?,
                salary_min: row.get(6)?,
                salary_max: row.get(7)?,
                salary_is_predicted: row.get(8)?,
                latitude: row.get(9)?,
                longitude: row.get(10)?,
                contract_type: row.get(11)?,
                contract_time: row.get(12)?,
                description: row.get(13)?,
                created: row.get(14)?,
                redirect_url: row.get(15)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct StoreStats {
    pub total: usize,
    pub titled: usize,
    pub salaried: usize,
    pub categories: usize,
    pub locations: usize,
}

pub fn get_stats(conn: &Connection) -> Result<StoreStats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM jobs", [], |r| r.get(0))?;
    let titled: usize = conn.query_row(
        "SELECT COUNT(*) FROM jobs WHERE title IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let salaried: usize = conn.query_row(
        "SELECT COUNT(*) FROM jobs WHERE salary_min IS NOT NULL AND salary_max IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let categories: usize = conn.query_row(
        "SELECT COUNT(DISTINCT category) FROM jobs WHERE category IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let locations: usize = conn.query_row(
        "SELECT COUNT(DISTINCT location) FROM jobs WHERE location IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    Ok(StoreStats {
        total,
        titled,
        salaried,
        categories,
        locations,
    })
}

// ── Tests ──
