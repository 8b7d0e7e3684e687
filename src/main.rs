mod classify;
mod config;
mod db;
mod fetcher;
mod normalize;
mod pivot;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use crate::config::SearchTarget;
use crate::pivot::{CountPivot, MeanPivot};

#[derive(Parser)]
#[command(name = "adzuna_jobs", about = "Adzuna job collector and tabulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch listings for a keyword and ingest them into the local store
    Fetch {
        /// Search keyword, e.g. "data analyst"
        what: String,
        /// Pages to fetch per location
        #[arg(short, long, default_value = "5")]
        pages: u32,
        /// Search target as country:location, repeatable
        /// (default: gb:London, us:"New York", us:California)
        #[arg(short, long = "location", value_parser = config::parse_target)]
        locations: Vec<SearchTarget>,
        /// Delay after each request, in milliseconds
        #[arg(long, default_value = "3000")]
        delay_ms: u64,
    },
    /// Show stored-corpus statistics
    Stats,
    /// Print the four role/area/category cross-tabulations
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch {
            what,
            pages,
            locations,
            delay_ms,
        } => run_fetch(&what, pages, locations, delay_ms).await,
        Commands::Stats => run_stats(),
        Commands::Report => run_report(),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_fetch(
    what: &str,
    pages: u32,
    locations: Vec<SearchTarget>,
    delay_ms: u64,
) -> anyhow::Result<()> {
    let creds = config::Credentials::from_env()?;
    let conn = db::connect()?;
    db::init_schema(&conn)?;

    let targets = if locations.is_empty() {
        config::default_targets()
    } else {
        locations
    };

    println!(
        "Fetching {:?} jobs across {} locations, {} pages each...",
        what,
        targets.len(),
        pages
    );
    let fetcher = fetcher::Fetcher::new(creds, Duration::from_millis(delay_ms));
    let (listings, fstats) = fetcher.fetch_all(what, &targets, pages).await?;
    println!(
        "Fetched total: {} listings ({} requests, {} failed)",
        listings.len(),
        fstats.requests,
        fstats.failed
    );

    let records: Vec<db::JobRecord> = listings.iter().map(normalize::normalize).collect();
    let stats = db::ingest(&conn, &records)?;
    println!(
        "Job insertion complete: {} inserted, {} skipped",
        stats.inserted, stats.skipped
    );
    Ok(())
}

fn run_stats() -> anyhow::Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let s = db::get_stats(&conn)?;
    println!("Jobs stored:         {}", s.total);
    println!("With title:          {}", s.titled);
    println!("With salary band:    {}", s.salaried);
    println!("Distinct categories: {}", s.categories);
    println!("Distinct locations:  {}", s.locations);
    Ok(())
}

fn run_report() -> anyhow::Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let jobs = db::fetch_all_jobs(&conn)?;
    if jobs.is_empty() {
        println!("No jobs stored. Run 'fetch' first.");
        return Ok(());
    }

    print_count_pivot("Roles vs categories", &pivot::role_by_category_counts(&jobs));
    print_mean_pivot(
        "Mean salary by role and category",
        &pivot::salary_by_role_and_category(&jobs),
    );
    print_count_pivot(
        "Role distribution across areas",
        &pivot::area_by_role_counts(&jobs),
    );
    print_count_pivot(
        "Category distribution across areas",
        &pivot::area_by_category_counts(&jobs),
    );
    Ok(())
}

const ROW_WIDTH: usize = 20;
const CELL_WIDTH: usize = 14;

fn print_header(title: &str, cols: &[String]) {
    println!("\n--- {} ---", title);
    print!("{:<width$}", "", width = ROW_WIDTH);
    for c in cols {
        print!(" | {:>width$}", truncate(c, CELL_WIDTH), width = CELL_WIDTH);
    }
    println!();
    println!("{}", "-".repeat(ROW_WIDTH + cols.len() * (CELL_WIDTH + 3)));
}

fn print_count_pivot(title: &str, p: &CountPivot) {
    if p.rows.is_empty() {
        println!("\n--- {} ---\n(no data)", title);
        return;
    }
    print_header(title, &p.cols);
    for (r, row) in p.rows.iter().zip(&p.cells) {
        print!("{:<width$}", truncate(r, ROW_WIDTH), width = ROW_WIDTH);
        for cell in row {
            print!(" | {:>width$}", cell, width = CELL_WIDTH);
        }
        println!();
    }
}

fn print_mean_pivot(title: &str, p: &MeanPivot) {
    if p.rows.is_empty() {
        println!("\n--- {} ---\n(no data)", title);
        return;
    }
    print_header(title, &p.cols);
    for (r, row) in p.rows.iter().zip(&p.cells) {
        print!("{:<width$}", truncate(r, ROW_WIDTH), width = ROW_WIDTH);
        for cell in row {
            match cell {
                Some(v) => print!(" | {:>width$.0}", v, width = CELL_WIDTH),
                None => print!(" | {:>width$}", "-", width = CELL_WIDTH),
            }
        }
        println!();
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
