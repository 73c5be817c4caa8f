mod config;
mod db;
mod directory;
mod discover;
mod error;
mod export;
mod fetch;
mod model;
mod parser;
mod pipeline;
mod report;
mod store;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::db::{GroupBy, RecordFilter};
use crate::directory::{CompanyTarget, Selection, Subset};
use crate::fetch::{Fetcher, HttpTransport};
use crate::parser::repair::FormatRepair;
use crate::pipeline::Pipeline;
use crate::store::{Backend, MultiSink};

#[derive(Parser)]
#[command(name = "salarios_scraper", about = "Scrape and classify salaries published for Peruvian companies")]
struct Cli {
    /// SQLite database path (overrides settings)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// CSV output path (overrides settings)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape company pages, classify the salaries and store them
    Run {
        /// Use the full directory instead of the test subset
        #[arg(long)]
        all: bool,
        /// Use a catalog written by `discover` (default path from settings when no value)
        #[arg(long, num_args = 0..=1)]
        catalog: Option<Option<PathBuf>>,
        /// Max companies to scrape
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Scrape only these slugs (repeatable)
        #[arg(short, long = "company")]
        companies: Vec<String>,
        /// Where to store records
        #[arg(short, long, value_enum, default_value_t = Backend::Sqlite)]
        backend: Backend,
        /// Milliseconds between requests
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Keep published figures as-is (no x10 correction)
        #[arg(long)]
        no_repair: bool,
    },
    /// List the company directory
    Companies {
        /// Only slugs with accented characters
        #[arg(long)]
        accents: bool,
        /// Show the full directory instead of the test subset
        #[arg(long)]
        all: bool,
        /// List a catalog written by `discover` (default path from settings when no value)
        #[arg(long, num_args = 0..=1)]
        catalog: Option<Option<PathBuf>>,
    },
    /// Read the company list published by the site and write a catalog file
    Discover {
        /// Catalog file to write (overrides settings)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Company pages fetched back to check the list
        #[arg(long, default_value = "5")]
        verify: usize,
    },
    /// Show dataset statistics
    Stats,
    /// List stored records
    Query {
        /// Company name contains
        #[arg(short, long)]
        company: Option<String>,
        /// Minimum average salary
        #[arg(long)]
        min: Option<f64>,
        /// Maximum average salary
        #[arg(long)]
        max: Option<f64>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Group-by summary of average salaries
    Report {
        #[arg(long, value_enum, default_value_t = GroupBy::Company)]
        by: GroupBy,
        /// Rows to display
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    if let Some(csv) = cli.csv {
        settings.csv_path = csv;
    }

    let result = match cli.command {
        Commands::Run {
            all,
            catalog,
            limit,
            companies,
            backend,
            delay_ms,
            no_repair,
        } => {
            if let Some(ms) = delay_ms {
                settings.delay_ms = ms;
            }
            if no_repair {
                settings.format_repair = false;
            }

            // Everything that can be misconfigured fails here, before any request.
            let subset = match catalog {
                Some(path) => Subset::Loaded(load_catalog(path, &settings.catalog_path)?),
                None if all => Subset::Full,
                None => Subset::Test,
            };
            let selection = Selection {
                subset,
                limit,
                only: companies,
            };
            let targets = directory::select(&selection)?;
            let base_url = settings.base_url()?;
            let mut sink = MultiSink::open(backend, &settings.db_path, &settings.csv_path)?;
            let transport = HttpTransport::new(&settings.user_agent, settings.timeout())?;

            println!(
                "Scraping {} companies from {} (delay {}ms, repair {}, sinks: {})",
                targets.len(),
                base_url,
                settings.delay_ms,
                if settings.format_repair { "on" } else { "off" },
                sink.names().join("+")
            );

            let fetcher = Fetcher::new(transport, base_url, settings.delay());
            let mut pipeline = Pipeline::new(fetcher, FormatRepair::new(settings.format_repair));
            let summary = pipeline.run(&targets, &mut sink)?;
            summary.print();
            Ok(())
        }
        Commands::Companies {
            accents,
            all,
            catalog,
        } => {
            let targets = match (catalog, accents, all) {
                (Some(path), accents, _) => {
                    let mut loaded = load_catalog(path, &settings.catalog_path)?;
                    if accents {
                        loaded.retain(CompanyTarget::has_accents);
                    }
                    loaded
                }
                (None, true, _) => directory::with_accents(),
                (None, false, true) => directory::all(),
                (None, false, false) => directory::test_subset(),
            };
            report::print_companies(&targets);
            Ok(())
        }
        Commands::Discover { output, verify } => {
            let path = output.unwrap_or(settings.catalog_path.clone());
            let transport = HttpTransport::new(&settings.user_agent, settings.timeout())?;
            let mut fetcher = Fetcher::new(transport, settings.base_url()?, settings.delay());

            let found = discover::discover(&mut fetcher)?;
            println!("Found {} companies ({})", found.companies.len(), found.source.label());
            let accented = found.companies.iter().filter(|c| c.has_accents()).count();
            println!("{accented} with accented slugs");

            if verify > 0 {
                let check = discover::verify(&mut fetcher, &found.companies, verify);
                println!("Verified {}/{} sample pages", check.valid, check.checked);
                if !check.passed() {
                    tracing::warn!("Sample check failed; writing the catalog anyway");
                }
            }

            directory::save(&path, &found.companies, fetcher.base_url().as_str())?;
            println!("Catalog written to {}", path.display());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            report::print_stats(&s);
            Ok(())
        }
        Commands::Query {
            company,
            min,
            max,
            limit,
            json,
        } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let mut rows = match (company, min, max) {
                (Some(c), None, None) => db::fetch_by_company(&conn, &c)?,
                (None, Some(lo), Some(hi)) => db::fetch_by_salary_range(&conn, lo, hi)?,
                (company, min_average, max_average) => db::fetch_records(
                    &conn,
                    &RecordFilter {
                        company,
                        min_average,
                        max_average,
                        limit: None,
                    },
                )?,
            };
            rows.truncate(limit);

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No records found. Run 'run' first.");
            } else {
                report::print_rows(&rows);
            }
            Ok(())
        }
        Commands::Report { by, top } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let groups = db::aggregate(&conn, by).context("aggregating salaries")?;
            if groups.is_empty() {
                println!("No records found. Run 'run' first.");
            } else {
                report::print_groups(by, &groups, top);
            }
            Ok(())
        }
    };

    result
}

/// `--catalog` given bare falls back to the configured catalog path.
fn load_catalog(flag: Option<PathBuf>, default: &Path) -> anyhow::Result<Vec<CompanyTarget>> {
    let path = flag.unwrap_or_else(|| default.to_path_buf());
    let targets = directory::load(&path)?;
    tracing::info!("Loaded {} companies from {}", targets.len(), path.display());
    Ok(targets)
}
