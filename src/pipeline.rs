use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::directory::CompanyTarget;
use crate::error::FetchFailure;
use crate::fetch::{Fetcher, Transport};
use crate::parser::{self, repair::Correction, repair::FormatRepair};
use crate::store::RecordSink;

const PROGRESS_EVERY: usize = 10;

/// Per-run tally. `succeeded` counts every fetched page, including the
/// `empty` ones that yielded no rows.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub targets: usize,
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
    pub records: usize,
    pub parse_failures: usize,
    pub corrections: Vec<Correction>,
    pub failures: Vec<(String, FetchFailure)>,
    /// Wall time of the run, courtesy delays included.
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn print(&self) {
        println!(
            "Targets: {} | ok: {} ({} empty) | failed: {}",
            self.targets, self.succeeded, self.empty, self.failed
        );
        println!(
            "Records: {} | dropped rows: {} | corrected salaries: {}",
            self.records,
            self.parse_failures,
            self.corrections.len()
        );
        for c in &self.corrections {
            println!("  x10 {} / {}: {} -> {}", c.company, c.position, c.before, c.after);
        }
        for (slug, failure) in &self.failures {
            println!("  {:<32} {:<9} {}", slug, failure.category(), failure);
        }
        match self.per_target() {
            Some(each) => println!(
                "Elapsed: {} ({} per company)",
                clock(self.elapsed),
                clock(each)
            ),
            None => println!("Elapsed: {}", clock(self.elapsed)),
        }
    }

    pub fn per_target(&self) -> Option<Duration> {
        u32::try_from(self.targets)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| self.elapsed / n)
    }
}

/// `4.2s`, `3m 07s`, `1h 02m 09s`.
fn clock(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 3600, secs / 60 % 60, secs % 60) {
        (0, 0, _) => format!("{:.1}s", d.as_secs_f64()),
        (0, m, s) => format!("{m}m {s:02}s"),
        (h, m, s) => format!("{h}h {m:02}m {s:02}s"),
    }
}

pub struct Pipeline<T: Transport> {
    fetcher: Fetcher<T>,
    repair: FormatRepair,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(fetcher: Fetcher<T>, repair: FormatRepair) -> Self {
        Pipeline { fetcher, repair }
    }

    /// Fetch, extract, repair and classify each target in order, appending
    /// its records to `sink` before moving on. Fetch failures and empty pages
    /// are counted; only sink errors abort the run.
    pub fn run(&mut self, targets: &[CompanyTarget], sink: &mut dyn RecordSink) -> Result<RunSummary> {
        let mut summary = RunSummary {
            targets: targets.len(),
            ..Default::default()
        };
        let started = Instant::now();
        sink.reset()?;

        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );

        for (i, target) in targets.iter().enumerate() {
            pb.set_message(target.display_name.clone());

            match self.fetcher.fetch(target) {
                Ok(page) => {
                    debug!("{}: fetched {:?}", target.identifier, page.title());
                    let out = parser::process_page(&page, target, self.repair);
                    summary.succeeded += 1;
                    summary.parse_failures += out.parse_failures;
                    summary.corrections.extend(out.corrections);

                    if let Some(u) = out.university {
                        debug!("{}: university {}", target.identifier, u);
                    }
                    if out.records.is_empty() {
                        summary.empty += 1;
                        info!("{}: no salaries found ({:?})", target.identifier, out.strategy);
                    } else {
                        summary.records += sink.append(&out.records)?;
                    }
                }
                Err(failure) => {
                    warn!("{}: {}", target.identifier, failure);
                    summary.failed += 1;
                    summary.failures.push((target.identifier.clone(), failure));
                }
            }

            pb.inc(1);
            if (i + 1) % PROGRESS_EVERY == 0 {
                info!(
                    "Progress {}/{}: {} ok, {} failed, {} records",
                    i + 1,
                    targets.len(),
                    summary.succeeded,
                    summary.failed,
                    summary.records
                );
            }
        }

        sink.finish()?;
        pb.finish_and_clear();
        summary.elapsed = started.elapsed();
        info!(
            "Run finished: {} ok, {} failed, {} records",
            summary.succeeded, summary.failed, summary.records
        );
        Ok(summary)
    }
}
