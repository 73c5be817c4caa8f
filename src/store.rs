use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;

use crate::db::SqliteSink;
use crate::export::CsvSink;
use crate::model::SalaryRecord;

/// Destination for classified records. The pipeline resets once per run and
/// appends after every target, so whatever was appended survives an abort.
pub trait RecordSink {
    fn name(&self) -> &'static str;

    /// Drop any previous dataset.
    fn reset(&mut self) -> Result<()>;

    fn append(&mut self, records: &[SalaryRecord]) -> Result<usize>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    #[default]
    Sqlite,
    Csv,
    Both,
}

/// Fans every call out to each configured sink.
pub struct MultiSink {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn RecordSink>>) -> Self {
        MultiSink { sinks }
    }

    pub fn open(backend: Backend, db_path: &Path, csv_path: &Path) -> Result<Self> {
        let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
        if matches!(backend, Backend::Sqlite | Backend::Both) {
            sinks.push(Box::new(SqliteSink::open(db_path)?));
        }
        if matches!(backend, Backend::Csv | Backend::Both) {
            sinks.push(Box::new(CsvSink::new(csv_path)));
        }
        Ok(MultiSink::new(sinks))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

impl RecordSink for MultiSink {
    fn name(&self) -> &'static str {
        "multi"
    }

    fn reset(&mut self) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.reset())
    }

    /// Returns the count from the first sink; every sink receives the same rows.
    fn append(&mut self, records: &[SalaryRecord]) -> Result<usize> {
        let mut written = None;
        for sink in &mut self.sinks {
            let n = sink.append(records)?;
            written.get_or_insert(n);
        }
        Ok(written.unwrap_or(0))
    }

    fn finish(&mut self) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.finish())
    }
}
