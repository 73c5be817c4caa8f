use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{RecordRow, SalaryRecord, COLUMNS};
use crate::store::RecordSink;

/// Delimited-text sink. The file is rewritten on reset and flushed after
/// every append.
pub struct CsvSink {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl CsvSink {
    pub fn new(path: &Path) -> Self {
        CsvSink {
            path: path.to_path_buf(),
            writer: None,
        }
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn reset(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let file = File::create(&self.path)
            .with_context(|| format!("creating {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(COLUMNS)?;
        writer.flush()?;
        self.writer = Some(writer);
        Ok(())
    }

    fn append(&mut self, records: &[SalaryRecord]) -> Result<usize> {
        let writer = self
            .writer
            .as_mut()
            .context("CSV sink must be reset before appending")?;
        for record in records {
            writer.serialize(RecordRow::from(record))?;
        }
        writer.flush()?;
        Ok(records.len())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{Currency, SalaryFigure};
    use crate::parser::classify::classify;

    fn record(position: &str, average: f64) -> SalaryRecord {
        let figure = SalaryFigure {
            minimum: average * 0.8,
            maximum: average * 1.2,
            average,
            currency: Currency::Pen,
        };
        let at = Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap();
        classify(SalaryRecord::new("Rimac Seguros", position, figure, "https://salariosperu.com/empresa/rimac-seguros", at))
    }

    fn read_rows(path: &Path) -> Vec<RecordRow> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .collect::<Result<Vec<RecordRow>, _>>()
            .unwrap()
    }

    #[test]
    fn header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/salarios.csv");
        let mut sink = CsvSink::new(&path);
        sink.reset().unwrap();
        assert_eq!(sink.append(&[record("Analista de Riesgos", 5000.0)]).unwrap(), 1);
        sink.append(&[record("Practicante Legal", 1100.0)]).unwrap();
        sink.finish().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next().unwrap(), COLUMNS.join(","));

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sector.as_deref(), Some("Seguros"));
        assert_eq!(rows[0].salario_promedio, 5000.0);
        assert!(rows[1].es_junior);
        assert_eq!(rows[1].nivel_ti, None);
    }

    #[test]
    fn rows_are_on_disk_after_each_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salarios.csv");
        let mut sink = CsvSink::new(&path);
        sink.reset().unwrap();
        sink.append(&[record("Analista de Riesgos", 5000.0)]).unwrap();
        // No finish: simulates an interrupted run.
        assert_eq!(read_rows(&path).len(), 1);
    }

    #[test]
    fn reset_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salarios.csv");
        let mut sink = CsvSink::new(&path);
        sink.reset().unwrap();
        sink.append(&[record("Analista de Riesgos", 5000.0)]).unwrap();
        sink.reset().unwrap();
        assert!(read_rows(&path).is_empty());
    }

    #[test]
    fn append_before_reset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(&dir.path().join("x.csv"));
        assert!(sink.append(&[]).is_err());
    }
}
