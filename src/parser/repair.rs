//! Fix salaries published with a dropped digit ("S/ 350" for an analyst who
//! earns S/ 3,500).

use tracing::warn;

use crate::model::{SalaryFigure, SalaryRecord};
use crate::parser::keywords::{fold, KeywordSet};

/// Averages below this are suspicious for professional roles.
pub const SUSPICIOUS_AVERAGE: f64 = 2000.0;
pub const CORRECTION_FACTOR: f64 = 10.0;

const ENTRY_LEVEL: KeywordSet = KeywordSet(&[
    "practicante", "trainee", "intern", "auxiliar", "asistente", "assistant",
]);

const PROFESSIONAL: KeywordSet = KeywordSet(&[
    "analista", "analyst", "coordinador", "coordinator", "especialista", "specialist",
    "ejecutivo", "executive", "asesor", "advisor", "supervisor", "jefe", "head", "gerente",
    "manager",
]);

#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub company: String,
    pub position: String,
    pub before: SalaryFigure,
    pub after: SalaryFigure,
}

#[derive(Debug, Default)]
pub struct RepairOutcome {
    pub records: Vec<SalaryRecord>,
    pub corrections: Vec<Correction>,
}

#[derive(Debug, Clone, Copy)]
pub struct FormatRepair {
    pub enabled: bool,
}

impl Default for FormatRepair {
    fn default() -> Self {
        FormatRepair { enabled: true }
    }
}

impl FormatRepair {
    pub fn new(enabled: bool) -> Self {
        FormatRepair { enabled }
    }

    /// A record needs repair when its average is below the threshold, the title
    /// is not entry-level and the title names a professional role.
    pub fn needs_repair(record: &SalaryRecord) -> bool {
        if record.format_corrected || record.figure.average >= SUSPICIOUS_AVERAGE {
            return false;
        }
        let title = fold(&record.position);
        !ENTRY_LEVEL.matches(&title) && PROFESSIONAL.matches(&title)
    }

    /// Scale suspicious records by ten. Records already flagged as corrected
    /// are left alone, so a second pass is a no-op.
    pub fn apply(&self, records: Vec<SalaryRecord>) -> RepairOutcome {
        if !self.enabled {
            return RepairOutcome {
                records,
                corrections: Vec::new(),
            };
        }

        let mut corrections = Vec::new();
        let records = records
            .into_iter()
            .map(|mut record| {
                if Self::needs_repair(&record) {
                    let before = record.figure;
                    record.figure = before.scaled(CORRECTION_FACTOR);
                    record.format_corrected = true;
                    warn!(
                        company = %record.company,
                        position = %record.position,
                        "corrected salary {before} -> {}",
                        record.figure
                    );
                    corrections.push(Correction {
                        company: record.company.clone(),
                        position: record.position.clone(),
                        before,
                        after: record.figure,
                    });
                }
                record
            })
            .collect();

        RepairOutcome {
            records,
            corrections,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::parser::salary;

    fn record(position: &str, text: &str) -> SalaryRecord {
        let figure = salary::parse(text).unwrap();
        SalaryRecord::new("Telefónica", position, figure, "https://salariosperu.com/empresa/telefonica", Utc::now())
    }

    #[test]
    fn scales_professional_role_with_dropped_digit() {
        let out = FormatRepair::default().apply(vec![record("Analista de Sistemas", "S/ 350.00")]);
        let r = &out.records[0];
        assert_eq!(r.figure.average, 3500.0);
        assert_eq!(r.figure.minimum, 2800.0);
        assert_eq!(r.figure.maximum, 4200.0);
        assert!(r.format_corrected);
        assert_eq!(out.corrections.len(), 1);
        assert_eq!(out.corrections[0].before.average, 350.0);
        assert_eq!(out.corrections[0].after.average, 3500.0);
    }

    #[test]
    fn leaves_entry_level_roles_alone() {
        let out = FormatRepair::default().apply(vec![
            record("Practicante de Finanzas", "S/ 1,025.00"),
            record("Asistente de Gerencia", "S/ 1,800.00"),
        ]);
        assert!(out.corrections.is_empty());
        assert_eq!(out.records[0].figure.average, 1025.0);
        assert!(!out.records[1].format_corrected);
    }

    #[test]
    fn leaves_unlisted_roles_alone() {
        let out = FormatRepair::default().apply(vec![record("Operario de Almacén", "S/ 1,300.00")]);
        assert!(out.corrections.is_empty());
        assert_eq!(out.records[0].figure.average, 1300.0);
    }

    #[test]
    fn average_at_threshold_is_not_suspicious() {
        let out = FormatRepair::default().apply(vec![record("Analista Contable", "S/ 2,000.00")]);
        assert!(out.corrections.is_empty());
    }

    #[test]
    fn disabled_repair_passes_through() {
        let out = FormatRepair::new(false).apply(vec![record("Jefe de Ventas", "S/ 900.00")]);
        assert!(out.corrections.is_empty());
        assert_eq!(out.records[0].figure.average, 900.0);
    }

    #[test]
    fn second_pass_is_noop() {
        let repair = FormatRepair::default();
        let once = repair.apply(vec![record("Supervisor de Planta", "S/ 150.00")]);
        assert_eq!(once.records[0].figure.average, 1500.0);
        let twice = repair.apply(once.records);
        assert!(twice.corrections.is_empty());
        assert_eq!(twice.records[0].figure.average, 1500.0);
    }
}
