use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "PEN")]
    Pen,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Pen => "PEN",
            Currency::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Pen => "S/",
            Currency::Usd => "US$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed salary. Always `minimum <= average <= maximum`.
///
/// For single-value texts the bounds are derived from the average, so they are
/// approximate rather than observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryFigure {
    pub minimum: f64,
    pub maximum: f64,
    pub average: f64,
    pub currency: Currency,
}

impl SalaryFigure {
    pub fn scaled(&self, factor: f64) -> SalaryFigure {
        SalaryFigure {
            minimum: round2(self.minimum * factor),
            maximum: round2(self.maximum * factor),
            average: round2(self.average * factor),
            currency: self.currency,
        }
    }
}

impl fmt::Display for SalaryFigure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = self.currency.symbol();
        write!(
            f,
            "{sym} {:.2} ({sym} {:.2} - {sym} {:.2})",
            self.average, self.minimum, self.maximum
        )
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One row of a company table before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawObservation {
    pub position_title: String,
    pub salary_text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFlags {
    pub is_technology: bool,
    pub is_sales_marketing: bool,
    pub is_managerial: bool,
    pub is_junior: bool,
}

/// Finer labels, set only when the matching parent flag (or sector) holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subcategories {
    pub technology_level: Option<String>,
    pub sales_marketing_level: Option<String>,
    pub managerial_level: Option<String>,
    pub junior_area: Option<String>,
    pub banking_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    pub company: String,
    pub position: String,
    pub figure: SalaryFigure,
    pub source_url: String,
    pub extracted_at: DateTime<Utc>,
    /// `None` until the classifier runs.
    pub sector: Option<String>,
    pub flags: CategoryFlags,
    pub subcategories: Subcategories,
    /// Set by format repair when the figure was scaled.
    pub format_corrected: bool,
    /// University named on the company page, shared by all its records.
    pub university: Option<String>,
}

impl SalaryRecord {
    pub fn new(
        company: &str,
        position: &str,
        figure: SalaryFigure,
        source_url: &str,
        extracted_at: DateTime<Utc>,
    ) -> Self {
        SalaryRecord {
            company: company.to_string(),
            position: position.to_string(),
            figure,
            source_url: source_url.to_string(),
            extracted_at,
            sector: None,
            flags: CategoryFlags::default(),
            subcategories: Subcategories::default(),
            format_corrected: false,
            university: None,
        }
    }
}

/// Flat output schema shared by every sink. Column names are stable; reporting
/// code keys on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub company: String,
    pub position: String,
    pub salario_minimo: f64,
    pub salario_maximo: f64,
    pub salario_promedio: f64,
    pub moneda: String,
    pub sector: Option<String>,
    pub es_ti: bool,
    pub es_ventas_marketing: bool,
    pub es_gerencial: bool,
    pub es_junior: bool,
    pub nivel_ti: Option<String>,
    pub nivel_ventas_marketing: Option<String>,
    pub nivel_gerencial: Option<String>,
    pub area_junior: Option<String>,
    pub rol_bancario: Option<String>,
    pub salario_corregido: bool,
    pub universidad_principal: Option<String>,
    pub source_url: String,
    pub extracted_at: String,
}

pub const COLUMNS: &[&str] = &[
    "company",
    "position",
    "salario_minimo",
    "salario_maximo",
    "salario_promedio",
    "moneda",
    "sector",
    "es_ti",
    "es_ventas_marketing",
    "es_gerencial",
    "es_junior",
    "nivel_ti",
    "nivel_ventas_marketing",
    "nivel_gerencial",
    "area_junior",
    "rol_bancario",
    "salario_corregido",
    "universidad_principal",
    "source_url",
    "extracted_at",
];

impl From<&SalaryRecord> for RecordRow {
    fn from(r: &SalaryRecord) -> Self {
        RecordRow {
            company: r.company.clone(),
            position: r.position.clone(),
            salario_minimo: r.figure.minimum,
            salario_maximo: r.figure.maximum,
            salario_promedio: r.figure.average,
            moneda: r.figure.currency.as_str().to_string(),
            sector: r.sector.clone(),
            es_ti: r.flags.is_technology,
            es_ventas_marketing: r.flags.is_sales_marketing,
            es_gerencial: r.flags.is_managerial,
            es_junior: r.flags.is_junior,
            nivel_ti: r.subcategories.technology_level.clone(),
            nivel_ventas_marketing: r.subcategories.sales_marketing_level.clone(),
            nivel_gerencial: r.subcategories.managerial_level.clone(),
            area_junior: r.subcategories.junior_area.clone(),
            rol_bancario: r.subcategories.banking_role.clone(),
            salario_corregido: r.format_corrected,
            universidad_principal: r.university.clone(),
            source_url: r.source_url.clone(),
            extracted_at: r.extracted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn figure() -> SalaryFigure {
        SalaryFigure { minimum: 280.0, maximum: 420.0, average: 350.0, currency: Currency::Pen }
    }

    #[test]
    fn scaled_keeps_currency_and_order() {
        let f = figure().scaled(10.0);
        assert_eq!((f.minimum, f.average, f.maximum), (2800.0, 3500.0, 4200.0));
        assert_eq!(f.currency, Currency::Pen);
    }

    #[test]
    fn display_uses_currency_symbol() {
        assert_eq!(figure().to_string(), "S/ 350.00 (S/ 280.00 - S/ 420.00)");
    }

    #[test]
    fn row_uses_stable_column_values() {
        let at = Utc.with_ymd_and_hms(2025, 6, 20, 12, 41, 55).unwrap();
        let mut rec = SalaryRecord::new("Yape", "Analista", figure(), "https://x/empresa/yape", at);
        rec.flags.is_technology = true;
        let row = RecordRow::from(&rec);
        assert_eq!(row.moneda, "PEN");
        assert_eq!(row.salario_promedio, 350.0);
        assert!(row.es_ti);
        assert!(row.sector.is_none());
        assert!(row.universidad_principal.is_none());
        assert_eq!(row.extracted_at, "2025-06-20T12:41:55Z");
    }

    #[test]
    fn column_list_matches_row_fields() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let row = RecordRow::from(&SalaryRecord::new("a", "b", figure(), "c", at));
        let json = serde_json::to_value(&row).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), COLUMNS.len());
        for col in COLUMNS {
            assert!(keys.contains(col), "missing column {col}");
        }
    }
}
