use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::directory::CompanyTarget;
use crate::fetch::ParsedPage;
use crate::model::{RawObservation, SalaryRecord};
use crate::parser::keywords::fold;
use crate::parser::{salary, university};

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static CONTAINER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div[class], section[class], article[class], li[class]").unwrap()
});

/// Folded position texts that mark a header row.
const HEADER_LABELS: &[&str] = &["puesto", "salario", "cargo", "posicion"];
/// Class fragments of containers worth scanning when a page has no table.
const CONTAINER_CLASSES: &[&str] = &["salary", "position", "job", "puesto", "salario"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Table,
    Fallback,
    /// Neither tables nor matching containers were found.
    Nothing,
}

/// Lazily parses observations into records. Rows whose salary text does not
/// parse are skipped and counted.
pub struct Extraction<'a> {
    target: &'a CompanyTarget,
    source_url: String,
    extracted_at: DateTime<Utc>,
    university: Option<&'static str>,
    rows: std::vec::IntoIter<RawObservation>,
    strategy: Strategy,
    parse_failures: usize,
}

impl Extraction<'_> {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn parse_failures(&self) -> usize {
        self.parse_failures
    }

    pub fn university(&self) -> Option<&'static str> {
        self.university
    }
}

impl Iterator for Extraction<'_> {
    type Item = SalaryRecord;

    fn next(&mut self) -> Option<SalaryRecord> {
        loop {
            let obs = self.rows.next()?;
            match salary::parse(&obs.salary_text) {
                Ok(figure) => {
                    let mut record = SalaryRecord::new(
                        &self.target.display_name,
                        &obs.position_title,
                        figure,
                        &self.source_url,
                        self.extracted_at,
                    );
                    record.university = self.university.map(str::to_string);
                    return Some(record);
                }
                Err(e) => {
                    debug!("{}: dropping {:?}: {}", self.target.identifier, obs.position_title, e);
                    self.parse_failures += 1;
                }
            }
        }
    }
}

pub fn extract<'a>(page: &ParsedPage, target: &'a CompanyTarget) -> Extraction<'a> {
    let (strategy, rows) = observations(&page.document);
    Extraction {
        target,
        source_url: page.url.to_string(),
        extracted_at: Utc::now(),
        university: university::principal(&page.document),
        rows: rows.into_iter(),
        strategy,
        parse_failures: 0,
    }
}

/// Raw (position, salary text) pairs, de-duplicated in document order.
pub fn observations(document: &Html) -> (Strategy, Vec<RawObservation>) {
    let tables: Vec<ElementRef> = document.select(&TABLE).collect();
    if !tables.is_empty() {
        let rows = tables.iter().flat_map(|t| table_rows(*t)).unique().collect();
        return (Strategy::Table, rows);
    }

    let containers: Vec<ElementRef> = document
        .select(&CONTAINER)
        .filter(|el| {
            el.value()
                .attr("class")
                .map(|c| c.to_lowercase())
                .is_some_and(|c| CONTAINER_CLASSES.iter().any(|k| c.contains(k)))
        })
        .collect();
    if containers.is_empty() {
        return (Strategy::Nothing, Vec::new());
    }

    let rows = containers.iter().flat_map(|c| container_rows(*c)).unique().collect();
    (Strategy::Fallback, rows)
}

// ── Table strategy ──

fn table_rows(table: ElementRef<'_>) -> Vec<RawObservation> {
    table
        .select(&ROW)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&CELL).map(cell_text).collect();
            if cells.len() < 2 {
                return None;
            }
            observation(&cells[0], &cells[1])
        })
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    collapse(&cell.text().collect::<Vec<_>>().join(" "))
}

fn observation(position: &str, salary_text: &str) -> Option<RawObservation> {
    if position.is_empty() || salary_text.is_empty() {
        return None;
    }
    if is_header(position) || fold(salary_text) == "salario" {
        return None;
    }
    if !salary::has_currency_marker(salary_text) {
        return None;
    }
    Some(RawObservation {
        position_title: position.to_string(),
        salary_text: salary_text.to_string(),
    })
}

fn is_header(position: &str) -> bool {
    let folded = fold(position);
    HEADER_LABELS.contains(&folded.as_str())
}

// ── Fallback strategy ──

/// A line carrying a currency marker is a salary; the closest preceding
/// non-empty line is its position, unless that line is itself a salary.
fn container_rows(container: ElementRef<'_>) -> Vec<RawObservation> {
    let lines: Vec<String> = container
        .text()
        .flat_map(str::lines)
        .map(collapse)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .tuple_windows()
        .filter(|(prev, line)| {
            salary::has_currency_marker(line) && !salary::has_currency_marker(prev)
        })
        .filter_map(|(prev, line)| observation(prev, line))
        .collect()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::model::Currency;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
    }

    fn page(name: &str) -> ParsedPage {
        let url = Url::parse("https://salariosperu.com/empresa/telefonica").unwrap();
        ParsedPage::new(url, &fixture(name))
    }

    fn target() -> CompanyTarget {
        CompanyTarget::new("telefonica", "Telefónica")
    }

    #[test]
    fn table_page_yields_rows() {
        let page = page("empresa_tabla.html");
        let target = target();
        let mut extraction = extract(&page, &target);
        assert_eq!(extraction.strategy(), Strategy::Table);

        let records: Vec<SalaryRecord> = extraction.by_ref().collect();
        let positions: Vec<&str> = records.iter().map(|r| r.position.as_str()).collect();
        assert_eq!(
            positions,
            vec![
                "Analista de Sistemas",
                "Gerente de Ventas",
                "Practicante de Marketing",
                "Desarrollador Backend Senior",
            ]
        );

        let analyst = &records[0];
        assert_eq!(analyst.company, "Telefónica");
        assert_eq!(analyst.figure.average, 350.0);
        assert_eq!(analyst.source_url, "https://salariosperu.com/empresa/telefonica");

        let manager = &records[1];
        assert_eq!((manager.figure.minimum, manager.figure.maximum), (12000.0, 18000.0));
        assert_eq!(records[3].figure.currency, Currency::Usd);

        // "S/ --" carries a marker but no figure.
        assert_eq!(extraction.parse_failures(), 1);

        assert_eq!(extraction.university(), Some("Universidad del Pacífico"));
        assert!(records
            .iter()
            .all(|r| r.university.as_deref() == Some("Universidad del Pacífico")));
    }

    #[test]
    fn table_rows_skip_headers_short_rows_and_duplicates() {
        let doc = Html::parse_document(&fixture("empresa_tabla.html"));
        let (_, rows) = observations(&doc);
        assert!(rows.iter().all(|r| !is_header(&r.position_title)));
        assert!(rows.iter().all(|r| r.position_title != "Operario"));
        let analysts = rows
            .iter()
            .filter(|r| r.position_title == "Analista de Sistemas")
            .count();
        assert_eq!(analysts, 1);
    }

    #[test]
    fn fallback_pairs_salary_with_previous_line() {
        let page = page("empresa_fallback.html");
        let target = target();
        let mut extraction = extract(&page, &target);
        assert_eq!(extraction.strategy(), Strategy::Fallback);

        let records: Vec<SalaryRecord> = extraction.by_ref().collect();
        let pairs: Vec<(&str, f64)> = records
            .iter()
            .map(|r| (r.position.as_str(), r.figure.average))
            .collect();
        assert_eq!(
            pairs,
            vec![("Jefe de Tienda", 5500.0), ("Cajero Principal", 1800.0), ("Asesor Comercial", 2750.0)]
        );
        assert_eq!(extraction.parse_failures(), 0);
        assert!(records.iter().all(|r| r.university.is_none()));
    }

    #[test]
    fn page_without_structure_is_empty_not_error() {
        let page = page("empresa_vacia.html");
        let target = target();
        let mut extraction = extract(&page, &target);
        assert_eq!(extraction.strategy(), Strategy::Nothing);
        assert_eq!(extraction.next(), None);
        assert_eq!(extraction.parse_failures(), 0);
    }

    #[test]
    fn header_detection_ignores_case_and_accents() {
        assert!(is_header("PUESTO"));
        assert!(is_header("Posicion"));
        assert!(is_header("Posición"));
        assert!(!is_header("Puesto de Trabajo"));
    }

    #[test]
    fn cell_whitespace_is_collapsed() {
        let doc = Html::parse_document(
            "<table><tr><th>Puesto</th><th>Salario</th></tr>\
             <tr><td>  Analista\n   de  Datos </td><td>S/ 4,000.00\n - S/ 5,000.00</td></tr></table>",
        );
        let (_, rows) = observations(&doc);
        assert_eq!(
            rows,
            vec![RawObservation {
                position_title: "Analista de Datos".into(),
                salary_text: "S/ 4,000.00 - S/ 5,000.00".into(),
            }]
        );
    }
}
