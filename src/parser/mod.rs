pub mod classify;
pub mod extract;
pub mod keywords;
pub mod repair;
pub mod salary;
pub mod taxonomy;
pub mod university;

use crate::directory::CompanyTarget;
use crate::fetch::ParsedPage;
use crate::model::SalaryRecord;
use extract::Strategy;
use repair::{Correction, FormatRepair};

pub struct PageRecords {
    pub records: Vec<SalaryRecord>,
    pub corrections: Vec<Correction>,
    pub parse_failures: usize,
    pub strategy: Strategy,
    pub university: Option<&'static str>,
}

/// Three-pass pipeline: page → raw rows → repaired figures → classified records.
pub fn process_page(page: &ParsedPage, target: &CompanyTarget, repair: FormatRepair) -> PageRecords {
    let mut extraction = extract::extract(page, target);
    let extracted: Vec<SalaryRecord> = extraction.by_ref().collect();

    let repaired = repair.apply(extracted);
    let records = repaired.records.into_iter().map(classify::classify).collect();

    PageRecords {
        records,
        corrections: repaired.corrections,
        parse_failures: extraction.parse_failures(),
        strategy: extraction.strategy(),
        university: extraction.university(),
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    #[test]
    fn table_page_end_to_end() {
        let html = std::fs::read_to_string("tests/fixtures/empresa_tabla.html").unwrap();
        let url = Url::parse("https://salariosperu.com/empresa/telefonica").unwrap();
        let page = ParsedPage::new(url, &html);
        let target = CompanyTarget::new("telefonica", "Telefónica");

        let out = process_page(&page, &target, FormatRepair::default());
        assert_eq!(out.records.len(), 4);
        assert_eq!(out.parse_failures, 1);
        assert_eq!(out.corrections.len(), 1);

        let analyst = &out.records[0];
        assert_eq!(analyst.figure.average, 3500.0);
        assert!(analyst.format_corrected);
        assert!(analyst.flags.is_technology);
        assert_eq!(analyst.sector.as_deref(), Some("Telecomunicaciones"));

        let manager = &out.records[1];
        assert!(manager.flags.is_managerial && !manager.flags.is_sales_marketing);

        let intern = &out.records[2];
        assert!(intern.flags.is_junior);
        assert_eq!(intern.subcategories.junior_area.as_deref(), Some("Marketing y Comercial Jr"));

        assert!(out.records.iter().all(|r| r.sector.is_some()));
        assert_eq!(out.university, Some("Universidad del Pacífico"));
    }

    #[test]
    fn repair_can_be_disabled() {
        let html = std::fs::read_to_string("tests/fixtures/empresa_tabla.html").unwrap();
        let url = Url::parse("https://salariosperu.com/empresa/telefonica").unwrap();
        let page = ParsedPage::new(url, &html);
        let target = CompanyTarget::new("telefonica", "Telefónica");

        let out = process_page(&page, &target, FormatRepair::new(false));
        assert!(out.corrections.is_empty());
        assert_eq!(out.records[0].figure.average, 350.0);
    }
}
