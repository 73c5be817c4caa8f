//! Category flags and sector assignment.
//!
//! Managerial and sales/marketing are disjoint: a "Gerente de Ventas" is
//! managerial only. Technology may overlap with managerial. Both behaviours are
//! kept as observed in the historical reports.

use crate::model::{CategoryFlags, SalaryRecord};
use crate::parser::keywords::{fold, KeywordSet, OrderedGroups};
use crate::parser::taxonomy;

pub const SECTOR_BANKING: &str = "Banca y Finanzas";
pub const SECTOR_DEFAULT: &str = "Otros";

/// Junior titles paid above this are treated as misclassified.
pub const JUNIOR_SALARY_CEILING: f64 = 5000.0;

const MANAGERIAL: KeywordSet = KeywordSet(&[
    "gerente", "director", "jefe", "head", "chief", "presidente", "ceo", "cfo", "cto",
    "manager", "supervisor", "coordinador", "coordinator", "lead", "lider", "encargado",
]);

const SALES_MARKETING: KeywordSet = KeywordSet(&[
    "vendedor", "ventas", "sales", "comercial", "account manager", "business development",
    "key account", "inside sales", "marketing", "brand", "digital marketing", "social media",
    "community manager", "seo", "sem", "publicidad", "advertising", "market research",
    "product marketing", "growth",
]);

const TECHNOLOGY: KeywordSet = KeywordSet(&[
    "desarrollador", "developer", "programador", "programmer", "ingeniero de software",
    "software engineer", "devops", "analista de sistemas", "systems analyst", "qa", "testing",
    "arquitecto de software", "tech lead", "scrum master", "data scientist", "data analyst",
    "big data", "machine learning", "frontend", "backend", "fullstack", "mobile developer",
    "cybersecurity", "seguridad informatica", "cloud", "aws", "azure",
]);

const ENTRY_LEVEL: KeywordSet = KeywordSet(&[
    "practicante", "trainee", "intern", "junior", "jr.", "jr", "auxiliar",
]);

const LEADERSHIP: KeywordSet = KeywordSet(&[
    "jefe", "head", "manager", "director", "gerente", "supervisor", "senior",
]);

const EXPLICIT_JUNIOR: KeywordSet = KeywordSet(&["junior", "jr"]);

const SECTORS: OrderedGroups = OrderedGroups {
    groups: &[
        (
            SECTOR_BANKING,
            KeywordSet(&[
                "bcp", "bbva", "interbank", "credicorp", "banco", "scotiabank", "yape", "plin",
                "culqi", "izipay", "financiera", "credito",
            ]),
        ),
        (
            "Tecnología",
            KeywordSet(&[
                "tech", "software", "ibm", "microsoft", "google", "oracle", "sap", "accenture",
                "tcs", "globant", "data", "developer", "programmer",
            ]),
        ),
        (
            "Consultoría",
            KeywordSet(&[
                "ey", "deloitte", "pwc", "kpmg", "mckinsey", "bcg", "bain", "consulting",
                "consultant", "advisory",
            ]),
        ),
        (
            "Telecomunicaciones",
            KeywordSet(&["entel", "movistar", "claro", "bitel", "telecom", "telefonica"]),
        ),
        (
            "Consumo Masivo",
            KeywordSet(&[
                "alicorp", "gloria", "nestle", "unilever", "procter", "gamble", "retail",
                "falabella", "ripley", "tottus", "wong", "plaza",
            ]),
        ),
        (
            "Seguros",
            KeywordSet(&["rimac", "pacifico", "seguros", "insurance", "reaseguros"]),
        ),
        (
            "Bebidas",
            KeywordSet(&["ab inbev", "backus", "coca cola", "pepsi", "cerveza"]),
        ),
        (
            "Cosmética",
            KeywordSet(&["loreal", "l'oreal", "nivea", "cosmetic", "beauty"]),
        ),
        (
            "Minería",
            KeywordSet(&["antamina", "southern", "volcan", "buenaventura", "cerro verde", "mining"]),
        ),
        (
            "Energía",
            KeywordSet(&["enel", "luz del sur", "electroandes", "energy", "electric"]),
        ),
    ],
    fallback: None,
};

pub fn flags_for(position: &str, average: f64) -> CategoryFlags {
    let title = fold(position);

    let is_managerial = MANAGERIAL.matches(&title);
    let is_sales_marketing = !is_managerial && SALES_MARKETING.matches(&title);
    let is_technology = TECHNOLOGY.matches(&title);

    let leads = LEADERSHIP.matches(&title) && !EXPLICIT_JUNIOR.matches(&title);
    let is_junior =
        ENTRY_LEVEL.matches(&title) && !leads && average <= JUNIOR_SALARY_CEILING;

    CategoryFlags {
        is_technology,
        is_sales_marketing,
        is_managerial,
        is_junior,
    }
}

/// Company name first, then the position title; first matching group wins.
pub fn sector_for(company: &str, position: &str) -> &'static str {
    SECTORS
        .first_match(&fold(company))
        .or_else(|| SECTORS.first_match(&fold(position)))
        .unwrap_or(SECTOR_DEFAULT)
}

/// Set flags, sector and sub-categories. Depends only on company, position
/// and the (already repaired) average, so applying it twice changes nothing.
pub fn classify(mut record: SalaryRecord) -> SalaryRecord {
    let flags = flags_for(&record.position, record.figure.average);
    let sector = sector_for(&record.company, &record.position);
    record.subcategories = taxonomy::subcategories(&record.position, &flags, sector);
    record.flags = flags;
    record.sector = Some(sector.to_string());
    record
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{Currency, SalaryFigure};

    fn record(company: &str, position: &str, average: f64) -> SalaryRecord {
        let figure = SalaryFigure {
            minimum: average * 0.8,
            maximum: average * 1.2,
            average,
            currency: Currency::Pen,
        };
        SalaryRecord::new(company, position, figure, "https://salariosperu.com/empresa/x", Utc::now())
    }

    #[test]
    fn sales_manager_is_managerial_not_sales() {
        let f = flags_for("Gerente de Ventas", 12000.0);
        assert!(f.is_managerial);
        assert!(!f.is_sales_marketing);
    }

    #[test]
    fn intern_in_marketing() {
        let f = flags_for("Practicante de Marketing", 1200.0);
        assert!(f.is_junior);
        assert!(f.is_sales_marketing);
        assert!(!f.is_managerial);
    }

    #[test]
    fn technology_may_overlap_managerial() {
        let f = flags_for("Jefe de Desarrollo de Software / Tech Lead", 15000.0);
        assert!(f.is_technology);
        assert!(f.is_managerial);
    }

    #[test]
    fn accents_do_not_block_matching() {
        assert!(flags_for("Líder de Producto", 9000.0).is_managerial);
        assert!(flags_for("Especialista en Seguridad Informática", 7000.0).is_technology);
    }

    #[test]
    fn short_acronyms_need_whole_tokens() {
        assert!(!flags_for("Analista de Proyectos", 4000.0).is_managerial);
        assert!(flags_for("CTO", 30000.0).is_managerial);
        assert!(flags_for("Analista QA", 4500.0).is_technology);
    }

    #[test]
    fn junior_excluded_by_leadership_unless_explicit() {
        assert!(!flags_for("Supervisor Practicante", 1800.0).is_junior);
        assert!(flags_for("Jefe de Proyecto Junior", 3000.0).is_junior);
        assert!(flags_for("Analista Jr. de Finanzas", 2800.0).is_junior);
    }

    #[test]
    fn junior_excluded_above_salary_ceiling() {
        assert!(flags_for("Analista Junior", 5000.0).is_junior);
        assert!(!flags_for("Analista Junior", 5000.01).is_junior);
    }

    #[test]
    fn sector_by_company_first() {
        assert_eq!(sector_for("Banco de Crédito BCP", "Data Analyst"), SECTOR_BANKING);
        assert_eq!(sector_for("Entel Perú", "Vendedor"), "Telecomunicaciones");
        assert_eq!(sector_for("Telefónica", "Analista"), "Telecomunicaciones");
        assert_eq!(sector_for("EY", "Senior"), "Consultoría");
        assert_eq!(sector_for("Nestlé", "Brand Manager"), "Consumo Masivo");
    }

    #[test]
    fn sector_falls_back_to_position_then_default() {
        assert_eq!(sector_for("Prosegur", "Software Developer"), "Tecnología");
        assert_eq!(sector_for("Prosegur", "Agente de Seguridad"), SECTOR_DEFAULT);
    }

    #[test]
    fn sector_first_group_wins_on_ties() {
        // "yape" is banking, "tech" is technology; banking is listed first.
        assert_eq!(sector_for("Yape Tech", "Analista"), SECTOR_BANKING);
    }

    #[test]
    fn classify_sets_sector_and_is_idempotent() {
        let once = classify(record("Interbank", "Gerente de Riesgos", 18000.0));
        assert_eq!(once.sector.as_deref(), Some(SECTOR_BANKING));
        assert_eq!(once.subcategories.banking_role.as_deref(), Some("Gestión y Liderazgo"));
        let twice = classify(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn never_managerial_and_sales() {
        let titles = [
            "Gerente de Ventas",
            "Key Account Manager",
            "Ejecutivo de Ventas",
            "Coordinador de Marketing",
            "Community Manager",
            "Vendedor",
            "Head of Growth",
        ];
        for t in titles {
            let f = flags_for(t, 4000.0);
            assert!(!(f.is_managerial && f.is_sales_marketing), "{t}");
        }
    }
}
