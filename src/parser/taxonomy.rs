//! Second-level labels inside each category.
//!
//! Each table is ordered; the first group whose keywords match wins and the
//! fallback applies when the parent flag holds but nothing more specific does.

use crate::model::{CategoryFlags, Subcategories};
use crate::parser::classify::SECTOR_BANKING;
use crate::parser::keywords::{fold, KeywordSet, OrderedGroups};

const TECHNOLOGY_LEVEL: OrderedGroups = OrderedGroups {
    groups: &[
        ("Senior TI", KeywordSet(&["senior", "sr.", "sr", "lead", "principal", "architect", "arquitecto"])),
        (
            "Data Science/Analytics",
            KeywordSet(&["data scientist", "data analyst", "big data", "machine learning"]),
        ),
        ("Cloud/DevOps", KeywordSet(&["cloud", "devops", "infrastructure", "infraestructura", "aws", "azure"])),
        ("Ciberseguridad", KeywordSet(&["cybersecurity", "security", "seguridad"])),
        ("Desarrollo", KeywordSet(&["frontend", "backend", "fullstack", "mobile", "web", "desarrollador", "developer"])),
        ("QA/Testing", KeywordSet(&["qa", "testing", "quality", "calidad"])),
        ("Liderazgo Técnico", KeywordSet(&["tech lead", "scrum master", "product owner"])),
    ],
    fallback: Some("TI General"),
};

const SALES_MARKETING_LEVEL: OrderedGroups = OrderedGroups {
    groups: &[
        ("Senior Ventas/Marketing", KeywordSet(&["senior", "sr.", "sr", "principal"])),
        (
            "Account Management",
            KeywordSet(&["account manager", "key account", "business development"]),
        ),
        ("Marketing Digital", KeywordSet(&["digital marketing", "marketing digital", "social media", "seo", "sem"])),
        ("Ventas Directas", KeywordSet(&["inside sales", "sales representative", "vendedor"])),
        ("Brand/Product Marketing", KeywordSet(&["brand", "product marketing", "marca"])),
        ("Research/Analytics", KeywordSet(&["market research", "analyst", "research", "investigacion"])),
    ],
    fallback: Some("Ventas/Marketing General"),
};

const MANAGERIAL_LEVEL: OrderedGroups = OrderedGroups {
    groups: &[
        (
            "C-Level",
            KeywordSet(&[
                "ceo", "cfo", "cto", "coo", "chief", "presidente", "director general",
            ]),
        ),
        ("Directores", KeywordSet(&["director", "directora"])),
        ("Gerentes Generales", KeywordSet(&["gerente general", "general manager"])),
        ("Gerentes", KeywordSet(&["gerente", "manager"])),
        ("Jefaturas", KeywordSet(&["jefe", "jefa", "head", "lider", "lead"])),
        ("Supervisión/Coordinación", KeywordSet(&["supervisor", "coordinador", "coordinator", "encargado"])),
    ],
    fallback: Some("Otros Gerenciales"),
};

const JUNIOR_AREA: OrderedGroups = OrderedGroups {
    groups: &[
        (
            "Marketing y Comercial Jr",
            KeywordSet(&["marketing", "marca", "brand", "comercial", "ventas", "sales"]),
        ),
        (
            "Finanzas y Análisis Jr",
            KeywordSet(&["finanzas", "finance", "planeamiento", "planning", "revenue", "contabilidad", "analyst"]),
        ),
        ("Tecnología Jr", KeywordSet(&["ti", "tecnologia", "sistemas", "tech", "software", "data"])),
        (
            "Recursos Humanos Jr",
            KeywordSet(&["recursos humanos", "rrhh", "hr", "talento", "seleccion"]),
        ),
        (
            "Supply Chain y Operaciones Jr",
            KeywordSet(&["supply", "logistica", "cadena", "operaciones", "operations"]),
        ),
        (
            "Consultoría y Negocios Jr",
            KeywordSet(&["consultoria", "consulting", "business", "negocios", "estrategia"]),
        ),
        ("Comunicaciones Jr", KeywordSet(&["comunicacion", "communication", "interna", "clima"])),
    ],
    fallback: Some("Otros Practicantes/Juniors"),
};

const BANKING_ROLE: OrderedGroups = OrderedGroups {
    groups: &[
        ("Gestión y Liderazgo", KeywordSet(&["gerente", "director", "jefe", "head", "manager"])),
        ("Asesoría y Ventas", KeywordSet(&["asesor", "ejecutivo", "consultor", "promotor"])),
        ("Análisis y Especialización", KeywordSet(&["analista", "analyst", "especialista", "specialist"])),
        ("Riesgo y Cumplimiento", KeywordSet(&["riesgo", "risk", "cumplimiento", "compliance"])),
        ("Operaciones", KeywordSet(&["operaciones", "operations", "procesos", "cajero"])),
    ],
    fallback: Some("Otros Roles Bancarios"),
};

pub fn subcategories(position: &str, flags: &CategoryFlags, sector: &str) -> Subcategories {
    let title = fold(position);
    let label = |table: &OrderedGroups, applies: bool| {
        applies
            .then(|| table.label(&title))
            .flatten()
            .map(str::to_string)
    };

    Subcategories {
        technology_level: label(&TECHNOLOGY_LEVEL, flags.is_technology),
        sales_marketing_level: label(&SALES_MARKETING_LEVEL, flags.is_sales_marketing),
        managerial_level: label(&MANAGERIAL_LEVEL, flags.is_managerial),
        junior_area: label(&JUNIOR_AREA, flags.is_junior),
        banking_role: label(&BANKING_ROLE, sector == SECTOR_BANKING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(tech: bool, sales: bool, mgr: bool, jr: bool) -> CategoryFlags {
        CategoryFlags {
            is_technology: tech,
            is_sales_marketing: sales,
            is_managerial: mgr,
            is_junior: jr,
        }
    }

    #[test]
    fn labels_only_under_their_flag() {
        let s = subcategories("Desarrollador Backend", &flags(true, false, false, false), "Tecnología");
        assert_eq!(s.technology_level.as_deref(), Some("Desarrollo"));
        assert!(s.sales_marketing_level.is_none());
        assert!(s.managerial_level.is_none());
        assert!(s.junior_area.is_none());
        assert!(s.banking_role.is_none());
    }

    #[test]
    fn seniority_beats_specialty() {
        let s = subcategories("Senior Data Scientist", &flags(true, false, false, false), "Otros");
        assert_eq!(s.technology_level.as_deref(), Some("Senior TI"));
    }

    #[test]
    fn managerial_levels() {
        let mgr = flags(false, false, true, false);
        let level = |t| subcategories(t, &mgr, "Otros").managerial_level;
        assert_eq!(level("CEO").as_deref(), Some("C-Level"));
        assert_eq!(level("Director de Finanzas").as_deref(), Some("Directores"));
        assert_eq!(level("Gerente General").as_deref(), Some("Gerentes Generales"));
        assert_eq!(level("Gerente de Ventas").as_deref(), Some("Gerentes"));
        assert_eq!(level("Jefe de Contabilidad").as_deref(), Some("Jefaturas"));
        assert_eq!(level("Coordinador de Eventos").as_deref(), Some("Supervisión/Coordinación"));
    }

    #[test]
    fn junior_area_and_fallback() {
        let jr = flags(false, false, false, true);
        assert_eq!(
            subcategories("Practicante de Recursos Humanos", &jr, "Otros").junior_area.as_deref(),
            Some("Recursos Humanos Jr")
        );
        assert_eq!(
            subcategories("Practicante Legal", &jr, "Otros").junior_area.as_deref(),
            Some("Otros Practicantes/Juniors")
        );
    }

    #[test]
    fn banking_role_requires_banking_sector() {
        let none = flags(false, false, false, false);
        let s = subcategories("Asesor de Banca Personal", &none, SECTOR_BANKING);
        assert_eq!(s.banking_role.as_deref(), Some("Asesoría y Ventas"));
        let s = subcategories("Asesor de Banca Personal", &none, "Seguros");
        assert!(s.banking_role.is_none());
    }
}
