//! Static catalog of company pages to scrape, optionally replaced by a
//! catalog file written by `discover`.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Local;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyTarget {
    /// URL slug, possibly with accents (`entel-perú`) or already encoded (`entel-per%C3%BA`).
    pub identifier: String,
    pub display_name: String,
}

impl CompanyTarget {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        CompanyTarget {
            identifier: identifier.into(),
            display_name: display_name.into(),
        }
    }

    pub fn has_accents(&self) -> bool {
        !self.identifier.is_ascii()
    }
}

const CATALOG: &[(&str, &str)] = &[
    // Banca y finanzas
    ("banco-de-credito-bcp", "Banco de Crédito BCP"),
    ("interbank", "Interbank"),
    ("bbva-peru", "BBVA Perú"),
    ("bbva-en-perú", "BBVA en Perú"),
    ("scotiabank-perú", "Scotiabank Perú"),
    ("banco-pichincha-perú", "Banco Pichincha Perú"),
    ("banbif-banco-interamericano-de-finanzas", "BanBif - Banco Interamericano de Finanzas"),
    ("mibanco-banco-de-la-microempresa", "Mibanco, banco de la Microempresa"),
    ("compartamos-financiera", "Compartamos Financiera"),
    ("financiera-credinka", "FINANCIERA CREDINKA"),
    // Telecomunicaciones
    ("entel-perú", "Entel Perú"),
    ("telefónica", "Telefónica"),
    ("claro-perú", "Claro Perú"),
    // Seguros
    ("rimac-seguros-y-reaseguros", "Rimac Seguros y Reaseguros"),
    ("pacifico-seguros", "Pacífico Seguros"),
    ("interseguro-compañia-de-seguros", "Interseguro Compañía de Seguros"),
    ("la-positiva-seguros", "La Positiva Seguros"),
    ("mapfre", "MAPFRE"),
    // AFP
    ("prima-afp", "Prima AFP"),
    ("profuturo-afp", "Profuturo AFP"),
    ("afp-integra", "AFP Integra"),
    // Retail
    ("falabella", "Falabella"),
    ("saga-falabella", "Saga Falabella"),
    ("ripley-perú", "Ripley Perú"),
    ("sodimac", "Sodimac"),
    ("hiraoka", "Hiraoka"),
    ("coolbox-perú", "Coolbox Perú"),
    ("cencosud-scotiabank", "Cencosud Scotiabank"),
    ("makro-peru", "Makro Peru"),
    // Alimentos y bebidas
    ("alicorp", "Alicorp"),
    ("nestlé", "Nestlé"),
    ("backus", "Backus"),
    ("ajinomoto-del-perú-sa", "Ajinomoto del Perú S.A."),
    ("san-fernando", "San Fernando"),
    ("grupo-aje", "Grupo AJE"),
    ("gloria", "Gloria"),
    ("mondelez-international", "Mondelēz International"),
    // Farmacias y cosmética
    ("farmacias-peruanas", "Farmacias Peruanas"),
    ("perfumerias-unidas", "Perfumerías Unidas"),
    ("belcorp", "Belcorp"),
    ("yanbal", "Yanbal"),
    ("loreal", "L'Oréal"),
    ("procter-gamble", "Procter & Gamble"),
    ("colgate-palmolive", "Colgate-Palmolive"),
    ("kimberly-clark", "Kimberly-Clark"),
    // Consultoría y tecnología
    ("deloitte", "Deloitte"),
    ("pwc-perú", "PwC Perú"),
    ("ey", "EY"),
    ("mckinsey-company", "McKinsey & Company"),
    ("boston-consulting-group-bcg", "Boston Consulting Group (BCG)"),
    ("accenture", "Accenture"),
    ("everis", "everis"),
    ("minsait", "Minsait"),
    ("indra", "Indra"),
    ("management-solutions", "Management Solutions"),
    ("ntt-data-europe-latam", "NTT DATA Europe & Latam"),
    ("stefanini-it-solutions-perú", "Stefanini IT Solutions (Perú)"),
    ("cisco", "Cisco"),
    // Petróleo y energía
    ("repsol", "Repsol"),
    ("enel-x", "Enel X"),
    ("primax", "Primax"),
    ("bp-perú", "BP Perú"),
    // Minería
    ("southern-copper-corporation", "Southern Copper Corporation"),
    ("compañia-minera-antamina", "Compañía Minera Antamina"),
    ("minsur-sa", "Minsur S.A."),
    ("shougang-hierro-perú-saa", "Shougang Hierro Perú S.A.A."),
    ("glencore", "Glencore"),
    ("sociedad-minera-el-brocal", "Sociedad Minera El Brocal"),
    // Construcción
    ("unacem", "UNACEM"),
    ("cementos-pacasmayo-saa", "Cementos Pacasmayo SAA"),
    ("graña-y-montero", "Graña y Montero"),
    ("stracon", "STRACON"),
    ("jjc-contratistas-generales-sa", "JJC Contratistas Generales S.A."),
    // Logística y transporte
    ("ransa", "Ransa"),
    ("dhl", "DHL"),
    ("fedex", "FedEx"),
    ("latam-airlines", "LATAM Airlines"),
    ("sky-airline", "SKY Airline"),
    ("talma-servicios-aeroportuarios-sa", "Talma Servicios Aeroportuarios S.A."),
    ("dp-world", "DP World"),
    // Automotriz
    ("toyota-del-perú", "Toyota del Perú"),
    ("divemotor", "Divemotor"),
    ("ferreyros-sa", "Ferreyros S.A."),
    ("inchcape-americas", "Inchcape Américas"),
    // Educación
    ("universidad-del-pacifico-pe", "Universidad del Pacífico (PE)"),
    ("universidad-continental", "Universidad Continental"),
    ("universidad-tecnologica-del-perú", "Universidad Tecnológica del Perú"),
    ("corporacion-educativa-pamer", "Corporación Educativa Pamer"),
    // Medios
    ("el-comercio", "El Comercio"),
    ("america-television", "América Televisión"),
    ("panamericana-television", "Panamericana Televisión"),
    // Salud
    ("clinica-anglo-americana", "Clínica Anglo Americana"),
    ("clinica-internacional", "Clínica Internacional"),
    ("auna", "Auna"),
    ("fresenius-medical-care", "Fresenius Medical Care"),
    ("siemens-healthineers", "Siemens Healthineers"),
    // Agroindustria
    ("san-miguel-industrias-pet", "San Miguel Industrias PET"),
    ("agro-industrial-paramonga-saa", "Agro Industrial Paramonga Saa"),
    ("viru-sa", "Viru S.A."),
    ("inkas-berries", "Inka's Berries"),
    // Startups y fintech
    ("yape", "Yape"),
    ("culqi", "Culqi"),
    ("kushki", "Kushki"),
    ("izipay", "izipay"),
    ("jokr", "JOKR"),
    ("rappi", "Rappi"),
    ("pedidosya", "PedidosYa"),
    ("despegar", "Despegar"),
    // Gobierno
    (
        "superintendencia-de-banca-seguros-y-administradoras-de-fondos-de-pensiones-del-perú",
        "Superintendencia de Banca, Seguros y Administradoras de Fondos de Pensiones del Perú",
    ),
    ("ministerio-de-comercio-exterior-y-turismo", "Ministerio de Comercio Exterior y Turismo"),
    ("municipalidad-de-lima", "Municipalidad de Lima"),
    ("bolsa-de-valores-de-lima", "Bolsa de Valores de Lima"),
    // Servicios
    ("prosegur", "Prosegur"),
    ("securitas", "Securitas"),
    ("sodexo", "Sodexo"),
    ("manpowergroup", "ManpowerGroup"),
    ("adecco", "Adecco"),
    ("michael-page", "Michael Page"),
    ("spencer-stuart", "Spencer Stuart"),
    ("marsh", "Marsh"),
    ("wtw", "WTW"),
    // Tecnología
    ("google", "Google"),
    ("amazon", "Amazon"),
    ("microsoft", "Microsoft"),
    ("ibm", "IBM"),
    ("oracle", "Oracle"),
    ("salesforce", "Salesforce"),
    ("sap", "SAP"),
    ("vtex", "VTEX"),
    ("mercadolibre", "MercadoLibre"),
    // Internacionales
    ("3m", "3M"),
    ("ab-inbev", "AB InBev"),
    ("adidas", "adidas"),
    ("samsung-electronics", "Samsung Electronics"),
    ("lg", "LG"),
    ("huawei", "Huawei"),
    ("lenovo", "Lenovo"),
    ("hp", "HP"),
    ("dell", "Dell"),
];

/// Quick-check subset; several slugs carry accents on purpose.
const TEST_SUBSET: &[(&str, &str)] = &[
    ("banco-de-credito-bcp", "Banco de Crédito BCP"),
    ("interbank", "Interbank"),
    ("bbva-peru", "BBVA Perú"),
    ("scotiabank-perú", "Scotiabank Perú"),
    ("entel-perú", "Entel Perú"),
    ("telefónica", "Telefónica"),
    ("alicorp", "Alicorp"),
    ("rimac-seguros", "Rimac Seguros"),
    ("falabella", "Falabella"),
    ("deloitte", "Deloitte"),
    ("pwc-perú", "PwC Perú"),
    ("rappi", "Rappi"),
    ("yape", "Yape"),
    ("culqi", "Culqi"),
    ("nestlé", "Nestlé"),
];

fn to_targets(entries: &[(&str, &str)]) -> Vec<CompanyTarget> {
    entries
        .iter()
        .map(|(slug, name)| CompanyTarget::new(*slug, *name))
        .collect()
}

pub fn all() -> Vec<CompanyTarget> {
    to_targets(CATALOG)
}

pub fn test_subset() -> Vec<CompanyTarget> {
    to_targets(TEST_SUBSET)
}

pub fn with_accents() -> Vec<CompanyTarget> {
    all().into_iter().filter(CompanyTarget::has_accents).collect()
}

/// Look a slug up in the full catalog and the test subset.
pub fn find(slug: &str) -> Option<CompanyTarget> {
    CATALOG
        .iter()
        .chain(TEST_SUBSET)
        .find(|(s, _)| *s == slug)
        .map(|(s, n)| CompanyTarget::new(*s, *n))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Subset {
    #[default]
    Test,
    Full,
    /// Entries read from a catalog file.
    Loaded(Vec<CompanyTarget>),
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub subset: Subset,
    pub limit: Option<usize>,
    /// Explicit slugs; when non-empty the subset is ignored.
    pub only: Vec<String>,
}

pub fn select(selection: &Selection) -> Result<Vec<CompanyTarget>, ConfigError> {
    let pool = match &selection.subset {
        Subset::Test => test_subset(),
        Subset::Full => all(),
        Subset::Loaded(entries) => entries.clone(),
    };
    let mut targets = if selection.only.is_empty() {
        pool
    } else {
        selection
            .only
            .iter()
            .map(|slug| {
                pool.iter()
                    .find(|t| t.identifier == *slug)
                    .cloned()
                    .or_else(|| find(slug))
                    .ok_or_else(|| ConfigError::UnknownCompany(slug.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    if let Some(n) = selection.limit {
        targets.truncate(n);
    }
    if targets.is_empty() {
        return Err(ConfigError::EmptySelection);
    }
    Ok(targets)
}

// ── Catalog files ──

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    metadata: CatalogMetadata,
    empresas: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogMetadata {
    total_empresas: usize,
    fecha_extraccion: String,
    fuente: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogEntry {
    slug: String,
    nombre: String,
}

/// Write `targets` as a JSON catalog that `load` reads back.
pub fn save(path: &Path, targets: &[CompanyTarget], source: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = CatalogFile {
        metadata: CatalogMetadata {
            total_empresas: targets.len(),
            fecha_extraccion: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            fuente: source.to_string(),
        },
        empresas: targets
            .iter()
            .map(|t| CatalogEntry {
                slug: t.identifier.clone(),
                nombre: t.display_name.clone(),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Entries of a catalog file in file order, first occurrence of each slug kept.
pub fn load(path: &Path) -> Result<Vec<CompanyTarget>, ConfigError> {
    let invalid = |reason: String| ConfigError::Catalog {
        path: path.display().to_string(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let file: CatalogFile = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;

    let targets: Vec<CompanyTarget> = file
        .empresas
        .into_iter()
        .filter(|e| !e.slug.trim().is_empty())
        .unique_by(|e| e.slug.clone())
        .map(|e| {
            let name = if e.nombre.trim().is_empty() { e.slug.clone() } else { e.nombre };
            CompanyTarget::new(e.slug, name)
        })
        .collect();
    if targets.is_empty() {
        return Err(invalid("no companies listed".into()));
    }
    Ok(targets)
}
