//! Company discovery: read the directory the site itself publishes and turn
//! it into a catalog file for `run --catalog`.
//!
//! The home page is tried first (company dropdown, datalist, then plain
//! `/empresa/` links). When it yields nothing, a few JSON endpoints are
//! probed. A small sample of the result is fetched back to check that the
//! pages really carry salaries.

use std::sync::LazyLock;

use anyhow::{bail, Result};
use itertools::Itertools;
use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::directory::CompanyTarget;
use crate::fetch::{Fetcher, ParsedPage, Transport};

static SELECT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("select").unwrap());
static DATALIST: LazyLock<Selector> = LazyLock::new(|| Selector::parse("datalist").unwrap());
static OPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").unwrap());
static COMPANY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/empresa/"]"#).unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());

/// A list shorter than this is navigation, not the company directory.
const MIN_LIST_OPTIONS: usize = 50;
const MIN_COMPANY_LINKS: usize = 20;
const MIN_API_ENTRIES: usize = 50;
const MIN_SLUG_LEN: usize = 3;
const PLACEHOLDERS: &[&str] = &["default", "Escoge una empresa"];
const API_PATHS: &[&str] = &["api/empresas", "api/companies", "search/companies", "empresas.json"];
/// Share of the verified sample that must look like salary pages.
const VERIFY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    HomePage,
    SearchApi,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::HomePage => "home page",
            Source::SearchApi => "search API",
        }
    }
}

#[derive(Debug)]
pub struct Discovery {
    pub source: Source,
    pub companies: Vec<CompanyTarget>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Verification {
    pub checked: usize,
    pub valid: usize,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.checked > 0 && self.valid as f64 / self.checked as f64 >= VERIFY_THRESHOLD
    }
}

pub fn discover<T: Transport>(fetcher: &mut Fetcher<T>) -> Result<Discovery> {
    let home = fetcher.base_url().clone();
    match fetcher.fetch_url(&home) {
        Ok(body) => {
            let companies = from_home_page(&Html::parse_document(&body));
            if !companies.is_empty() {
                info!("Found {} companies on the home page", companies.len());
                return Ok(Discovery { source: Source::HomePage, companies });
            }
            warn!("Home page lists no companies, trying the search API");
        }
        Err(e) => warn!("Home page unavailable ({}), trying the search API", e),
    }

    for path in API_PATHS {
        let Ok(url) = home.join(path) else { continue };
        match fetcher.fetch_url(&url) {
            Ok(body) => {
                let companies = from_api(&body);
                if companies.len() > MIN_API_ENTRIES {
                    info!("Found {} companies at {}", companies.len(), url);
                    return Ok(Discovery { source: Source::SearchApi, companies });
                }
                debug!("{}: {} entries, ignored", url, companies.len());
            }
            Err(e) => debug!("{}: {}", url, e),
        }
    }
    bail!("no company list found on {home}")
}

// ── Home page ──

/// Companies from the directory widgets of the home page, de-duplicated by
/// slug in document order.
pub fn from_home_page(document: &Html) -> Vec<CompanyTarget> {
    let dropdowns = document
        .select(&SELECT)
        .chain(document.select(&DATALIST))
        .filter(|list| list.select(&OPTION).count() > MIN_LIST_OPTIONS)
        .flat_map(|list| list.select(&OPTION).filter_map(option_entry).collect::<Vec<_>>());

    let links: Vec<ElementRef> = document.select(&COMPANY_LINK).collect();
    let linked: Vec<CompanyTarget> = if links.len() > MIN_COMPANY_LINKS {
        links.into_iter().filter_map(link_entry).collect()
    } else {
        Vec::new()
    };

    dropdowns
        .chain(linked)
        .filter(|t| t.identifier.chars().count() >= MIN_SLUG_LEN)
        .unique_by(|t| t.identifier.clone())
        .collect()
}

fn option_entry(option: ElementRef<'_>) -> Option<CompanyTarget> {
    let value = option.value().attr("value")?.trim();
    let text = option.text().collect::<String>().trim().to_string();
    if value.is_empty() || PLACEHOLDERS.contains(&value) || PLACEHOLDERS.contains(&text.as_str()) {
        return None;
    }
    let name = if text.is_empty() { value.to_string() } else { text };
    Some(CompanyTarget::new(slug_of(value), name))
}

fn link_entry(link: ElementRef<'_>) -> Option<CompanyTarget> {
    let href = link.value().attr("href")?;
    let text = link.text().collect::<Vec<_>>().join(" ");
    let name = text.split_whitespace().join(" ");
    if name.is_empty() {
        return None;
    }
    Some(CompanyTarget::new(slug_of(href), name))
}

/// `/empresa/entel-per%C3%BA/` or a bare value -> `entel-perú`.
fn slug_of(value: &str) -> String {
    let raw = match value.split_once("/empresa/") {
        Some((_, rest)) => rest,
        None => value,
    };
    let raw = raw.split(['?', '#']).next().unwrap_or_default().trim_matches('/');
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

// ── Search API ──

/// Entries of a JSON array: plain slug strings or objects carrying a slug
/// (`slug`, `value` or `url`) and a name (`nombre` or `name`).
pub fn from_api(body: &str) -> Vec<CompanyTarget> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(CompanyTarget::new(slug_of(s), s.clone())),
            Value::Object(obj) => {
                let field = |keys: &[&str]| {
                    keys.iter()
                        .find_map(|k| obj.get(*k).and_then(Value::as_str))
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                };
                let slug = slug_of(field(&["slug", "value", "url"])?);
                let name = field(&["nombre", "name"]).map_or_else(|| slug.clone(), str::to_string);
                Some(CompanyTarget::new(slug, name))
            }
            _ => None,
        })
        .filter(|t| t.identifier.chars().count() >= MIN_SLUG_LEN)
        .unique_by(|t| t.identifier.clone())
        .collect()
}

// ── Verification ──

/// Fetch the first `sample` companies and count the pages that look like
/// salary pages.
pub fn verify<T: Transport>(
    fetcher: &mut Fetcher<T>,
    companies: &[CompanyTarget],
    sample: usize,
) -> Verification {
    let mut result = Verification::default();
    for target in companies.iter().take(sample) {
        result.checked += 1;
        match fetcher.fetch(target) {
            Ok(page) if looks_like_salary_page(&page) => result.valid += 1,
            Ok(_) => info!("{}: no salary data", target.identifier),
            Err(e) => warn!("{}: {}", target.identifier, e),
        }
    }
    result
}

fn looks_like_salary_page(page: &ParsedPage) -> bool {
    if page.document.select(&TABLE).next().is_some() {
        return true;
    }
    let text = page.document.root_element().text().collect::<String>();
    let lower = text.to_lowercase();
    text.contains("S/") || lower.contains("salario") || lower.contains("puesto")
}
