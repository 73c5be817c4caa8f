//! Salary text -> `SalaryFigure`.
//!
//! Handles "S/ 3,600.00 - S/ 5,000.00" (range) and "S/ 7,857.00" (single value).
//! Single values get bounds of +/-20% around the figure. A range is only read
//! from the leading figure, so trailing numbers like "(2023-2024)" are ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseFailure;
use crate::model::{round2, Currency, SalaryFigure};

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\D*(\d+(?:\.\d+)?)\s*[-–—]\s*(\d+(?:\.\d+)?)").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

pub const SINGLE_VALUE_LOWER: f64 = 0.8;
pub const SINGLE_VALUE_UPPER: f64 = 1.2;

/// Longest first: "S/." must be stripped whole or its dot sticks to the number.
const PEN_MARKERS: &[&str] = &["S/.", "S/", "PEN"];
const USD_MARKERS: &[&str] = &["US$", "USD", "$"];

/// True if `text` carries any currency marker the parser understands.
pub fn has_currency_marker(text: &str) -> bool {
    PEN_MARKERS.iter().chain(USD_MARKERS).any(|m| text.contains(m))
}

pub fn detect_currency(text: &str) -> Currency {
    if PEN_MARKERS.iter().any(|m| text.contains(m)) {
        Currency::Pen
    } else {
        Currency::Usd
    }
}

/// Strip currency markers and thousands separators.
fn normalize(text: &str) -> String {
    let mut clean = text.to_string();
    for marker in PEN_MARKERS.iter().chain(USD_MARKERS) {
        clean = clean.replace(marker, " ");
    }
    clean.replace(',', "")
}

pub fn parse(text: &str) -> Result<SalaryFigure, ParseFailure> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::Empty);
    }

    let currency = detect_currency(trimmed);
    let clean = normalize(trimmed);

    if let Some(caps) = RANGE_RE.captures(&clean) {
        let a = to_number(&caps[1], trimmed)?;
        let b = to_number(&caps[2], trimmed)?;
        let (minimum, maximum) = if a <= b { (a, b) } else { (b, a) };
        if minimum <= 0.0 {
            return Err(ParseFailure::NonPositive(trimmed.to_string()));
        }
        return Ok(SalaryFigure {
            minimum: round2(minimum),
            maximum: round2(maximum),
            average: round2((minimum + maximum) / 2.0),
            currency,
        });
    }

    let first = NUMBER_RE
        .find(&clean)
        .ok_or_else(|| ParseFailure::NoNumber(trimmed.to_string()))?;
    let average = round2(to_number(first.as_str(), trimmed)?);
    if average <= 0.0 {
        return Err(ParseFailure::NonPositive(trimmed.to_string()));
    }

    let minimum = round2(average * SINGLE_VALUE_LOWER);
    let maximum = round2(average * SINGLE_VALUE_UPPER);
    if !(minimum < average && average < maximum) {
        return Err(ParseFailure::BelowPrecision(trimmed.to_string()));
    }

    Ok(SalaryFigure {
        minimum,
        maximum,
        average,
        currency,
    })
}

fn to_number(token: &str, original: &str) -> Result<f64, ParseFailure> {
    token
        .parse::<f64>()
        .map_err(|_| ParseFailure::NoNumber(original.to_string()))
}
