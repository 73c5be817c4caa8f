//! Alma mater mentioned on a company page.
//!
//! Pages sometimes name the university most of the company's staff studied
//! at. The first listed university found in the page text wins, and every
//! record of that page carries it.

use scraper::Html;

use crate::parser::keywords::fold;

/// Checked in order; earlier entries win when several are mentioned.
const UNIVERSITIES: &[&str] = &[
    "Universidad del Pacífico",
    "Universidad de Lima",
    "Pontificia Universidad Católica del Perú",
    "Universidad San Martín de Porres",
    "Universidad Nacional Mayor de San Marcos",
    "Universidad Peruana de Ciencias Aplicadas",
    "Universidad ESAN",
    "Universidad Nacional de Ingeniería",
];

pub fn principal(document: &Html) -> Option<&'static str> {
    let text = fold(&document.root_element().text().collect::<Vec<_>>().join(" "));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    UNIVERSITIES
        .iter()
        .find(|u| text.contains(&fold(u)))
        .copied()
}
