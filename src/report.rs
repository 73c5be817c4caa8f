//! Plain-text tables for the `stats`, `query`, `report` and `companies` commands.

use crate::db::{GroupBy, GroupRow, Stats};
use crate::directory::CompanyTarget;
use crate::model::RecordRow;

pub fn print_stats(s: &Stats) {
    println!("Records:          {}", s.records);
    println!("Companies:        {}", s.companies);
    println!("Sectors:          {}", s.sectors);
    println!("Corrected:        {}", s.corrected);
    println!("Technology:       {}", s.technology);
    println!("Sales/Marketing:  {}", s.sales_marketing);
    println!("Managerial:       {}", s.managerial);
    println!("Junior:           {}", s.junior);
    match s.mean_average {
        Some(mean) => println!("Mean salary:      {}", money(mean)),
        None => println!("Mean salary:      -"),
    }
}

pub fn print_rows(rows: &[RecordRow]) {
    println!(
        "{:>3} | {:<24} | {:<36} | {:>12} | {:>12} | {:>12} | {:<3} | {:<18} | {}",
        "#", "Company", "Position", "Min", "Avg", "Max", "Cur", "Sector", "Flags"
    );
    println!("{}", "-".repeat(150));

    for (i, r) in rows.iter().enumerate() {
        println!(
            "{:>3} | {:<24} | {:<36} | {:>12} | {:>12} | {:>12} | {:<3} | {:<18} | {}",
            i + 1,
            truncate(&r.company, 24),
            truncate(&r.position, 36),
            money(r.salario_minimo),
            money(r.salario_promedio),
            money(r.salario_maximo),
            r.moneda,
            truncate(r.sector.as_deref().unwrap_or("-"), 18),
            flags(r)
        );
    }
    println!("\n{} rows", rows.len());
}

pub fn print_groups(group: GroupBy, rows: &[GroupRow], top: usize) {
    let label = match group {
        GroupBy::Company => "Company",
        GroupBy::Sector => "Sector",
        GroupBy::Category => "Category",
        GroupBy::University => "University",
    };
    println!(
        "{:>3} | {:<32} | {:>6} | {:>12} | {:>12} | {:>12}",
        "#", label, "Count", "Mean", "Min", "Max"
    );
    println!("{}", "-".repeat(92));

    for (i, g) in rows.iter().take(top).enumerate() {
        println!(
            "{:>3} | {:<32} | {:>6} | {:>12} | {:>12} | {:>12}",
            i + 1,
            truncate(&g.key, 32),
            g.count,
            money(g.mean),
            money(g.min),
            money(g.max)
        );
    }
    if rows.len() > top {
        println!("... {} more", rows.len() - top);
    }
}

pub fn print_companies(targets: &[CompanyTarget]) {
    for t in targets {
        let marker = if t.has_accents() { "*" } else { " " };
        println!("{marker} {:<48} {}", t.identifier, t.display_name);
    }
    println!("\n{} companies (* = slug needs percent-encoding)", targets.len());
}

/// Short marker list: TI, VM, GER, JR, and `x10` for repaired salaries.
fn flags(r: &RecordRow) -> String {
    let mut out = Vec::new();
    if r.es_ti {
        out.push("TI");
    }
    if r.es_ventas_marketing {
        out.push("VM");
    }
    if r.es_gerencial {
        out.push("GER");
    }
    if r.es_junior {
        out.push("JR");
    }
    if r.salario_corregido {
        out.push("x10");
    }
    out.join(",")
}

/// `12,345.67`
fn money(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let mut grouped = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
