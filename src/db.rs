use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rusqlite::Connection;

use crate::model::{RecordRow, SalaryRecord, COLUMNS};
use crate::store::RecordSink;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS salarios (
            id                     INTEGER PRIMARY KEY,
            company                TEXT NOT NULL,
            position               TEXT NOT NULL,
            salario_minimo         REAL NOT NULL,
            salario_maximo         REAL NOT NULL,
            salario_promedio       REAL NOT NULL,
            moneda                 TEXT NOT NULL CHECK(moneda IN ('PEN','USD')),
            sector                 TEXT,
            es_ti                  BOOLEAN NOT NULL DEFAULT 0,
            es_ventas_marketing    BOOLEAN NOT NULL DEFAULT 0,
            es_gerencial           BOOLEAN NOT NULL DEFAULT 0,
            es_junior              BOOLEAN NOT NULL DEFAULT 0,
            nivel_ti               TEXT,
            nivel_ventas_marketing TEXT,
            nivel_gerencial        TEXT,
            area_junior            TEXT,
            rol_bancario           TEXT,
            salario_corregido      BOOLEAN NOT NULL DEFAULT 0,
            universidad_principal  TEXT,
            source_url             TEXT NOT NULL,
            extracted_at           TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_salarios_company ON salarios(company);
        CREATE INDEX IF NOT EXISTS idx_salarios_position ON salarios(position);
        CREATE INDEX IF NOT EXISTS idx_salarios_promedio ON salarios(salario_promedio);
        CREATE INDEX IF NOT EXISTS idx_salarios_sector ON salarios(sector);
        ",
    )?;

    // Databases written before the university column existed.
    let has_university: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info('salarios') WHERE name = 'universidad_principal'",
        [],
        |r| r.get(0),
    )?;
    if !has_university {
        conn.execute_batch("ALTER TABLE salarios ADD COLUMN universidad_principal TEXT;")?;
    }
    Ok(())
}

// ── Writing ──

pub fn clear(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM salarios", [])?)
}

pub fn save_records(conn: &Connection, records: &[SalaryRecord]) -> Result<usize> {
    let placeholders = (1..=COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO salarios ({}) VALUES ({})",
        COLUMNS.join(", "),
        placeholders
    );

    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(&sql)?;
        for record in records {
            let r = RecordRow::from(record);
            count += stmt.execute(rusqlite::params![
                r.company,
                r.position,
                r.salario_minimo,
                r.salario_maximo,
                r.salario_promedio,
                r.moneda,
                r.sector,
                r.es_ti,
                r.es_ventas_marketing,
                r.es_gerencial,
                r.es_junior,
                r.nivel_ti,
                r.nivel_ventas_marketing,
                r.nivel_gerencial,
                r.area_junior,
                r.rol_bancario,
                r.salario_corregido,
                r.universidad_principal,
                r.source_url,
                r.extracted_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = connect(path)?;
        init_schema(&conn)?;
        Ok(SqliteSink { conn })
    }
}

impl RecordSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn reset(&mut self) -> Result<()> {
        clear(&self.conn)?;
        Ok(())
    }

    fn append(&mut self, records: &[SalaryRecord]) -> Result<usize> {
        save_records(&self.conn, records)
    }
}

// ── Queries ──

#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    /// Case-insensitive substring of the company name.
    pub company: Option<String>,
    pub min_average: Option<f64>,
    pub max_average: Option<f64>,
    pub limit: Option<usize>,
}

pub fn fetch_records(conn: &Connection, filter: &RecordFilter) -> Result<Vec<RecordRow>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(c) = &filter.company {
        conditions.push(format!("company LIKE ?{}", params.len() + 1));
        params.push(Box::new(format!("%{c}%")));
    }
    if let Some(min) = filter.min_average {
        conditions.push(format!("salario_promedio >= ?{}", params.len() + 1));
        params.push(Box::new(min));
    }
    if let Some(max) = filter.max_average {
        conditions.push(format!("salario_promedio <= ?{}", params.len() + 1));
        params.push(Box::new(max));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let limit = match filter.limit {
        Some(n) => format!(" LIMIT {n}"),
        None => String::new(),
    };

    let sql = format!(
        "SELECT {} FROM salarios{} ORDER BY salario_promedio DESC, company, position{}",
        COLUMNS.join(", "),
        where_clause,
        limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(RecordRow {
                company: row.get(0)?,
                position: row.get(1)?,
                salario_minimo: row.get(2)?,
                salario_maximo: row.get(3)?,
                salario_promedio: row.get(4)?,
                moneda: row.get(5)?,
                sector: row.get(6)?,
                es_ti: row.get(7)?,
                es_ventas_marketing: row.get(8)?,
                es_gerencial: row.get(9)?,
                es_junior: row.get(10)?,
                nivel_ti: row.get(11)?,
                nivel_ventas_marketing: row.get(12)?,
                nivel_gerencial: row.get(13)?,
                area_junior: row.get(14)?,
                rol_bancario: row.get(15)?,
                salario_corregido: row.get(16)?,
                universidad_principal: row.get(17)?,
                source_url: row.get(18)?,
                extracted_at: row.get(19)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_by_company(conn: &Connection, company: &str) -> Result<Vec<RecordRow>> {
    let filter = RecordFilter {
        company: Some(company.to_string()),
        ..Default::default()
    };
    fetch_records(conn, &filter)
}

pub fn fetch_by_salary_range(conn: &Connection, min: f64, max: f64) -> Result<Vec<RecordRow>> {
    let filter = RecordFilter {
        min_average: Some(min),
        max_average: Some(max),
        ..Default::default()
    };
    fetch_records(conn, &filter)
}

// ── Aggregation ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    #[default]
    Company,
    Sector,
    Category,
    University,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Category rows overlap: a record flagged both technology and managerial
/// counts in both groups.
const CATEGORY_UNION: &str = "
    SELECT 'Tecnología' AS grp, salario_promedio FROM salarios WHERE es_ti = 1
    UNION ALL
    SELECT 'Ventas/Marketing', salario_promedio FROM salarios WHERE es_ventas_marketing = 1
    UNION ALL
    SELECT 'Gerencial', salario_promedio FROM salarios WHERE es_gerencial = 1
    UNION ALL
    SELECT 'Junior/Practicante', salario_promedio FROM salarios WHERE es_junior = 1
";

pub fn aggregate(conn: &Connection, group: GroupBy) -> Result<Vec<GroupRow>> {
    let source = match group {
        GroupBy::Company => "SELECT company AS grp, salario_promedio FROM salarios".to_string(),
        GroupBy::Sector => {
            "SELECT COALESCE(sector, 'Otros') AS grp, salario_promedio FROM salarios".to_string()
        }
        GroupBy::Category => CATEGORY_UNION.to_string(),
        GroupBy::University => "SELECT universidad_principal AS grp, salario_promedio FROM salarios
             WHERE universidad_principal IS NOT NULL"
            .to_string(),
    };
    let sql = format!(
        "SELECT grp, COUNT(*), AVG(salario_promedio), MIN(salario_promedio), MAX(salario_promedio)
         FROM ({source})
         GROUP BY grp
         ORDER BY AVG(salario_promedio) DESC, grp"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(GroupRow {
                key: row.get(0)?,
                count: row.get(1)?,
                mean: row.get(2)?,
                min: row.get(3)?,
                max: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub records: usize,
    pub companies: usize,
    pub sectors: usize,
    pub corrected: usize,
    pub technology: usize,
    pub sales_marketing: usize,
    pub managerial: usize,
    pub junior: usize,
    pub mean_average: Option<f64>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };

    let records = count("SELECT COUNT(*) FROM salarios")?;
    let companies = count("SELECT COUNT(DISTINCT company) FROM salarios")?;
    let sectors = count("SELECT COUNT(DISTINCT sector) FROM salarios")?;
    let corrected = count("SELECT COUNT(*) FROM salarios WHERE salario_corregido = 1")?;
    let technology = count("SELECT COUNT(*) FROM salarios WHERE es_ti = 1")?;
    let sales_marketing = count("SELECT COUNT(*) FROM salarios WHERE es_ventas_marketing = 1")?;
    let managerial = count("SELECT COUNT(*) FROM salarios WHERE es_gerencial = 1")?;
    let junior = count("SELECT COUNT(*) FROM salarios WHERE es_junior = 1")?;
    let mean_average: Option<f64> =
        conn.query_row("SELECT AVG(salario_promedio) FROM salarios", [], |r| r.get(0))?;

    Ok(Stats {
        records,
        companies,
        sectors,
        corrected,
        technology,
        sales_marketing,
        managerial,
        junior,
        mean_average,
    })
}
