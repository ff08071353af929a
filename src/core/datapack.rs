//! DataPack row parsing.
//!
//! A numeric cell that cannot be read becomes zero and is counted in
//! [`ParseDiagnostics::lenient_cells`]. A row without an area code is dropped
//! and counted in [`ParseDiagnostics::dropped_rows`]. Data quality alone never
//! fails a parse.

use crate::config::toml_config::{G01Columns, G02Columns};
use crate::domain::model::{AgeSexCount, G01Record, G02Record, ParseDiagnostics, RawRow, Sex};
use crate::utils::error::{CensusError, Result};
use regex::Regex;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome<T> {
    pub records: Vec<T>,
    pub diagnostics: ParseDiagnostics,
}

#[derive(Debug, Clone, PartialEq)]
struct AgeSexColumn {
    column: String,
    sex: Sex,
    lower: u32,
    bracket: String,
}

pub struct G01Parser {
    columns: G01Columns,
    age_sex: Regex,
}

impl G01Parser {
    pub fn new(columns: &G01Columns) -> Result<Self> {
        let age_sex = Regex::new(&columns.age_sex_pattern).map_err(|e| {
            CensusError::InvalidConfigValueError {
                field: "g01.age_sex_pattern".to_string(),
                value: columns.age_sex_pattern.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            columns: columns.clone(),
            age_sex,
        })
    }

    fn age_sex_columns<'a>(&self, headers: impl Iterator<Item = &'a String>) -> Vec<AgeSexColumn> {
        let mut found: Vec<AgeSexColumn> = headers
            .filter_map(|header| {
                let caps = self.age_sex.captures(header)?;
                // 具名群組優先, 否則依序為 性別/下限/上限
                let group = |name: &str, index: usize| caps.name(name).or_else(|| caps.get(index));
                let sex = Sex::from_code(group("sex", 1)?.as_str())?;
                let lower_str = group("lower", 2)?.as_str();
                let lower = lower_str.parse::<u32>().ok()?;
                let upper = group("upper", 3)?.as_str();
                let open_ended =
                    upper.eq_ignore_ascii_case("over") || upper.eq_ignore_ascii_case("ov");
                let bracket = if open_ended {
                    format!("{}+", lower_str)
                } else {
                    format!("{}-{}", lower_str, upper)
                };
                Some(AgeSexColumn {
                    column: header.clone(),
                    sex,
                    lower,
                    bracket,
                })
            })
            .collect();

        // 依性別再依年齡排序, 讓輸出穩定
        found.sort_by(|a, b| {
            sex_order(a.sex)
                .cmp(&sex_order(b.sex))
                .then(a.lower.cmp(&b.lower))
                .then(a.bracket.cmp(&b.bracket))
        });
        found
    }

    pub fn parse(&self, rows: &[RawRow]) -> ParseOutcome<G01Record> {
        let mut diagnostics = ParseDiagnostics::default();
        let mut records = Vec::with_capacity(rows.len());
        let mut seen = HashSet::new();

        let age_sex_columns = rows
            .first()
            .map(|row| self.age_sex_columns(row.data.keys()))
            .unwrap_or_default();

        for row in rows {
            let Some(area_code) = area_code(row, &self.columns.area_code_column) else {
                diagnostics.dropped_rows += 1;
                continue;
            };

            if !seen.insert(area_code.clone()) {
                diagnostics.duplicate_area_codes += 1;
                tracing::warn!("⚠️ Duplicate G01 area code {}", area_code);
            }

            let total_population =
                lenient_count(row, &self.columns.total_population_column, &mut diagnostics);

            let age_sex = age_sex_columns
                .iter()
                .map(|col| AgeSexCount {
                    sex: col.sex,
                    bracket: col.bracket.clone(),
                    count: lenient_count(row, &col.column, &mut diagnostics),
                })
                .collect();

            let male_total = self
                .columns
                .male_total_column
                .as_deref()
                .map(|column| lenient_count(row, column, &mut diagnostics));
            let female_total = self
                .columns
                .female_total_column
                .as_deref()
                .map(|column| lenient_count(row, column, &mut diagnostics));

            records.push(G01Record {
                area_code,
                total_population,
                age_sex,
                male_total,
                female_total,
            });
        }

        log_outcome("G01", records.len(), &diagnostics);
        ParseOutcome {
            records,
            diagnostics,
        }
    }
}

fn sex_order(sex: Sex) -> u8 {
    match sex {
        Sex::Male => 0,
        Sex::Female => 1,
        Sex::Persons => 2,
    }
}

pub fn parse_g01(rows: &[RawRow], columns: &G01Columns) -> Result<ParseOutcome<G01Record>> {
    Ok(G01Parser::new(columns)?.parse(rows))
}

pub fn parse_g02(rows: &[RawRow], columns: &G02Columns) -> ParseOutcome<G02Record> {
    let mut diagnostics = ParseDiagnostics::default();
    let mut records = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();

    for row in rows {
        let Some(area_code) = area_code(row, &columns.area_code_column) else {
            diagnostics.dropped_rows += 1;
            continue;
        };

        if !seen.insert(area_code.clone()) {
            diagnostics.duplicate_area_codes += 1;
            tracing::warn!("⚠️ Duplicate G02 area code {}", area_code);
        }

        records.push(G02Record {
            area_code,
            median_age: lenient_value(row, &columns.median_age_column, &mut diagnostics),
            median_household_income_weekly: lenient_value(
                row,
                &columns.median_household_income_column,
                &mut diagnostics,
            ),
            median_personal_income_weekly: lenient_value(
                row,
                &columns.median_personal_income_column,
                &mut diagnostics,
            ),
            median_rent_weekly: lenient_value(row, &columns.median_rent_column, &mut diagnostics),
            average_household_size: lenient_value(
                row,
                &columns.average_household_size_column,
                &mut diagnostics,
            ),
        });
    }

    log_outcome("G02", records.len(), &diagnostics);
    ParseOutcome {
        records,
        diagnostics,
    }
}

fn area_code(row: &RawRow, column: &str) -> Option<String> {
    row.get(column)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lenient_value(row: &RawRow, column: &str, diagnostics: &mut ParseDiagnostics) -> f64 {
    match row.get(column).and_then(parse_number) {
        Some(value) => value,
        None => {
            diagnostics.lenient_cells += 1;
            0.0
        }
    }
}

fn lenient_count(row: &RawRow, column: &str, diagnostics: &mut ParseDiagnostics) -> u64 {
    match row.get(column).and_then(parse_number) {
        Some(value) if value >= 0.0 => value.round() as u64,
        _ => {
            diagnostics.lenient_cells += 1;
            0
        }
    }
}

fn log_outcome(table: &str, parsed: usize, diagnostics: &ParseDiagnostics) {
    tracing::info!(
        "📋 {} parsed {} records ({} dropped, {} lenient cells)",
        table,
        parsed,
        diagnostics.dropped_rows,
        diagnostics.lenient_cells
    );
}
