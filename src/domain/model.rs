use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One CSV data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub data: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.data.get(column).map(String::as_str)
    }
}

/// Result of splitting a CSV text into rows.
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// 欄位數與標題不一致而被略過的列數
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableType {
    G01,
    G02,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::G01 => write!(f, "G01"),
            TableType::G02 => write!(f, "G02"),
        }
    }
}

impl std::str::FromStr for TableType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "G01" => Ok(TableType::G01),
            "G02" => Ok(TableType::G02),
            other => Err(format!("unsupported DataPack table: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Persons,
}

impl Sex {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            "P" => Some(Sex::Persons),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeSexCount {
    pub sex: Sex,
    /// e.g. "15-19" or "85+"
    pub bracket: String,
    pub count: u64,
}

/// G01: selected person characteristics for one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct G01Record {
    pub area_code: String,
    pub total_population: u64,
    pub age_sex: Vec<AgeSexCount>,
    /// 只在設定了性別總人數欄位時才有值
    #[serde(default)]
    pub male_total: Option<u64>,
    #[serde(default)]
    pub female_total: Option<u64>,
}

/// G02: selected medians and averages for one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct G02Record {
    pub area_code: String,
    pub median_age: f64,
    pub median_household_income_weekly: f64,
    pub median_personal_income_weekly: f64,
    pub median_rent_weekly: f64,
    pub average_household_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeShare {
    pub bracket: String,
    pub percent: f64,
}

/// Population composition derived from the G01 age/sex columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub male_percent: Option<f64>,
    pub female_percent: Option<f64>,
    pub age_brackets: Vec<AgeShare>,
}

/// Unified suburb view. G02-derived fields are `None` when no G02 row matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuburbRecord {
    pub area_code: String,
    pub name: String,
    pub population: u64,
    pub median_age: Option<f64>,
    pub median_household_income_weekly: Option<f64>,
    pub median_personal_income_weekly: Option<f64>,
    pub median_rent_weekly: Option<f64>,
    pub average_household_size: Option<f64>,
    pub estimated_households: Option<u64>,
    pub composition: Composition,
}

impl SuburbRecord {
    pub fn is_enriched(&self) -> bool {
        self.median_age.is_some()
    }
}

/// Safety/convenience pair returned by a rating source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuburbRatings {
    pub safety_rating: f64,
    pub convenience_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Excellent => "Excellent",
            Recommendation::Good => "Good",
            Recommendation::Fair => "Fair",
            Recommendation::Poor => "Poor",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentAnalysis {
    pub safety_rating: f64,
    pub convenience_score: f64,
    pub safety_weight: f64,
    pub convenience_weight: f64,
    /// Full precision; use `display_index` for presentation.
    pub investment_index: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
    pub explanation: String,
    pub key_strengths: Vec<String>,
    pub potential_concerns: Vec<String>,
    pub investment_advice: String,
}

impl InvestmentAnalysis {
    pub fn display_index(&self) -> f64 {
        (self.investment_index * 10.0).round() / 10.0
    }
}

/// Data-quality counters collected while ingesting one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub skipped_rows: usize,
    pub dropped_rows: usize,
    pub lenient_cells: usize,
    pub duplicate_area_codes: usize,
}

impl ParseDiagnostics {
    pub fn merge(&mut self, other: &ParseDiagnostics) {
        self.skipped_rows += other.skipped_rows;
        self.dropped_rows += other.dropped_rows;
        self.lenient_cells += other.lenient_cells;
        self.duplicate_area_codes += other.duplicate_area_codes;
    }

    pub fn is_clean(&self) -> bool {
        *self == ParseDiagnostics::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub table: TableType,
    pub valid: bool,
    pub headers: Vec<String>,
    pub missing_columns: Vec<String>,
    pub data_rows: usize,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub processed_at: chrono::DateTime<chrono::Utc>,
    pub total_suburbs: usize,
    pub enriched_suburbs: usize,
    pub named_suburbs: usize,
    pub enrichment_percentage: f64,
    pub diagnostics: ParseDiagnostics,
    pub sample: Vec<SuburbRecord>,
}

/// Raw CSV text for one import, as read from storage.
#[derive(Debug, Clone, Default)]
pub struct DataPackInput {
    pub g01: String,
    pub g02: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub suburbs: Vec<SuburbRecord>,
    pub report: ImportReport,
}
