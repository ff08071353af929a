use crate::domain::model::TableType;
use crate::utils::error::{CensusError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_AGE_SEX_PATTERN: &str = r"^(M|F|P)_(\d+)_(\d+|over)$";

/// Column configuration and import settings. Every section is optional;
/// missing sections fall back to the ABS 2021 DataPack column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub g01: G01Columns,
    pub g02: G02Columns,
    pub import: ImportSettings,
    pub ratings: Option<RatingsConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct G01Columns {
    pub area_code_column: String,
    pub total_population_column: String,
    /// 其他必要欄位 (除了地區代碼與總人口)
    pub required_columns: Vec<String>,
    pub age_sex_pattern: String,
    /// 性別總人數欄位; 兩者皆設定時, 性別比例取自這兩欄而非年齡層加總
    pub male_total_column: Option<String>,
    pub female_total_column: Option<String>,
}

impl Default for G01Columns {
    fn default() -> Self {
        Self {
            area_code_column: "SA2_CODE".to_string(),
            total_population_column: "Tot_P".to_string(),
            required_columns: vec!["M_15_19".to_string(), "F_15_19".to_string()],
            age_sex_pattern: DEFAULT_AGE_SEX_PATTERN.to_string(),
            male_total_column: None,
            female_total_column: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct G02Columns {
    pub area_code_column: String,
    pub median_age_column: String,
    pub median_household_income_column: String,
    pub median_personal_income_column: String,
    pub median_rent_column: String,
    pub average_household_size_column: String,
}

impl Default for G02Columns {
    fn default() -> Self {
        Self {
            area_code_column: "SA2_CODE".to_string(),
            median_age_column: "Median_age_persons".to_string(),
            median_household_income_column: "Median_tot_hhd_inc_weekly".to_string(),
            median_personal_income_column: "Median_tot_prsnl_inc_weekly".to_string(),
            median_rent_column: "Median_rent_weekly".to_string(),
            average_household_size_column: "Average_household_size".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// 回傳給呼叫者的預覽筆數
    pub sample_size: usize,
    pub names_file: Option<String>,
    pub name_code_column: String,
    pub name_column: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            sample_size: 10,
            names_file: None,
            name_code_column: "SA2_CODE_2021".to_string(),
            name_column: "SA2_NAME_2021".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingsConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

impl ImportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CensusError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CensusError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RATINGS_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| CensusError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Header names a file of `table` must contain, in configuration order.
    pub fn required_columns(&self, table: TableType) -> Vec<&str> {
        let mut columns: Vec<&str> = match table {
            TableType::G01 => {
                let mut cols = vec![
                    self.g01.area_code_column.as_str(),
                    self.g01.total_population_column.as_str(),
                ];
                cols.extend(self.g01.required_columns.iter().map(String::as_str));
                cols.extend(self.g01.male_total_column.as_deref());
                cols.extend(self.g01.female_total_column.as_deref());
                cols
            }
            TableType::G02 => vec![
                self.g02.area_code_column.as_str(),
                self.g02.median_age_column.as_str(),
                self.g02.median_household_income_column.as_str(),
            ],
        };

        let mut seen = std::collections::HashSet::new();
        columns.retain(|c| seen.insert(*c));
        columns
    }

    pub fn sample_size(&self) -> usize {
        self.import.sample_size
    }

    pub fn ratings_endpoint(&self) -> Option<&str> {
        self.ratings.as_ref().map(|r| r.endpoint.as_str())
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("g01.area_code_column", &self.g01.area_code_column)?;
        validation::validate_non_empty_string(
            "g01.total_population_column",
            &self.g01.total_population_column,
        )?;
        for column in &self.g01.required_columns {
            validation::validate_non_empty_string("g01.required_columns", column)?;
        }
        validation::validate_age_sex_pattern("g01.age_sex_pattern", &self.g01.age_sex_pattern)?;
        if let Some(column) = &self.g01.male_total_column {
            validation::validate_non_empty_string("g01.male_total_column", column)?;
        }
        if let Some(column) = &self.g01.female_total_column {
            validation::validate_non_empty_string("g01.female_total_column", column)?;
        }

        validation::validate_non_empty_string("g02.area_code_column", &self.g02.area_code_column)?;
        validation::validate_non_empty_string(
            "g02.median_age_column",
            &self.g02.median_age_column,
        )?;
        validation::validate_non_empty_string(
            "g02.median_household_income_column",
            &self.g02.median_household_income_column,
        )?;

        validation::validate_positive_number("import.sample_size", self.import.sample_size, 1)?;
        if let Some(names_file) = &self.import.names_file {
            validation::validate_file_extension("import.names_file", names_file, &["csv"])?;
        }

        if let Some(ratings) = &self.ratings {
            validation::validate_url("ratings.endpoint", &ratings.endpoint)?;
        }

        Ok(())
    }
}
