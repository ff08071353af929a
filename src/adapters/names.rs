use crate::core::csv_reader;
use crate::domain::ports::NameLookup;
use crate::utils::error::{CensusError, Result};
use std::collections::HashMap;

/// Area code to display name directory, loaded from an ABS correspondence CSV.
#[derive(Debug, Clone, Default)]
pub struct AreaNames {
    names: HashMap<String, String>,
}

impl AreaNames {
    pub fn from_csv(text: &str, code_column: &str, name_column: &str) -> Result<Self> {
        let parsed = csv_reader::parse_csv(text)?;

        for column in [code_column, name_column] {
            if !parsed.headers.is_empty() && !parsed.headers.iter().any(|h| h == column) {
                return Err(CensusError::StructuralError {
                    table: "area names".to_string(),
                    reason: format!("missing column {}", column),
                });
            }
        }

        let mut names = HashMap::new();
        for row in &parsed.rows {
            let code = row.get(code_column).unwrap_or_default().trim();
            let name = row.get(name_column).unwrap_or_default().trim();
            if code.is_empty() || name.is_empty() {
                continue;
            }
            // 對應表可能一個代碼多列, 保留第一個名稱
            names
                .entry(code.to_string())
                .or_insert_with(|| name.to_string());
        }

        tracing::info!("🗺️ Loaded {} area names", names.len());
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for AreaNames {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl NameLookup for AreaNames {
    fn name_for(&self, area_code: &str) -> Option<&str> {
        self.names.get(area_code).map(String::as_str)
    }
}
