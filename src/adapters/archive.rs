use crate::domain::model::TableType;
use crate::utils::error::{CensusError, Result};
use regex::Regex;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// An ABS Census DataPack ZIP, e.g. `2021_GCP_SA2_for_WA_short-header.zip`.
pub struct DataPackArchive {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl DataPackArchive {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        tracing::debug!("Opened DataPack archive with {} entries", archive.len());
        Ok(Self { archive })
    }

    fn table_pattern(table: TableType) -> Result<Regex> {
        Regex::new(&format!(r"(?i)(^|[/_]){}[_.].*\.csv$|(^|[/_]){}\.csv$", table, table)).map_err(
            |e| CensusError::ProcessingError {
                message: format!("table pattern: {}", e),
            },
        )
    }

    /// Entry names holding the given table, sorted.
    pub fn entries_for(&self, table: TableType) -> Result<Vec<String>> {
        let pattern = Self::table_pattern(table)?;
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| pattern.is_match(name))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    /// CSV text of the table, or `None` if the archive does not carry it.
    pub fn read_table(&mut self, table: TableType) -> Result<Option<String>> {
        let entries = self.entries_for(table)?;
        let Some(name) = entries.first() else {
            return Ok(None);
        };
        if entries.len() > 1 {
            tracing::warn!(
                "⚠️ {} entries match {}; using {}",
                entries.len(),
                table,
                name
            );
        }

        let mut file = self.archive.by_name(name)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let text = String::from_utf8(bytes).map_err(|e| CensusError::StructuralError {
            table: table.to_string(),
            reason: format!("{} is not UTF-8: {}", name, e),
        })?;

        tracing::info!("📦 Read {} from archive entry {}", table, name);
        Ok(Some(text))
    }
}
