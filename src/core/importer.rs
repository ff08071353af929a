use crate::config::toml_config::ImportConfig;
use crate::core::aggregator::SuburbAggregator;
use crate::core::csv_reader;
use crate::core::datapack::{self, G01Parser};
use crate::core::validator;
use crate::domain::model::{
    ImportOutcome, ImportReport, ParseDiagnostics, RawRow, SuburbRecord, TableType,
    ValidationReport,
};
use crate::domain::ports::NameLookup;
use crate::utils::error::{CensusError, Result};

/// Validate-then-import flow for uploaded DataPack tables.
///
/// Constructed once and shared by reference; holds no per-request state.
pub struct DataPackImporter {
    config: ImportConfig,
    g01_parser: G01Parser,
    aggregator: SuburbAggregator,
}

impl DataPackImporter {
    pub fn new(config: ImportConfig) -> Result<Self> {
        let g01_parser = G01Parser::new(&config.g01)?;
        Ok(Self {
            config,
            g01_parser,
            aggregator: SuburbAggregator::new(),
        })
    }

    pub fn with_names(mut self, names: impl NameLookup + 'static) -> Self {
        self.aggregator = SuburbAggregator::with_names(names);
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Preview step: structural check only, never an error.
    pub fn validate(&self, text: &str, table: TableType) -> ValidationReport {
        validator::check_structure(text, table, &self.config)
    }

    /// Import step. A table that fails the structural check is rejected with
    /// [`CensusError::StructuralError`]; row-level problems are only counted.
    pub fn import(&self, g01_text: &str, g02_text: Option<&str>) -> Result<ImportOutcome> {
        let mut diagnostics = ParseDiagnostics::default();

        let g01_csv = self.parse_checked(g01_text, TableType::G01, &mut diagnostics)?;
        let g01 = self.g01_parser.parse(&g01_csv);
        diagnostics.merge(&g01.diagnostics);

        let g02 = match g02_text {
            Some(text) => {
                let g02_csv = self.parse_checked(text, TableType::G02, &mut diagnostics)?;
                let outcome = datapack::parse_g02(&g02_csv, &self.config.g02);
                diagnostics.merge(&outcome.diagnostics);
                outcome.records
            }
            None => {
                tracing::info!("ℹ️ No G02 table supplied; medians left empty");
                Vec::new()
            }
        };

        let suburbs = self.aggregator.aggregate(&g01.records, &g02);
        let report = self.report(&suburbs, diagnostics);

        tracing::info!(
            "✅ Imported {} suburbs ({} enriched, {} named)",
            report.total_suburbs,
            report.enriched_suburbs,
            report.named_suburbs
        );
        if !report.diagnostics.is_clean() {
            tracing::warn!("⚠️ Data-quality diagnostics: {:?}", report.diagnostics);
        }

        Ok(ImportOutcome { suburbs, report })
    }

    fn parse_checked(
        &self,
        text: &str,
        table: TableType,
        diagnostics: &mut ParseDiagnostics,
    ) -> Result<Vec<RawRow>> {
        let parsed = csv_reader::parse_csv(text)?;

        if let Some(reason) = validator::failure_reason(&parsed.headers, table, &self.config) {
            return Err(CensusError::StructuralError {
                table: table.to_string(),
                reason,
            });
        }

        diagnostics.skipped_rows += parsed.skipped_rows;
        Ok(parsed.rows)
    }

    fn report(&self, suburbs: &[SuburbRecord], diagnostics: ParseDiagnostics) -> ImportReport {
        let total_suburbs = suburbs.len();
        let enriched_suburbs = suburbs.iter().filter(|s| s.is_enriched()).count();
        let named_suburbs = suburbs
            .iter()
            .filter(|s| s.name != SuburbAggregator::placeholder_name(&s.area_code))
            .count();
        let enrichment_percentage = if total_suburbs == 0 {
            0.0
        } else {
            (enriched_suburbs as f64 / total_suburbs as f64 * 1000.0).round() / 10.0
        };

        ImportReport {
            processed_at: chrono::Utc::now(),
            total_suburbs,
            enriched_suburbs,
            named_suburbs,
            enrichment_percentage,
            diagnostics,
            sample: suburbs
                .iter()
                .take(self.config.sample_size())
                .cloned()
                .collect(),
        }
    }
}
