use crate::adapters::archive::DataPackArchive;
use crate::core::importer::DataPackImporter;
use crate::domain::model::{DataPackInput, ImportOutcome, ImportReport, SuburbRecord, TableType};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::{CensusError, Result};
use serde::Serialize;

/// Where the DataPack tables come from, relative to the storage root.
#[derive(Debug, Clone)]
pub enum DataPackSource {
    Tables { g01: String, g02: Option<String> },
    Archive(String),
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    report: &'a ImportReport,
    suburbs: &'a [SuburbRecord],
}

pub struct DataPackPipeline<S: Storage> {
    storage: S,
    importer: DataPackImporter,
    source: DataPackSource,
    output_file: Option<String>,
}

impl<S: Storage> DataPackPipeline<S> {
    pub fn new(storage: S, importer: DataPackImporter, source: DataPackSource) -> Self {
        Self {
            storage,
            importer,
            source,
            output_file: None,
        }
    }

    /// Write every suburb record plus the report as JSON after the import.
    pub fn with_output(mut self, output_file: impl Into<String>) -> Self {
        self.output_file = Some(output_file.into());
        self
    }

    async fn read_text(&self, path: &str, table: TableType) -> Result<String> {
        let bytes = self.storage.read_file(path).await?;
        String::from_utf8(bytes).map_err(|e| CensusError::StructuralError {
            table: table.to_string(),
            reason: format!("{} is not UTF-8 text: {}", path, e),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for DataPackPipeline<S> {
    async fn extract(&self) -> Result<DataPackInput> {
        match &self.source {
            DataPackSource::Tables { g01, g02 } => {
                tracing::debug!("Reading G01 from {}", g01);
                let g01_text = self.read_text(g01, TableType::G01).await?;

                let g02_text = match g02 {
                    Some(path) => {
                        tracing::debug!("Reading G02 from {}", path);
                        Some(self.read_text(path, TableType::G02).await?)
                    }
                    None => None,
                };

                Ok(DataPackInput {
                    g01: g01_text,
                    g02: g02_text,
                })
            }
            DataPackSource::Archive(path) => {
                let bytes = self.storage.read_file(path).await?;
                let mut archive = DataPackArchive::from_bytes(bytes)?;

                let g01 = archive
                    .read_table(TableType::G01)?
                    .ok_or_else(|| CensusError::StructuralError {
                        table: TableType::G01.to_string(),
                        reason: format!("{} contains no G01 table", path),
                    })?;
                let g02 = archive.read_table(TableType::G02)?;

                Ok(DataPackInput { g01, g02 })
            }
        }
    }

    async fn transform(&self, input: DataPackInput) -> Result<ImportOutcome> {
        self.importer.import(&input.g01, input.g02.as_deref())
    }

    async fn load(&self, outcome: ImportOutcome) -> Result<ImportOutcome> {
        if let Some(output_file) = &self.output_file {
            let document = ExportDocument {
                report: &outcome.report,
                suburbs: &outcome.suburbs,
            };
            let json_data = serde_json::to_string_pretty(&document)?;

            tracing::debug!(
                "Writing {} suburbs ({} bytes) to {}",
                outcome.suburbs.len(),
                json_data.len(),
                output_file
            );
            self.storage
                .write_file(output_file, json_data.as_bytes())
                .await?;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::ImportConfig;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use zip::write::{SimpleFileOptions, ZipWriter};

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CensusError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    const G01: &str = "SA2_CODE,Tot_P,M_15_19,F_15_19\n123456789,500,40,35\n";
    const G02: &str = "SA2_CODE,Median_age_persons,Median_tot_hhd_inc_weekly\n123456789,37,1700\n";

    fn importer() -> DataPackImporter {
        DataPackImporter::new(ImportConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_extract_tables() {
        let storage = MockStorage::new();
        storage.put("g01.csv", G01.as_bytes()).await;

        let pipeline = DataPackPipeline::new(
            storage,
            importer(),
            DataPackSource::Tables {
                g01: "g01.csv".to_string(),
                g02: None,
            },
        );
        let input = pipeline.extract().await.unwrap();

        assert_eq!(input.g01, G01);
        assert!(input.g02.is_none());
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let pipeline = DataPackPipeline::new(
            MockStorage::new(),
            importer(),
            DataPackSource::Tables {
                g01: "missing.csv".to_string(),
                g02: None,
            },
        );

        assert!(matches!(
            pipeline.extract().await,
            Err(CensusError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_non_utf8_is_structural_error() {
        let storage = MockStorage::new();
        storage.put("g01.csv", &[0xff, 0xfe, 0x00]).await;

        let pipeline = DataPackPipeline::new(
            storage,
            importer(),
            DataPackSource::Tables {
                g01: "g01.csv".to_string(),
                g02: None,
            },
        );

        assert!(matches!(
            pipeline.extract().await,
            Err(CensusError::StructuralError { .. })
        ));
    }

    #[tokio::test]
    async fn test_extract_from_archive() {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file("2021Census_G01_WA_SA2.csv", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(G01.as_bytes()).unwrap();
        zip.start_file("2021Census_G02_WA_SA2.csv", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(G02.as_bytes()).unwrap();
        let data = zip.finish().unwrap().into_inner();

        let storage = MockStorage::new();
        storage.put("datapack.zip", &data).await;

        let pipeline = DataPackPipeline::new(
            storage,
            importer(),
            DataPackSource::Archive("datapack.zip".to_string()),
        );
        let input = pipeline.extract().await.unwrap();

        assert_eq!(input.g01, G01);
        assert_eq!(input.g02.as_deref(), Some(G02));
    }

    #[tokio::test]
    async fn test_archive_without_g01_is_structural_error() {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file("2021Census_G02_WA_SA2.csv", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(G02.as_bytes()).unwrap();
        let data = zip.finish().unwrap().into_inner();

        let storage = MockStorage::new();
        storage.put("datapack.zip", &data).await;

        let pipeline = DataPackPipeline::new(
            storage,
            importer(),
            DataPackSource::Archive("datapack.zip".to_string()),
        );

        assert!(matches!(
            pipeline.extract().await,
            Err(CensusError::StructuralError { table, .. }) if table == "G01"
        ));
    }

    #[tokio::test]
    async fn test_transform_and_load_writes_json() {
        let storage = MockStorage::new();
        let pipeline = DataPackPipeline::new(
            storage.clone(),
            importer(),
            DataPackSource::Tables {
                g01: "g01.csv".to_string(),
                g02: None,
            },
        )
        .with_output("out/suburbs.json");

        let outcome = pipeline
            .transform(DataPackInput {
                g01: G01.to_string(),
                g02: Some(G02.to_string()),
            })
            .await
            .unwrap();
        let outcome = pipeline.load(outcome).await.unwrap();
        assert_eq!(outcome.suburbs.len(), 1);

        let written = storage.get_file("out/suburbs.json").await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(json["report"]["total_suburbs"], 1);
        assert_eq!(json["suburbs"][0]["area_code"], "123456789");
        assert_eq!(json["suburbs"][0]["median_age"], 37.0);
    }

    #[tokio::test]
    async fn test_load_without_output_writes_nothing() {
        let storage = MockStorage::new();
        let pipeline = DataPackPipeline::new(
            storage.clone(),
            importer(),
            DataPackSource::Tables {
                g01: "g01.csv".to_string(),
                g02: None,
            },
        );

        let outcome = pipeline
            .transform(DataPackInput {
                g01: G01.to_string(),
                g02: None,
            })
            .await
            .unwrap();
        pipeline.load(outcome).await.unwrap();

        assert!(storage.files.lock().await.is_empty());
    }
}
