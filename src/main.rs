use clap::Parser;
use std::path::Path;
use wa_census_etl::domain::ports::Storage;
use wa_census_etl::utils::error::{CensusError, ErrorSeverity};
use wa_census_etl::utils::{logger, validation::Validate};
use wa_census_etl::{
    AreaNames, CliConfig, Command, DataPackImporter, DataPackPipeline, DataPackSource, EtlEngine,
    HttpRatingSource, ImportConfig, InvestmentScorer, LocalStorage, TableType,
};

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

async fn read_text(storage: &LocalStorage, path: &Path) -> wa_census_etl::Result<String> {
    let bytes = storage.read_file(&path_str(path)).await?;
    String::from_utf8(bytes).map_err(|e| CensusError::ValidationError {
        message: format!("{} is not UTF-8 text: {}", path.display(), e),
    })
}

async fn run_validate(
    config: ImportConfig,
    storage: &LocalStorage,
    table: TableType,
    file: &Path,
) -> wa_census_etl::Result<bool> {
    let text = read_text(storage, file).await?;
    let importer = DataPackImporter::new(config)?;
    let report = importer.validate(&text, table);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.valid)
}

async fn run_import(
    config: ImportConfig,
    storage: LocalStorage,
    source: DataPackSource,
    names: Option<String>,
    out: Option<String>,
) -> wa_census_etl::Result<()> {
    let mut importer = DataPackImporter::new(config.clone())?;

    // 命令列參數優先於設定檔
    if let Some(names_file) = names.or_else(|| config.import.names_file.clone()) {
        let text = read_text(&storage, Path::new(&names_file)).await?;
        let names = AreaNames::from_csv(
            &text,
            &config.import.name_code_column,
            &config.import.name_column,
        )?;
        importer = importer.with_names(names);
    }

    let mut pipeline = DataPackPipeline::new(storage, importer, source);
    if let Some(out) = out {
        pipeline = pipeline.with_output(out);
    }

    let outcome = EtlEngine::new(pipeline).run().await?;
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}

async fn run_score(
    config: ImportConfig,
    safety: Option<f64>,
    convenience: Option<f64>,
    area_code: Option<String>,
) -> wa_census_etl::Result<()> {
    let scorer = InvestmentScorer::new();

    let analysis = match (safety, convenience, area_code) {
        (Some(safety), Some(convenience), _) => scorer.score(safety, convenience),
        (_, _, Some(area_code)) => {
            let ratings = config
                .ratings
                .as_ref()
                .ok_or_else(|| CensusError::MissingConfigError {
                    field: "ratings.endpoint".to_string(),
                })?;
            let source = HttpRatingSource::new(ratings)?;
            scorer
                .score_area(&source, &area_code)
                .await?
                .ok_or_else(|| CensusError::ValidationError {
                    message: format!("no ratings found for area {}", area_code),
                })?
        }
        _ => {
            return Err(CensusError::ValidationError {
                message: "provide --safety and --convenience, or --area-code".to_string(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

async fn run(cli: CliConfig) -> wa_census_etl::Result<bool> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            ImportConfig::from_file(path)?
        }
        None => ImportConfig::default(),
    };
    config.validate()?;

    let storage = LocalStorage::new(".".to_string());

    match cli.command {
        Command::Validate { table, file } => run_validate(config, &storage, table, &file).await,
        Command::Import {
            g01,
            g02,
            datapack,
            names,
            out,
        } => {
            let source = match (datapack, g01) {
                (Some(archive), _) => DataPackSource::Archive(path_str(&archive)),
                (None, Some(g01)) => DataPackSource::Tables {
                    g01: path_str(&g01),
                    g02: g02.as_deref().map(path_str),
                },
                (None, None) => {
                    return Err(CensusError::MissingConfigError {
                        field: "--g01 or --datapack".to_string(),
                    })
                }
            };
            run_import(
                config,
                storage,
                source,
                names.as_deref().map(path_str),
                out.as_deref().map(path_str),
            )
            .await?;
            Ok(true)
        }
        Command::Score {
            safety,
            convenience,
            area_code,
        } => {
            run_score(config, safety, convenience, area_code).await?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting wa-census-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(cli).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            // 結構檢查失敗: 報告已輸出
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}
