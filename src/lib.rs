pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{archive::DataPackArchive, http::HttpRatingSource, names::AreaNames};
pub use app::pipelines::datapack_pipeline::{DataPackPipeline, DataPackSource};
pub use config::{cli::LocalStorage, toml_config::ImportConfig};
pub use core::{
    aggregator::{aggregate, SuburbAggregator},
    csv_reader::parse_csv,
    datapack::{parse_g01, parse_g02},
    etl::EtlEngine,
    importer::DataPackImporter,
    scoring::{score, InvestmentScorer},
    validator::validate_structure,
};
pub use domain::model::*;
pub use utils::error::{CensusError, Result};
