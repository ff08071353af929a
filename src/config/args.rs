use crate::domain::model::TableType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "wa-census-etl")]
#[command(about = "Import ABS Census DataPack tables and score WA suburbs")]
pub struct CliConfig {
    /// Path to TOML import configuration (ABS defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check a DataPack CSV header against the expected table schema
    Validate {
        #[arg(long, value_parser = parse_table_type)]
        table: TableType,
        file: PathBuf,
    },
    /// Parse G01 (and optional G02) tables into suburb records
    Import {
        #[arg(long, required_unless_present = "datapack")]
        g01: Option<PathBuf>,
        #[arg(long)]
        g02: Option<PathBuf>,
        /// DataPack ZIP containing the G01/G02 CSVs
        #[arg(long, conflicts_with_all = ["g01", "g02"])]
        datapack: Option<PathBuf>,
        /// Area code to name correspondence CSV
        #[arg(long)]
        names: Option<PathBuf>,
        /// Write every suburb record as JSON to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Compute the investment index from a safety rating and a convenience score
    Score {
        #[arg(long, requires = "convenience", conflicts_with = "area_code")]
        safety: Option<f64>,
        #[arg(long, requires = "safety")]
        convenience: Option<f64>,
        /// Fetch both ratings from the configured ratings endpoint
        #[arg(long)]
        area_code: Option<String>,
    },
}

fn parse_table_type(value: &str) -> Result<TableType, String> {
    value.parse()
}
