pub mod aggregator;
pub mod csv_reader;
pub mod datapack;
pub mod etl;
pub mod importer;
pub mod scoring;
pub mod validator;

pub use crate::domain::model::{ImportOutcome, SuburbRecord};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
