use crate::domain::model::{DataPackInput, ImportOutcome, SuburbRatings};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// External safety/convenience data, fetched by area code.
#[async_trait]
pub trait RatingSource: Send + Sync {
    /// `Ok(None)` when the source has no ratings for the area.
    async fn fetch(&self, area_code: &str) -> Result<Option<SuburbRatings>>;
}

pub trait NameLookup: Send + Sync {
    fn name_for(&self, area_code: &str) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<DataPackInput>;
    async fn transform(&self, input: DataPackInput) -> Result<ImportOutcome>;
    async fn load(&self, outcome: ImportOutcome) -> Result<ImportOutcome>;
}
