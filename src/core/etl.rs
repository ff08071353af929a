use crate::domain::model::ImportOutcome;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ImportOutcome> {
        let started = Instant::now();
        tracing::info!("🚀 Starting DataPack import");

        // Extract
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted G01 ({} bytes){}",
            input.g01.len(),
            if input.g02.is_some() { " and G02" } else { "" }
        );

        // Transform
        let outcome = self.pipeline.transform(input).await?;
        tracing::info!("🔄 Transformed {} suburbs", outcome.suburbs.len());

        // Load
        let outcome = self.pipeline.load(outcome).await?;
        tracing::info!("🏁 Import finished in {:?}", started.elapsed());

        Ok(outcome)
    }
}
