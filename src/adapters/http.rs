use crate::config::toml_config::RatingsConfig;
use crate::domain::model::SuburbRatings;
use crate::domain::ports::RatingSource;
use crate::utils::error::{CensusError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Fetches `{endpoint}/{area_code}` and expects
/// `{"safety_rating": 8.1, "convenience_score": 6.4}`.
pub struct HttpRatingSource {
    client: Client,
    endpoint: String,
}

impl HttpRatingSource {
    pub fn new(config: &RatingsConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RatingSource for HttpRatingSource {
    async fn fetch(&self, area_code: &str) -> Result<Option<SuburbRatings>> {
        let url = format!("{}/{}", self.endpoint, area_code);
        tracing::debug!("Making ratings request to: {}", url);

        let response = self.client.get(&url).send().await?;
        tracing::debug!("Ratings response status: {}", response.status());

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(CensusError::ProcessingError {
                message: format!("ratings service returned {} for {}", status, area_code),
            }),
        }
    }
}
