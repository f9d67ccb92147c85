/// External API clients module
use crate::domain::{Launch, Launchpad, Payload, Rocket};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper with common configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("launch-browser/0.1")
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self { client })
    }

    /// GET a JSON document, turning non-2xx into `ApiError::HttpStatus`
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::HttpStatus {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Read-only launch data source
#[async_trait]
pub trait SpaceXApi: Send + Sync {
    async fn fetch_launches(&self) -> ApiResult<Vec<Launch>>;
    async fn fetch_launch(&self, id: &str) -> ApiResult<Launch>;
    async fn fetch_rocket(&self, id: &str) -> ApiResult<Rocket>;
    async fn fetch_launchpad(&self, id: &str) -> ApiResult<Launchpad>;
    async fn fetch_payload(&self, id: &str) -> ApiResult<Payload>;
}

/// SpaceX API client
#[derive(Clone)]
pub struct SpaceXClient {
    http_client: HttpClient,
    base_url: String,
}

impl SpaceXClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, collection: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}", self.base_url, collection, id),
            None => format!("{}/{}", self.base_url, collection),
        }
    }
}

#[async_trait]
impl SpaceXApi for SpaceXClient {
    async fn fetch_launches(&self) -> ApiResult<Vec<Launch>> {
        let launches: Option<Vec<Launch>> =
            self.http_client.get_json(&self.url("launches", None)).await?;
        Ok(launches.unwrap_or_default())
    }

    async fn fetch_launch(&self, id: &str) -> ApiResult<Launch> {
        self.http_client
            .get_json(&self.url("launches", Some(id)))
            .await
    }

    async fn fetch_rocket(&self, id: &str) -> ApiResult<Rocket> {
        self.http_client
            .get_json(&self.url("rockets", Some(id)))
            .await
    }

    async fn fetch_launchpad(&self, id: &str) -> ApiResult<Launchpad> {
        self.http_client
            .get_json(&self.url("launchpads", Some(id)))
            .await
    }

    async fn fetch_payload(&self, id: &str) -> ApiResult<Payload> {
        self.http_client
            .get_json(&self.url("payloads", Some(id)))
            .await
    }
}
