/// Application configuration module
use crate::errors::{ApiError, ApiResult};
use crate::services::RetryPolicy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.spacexdata.com/v4";
pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub favorites_path: PathBuf,
    pub page_size: usize,
    pub search_debounce: Duration,
    pub retry: RetryPolicy,
    pub http_timeout: Duration,
    /// Initial view state, in address-bar query form
    pub initial_query: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            favorites_path: PathBuf::from("spacex-favorites.json"),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(300),
            retry: RetryPolicy::default(),
            http_timeout: Duration::from_secs(30),
            initial_query: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable numbers use defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let defaults = Self::default();
        let num = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let page_size = num("PAGE_SIZE", DEFAULT_PAGE_SIZE as u64) as usize;
        if page_size == 0 {
            return Err(ApiError::Config("PAGE_SIZE must be at least 1".to_string()));
        }

        let max_retries = num("RETRY_MAX_ATTEMPTS", defaults.retry.max_retries as u64);
        let retry = RetryPolicy::new(
            u32::try_from(max_retries).unwrap_or(u32::MAX),
            Duration::from_millis(num("RETRY_BASE_DELAY_MS", 1000)),
        );

        Ok(Self {
            api_url: lookup("SPACEX_API_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.api_url),
            favorites_path: lookup("FAVORITES_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.favorites_path),
            page_size,
            search_debounce: Duration::from_millis(num("SEARCH_DEBOUNCE_MS", 300)),
            retry,
            http_timeout: Duration::from_secs(num("HTTP_TIMEOUT_SECONDS", 30)),
            initial_query: lookup("LAUNCH_QUERY").unwrap_or_default(),
        })
    }
}
