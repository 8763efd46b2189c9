use std::future::Future;
use std::time::Duration;

use crate::prelude::*;
use serde::de::DeserializeOwned;
use wpblog_core::api::{is_valid_origin, normalize_origin, post_url, posts_url};
use wpblog_core::fetch::{FetchError, FetchState};
use wpblog_core::post::WpPost;

pub mod fetcher;
pub mod list;
pub mod read;

pub use fetcher::{Activation, Fetcher, PostDetailFetcher, PostListFetcher};

/// Blog configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogConfig {
    pub origin: String,
    pub timeout: Duration,
}

impl BlogConfig {
    /// Default WordPress site
    pub const DEFAULT_ORIGIN: &'static str = "https://navajowhite-gull-167151.hostingersite.com";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(origin: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let origin = origin.into();
        if !is_valid_origin(&origin) {
            return Err(Error::InvalidOrigin(origin));
        }
        if timeout.is_zero() {
            return Err(Error::InvalidTimeout("timeout must be at least one second".into()));
        }

        Ok(Self {
            origin: normalize_origin(&origin),
            timeout,
        })
    }

    /// Load configuration from environment variables
    /// Uses WPBLOG_ORIGIN with default fallback
    /// Uses WPBLOG_TIMEOUT_SECS with default fallback
    pub fn from_env() -> Result<Self, Error> {
        let origin =
            std::env::var("WPBLOG_ORIGIN").unwrap_or_else(|_| Self::DEFAULT_ORIGIN.to_string());

        let timeout_secs = match std::env::var("WPBLOG_TIMEOUT_SECS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidTimeout(value.clone()))?,
            Err(_) => Self::DEFAULT_TIMEOUT_SECS,
        };

        Self::new(origin, Duration::from_secs(timeout_secs))
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(self, origin: Option<String>, timeout: Option<u64>) -> Result<Self, Error> {
        Self::new(
            origin.unwrap_or(self.origin),
            timeout.map(Duration::from_secs).unwrap_or(self.timeout),
        )
    }

    /// Environment configuration with the global CLI flags applied
    pub fn from_global(global: &crate::Global) -> Result<Self, Error> {
        Self::from_env()?.with_overrides(global.origin.clone(), global.timeout)
    }
}

/// Read access to the WordPress content API
pub trait ContentApi: Send + Sync + 'static {
    /// All posts with embedded author and featured media, in API order
    fn fetch_posts(&self) -> impl Future<Output = Result<Vec<WpPost>, FetchError>> + Send;

    /// One post with embedded author and featured media
    fn fetch_post(&self, id: u64) -> impl Future<Output = Result<WpPost, FetchError>> + Send;
}

/// `ContentApi` backed by the WordPress REST endpoints
#[derive(Debug, Clone)]
pub struct WpClient {
    client: reqwest::Client,
    origin: String,
}

impl WpClient {
    pub fn new(config: &BlogConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("wpblog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            client,
            origin: config.origin.clone(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// GET `url` and decode its JSON body, mapping a non-success status to `on_status`
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        on_status: FetchError,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(on_status);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl ContentApi for WpClient {
    async fn fetch_posts(&self) -> Result<Vec<WpPost>, FetchError> {
        self.get_json(&posts_url(&self.origin), FetchError::RequestFailed)
            .await
    }

    async fn fetch_post(&self, id: u64) -> Result<WpPost, FetchError> {
        self.get_json(&post_url(&self.origin, id), FetchError::NotFound)
            .await
    }
}

/// Unwrap a settled fetch into its data
pub fn into_loaded<T>(state: FetchState<T>) -> Result<T> {
    match state {
        FetchState::Loaded(data) => Ok(data),
        FetchState::Failed(message) => Err(eyre!(message)),
        FetchState::Idle | FetchState::Loading => Err(eyre!("Request was cancelled")),
    }
}
