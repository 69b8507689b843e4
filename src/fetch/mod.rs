//! Page fetching for the ingestion pipeline
//!
//! A thin wrapper over a reqwest client that applies the run's timeout,
//! user agent and body cap, and turns non-200 answers into errors.

mod error;

pub use error::FetchError;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::config::IngestConfig;

/// HTTP fetcher bound to one site
#[derive(Debug, Clone)]
pub struct Fetcher {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL relative links resolve against
    base_url: Url,

    /// Largest accepted body in bytes
    max_body_bytes: usize,
}

impl Fetcher {
    /// Create a fetcher from the run configuration
    pub fn new(config: &IngestConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Resolve an absolute or site-relative link against the base URL
    pub fn resolve(&self, href: &str) -> Result<Url, FetchError> {
        Ok(self.base_url.join(href)?)
    }

    /// Fetch a page and return its HTML
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute or site-relative URL
    ///
    /// # Returns
    ///
    /// The response body decoded as UTF-8 (lossily)
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = self.resolve(url)?;
        let url_str = url.to_string();

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url_str.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(FetchError::BodyTooLarge {
                    url: url_str,
                    limit: self.max_body_bytes,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|source| FetchError::Network {
                url: url_str.clone(),
                source,
            })?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge {
                    url: url_str,
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), url_str);
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
