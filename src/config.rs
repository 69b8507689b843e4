//! # Ingest Configuration Module
//!
//! Run-level settings for the ingestion pipeline: where the tutorial lives,
//! how politely to fetch it and how much of a response to accept. Site
//! knowledge (URL patterns, keywords) is kept separately in
//! [`SiteProfile`](crate::profile::SiteProfile).
//!
//! ## Key Components
//!
//! - `IngestConfig`: The configuration struct
//! - `IngestConfigBuilder`: Builder for overriding individual settings

use std::time::Duration;

/// Configuration for an ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Base URL of the tutorial site; relative links resolve against it
    pub base_url: String,

    /// Path of the table of contents page
    pub toc_path: String,

    /// User agent to use for requests
    pub user_agent: String,

    /// Timeout applied to every request, in seconds
    pub timeout_secs: u64,

    /// Delay in milliseconds awaited before each lesson fetch
    pub request_delay_ms: u64,

    /// Largest response body accepted, in bytes
    pub max_body_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://metanit.com".to_string(),
            toc_path: "/go/tutorial/".to_string(),
            user_agent: format!(
                "primer-ingest/{} (tutorial lesson importer)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 30,
            request_delay_ms: 500,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Builder for IngestConfig
#[derive(Debug, Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: IngestConfig::default(),
        }
    }

    /// Set the base URL of the site
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the path of the table of contents page
    pub fn toc_path(mut self, toc_path: impl Into<String>) -> Self {
        self.config.toc_path = toc_path.into();
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the delay between lesson fetches in milliseconds
    pub fn request_delay_ms(mut self, request_delay_ms: u64) -> Self {
        self.config.request_delay_ms = request_delay_ms;
        self
    }

    /// Set the response body cap in bytes
    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.config.max_body_bytes = max_body_bytes;
        self
    }

    /// Build the configuration
    pub fn build(self) -> IngestConfig {
        self.config
    }
}

impl IngestConfig {
    /// Create a new builder
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder::new()
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the inter-request delay as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.request_delay(), Duration::from_millis(500));
        assert!(config.user_agent.starts_with("primer-ingest/"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = IngestConfig::builder()
            .base_url("http://localhost:8080")
            .toc_path("/index.html")
            .request_delay_ms(0)
            .timeout_secs(5)
            .max_body_bytes(1024)
            .user_agent("test-agent")
            .build();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.toc_path, "/index.html");
        assert_eq!(config.request_delay(), Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.user_agent, "test-agent");
    }
}
