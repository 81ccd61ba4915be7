//! Site discovery: turn whatever the user typed into a validated
//! [`SiteDescriptor`], or report that the site is not compatible.
//!
//! The probe is a single `GET {url}/wp-json/booknetic-app/v1/info`. Callers
//! only learn compatible/incompatible; the reason for a failure goes to the
//! debug log.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use thiserror::Error;

use crate::client::API_PREFIX;
use crate::models::{SiteDescriptor, SiteInfo};

/// Timeout applied to the compatibility probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Site {0} is not compatible with the Booknetic app")]
    NotCompatible(String),
}

/// Canonical form of a user-supplied site address.
///
/// Trims whitespace, drops one trailing slash, and defaults the scheme to
/// `https://`. Host syntax is not checked here.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let url = trimmed.strip_suffix('/').unwrap_or(trimmed);

    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Probes sites for the plugin. Holds its own HTTP client so the probe
/// timeout does not leak into regular API calls.
#[derive(Debug, Clone)]
pub struct SiteDiscovery {
    client: Client,
    timeout: Duration,
}

impl Default for SiteDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl SiteDiscovery {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Check that `url` serves the plugin's info route and describe it.
    ///
    /// `url` should already be normalized; it becomes the descriptor's url
    /// verbatim.
    pub async fn probe(&self, url: &str) -> Result<SiteDescriptor, DiscoveryError> {
        match self.try_probe(url).await {
            Ok(info) => Ok(info.into_descriptor(url.to_string())),
            Err(reason) => {
                tracing::debug!("Site {} not compatible: {}", url, reason);
                Err(DiscoveryError::NotCompatible(url.to_string()))
            }
        }
    }

    async fn try_probe(&self, url: &str) -> Result<SiteInfo, String> {
        if url.ends_with('/') {
            return Err("url has a trailing slash".to_string());
        }
        let parsed = Url::parse(url).map_err(|e| format!("invalid url: {}", e))?;
        if parsed.host_str().is_none() {
            return Err("url has no host".to_string());
        }

        let endpoint = format!("{}{}/info", url, API_PREFIX);
        let response = self
            .client
            .get(&endpoint)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {}", status));
        }

        response.json::<SiteInfo>().await.map_err(|e| e.to_string())
    }

    /// Normalize user input and probe it.
    pub async fn site_config(&self, raw: &str) -> Result<SiteDescriptor, DiscoveryError> {
        self.probe(&normalize(raw)).await
    }
}
