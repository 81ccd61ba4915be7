//! Long-lived services, built once at startup and passed to whatever needs them.

use thiserror::Error;

use crate::client::WordPressClient;
use crate::config::Config;
use crate::discovery::{DiscoveryError, SiteDiscovery};
use crate::models::SiteDescriptor;
use crate::registry::SiteRegistry;
use crate::session::{SessionManager, SessionStore};
use crate::store::{self, Store};

/// Base URL used until a site is configured or selected. Requests against it
/// fail, which surfaces as an ordinary request error.
const UNCONFIGURED_URL: &str = "https://placeholder.invalid";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Site {0} is not saved")]
    UnknownSite(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct App {
    config: Config,
    store: Store,
    registry: SiteRegistry,
    discovery: SiteDiscovery,
    client: WordPressClient,
}

impl App {
    /// Open the store named by `config` and wire up the services.
    pub fn open(config: Config) -> anyhow::Result<Self> {
        let data_dir = match config.data_dir.clone() {
            Some(dir) => dir,
            None => store::default_data_dir()?,
        };
        let store = Store::open_in(&data_dir)?;
        store.migrate()?;
        Ok(Self::with_store(config, store))
    }

    /// Wire up the services over an existing, migrated store.
    pub fn with_store(config: Config, store: Store) -> Self {
        let registry = SiteRegistry::new(store.clone());
        let discovery = SiteDiscovery::new(config.probe_timeout());

        let base_url = match registry.current() {
            Some(site) => site.url,
            None => match config.site_url() {
                Some(url) => url.to_string(),
                None => {
                    tracing::warn!("WordPress URL not configured and no site selected");
                    UNCONFIGURED_URL.to_string()
                }
            },
        };
        let client = WordPressClient::with_timeout(base_url, config.request_timeout());

        Self {
            config,
            store,
            registry,
            discovery,
            client,
        }
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    pub fn client(&self) -> &WordPressClient {
        &self.client
    }

    /// A session manager bound to the current site, still in `Loading`.
    pub fn session(&self) -> SessionManager {
        SessionManager::new(SessionStore::new(self.store.clone()), self.client.clone())
    }

    // ============================================================
    // Site selection
    // ============================================================

    /// Discover the site the user typed, save it, and make it current.
    pub async fn add_site(&mut self, raw: &str) -> Result<SiteDescriptor, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a website URL".to_string(),
            ));
        }

        let site = self.discovery.site_config(raw).await?;
        self.registry.upsert(site.clone())?;
        self.activate(&site)?;
        Ok(site)
    }

    /// Make a saved site current.
    pub fn select_site(&mut self, url: &str) -> Result<SiteDescriptor, AppError> {
        let site = self
            .registry
            .get(url)
            .ok_or_else(|| AppError::UnknownSite(url.to_string()))?;
        self.activate(&site)?;
        Ok(site)
    }

    /// Forget a saved site. If it was current, requests go back to the
    /// configured default.
    pub fn remove_site(&mut self, url: &str) -> Result<(), AppError> {
        if self.registry.remove(url)? {
            let fallback = self.config.site_url().unwrap_or(UNCONFIGURED_URL).to_string();
            self.client.set_base_url(fallback);
        }
        Ok(())
    }

    fn activate(&mut self, site: &SiteDescriptor) -> Result<(), AppError> {
        self.registry.set_current(site)?;
        self.client.set_base_url(site.url.clone());
        Ok(())
    }
}
