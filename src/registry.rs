//! Saved sites and the active-site pointer.
//!
//! The list and the pointer live under separate store keys. Reads fail open:
//! a missing or unreadable value is logged and treated as empty.

use anyhow::Result;

use crate::models::SiteDescriptor;
use crate::store::{Store, CURRENT_SITE_KEY, SITES_KEY};

#[derive(Clone)]
pub struct SiteRegistry {
    store: Store,
}

impl SiteRegistry {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Saved sites in the order they were first added.
    pub fn list(&self) -> Vec<SiteDescriptor> {
        match self.store.get_json::<Vec<SiteDescriptor>>(SITES_KEY) {
            Ok(sites) => sites.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Error getting saved sites, treating as empty: {:#}", e);
                Vec::new()
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<SiteDescriptor> {
        self.list().into_iter().find(|s| s.url == url)
    }

    /// Insert a site, or replace the one with the same url in place.
    pub fn upsert(&self, site: SiteDescriptor) -> Result<()> {
        let mut sites = self.list();
        match sites.iter_mut().find(|s| s.url == site.url) {
            Some(existing) => *existing = site,
            None => sites.push(site),
        }
        self.store.set_json(SITES_KEY, &sites)
    }

    /// Drop the site with `url` and clear the current pointer if it named
    /// that site, even when the url is missing from the saved list.
    /// Returns whether the current pointer was cleared.
    pub fn remove(&self, url: &str) -> Result<bool> {
        let mut sites = self.list();
        let before = sites.len();
        sites.retain(|s| s.url != url);
        if sites.len() != before {
            self.store.set_json(SITES_KEY, &sites)?;
        }

        if self.current().is_some_and(|current| current.url == url) {
            tracing::info!("Removed site {} was current, clearing", url);
            self.clear_current()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn set_current(&self, site: &SiteDescriptor) -> Result<()> {
        self.store.set_json(CURRENT_SITE_KEY, site)
    }

    pub fn current(&self) -> Option<SiteDescriptor> {
        match self.store.get_json(CURRENT_SITE_KEY) {
            Ok(site) => site,
            Err(e) => {
                tracing::warn!("Error getting current site: {:#}", e);
                None
            }
        }
    }

    pub fn clear_current(&self) -> Result<()> {
        self.store.remove(CURRENT_SITE_KEY)
    }
}
