use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when the plugin does not report a site name.
pub const DEFAULT_SITE_NAME: &str = "Booknetic Site";

/// App name used when the plugin does not report one.
pub const DEFAULT_APP_NAME: &str = "Booknetic App";

/// A WordPress site that answered the compatibility probe.
///
/// The `url` is the identity key: it always carries an explicit scheme and
/// never ends in a slash. Descriptors are only built by
/// [`SiteDiscovery::probe`](crate::discovery::SiteDiscovery::probe), so a
/// descriptor in the registry has been seen to answer at least once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteDescriptor {
    pub url: String,
    pub name: String,
    pub app_name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Feature flags reported by the plugin. Opaque to the client.
    #[serde(default)]
    pub features: serde_json::Map<String, serde_json::Value>,
    /// When this descriptor was produced by a probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_at: Option<DateTime<Utc>>,
}

impl SiteDescriptor {
    /// Name to show for the site, preferring the app name.
    pub fn display_name(&self) -> &str {
        if !self.app_name.is_empty() {
            &self.app_name
        } else {
            &self.name
        }
    }
}

/// Body of `GET /wp-json/booknetic-app/v1/info`.
///
/// Every field is optional on the wire; missing ones fall back to the
/// defaults above when converted into a [`SiteDescriptor`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub api_version: Option<serde_json::Value>,
    /// An object of flags. PHP encodes an empty one as `[]`, so any
    /// non-object value is read as "no flags".
    #[serde(default)]
    pub features: serde_json::Value,
}

impl SiteInfo {
    /// Build a descriptor for the site at `url` (already normalized).
    pub fn into_descriptor(self, url: String) -> SiteDescriptor {
        let version = self.api_version.and_then(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });

        SiteDescriptor {
            url,
            name: non_empty(self.site_name).unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            app_name: non_empty(self.app_name).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            version,
            features: match self.features {
                serde_json::Value::Object(map) => map,
                _ => serde_json::Map::new(),
            },
            discovered_at: Some(Utc::now()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
