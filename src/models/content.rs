use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

type Extra = serde_json::Map<String, serde_json::Value>;

/// Read an optional section that PHP may send as `[]` or `false` when empty.
/// Anything that is not an object decoding as `T` becomes `None`.
fn object_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// Body of `GET app-content`: what the home view shows above the posts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppContent {
    #[serde(default, deserialize_with = "object_or_none")]
    pub hero_section: Option<HeroSection>,
    #[serde(default)]
    pub features: Vec<ContentFeature>,
    #[serde(default, deserialize_with = "object_or_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeroSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub button_text: Option<String>,
}

/// A feature card. `icon` is an icon-set name chosen by the site owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentFeature {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One page of `GET posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostsPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
}

/// Query parameters for `GET posts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub page: u32,
    pub per_page: u32,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            category: None,
            search: None,
        }
    }
}

impl PostQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(ref category) = self.category {
            params.push(("category", category.clone()));
        }
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Body of `POST contact`. All three fields are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Trimmed copy, or `None` if any field is blank.
    pub fn validated(&self) -> Option<Self> {
        let form = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        };
        if form.name.is_empty() || form.email.is_empty() || form.message.is_empty() {
            None
        } else {
            Some(form)
        }
    }
}
