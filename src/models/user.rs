use serde::{Deserialize, Serialize};

/// The authenticated WordPress user, as returned by `auth/login`.
///
/// Only `username` is required. Anything else the plugin sends is kept in
/// `extra` so the persisted session round-trips without loss.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub username: String,
    #[serde(
        rename = "displayName",
        alias = "display_name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// `displayName` when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// A stored user is only usable if it identifies someone.
    pub fn is_well_formed(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

/// Body of `POST auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// The login route either returns the user directly or wraps it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Wrapped { user: User },
    Bare(User),
}

impl LoginResponse {
    pub fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}
