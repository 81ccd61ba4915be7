//! HTTP client for the Booknetic app plugin routes.
//!
//! Every call is a single JSON request against `{base_url}/wp-json/booknetic-app/v1`.
//! There are no retries: a transport failure or non-2xx status is returned
//! to the caller as-is.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::*;

/// Route namespace exposed by the plugin.
pub const API_PREFIX: &str = "/wp-json/booknetic-app/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP error! status: {status}")]
    Status { status: StatusCode, body: String },

    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// HTTP status if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Status { status, .. } => Some(*status),
            Self::Validation(_) => None,
        }
    }
}

/// Client for one WordPress site. The base URL can be retargeted when the
/// user switches sites; the underlying connection pool is kept.
#[derive(Debug, Clone)]
pub struct WordPressClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl WordPressClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            client: Client::new(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point subsequent requests at another site.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = trim_base(base_url.into());
        tracing::info!("WordPress API URL updated to: {}", self.base_url);
    }

    fn request(&self, method: Method, route: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, route);
        tracing::debug!("Making API request to: {} {}", method, url);
        self.client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("API request failed with {}: {}", status, body);
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(ClientError::Unauthorized(body))
                }
                _ => Err(ClientError::Status { status, body }),
            }
        }
    }

    /// Handle a response whose body is not needed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(ClientError::Unauthorized(body))
                }
                _ => Err(ClientError::Status { status, body }),
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, route).send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Site Operations
    // ============================================================

    /// Raw plugin info for the current site.
    pub async fn app_info(&self) -> Result<SiteInfo, ClientError> {
        self.get("/info").await
    }

    pub async fn app_content(&self) -> Result<AppContent, ClientError> {
        self.get("/app-content").await
    }

    pub async fn pages(&self) -> Result<Vec<Page>, ClientError> {
        self.get("/pages").await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get("/categories").await
    }

    /// Submit the contact form. Fields are trimmed; all three are required.
    pub async fn submit_contact(
        &self,
        form: &ContactForm,
    ) -> Result<serde_json::Value, ClientError> {
        let form = form
            .validated()
            .ok_or_else(|| ClientError::Validation("All fields are required".to_string()))?;

        let response = self
            .request(Method::POST, "/contact")
            .json(&form)
            .send()
            .await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Post Operations
    // ============================================================

    pub async fn posts(&self, query: &PostQuery) -> Result<PostsPage, ClientError> {
        let response = self
            .request(Method::GET, "/posts")
            .query(&query.to_params())
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn post(&self, id: u64) -> Result<Post, ClientError> {
        self.get(&format!("/posts/{}", id)).await
    }

    pub async fn recent_posts(&self, limit: u32) -> Result<Vec<Post>, ClientError> {
        let page = self
            .posts(&PostQuery {
                per_page: limit,
                ..PostQuery::default()
            })
            .await?;
        Ok(page.posts)
    }

    /// Recent posts that carry a featured image.
    pub async fn featured_posts(&self, limit: u32) -> Result<Vec<Post>, ClientError> {
        let posts = self.recent_posts(limit).await?;
        Ok(posts
            .into_iter()
            .filter(|p| p.featured_image.as_deref().is_some_and(|s| !s.is_empty()))
            .collect())
    }

    pub async fn posts_by_category(
        &self,
        category: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PostsPage, ClientError> {
        self.posts(&PostQuery {
            page,
            per_page,
            category: Some(category.to_string()),
            search: None,
        })
        .await
    }

    pub async fn search_posts(
        &self,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PostsPage, ClientError> {
        self.posts(&PostQuery {
            page,
            per_page,
            category: None,
            search: Some(search.to_string()),
        })
        .await
    }

    // ============================================================
    // Auth Operations
    // ============================================================

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let response = self
            .request(Method::POST, "/auth/login")
            .json(&LoginInput {
                username: username.trim().to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: LoginResponse = self.handle_response(response).await?;
        Ok(body.into_user())
    }

    /// Tell the server the session is over. The response body is ignored.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.request(Method::POST, "/auth/logout").send().await?;
        self.handle_empty_response(response).await
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        let body: LoginResponse = self.get("/auth/user").await?;
        Ok(body.into_user())
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
