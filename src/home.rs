//! Content for the home view.

use serde::Serialize;
use thiserror::Error;

use crate::client::{ClientError, WordPressClient};
use crate::models::{AppContent, Post};
use crate::session::{SessionManager, SessionState};

/// Number of posts shown under "Recent Posts".
pub const RECENT_POST_COUNT: u32 = 5;

#[derive(Debug, Error)]
pub enum HomeError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeContent {
    pub app_content: AppContent,
    pub recent_posts: Vec<Post>,
}

/// Fetch app content and recent posts concurrently. If either request
/// fails the whole load fails; partial results are dropped.
pub async fn load_home(client: &WordPressClient) -> Result<HomeContent, ClientError> {
    let (app_content, recent_posts) = tokio::try_join!(
        client.app_content(),
        client.recent_posts(RECENT_POST_COUNT)
    )
    .inspect_err(|e| tracing::error!("Error loading data: {}", e))?;

    Ok(HomeContent {
        app_content,
        recent_posts,
    })
}

/// Load the home view for a logged-in user. Nothing is requested unless the
/// session is `Authenticated`.
pub async fn load_authenticated_home(session: &SessionManager) -> Result<HomeContent, HomeError> {
    if !matches!(session.state(), SessionState::Authenticated(_)) {
        return Err(HomeError::NotAuthenticated);
    }
    Ok(load_home(session.client()).await?)
}
