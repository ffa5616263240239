use std::sync::Arc;

use crate::auth::config::AuthConfig;
use crate::db::comment_repository::CommentRepository;
use crate::db::story_repository::StoryRepository;
use crate::pagination::PaginationConfig;

/// Shared handler state. Cloned per request; everything inside is either an
/// `Arc` or immutable configuration.
#[derive(Clone)]
pub struct AppState {
    pub story_repo: Arc<dyn StoryRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
}

impl axum::extract::FromRef<AppState> for AuthConfig {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
