use crate::auth::models::AuthenticatedUser;
use crate::db::comment_repository::CommentRepository;
use crate::db::models::{parse_object_id, sanitize_attributes, Story, StoryKey};
use crate::db::story_repository::StoryRepository;
use crate::error::AppError;
use crate::models::story::{MessageResponse, StoryListResponse, StoryView, TopStoriesResponse};
use crate::pagination::PageRequest;

/// Number of stories returned by the most-viewed ranking.
pub const TOP_STORIES_LIMIT: u64 = 3;

pub const ITEM_CREATED: &str = "Item Successfully Created";
pub const ITEM_UPDATED: &str = "Item Successfully Updated";
pub const ITEM_DELETED: &str = "Item Successfully Deleted";
pub const ITEM_NOT_FOUND: &str = "Item Not Found";

type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Create a story owned by `actor`.
///
/// Stores every client attribute except the server-owned ones; `createdBy` is
/// always the acting user.
pub async fn process_create(
    repo: &dyn StoryRepository,
    actor: &AuthenticatedUser,
    body: JsonObject,
) -> Result<MessageResponse, AppError> {
    let attributes = sanitize_attributes(body)?;
    let story = Story::new(actor.user_id.clone(), attributes);

    let id = repo.insert(story).await?;
    tracing::info!(story_id = %id, user_id = %actor.user_id, "story created");

    Ok(MessageResponse::success(ITEM_CREATED))
}

/// Delete a story. Its comments are left behind.
pub async fn process_remove(
    repo: &dyn StoryRepository,
    id: &str,
) -> Result<MessageResponse, AppError> {
    let id = parse_object_id(id, "_id")?;

    match repo.delete_by_id(id).await? {
        Some(_) => {
            tracing::info!(story_id = %id, "story deleted");
            Ok(MessageResponse::success(ITEM_DELETED))
        }
        None => Err(AppError::NotFound(ITEM_NOT_FOUND.into())),
    }
}

/// Apply a patch without checking that the story exists.
pub async fn process_update(
    repo: &dyn StoryRepository,
    id: &str,
    patch: JsonObject,
) -> Result<MessageResponse, AppError> {
    let id = parse_object_id(id, "_id")?;
    let patch = sanitize_attributes(patch)?;

    repo.update_by_id(id, patch).await?;

    Ok(MessageResponse::success(ITEM_UPDATED))
}

/// One page of stories, newest first, plus pagination metadata.
///
/// The page fetch and the total count run concurrently, so they are not a
/// consistent snapshot under concurrent writes.
pub async fn process_list(
    repo: &dyn StoryRepository,
    request: PageRequest,
    path: &str,
) -> Result<StoryListResponse, AppError> {
    let (stories, item_count) = futures::try_join!(
        repo.find_page(request.skip(), request.limit),
        repo.count()
    )?;

    let page_count = request.page_count(item_count);

    Ok(StoryListResponse {
        object: "list".to_string(),
        has_more: request.has_more(page_count),
        data: stories.into_iter().map(StoryView::from).collect(),
        page_count,
        item_count,
        current_page: request.page,
        pages: request.page_links(path, page_count),
    })
}

/// Count a view on the addressed story and return it with its comments.
pub async fn process_view(
    stories: &dyn StoryRepository,
    comments: &dyn CommentRepository,
    key: StoryKey,
) -> Result<StoryView, AppError> {
    let story = stories
        .increment_views(key)
        .await?
        .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.into()))?;

    // Separate read: a comment added in between may or may not show up.
    let story_comments = comments.find_by_story(story.id).await?;

    Ok(StoryView::from(story).with_comments(story_comments))
}

pub async fn process_get_by_id(
    stories: &dyn StoryRepository,
    comments: &dyn CommentRepository,
    id: &str,
) -> Result<StoryView, AppError> {
    let id = parse_object_id(id, "_id")?;
    process_view(stories, comments, StoryKey::Id(id)).await
}

pub async fn process_get_by_slug(
    stories: &dyn StoryRepository,
    comments: &dyn CommentRepository,
    slug: &str,
) -> Result<StoryView, AppError> {
    process_view(stories, comments, StoryKey::Slug(slug.to_string())).await
}

pub async fn process_get_top(repo: &dyn StoryRepository) -> Result<TopStoriesResponse, AppError> {
    let stories = repo.find_most_viewed(TOP_STORIES_LIMIT).await?;

    Ok(TopStoriesResponse {
        data: stories.into_iter().map(StoryView::from).collect(),
    })
}

#[cfg(feature = "server")]
pub use handlers::*;

/// Axum handlers. Status codes follow the established API contract, which
/// uses 201 for several reads.
#[cfg(feature = "server")]
mod handlers {
    use axum::extract::rejection::{JsonRejection, QueryRejection};
    use axum::extract::{OriginalUri, Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;

    use super::*;
    use crate::pagination::PageQuery;
    use crate::state::AppState;

    /// `POST /stories`
    pub async fn create_story_handler(
        State(state): State<AppState>,
        actor: AuthenticatedUser,
        payload: Result<Json<JsonObject>, JsonRejection>,
    ) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
        let Json(body) = payload?;
        let response = process_create(state.story_repo.as_ref(), &actor, body).await?;
        Ok((StatusCode::CREATED, Json(response)))
    }

    /// `DELETE /stories/{id}`
    ///
    /// Responds 204 with a body attached; HTTP/1 servers drop it on the wire.
    pub async fn remove_story_handler(
        State(state): State<AppState>,
        _actor: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
        let response = process_remove(state.story_repo.as_ref(), &id).await?;
        Ok((StatusCode::NO_CONTENT, Json(response)))
    }

    /// `PUT|PATCH /stories/{id}`
    pub async fn update_story_handler(
        State(state): State<AppState>,
        _actor: AuthenticatedUser,
        Path(id): Path<String>,
        payload: Result<Json<JsonObject>, JsonRejection>,
    ) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
        let Json(patch) = payload?;
        let response = process_update(state.story_repo.as_ref(), &id, patch).await?;
        Ok((StatusCode::CREATED, Json(response)))
    }

    /// `GET /stories?page=&limit=`
    pub async fn list_stories_handler(
        State(state): State<AppState>,
        OriginalUri(uri): OriginalUri,
        query: Result<Query<PageQuery>, QueryRejection>,
    ) -> Result<(StatusCode, Json<StoryListResponse>), AppError> {
        // An undecodable query string (e.g. a repeated `page`) means defaults
        let query = match query {
            Ok(Query(query)) => query,
            Err(rejection) => {
                tracing::debug!("ignoring pagination query: {}", rejection.body_text());
                PageQuery::default()
            }
        };
        let request = PageRequest::from_query(&query, &state.pagination);
        let response = process_list(state.story_repo.as_ref(), request, uri.path()).await?;
        Ok((StatusCode::CREATED, Json(response)))
    }

    /// `GET /stories/{id}`
    pub async fn get_story_handler(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<Json<StoryView>, AppError> {
        let story = process_get_by_id(
            state.story_repo.as_ref(),
            state.comment_repo.as_ref(),
            &id,
        )
        .await?;
        Ok(Json(story))
    }

    /// `GET /stories/slug/{slug}`
    pub async fn get_story_by_slug_handler(
        State(state): State<AppState>,
        Path(slug): Path<String>,
    ) -> Result<Json<StoryView>, AppError> {
        let story = process_get_by_slug(
            state.story_repo.as_ref(),
            state.comment_repo.as_ref(),
            &slug,
        )
        .await?;
        Ok(Json(story))
    }

    /// `GET /stories/top`
    pub async fn top_stories_handler(
        State(state): State<AppState>,
    ) -> Result<(StatusCode, Json<TopStoriesResponse>), AppError> {
        let response = process_get_top(state.story_repo.as_ref()).await?;
        Ok((StatusCode::CREATED, Json(response)))
    }
}
