use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Category, Comment, PopulatedStory};
use crate::pagination::PageLink;

/// The `{message, success}` body shared by every write and every failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

/// The joined category as exposed on a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_hex(),
            title: category.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: String,
    pub story: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_hex(),
            story: comment.story.to_hex(),
            created_at: comment.created_at,
            attributes: attributes_to_json(comment.attributes),
        }
    }
}

/// A story as returned by the read endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryView>,
    pub created_by: String,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    /// Only present on single-item reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentView>>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl StoryView {
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = Some(comments.into_iter().map(CommentView::from).collect());
        self
    }
}

impl From<PopulatedStory> for StoryView {
    fn from(story: PopulatedStory) -> Self {
        Self {
            id: story.id.to_hex(),
            slug: story.slug,
            category: story.category.map(CategoryView::from),
            created_by: story.created_by,
            views_count: story.views_count,
            created_at: story.created_at,
            comments: None,
            attributes: attributes_to_json(story.attributes),
        }
    }
}

/// The paginated list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryListResponse {
    /// Always `"list"`.
    pub object: String,
    #[serde(rename = "has_more")]
    pub has_more: bool,
    pub data: Vec<StoryView>,
    pub page_count: u64,
    pub item_count: u64,
    pub current_page: u64,
    pub pages: Vec<PageLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopStoriesResponse {
    pub data: Vec<StoryView>,
}

/// Render stored attributes as relaxed extended JSON.
fn attributes_to_json(attributes: Document) -> serde_json::Map<String, serde_json::Value> {
    match Bson::Document(attributes).into_relaxed_extjson() {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
