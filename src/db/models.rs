use bson::oid::ObjectId;
use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fields the server owns. They are dropped from client payloads before
/// anything is written.
pub const RESERVED_FIELDS: &[&str] = &["_id", "createdBy", "viewsCount", "createdAt", "comments"];

/// Represents a story stored in the `stories` collection.
///
/// `C` is the shape of the category reference: the raw [`ObjectId`] as
/// stored, or a [`Category`] once the reference has been joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "C: Deserialize<'de>"))]
pub struct Story<C = ObjectId> {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// URL-safe key used by the slug lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Reference to the owning category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<C>,
    /// Identifier of the user who created the story. Always set server-side.
    pub created_by: String,
    /// Number of single-item reads served for this story.
    #[serde(default)]
    pub views_count: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Every other caller-supplied attribute (title, body, image, ...).
    #[serde(flatten)]
    pub attributes: Document,
}

impl Story {
    /// Build a new story owned by `created_by` from sanitized attributes.
    ///
    /// `slug` and `category` are lifted out of the attribute map into their
    /// typed fields.
    pub fn new(created_by: impl Into<String>, mut attributes: Document) -> Self {
        let slug = match attributes.remove("slug") {
            Some(Bson::String(slug)) => Some(slug),
            _ => None,
        };
        let category = match attributes.remove("category") {
            Some(Bson::ObjectId(id)) => Some(id),
            _ => None,
        };

        Self {
            id: ObjectId::new(),
            slug,
            category,
            created_by: created_by.into(),
            views_count: 0,
            created_at: Utc::now(),
            attributes,
        }
    }

    /// Replace the category reference with its joined representation.
    ///
    /// A dangling reference (category deleted) yields `None`.
    pub fn with_category(self, category: Option<Category>) -> Story<Category> {
        Story {
            id: self.id,
            slug: self.slug,
            category,
            created_by: self.created_by,
            views_count: self.views_count,
            created_at: self.created_at,
            attributes: self.attributes,
        }
    }
}

/// A story with its category joined, as returned by read operations.
pub type PopulatedStory = Story<Category>;

/// A category as stored in the `categories` collection. Only `title` is ever
/// projected onto stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub title: String,
}

/// Represents a comment stored in the `comments` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// The story this comment belongs to.
    pub story: ObjectId,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
    /// Comment content (author, text, ...). Opaque to the API.
    #[serde(flatten)]
    pub attributes: Document,
}

impl Comment {
    pub fn new(story: ObjectId, attributes: Document) -> Self {
        Self {
            id: ObjectId::new(),
            story,
            created_at: Utc::now(),
            attributes,
        }
    }
}

/// How a single story is addressed by the read-and-count operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryKey {
    Id(ObjectId),
    Slug(String),
}

/// Parse a 24-character hex object id, failing the way a cast would.
pub fn parse_object_id(value: &str, path: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value).map_err(|_| {
        AppError::Validation(format!(
            "Cast to ObjectId failed for value \"{value}\" at path \"{path}\""
        ))
    })
}

/// Turn a client JSON payload into a document safe to store.
///
/// Reserved fields are dropped, `category` is cast to an [`ObjectId`] and
/// `slug` must be a string. `null` is kept for both so a patch can clear them.
/// Keys that MongoDB would read as paths or operators (`a.b`, `$x`) are
/// rejected.
pub fn sanitize_attributes(
    body: serde_json::Map<String, serde_json::Value>,
) -> Result<Document, AppError> {
    use serde_json::Value;

    let mut attributes = Document::new();
    for (key, value) in body {
        if RESERVED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if key.contains('.') || key.starts_with('$') {
            return Err(AppError::Validation(format!(
                "Field name \"{key}\" must not contain '.' or start with '$'"
            )));
        }

        let value = match (key.as_str(), value) {
            (_, Value::Null) => Bson::Null,
            ("category", Value::String(hex)) => Bson::ObjectId(parse_object_id(&hex, "category")?),
            ("category", other) => {
                return Err(AppError::Validation(format!(
                    "Cast to ObjectId failed for value \"{other}\" at path \"category\""
                )))
            }
            ("slug", Value::String(slug)) => Bson::String(slug),
            ("slug", other) => {
                return Err(AppError::Validation(format!(
                    "Cast to string failed for value \"{other}\" at path \"slug\""
                )))
            }
            (_, other) => bson::to_bson(&other)?,
        };
        attributes.insert(key, value);
    }

    Ok(attributes)
}
