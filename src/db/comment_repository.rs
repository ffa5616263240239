use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::Comment;
use crate::error::AppError;

/// Repository trait for comment operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment and return its id.
    async fn insert(&self, comment: Comment) -> Result<ObjectId, AppError>;

    /// All comments referencing the given story, oldest first.
    async fn find_by_story(&self, story_id: ObjectId) -> Result<Vec<Comment>, AppError>;
}

/// MongoDB implementation of the CommentRepository.
#[cfg(feature = "server")]
pub struct MongoCommentRepository {
    collection: mongodb::Collection<Comment>,
}

#[cfg(feature = "server")]
impl MongoCommentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("comments"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        self.collection
            .create_index(IndexModel::builder().keys(doc! { "story": 1, "createdAt": 1 }).build())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(feature = "server")]
#[async_trait]
impl CommentRepository for MongoCommentRepository {
    async fn insert(&self, comment: Comment) -> Result<ObjectId, AppError> {
        let id = comment.id;

        self.collection
            .insert_one(&comment)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(id)
    }

    async fn find_by_story(&self, story_id: ObjectId) -> Result<Vec<Comment>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": 1, "_id": 1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "story": story_id })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
