use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Document;

use crate::db::models::{PopulatedStory, Story, StoryKey};
use crate::error::AppError;

/// Repository trait for story operations.
///
/// This trait allows mocking the database layer in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Insert a new story and return its id.
    async fn insert(&self, story: Story) -> Result<ObjectId, AppError>;

    /// Find a story by id without touching its view counter.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Story>, AppError>;

    /// Delete a story by id, returning the removed document if there was one.
    ///
    /// Comments referencing the story are left in place.
    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Story>, AppError>;

    /// `$set` the given fields on the story with this id. Matching nothing is
    /// not an error.
    async fn update_by_id(&self, id: ObjectId, patch: Document) -> Result<(), AppError>;

    /// Fetch one page of stories, newest first, with categories joined.
    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<PopulatedStory>, AppError>;

    /// Count all stories.
    async fn count(&self) -> Result<u64, AppError>;

    /// Atomically increment `viewsCount` on the addressed story and return the
    /// updated document with its category joined.
    async fn increment_views(&self, key: StoryKey) -> Result<Option<PopulatedStory>, AppError>;

    /// The most viewed stories, highest `viewsCount` first.
    async fn find_most_viewed(&self, limit: u64) -> Result<Vec<PopulatedStory>, AppError>;
}

/// MongoDB implementation of the StoryRepository.
///
/// This is only available when the `server` feature is enabled.
#[cfg(feature = "server")]
pub struct MongoStoryRepository {
    stories: mongodb::Collection<Story>,
    categories: mongodb::Collection<crate::db::models::Category>,
}

#[cfg(feature = "server")]
impl MongoStoryRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            stories: db.collection("stories"),
            categories: db.collection("categories"),
        }
    }

    /// Create the indexes backing the listing, ranking and slug lookups.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        let indexes = vec![
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            IndexModel::builder().keys(doc! { "viewsCount": -1 }).build(),
            IndexModel::builder().keys(doc! { "slug": 1 }).build(),
        ];

        self.stories
            .create_indexes(indexes)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Join the category of a single story with a second, title-only query.
    async fn populate(&self, story: Story) -> Result<PopulatedStory, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOneOptions;

        let category = match story.category {
            Some(category_id) => {
                let options = FindOneOptions::builder()
                    .projection(doc! { "title": 1 })
                    .build();
                self.categories
                    .find_one(doc! { "_id": category_id })
                    .with_options(options)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?
            }
            None => None,
        };

        Ok(story.with_category(category))
    }

    /// Run `stages` followed by the category join and decode the results.
    async fn aggregate_populated(
        &self,
        mut stages: Vec<Document>,
    ) -> Result<Vec<PopulatedStory>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;

        stages.push(doc! {
            "$lookup": {
                "from": "categories",
                "localField": "category",
                "foreignField": "_id",
                "as": "category",
            }
        });
        stages.push(doc! {
            "$unwind": { "path": "$category", "preserveNullAndEmptyArrays": true }
        });

        let mut cursor = self
            .stories
            .aggregate(stages)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut stories = Vec::new();
        while let Some(raw) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let story: PopulatedStory = bson::from_document(raw)
                .map_err(|e| AppError::Database(format!("Failed to decode story: {e}")))?;
            stories.push(story);
        }

        Ok(stories)
    }
}

#[cfg(feature = "server")]
#[async_trait]
impl StoryRepository for MongoStoryRepository {
    async fn insert(&self, story: Story) -> Result<ObjectId, AppError> {
        let id = story.id;

        self.stories
            .insert_one(&story)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(story_id = %id, "story inserted");
        Ok(id)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Story>, AppError> {
        use mongodb::bson::doc;

        self.stories
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Story>, AppError> {
        use mongodb::bson::doc;

        self.stories
            .find_one_and_delete(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn update_by_id(&self, id: ObjectId, patch: Document) -> Result<(), AppError> {
        use mongodb::bson::doc;

        // An empty `$set` is rejected by the server.
        if patch.is_empty() {
            return Ok(());
        }

        let result = self
            .stories
            .update_one(doc! { "_id": id }, doc! { "$set": patch })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            story_id = %id,
            matched = result.matched_count,
            "story updated"
        );
        Ok(())
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<PopulatedStory>, AppError> {
        use mongodb::bson::doc;

        let skip = i64::try_from(skip)
            .map_err(|_| AppError::Validation(format!("skip {skip} is out of range")))?;
        let limit = i64::try_from(limit)
            .map_err(|_| AppError::Validation(format!("limit {limit} is out of range")))?;

        self.aggregate_populated(vec![
            doc! { "$sort": { "createdAt": -1 } },
            doc! { "$skip": skip },
            doc! { "$limit": limit },
        ])
        .await
    }

    async fn count(&self) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        self.stories
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn increment_views(&self, key: StoryKey) -> Result<Option<PopulatedStory>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let filter = match &key {
            StoryKey::Id(id) => doc! { "_id": *id },
            StoryKey::Slug(slug) => doc! { "slug": slug },
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let story = self
            .stories
            .find_one_and_update(filter, doc! { "$inc": { "viewsCount": 1 } })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match story {
            Some(story) => Ok(Some(self.populate(story).await?)),
            None => Ok(None),
        }
    }

    async fn find_most_viewed(&self, limit: u64) -> Result<Vec<PopulatedStory>, AppError> {
        use mongodb::bson::doc;

        let limit = i64::try_from(limit)
            .map_err(|_| AppError::Validation(format!("limit {limit} is out of range")))?;

        self.aggregate_populated(vec![
            doc! { "$sort": { "viewsCount": -1 } },
            doc! { "$limit": limit },
        ])
        .await
    }
}
