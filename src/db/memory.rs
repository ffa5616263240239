//! In-memory repositories used by unit and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};

use crate::db::comment_repository::CommentRepository;
use crate::db::models::{Category, Comment, PopulatedStory, Story, StoryKey};
use crate::db::story_repository::StoryRepository;
use crate::error::AppError;

#[derive(Default)]
pub struct MemoryStoryRepository {
    pub stories: Mutex<Vec<Story>>,
    pub categories: Mutex<Vec<Category>>,
}

impl MemoryStoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, title: &str) -> ObjectId {
        let id = ObjectId::new();
        self.categories.lock().unwrap().push(Category {
            id,
            title: title.to_string(),
        });
        id
    }

    /// Current view count, read without side effects.
    pub fn views_of(&self, id: ObjectId) -> i64 {
        self.stories
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.views_count)
            .unwrap_or_default()
    }

    fn populate(&self, story: Story) -> PopulatedStory {
        let category = story.category.and_then(|id| {
            self.categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned()
        });
        story.with_category(category)
    }
}

/// Mirror of `$set` on the typed story fields.
fn apply_patch(story: &mut Story, patch: Document) {
    for (key, value) in patch {
        match (key.as_str(), value) {
            ("slug", Bson::String(slug)) => story.slug = Some(slug),
            ("slug", _) => story.slug = None,
            ("category", Bson::ObjectId(id)) => story.category = Some(id),
            ("category", _) => story.category = None,
            (_, value) => {
                story.attributes.insert(key, value);
            }
        }
    }
}

#[async_trait]
impl StoryRepository for MemoryStoryRepository {
    async fn insert(&self, story: Story) -> Result<ObjectId, AppError> {
        let id = story.id;
        self.stories.lock().unwrap().push(story);
        Ok(id)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Story>, AppError> {
        Ok(self
            .stories
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Story>, AppError> {
        let mut stories = self.stories.lock().unwrap();
        let position = stories.iter().position(|s| s.id == id);
        Ok(position.map(|index| stories.remove(index)))
    }

    async fn update_by_id(&self, id: ObjectId, patch: Document) -> Result<(), AppError> {
        let mut stories = self.stories.lock().unwrap();
        if let Some(story) = stories.iter_mut().find(|s| s.id == id) {
            apply_patch(story, patch);
        }
        Ok(())
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<PopulatedStory>, AppError> {
        let mut stories = self.stories.lock().unwrap().clone();
        // Latest insert first when timestamps tie
        stories.reverse();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(stories
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|s| self.populate(s))
            .collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.stories.lock().unwrap().len() as u64)
    }

    async fn increment_views(&self, key: StoryKey) -> Result<Option<PopulatedStory>, AppError> {
        let updated = {
            let mut stories = self.stories.lock().unwrap();
            let found = stories.iter_mut().find(|s| match &key {
                StoryKey::Id(id) => s.id == *id,
                StoryKey::Slug(slug) => s.slug.as_deref() == Some(slug.as_str()),
            });
            found.map(|story| {
                story.views_count += 1;
                story.clone()
            })
        };

        Ok(updated.map(|s| self.populate(s)))
    }

    async fn find_most_viewed(&self, limit: u64) -> Result<Vec<PopulatedStory>, AppError> {
        let mut stories = self.stories.lock().unwrap().clone();
        stories.sort_by(|a, b| b.views_count.cmp(&a.views_count));

        Ok(stories
            .into_iter()
            .take(limit as usize)
            .map(|s| self.populate(s))
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryCommentRepository {
    pub comments: Mutex<Vec<Comment>>,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn insert(&self, comment: Comment) -> Result<ObjectId, AppError> {
        let id = comment.id;
        self.comments.lock().unwrap().push(comment);
        Ok(id)
    }

    async fn find_by_story(&self, story_id: ObjectId) -> Result<Vec<Comment>, AppError> {
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.story == story_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}
