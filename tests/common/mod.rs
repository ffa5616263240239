#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use bson::oid::ObjectId;
use bson::{doc, Document};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use storydesk::auth::config::AuthConfig;
use storydesk::auth::models::AuthenticatedUser;
use storydesk::auth::token::issue_token;
use storydesk::db::comment_repository::{CommentRepository, MongoCommentRepository};
use storydesk::db::models::Comment;
use storydesk::db::story_repository::{MongoStoryRepository, StoryRepository};
use storydesk::pagination::PaginationConfig;
use storydesk::router::build_router;
use storydesk::state::AppState;

pub const JWT_SECRET: &str = "integration-secret";
pub const API_PREFIX: &str = "/api";

/// Holds the running MongoDB container and provides the Axum router for
/// integration tests.
///
/// The container is kept alive for as long as this struct lives. When
/// dropped, it is stopped and cleaned up automatically.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub router: Router,
    pub db: mongodb::Database,
    pub story_repo: Arc<dyn StoryRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
}

impl TestEnv {
    /// Start MongoDB and build a router wired to the real repositories.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let db = mongo_client.database("storydesk_test");

        let stories = MongoStoryRepository::new(&db);
        stories
            .ensure_indexes()
            .await
            .expect("Failed to create story indexes");
        let comments = MongoCommentRepository::new(&db);
        comments
            .ensure_indexes()
            .await
            .expect("Failed to create comment indexes");

        let story_repo: Arc<dyn StoryRepository> = Arc::new(stories);
        let comment_repo: Arc<dyn CommentRepository> = Arc::new(comments);

        let app_state = AppState {
            story_repo: story_repo.clone(),
            comment_repo: comment_repo.clone(),
            auth: AuthConfig::new(JWT_SECRET),
            pagination: PaginationConfig::default(),
        };

        let router = build_router(app_state, API_PREFIX);

        Self {
            _mongo: mongo_container,
            router,
            db,
            story_repo,
            comment_repo,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// A valid bearer token for `user_id`.
    pub fn token(&self, user_id: &str) -> String {
        issue_token(
            JWT_SECRET,
            &AuthenticatedUser::new(user_id),
            chrono::Duration::minutes(15),
        )
        .expect("Failed to issue token")
    }

    /// Helper: create a story via the API.
    pub async fn create_story(
        &self,
        server: &axum_test::TestServer,
        token: &str,
        body: serde_json::Value,
    ) -> axum_test::TestResponse {
        server
            .post("/api/stories")
            .authorization_bearer(token)
            .json(&body)
            .await
    }

    /// Helper: look up a story id by slug straight from the collection,
    /// without counting a view.
    pub async fn story_id_by_slug(&self, slug: &str) -> ObjectId {
        let found = self
            .db
            .collection::<Document>("stories")
            .find_one(doc! { "slug": slug })
            .await
            .expect("Failed to query stories")
            .expect("Story not found");
        found.get_object_id("_id").expect("Story without _id")
    }

    /// Helper: insert a category directly; there is no API for them.
    pub async fn insert_category(&self, title: &str) -> ObjectId {
        let id = ObjectId::new();
        self.db
            .collection::<Document>("categories")
            .insert_one(doc! { "_id": id, "title": title })
            .await
            .expect("Failed to insert category");
        id
    }

    /// Helper: attach a comment to a story.
    pub async fn insert_comment(&self, story: ObjectId, text: &str) -> ObjectId {
        self.comment_repo
            .insert(Comment::new(story, doc! { "text": text }))
            .await
            .expect("Failed to insert comment")
    }
}

/// A slug that will not collide across tests.
pub fn unique_slug(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
