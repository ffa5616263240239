#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::sync::Arc;

    use anyhow::Context;
    use storydesk::config::AppConfig;
    use storydesk::db::comment_repository::{CommentRepository, MongoCommentRepository};
    use storydesk::db::story_repository::{MongoStoryRepository, StoryRepository};
    use storydesk::router::build_router;
    use storydesk::state::AppState;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storydesk=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting Storydesk server...");

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri)
        .await
        .context("Failed to connect to MongoDB")?;
    let mongo_db = mongo_client.database(&config.mongodb.database);

    let stories = MongoStoryRepository::new(&mongo_db);
    stories.ensure_indexes().await?;
    let comments = MongoCommentRepository::new(&mongo_db);
    comments.ensure_indexes().await?;

    tracing::info!(database = %config.mongodb.database, "Connected to MongoDB");

    let story_repo: Arc<dyn StoryRepository> = Arc::new(stories);
    let comment_repo: Arc<dyn CommentRepository> = Arc::new(comments);

    let app_state = AppState {
        story_repo,
        comment_repo,
        auth: config.auth.clone(),
        pagination: config.pagination,
    };

    let app = build_router(app_state, &config.server.api_prefix);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Listening on http://{}{}", addr, config.server.api_prefix);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(feature = "server")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}

// Without the `server` feature only the library types are built.
#[cfg(not(feature = "server"))]
fn main() {}
