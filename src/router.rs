use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::stories;
use crate::state::AppState;

/// Story routes, relative to the API prefix.
fn story_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/stories",
            post(stories::create_story_handler).get(stories::list_stories_handler),
        )
        // Static segments win over `{id}`
        .route("/stories/top", get(stories::top_stories_handler))
        .route(
            "/stories/slug/{slug}",
            get(stories::get_story_by_slug_handler),
        )
        .route(
            "/stories/{id}",
            get(stories::get_story_handler)
                .put(stories::update_story_handler)
                .patch(stories::update_story_handler)
                .delete(stories::remove_story_handler),
        )
}

/// Build the full application router with request tracing and CORS.
///
/// An empty or `/` prefix mounts the routes at the root. Leading and
/// trailing slashes are optional (`api`, `/api/` and `/api` are the same).
pub fn build_router(state: AppState, api_prefix: &str) -> Router {
    let prefix = api_prefix.trim_matches('/');

    let routes = if prefix.is_empty() {
        story_routes()
    } else {
        Router::new().nest(&format!("/{prefix}"), story_routes())
    };

    routes
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
