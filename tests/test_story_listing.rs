mod common;

use axum::http::StatusCode;
use serde_json::json;

/// Create `count` stories titled `Story 0..count`, oldest first.
async fn seed_stories(env: &common::TestEnv, server: &axum_test::TestServer, count: usize) {
    let token = env.token("editor-1");
    for i in 0..count {
        env.create_story(server, &token, json!({ "title": format!("Story {i}") }))
            .await
            .assert_status(StatusCode::CREATED);
        // createdAt has millisecond resolution
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}

fn titles(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn list_empty_collection() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let response = server.get("/api/stories").await;

    response.assert_status(StatusCode::CREATED);
    response.assert_json(&json!({
        "object": "list",
        "has_more": false,
        "data": [],
        "pageCount": 0,
        "itemCount": 0,
        "currentPage": 1,
        "pages": []
    }));
}

#[tokio::test]
async fn list_second_page_newest_first() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    seed_stories(&env, &server, 10).await;

    let response = server
        .get("/api/stories")
        .add_query_param("page", 2)
        .add_query_param("limit", 3)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["itemCount"], 10);
    assert_eq!(body["pageCount"], 4);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["has_more"], true);
    assert_eq!(titles(&body), vec!["Story 6", "Story 5", "Story 4"]);
    assert_eq!(
        body["pages"],
        json!([
            { "number": 1, "url": "/api/stories?page=1&limit=3" },
            { "number": 2, "url": "/api/stories?page=2&limit=3" },
            { "number": 3, "url": "/api/stories?page=3&limit=3" }
        ])
    );
}

#[tokio::test]
async fn list_last_page_has_no_more() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    seed_stories(&env, &server, 10).await;

    let response = server
        .get("/api/stories")
        .add_query_param("page", 4)
        .add_query_param("limit", 3)
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["has_more"], false);
    assert_eq!(titles(&body), vec!["Story 0"]);
}

#[tokio::test]
async fn list_page_past_the_end_is_empty() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    seed_stories(&env, &server, 2).await;

    let response = server.get("/api/stories").add_query_param("page", 9).await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["itemCount"], 2);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn list_joins_category_and_omits_comments() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let category = env.insert_category("Changelog").await;
    let slug = common::unique_slug("tagged");

    env.create_story(
        &server,
        &env.token("editor-1"),
        json!({ "title": "Tagged", "slug": slug, "category": category.to_hex() }),
    )
    .await
    .assert_status(StatusCode::CREATED);
    let id = env.story_id_by_slug(&slug).await;
    env.insert_comment(id, "hidden in lists").await;

    let body: serde_json::Value = server.get("/api/stories").await.json();
    let story = &body["data"][0];
    assert_eq!(story["category"]["title"], "Changelog");
    assert!(story.get("comments").is_none());
}

#[tokio::test]
async fn top_returns_three_most_viewed() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.token("editor-1");

    let mut ids = Vec::new();
    for views in 0..5 {
        let slug = common::unique_slug("ranked");
        env.create_story(
            &server,
            &token,
            json!({ "title": format!("Viewed {views}"), "slug": slug }),
        )
        .await
        .assert_status(StatusCode::CREATED);
        ids.push((env.story_id_by_slug(&slug).await, views));
    }

    for (id, views) in &ids {
        for _ in 0..*views {
            server
                .get(&format!("/api/stories/{}", id.to_hex()))
                .await
                .assert_status_ok();
        }
    }

    let response = server.get("/api/stories/top").await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    let views: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["viewsCount"].as_i64().unwrap())
        .collect();
    assert_eq!(views, vec![4, 3, 2]);
    assert_eq!(titles(&body), vec!["Viewed 4", "Viewed 3", "Viewed 2"]);
}

#[tokio::test]
async fn top_with_fewer_than_three_stories() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    seed_stories(&env, &server, 1).await;

    let body: serde_json::Value = server.get("/api/stories/top").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
