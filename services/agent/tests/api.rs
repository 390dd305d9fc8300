use agent_lib::adapters::{FirebaseStore, SqliteCache};
use agent_lib::config::Config;
use agent_lib::web::{self, state::AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use velotrivia_core::{ContentGenerator, PortError, PortResult, SyncController, TriviaContent};

struct StubGenerator;

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate_trivia(&self, _topic: &str) -> PortResult<TriviaContent> {
        Ok(TriviaContent {
            question: "Who won the 1989 Tour by eight seconds?".to_string(),
            answer: "Greg LeMond".to_string(),
            fun_fact: "He used aero bars in the final time trial.".to_string(),
            image_description: "Aero bars on a 1989 time trial bike".to_string(),
            hashtags: vec!["TDF".to_string(), "LeMond".to_string()],
        })
    }

    async fn generate_image_from_description(&self, _description: &str) -> PortResult<String> {
        Err(PortError::ContentRejected("safety filter".to_string()))
    }
}

async fn test_app() -> Router {
    let cache = SqliteCache::connect("sqlite::memory:").await.unwrap();
    cache.run_migrations().await.unwrap();
    let controller = SyncController::new(
        Arc::new(FirebaseStore::new(reqwest::Client::new(), None)),
        Arc::new(cache),
        Arc::new(StubGenerator),
    );
    controller.hydrate().await;

    let config = Config::from_lookup(|_| None).unwrap();
    web::router(Arc::new(AppState {
        controller,
        config: Arc::new(config),
    }))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_generated_post_shows_on_dashboard() {
    let app = test_app().await;

    let (status, post) = send(&app, Method::POST, "/posts/generate", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["status"], "scheduled");
    assert_eq!(post["platform"], "facebook");

    let (status, dashboard) = send(&app, Method::GET, "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["totalPosts"], 1);
    assert_eq!(dashboard["scheduledPost"]["id"], post["id"]);
    assert_eq!(dashboard["status"]["remoteSyncEnabled"], false);
}

#[tokio::test]
async fn test_reviewed_posts_move_to_history() {
    let app = test_app().await;
    let (_, post) = send(&app, Method::POST, "/posts/generate", None).await;
    let id = post["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/posts/{}/status", id),
        Some(json!({ "status": "posted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "posted");

    let (_, history) = send(&app, Method::GET, "/history", None).await;
    assert_eq!(history["posts"].as_array().unwrap().len(), 1);

    let (_, failed) = send(&app, Method::GET, "/history?filter=failed", None).await;
    assert!(failed["posts"].as_array().unwrap().is_empty());

    let (_, dashboard) = send(&app, Method::GET, "/dashboard", None).await;
    assert!(dashboard["scheduledPost"].is_null());
}

#[tokio::test]
async fn test_status_update_validation() {
    let app = test_app().await;
    let (_, post) = send(&app, Method::POST, "/posts/generate", None).await;
    let id = post["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/posts/{}/status", id),
        Some(json!({ "status": "scheduled" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/posts/unknown/status",
        Some(json!({ "status": "failed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_round_trip_and_validation() {
    let app = test_app().await;
    let (_, mut settings) = send(&app, Method::GET, "/settings", None).await;
    assert_eq!(settings["postTime"], "09:00");

    settings["postTime"] = json!("quarter past");
    let (status, _) = send(&app, Method::PUT, "/settings", Some(settings.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    settings["postTime"] = json!("18:30");
    settings["topic"] = json!("Cyclocross");
    let (status, saved) = send(&app, Method::PUT, "/settings", Some(settings)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["topic"], "Cyclocross");

    let (_, reloaded) = send(&app, Method::GET, "/settings", None).await;
    assert_eq!(reloaded["postTime"], "18:30");
    assert_eq!(reloaded["topic"], "Cyclocross");
}

#[tokio::test]
async fn test_share_text() {
    let app = test_app().await;
    let (_, post) = send(&app, Method::POST, "/posts/generate", None).await;
    let id = post["id"].as_str().unwrap().to_string();

    let (status, share) = send(&app, Method::GET, &format!("/posts/{}/share", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let text = share["text"].as_str().unwrap();
    assert!(text.contains("✅ Answer: Greg LeMond"));
    assert!(text.ends_with("#VeloTrivia #TDF #LeMond"));

    let (status, _) = send(&app, Method::GET, "/posts/unknown/share", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejected_image_is_reported() {
    let app = test_app().await;
    let (_, post) = send(&app, Method::POST, "/posts/generate", None).await;
    let id = post["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, &format!("/posts/{}/image", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::POST, "/posts/unknown/image", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, dashboard) = send(&app, Method::GET, "/dashboard", None).await;
    assert!(dashboard["scheduledPost"]["imageUrl"].is_null());
}

#[tokio::test]
async fn test_toggle_connection() {
    let app = test_app().await;

    let (_, connected) = send(&app, Method::POST, "/connection/toggle", None).await;
    assert_eq!(connected["fbConnected"], true);

    let (_, disconnected) = send(&app, Method::POST, "/connection/auth", None).await;
    assert_eq!(disconnected["fbConnected"], false);
}
