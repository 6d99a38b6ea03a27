//! Functional tests for the HTTP surface

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use imagegen_studio::api::create_router;
use imagegen_studio::config::Settings;
use imagegen_studio::provider::{GenerationBackend, ProviderAdapter, RetryController};
use imagegen_studio::SessionManager;

const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 7, 7, 7, 7];

fn create_test_app() -> Router {
    let settings = Arc::new(Settings::default());
    let backend: Arc<dyn GenerationBackend> =
        Arc::new(ProviderAdapter::new(settings.http.clone()).unwrap());
    let manager = SessionManager::with_retry(
        settings,
        backend,
        RetryController::new(3, Duration::from_millis(1)),
    );
    create_router(Arc::new(manager))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send_json(app, "POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_catalogs() {
    let app = create_test_app();

    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send_json(&app, "GET", "/providers", None).await;
    assert_eq!(status, StatusCode::OK);
    let providers = body.as_array().unwrap();
    assert_eq!(providers.len(), 4);
    let free = providers
        .iter()
        .find(|p| p["kind"] == "pollinations")
        .unwrap();
    assert_eq!(free["capabilities"]["max_images"], 1);

    let (status, body) = send_json(&app, "GET", "/styles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["styles"].as_array().unwrap().len(), 6);
    assert_eq!(body["geometries"][0]["width"], 1024);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = create_test_app();
    let uri = format!("/sessions/{}/history", uuid::Uuid::new_v4());

    let (status, body) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "session_not_found");
}

#[tokio::test]
async fn test_generate_requires_validated_profile() {
    let app = create_test_app();
    let id = create_session(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/sessions/{}/generate", id),
        Some(json!({"prompt": "a cat"})),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["error"]["code"], "profile_not_validated");
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let app = create_test_app();
    let id = create_session(&app).await;
    let base = format!("/sessions/{}", id);

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("{}/profiles", base),
        Some(json!({
            "profile": {
                "name": "work",
                "kind": "openai_compatible",
                "base_url": "http://127.0.0.1:9/v1",
                "api_key": "sk-secret-value"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);

    let (_, body) = send_json(&app, "GET", &format!("{}/profiles", base), None).await;
    assert_eq!(body["active"], "default");
    let work = body["profiles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "work")
        .unwrap()
        .clone();
    assert_eq!(work["api_key"], "****alue");
    assert_eq!(work["validated"], false);

    let (status, body) = send_json(&app, "POST", &format!("{}/profiles/work/activate", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "work");

    let (_, body) = send_json(&app, "GET", &format!("{}/active_profile", base), None).await;
    assert_eq!(body["name"], "work");

    let (status, _) = send_json(&app, "DELETE", &format!("{}/profiles/default", base), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "DELETE", &format!("{}/profiles/work", base), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "last_profile");

    let (status, _) = send_json(&app, "POST", &format!("{}/profiles/ghost/activate", base), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_named_active_can_be_deleted() {
    let app = create_test_app();
    let id = create_session(&app).await;
    let base = format!("/sessions/{}", id);

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("{}/profiles", base),
        Some(json!({"profile": {"name": "active", "kind": "pollinations"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "POST", &format!("{}/profiles/active/activate", base), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send_json(&app, "GET", &format!("{}/active_profile", base), None).await;
    assert_eq!(body["name"], "active");

    let (status, body) = send_json(&app, "DELETE", &format!("{}/profiles/active", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "active");

    let (_, body) = send_json(&app, "GET", &format!("{}/profiles", base), None).await;
    assert_eq!(body["active"], "default");
    assert!(body["profiles"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["name"] != "active"));
}

#[tokio::test]
async fn test_generate_favorite_download_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/prompt/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(PNG.to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app();
    let id = create_session(&app).await;
    let base = format!("/sessions/{}", id);

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("{}/profiles", base),
        Some(json!({
            "previous_name": "default",
            "profile": {"name": "flowers", "kind": "pollinations", "base_url": server.uri()}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("{}/generate", base),
        Some(json!({
            "prompt": "a cat",
            "negative_prompt": "blurry",
            "style": "anime",
            "geometry": {"width": 896, "height": 1152}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let image_id = body["image_ids"][0].as_str().unwrap().to_string();
    let entry_id = body["entry"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["entry"]["prompt"], "a cat");
    assert_eq!(body["entry"]["metadata"]["style"], "Anime");

    let (_, body) = send_json(&app, "GET", &format!("{}/history", base), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send_json(&app, "GET", &format!("{}/history/{}/vary", base, entry_id), None).await;
    assert_eq!(body["negative_prompt"], "blurry");

    let (_, body) = send_json(&app, "GET", &format!("{}/history/{}/images", base, entry_id), None).await;
    assert_eq!(body[0]["ok"], true);

    let (status, body) = send_json(&app, "POST", &format!("{}/favorites/{}", base, image_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "added");

    let request = Request::builder()
        .uri(format!("{}/images/{}", base, image_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains(&format!("flux_{}.png", image_id)));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), PNG.as_slice());

    let (status, _) = send_json(&app, "DELETE", &format!("{}/history/{}", base, entry_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", &format!("{}/favorites", base), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &base, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("{}/favorites", base), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_on_single_image_provider_is_400() {
    let app = create_test_app();
    let id = create_session(&app).await;
    let base = format!("/sessions/{}", id);

    send_json(&app, "POST", &format!("{}/profiles/default/validate", base), None).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("{}/generate", base),
        Some(json!({"prompt": "a cat", "count": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}
