//! HTTP boundary tests
//!
//! Exercises the router end-to-end with in-process requests: multipart
//! creation, JSON lookup, raw blob download, and error translation.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pastebox::config::Config;
use pastebox::http_server::HttpServer;
use pastebox::store::PasteStore;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pastebox-test-boundary";

fn test_router(temp: &TempDir) -> Router {
    let config: Config = serde_json::from_value(serde_json::json!({
        "data_dir": temp.path().to_string_lossy(),
    }))
    .unwrap();

    let store = PasteStore::open(temp.path(), config.max_upload_bytes).unwrap();
    HttpServer::new(config, store).router()
}

fn multipart_body(text: Option<&str>, file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(text) = text {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{}\r\n",
                BOUNDARY, text
            )
            .as_bytes(),
        );
    }

    if let Some((name, mime, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, mime
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn create_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/paste")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let temp = TempDir::new().unwrap();
    let app = test_router(&temp);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_text_paste() {
    let temp = TempDir::new().unwrap();
    let app = test_router(&temp);

    let response = app
        .clone()
        .oneshot(create_request(multipart_body(Some("hello"), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["url"], format!("/api/paste/{}", id));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/paste/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["text"], "hello");
    assert!(body["file"].is_null());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_create_with_file_and_download() {
    let temp = TempDir::new().unwrap();
    let app = test_router(&temp);

    let payload = b"\x89PNG fake image bytes";
    let response = app
        .clone()
        .oneshot(create_request(multipart_body(
            Some("caption"),
            Some(("shot.png", "image/png", payload)),
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/paste/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["text"], "caption");
    assert_eq!(body["file"]["original_name"], "shot.png");
    assert_eq!(body["file"]["mime_type"], "image/png");
    assert_eq!(body["file"]["size"], payload.len() as u64);

    let blob_url = body["file"]["url"].as_str().unwrap().to_string();
    assert!(blob_url.starts_with("/uploads/"));

    let response = app
        .oneshot(Request::builder().uri(blob_url).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], &payload[..]);
}

#[tokio::test]
async fn test_empty_submission_rejected() {
    let temp = TempDir::new().unwrap();
    let app = test_router(&temp);

    let response = app
        .oneshot(create_request(multipart_body(None, None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_second_attachment_rejected() {
    let temp = TempDir::new().unwrap();
    let app = test_router(&temp);

    let mut body = Vec::new();
    for name in ["a.bin", "b.bin"] {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\nxx\r\n",
                BOUNDARY, name
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let response = app.oneshot(create_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_paste_is_404() {
    let temp = TempDir::new().unwrap();
    let app = test_router(&temp);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/paste/ffffffffff")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_unknown_blob_is_404() {
    let temp = TempDir::new().unwrap();
    let app = test_router(&temp);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/uploads/1716000000000-deadbeef.bin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
