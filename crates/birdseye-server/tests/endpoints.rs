use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use birdseye_core::{BoardError, BoardResult};
use birdseye_gateway::{DirectoryImageSource, ImageSource};
use birdseye_server::{create_router, AppState};
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Serves fixed bytes and records the requested ids.
#[derive(Default)]
struct FakeImages {
    requested: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn fetch_image(&self, id: &str) -> BoardResult<Vec<u8>> {
        self.requested.lock().unwrap().push(id.to_string());
        if id.starts_with("missing") {
            return Err(BoardError::Remote {
                status: 404,
                message: "Object not found".into(),
            });
        }
        Ok(format!("image:{}", id).into_bytes())
    }
}

fn app(images: Arc<FakeImages>) -> Router {
    create_router(AppState::new(images))
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

#[tokio::test]
async fn image_get_streams_bytes_with_content_type() {
    let images = Arc::new(FakeImages::default());
    let response = app(images.clone())
        .oneshot(request("GET", "/api/images/cards/42/photo.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        body_bytes(response.into_body()).await,
        b"image:cards/42/photo.png"
    );
    assert_eq!(*images.requested.lock().unwrap(), vec!["cards/42/photo.png"]);
}

#[tokio::test]
async fn unknown_extension_is_octet_stream() {
    let response = app(Arc::default())
        .oneshot(request("GET", "/api/images/blob"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
}

#[tokio::test]
async fn other_methods_are_unsupported() {
    let images = Arc::new(FakeImages::default());
    for method in ["POST", "PUT", "DELETE"] {
        let response = app(images.clone())
            .oneshot(request(method, "/api/images/a.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", method);
        assert_eq!(
            body_json(response.into_body()).await,
            serde_json::json!({"message": "Unsupported Request"})
        );
    }
    assert!(images.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn storage_failure_is_unsupported() {
    let response = app(Arc::default())
        .oneshot(request("GET", "/api/images/missing.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response.into_body()).await["message"],
        "Unsupported Request"
    );
}

#[tokio::test]
async fn url_fetch_answers_any_method() {
    for method in ["GET", "POST"] {
        let response = app(Arc::default())
            .oneshot(request(method, "/api/urls/fetch"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response.into_body()).await;
        assert_eq!(json["success"], 1);
        assert_eq!(json["meta"]["title"], "CodeX Team");
        assert_eq!(
            json["meta"]["image"]["url"],
            "https://codex.so/public/app/img/meta_img.png"
        );
    }
}

#[tokio::test]
async fn directory_source_serves_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("logo.svg"), b"<svg/>").unwrap();
    let app = create_router(AppState::new(Arc::new(DirectoryImageSource::new(dir.path()))));

    let response = app
        .clone()
        .oneshot(request("GET", "/api/images/logo.svg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    assert_eq!(body_bytes(response.into_body()).await, b"<svg/>");

    let escape = app
        .oneshot(request("GET", "/api/images/..%2F..%2Fetc%2Fpasswd"))
        .await
        .unwrap();
    assert_eq!(escape.status(), StatusCode::BAD_REQUEST);
}
