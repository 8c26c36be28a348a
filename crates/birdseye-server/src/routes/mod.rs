pub mod images;
pub mod urls;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Answer for any method or failure the endpoints do not handle.
pub async fn unsupported() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Unsupported Request" })),
    )
}
