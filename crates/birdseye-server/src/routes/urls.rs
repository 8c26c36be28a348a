use axum::Json;
use serde_json::{json, Value};

/// Link preview metadata for the description editor's link tool. The
/// payload is fixed; no URL is fetched.
pub async fn fetch_url_meta() -> Json<Value> {
    Json(json!({
        "success": 1,
        "meta": {
            "title": "CodeX Team",
            "description": "Club of web-development, design and marketing. We build team learning how to build full-valued projects on the world market.",
            "image": {
                "url": "https://codex.so/public/app/img/meta_img.png"
            }
        }
    }))
}
