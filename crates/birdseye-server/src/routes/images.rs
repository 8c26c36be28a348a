use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::unsupported;
use crate::state::AppState;

/// Streams a card image out of storage. `id` is the object path inside the
/// image bucket and may contain slashes.
pub async fn get_image(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.images.fetch_image(&id).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&id).first_or_octet_stream();
            tracing::debug!("Serving image {} ({} bytes, {})", id, bytes.len(), mime);
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(e) => {
            tracing::warn!("Image {} unavailable: {}", id, e);
            unsupported().await.into_response()
        }
    }
}
