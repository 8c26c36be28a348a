use birdseye_gateway::ImageSource;
use std::sync::Arc;

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub images: Arc<dyn ImageSource>,
}

impl AppState {
    pub fn new(images: Arc<dyn ImageSource>) -> Self {
        Self { images }
    }
}
