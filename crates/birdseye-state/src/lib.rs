//! The board's single state container.
//!
//! [`BoardStore`] owns the current snapshot. Every mutation is a named action:
//! reorders apply locally at once, everything else applies when the backend
//! answers. Remote writes run as background tasks whose completions come
//! back as [`RemoteEvent`]s on the UI task.

pub mod event;
pub mod store;

pub use event::{Action, RemoteEvent};
pub use store::BoardStore;
