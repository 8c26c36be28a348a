//! Terminal board: swimlanes stacked vertically, columns side by side,
//! cards inside each cell. Cards are moved with a keyboard drag and
//! descriptions open in a detail view with a formatting toolbar.

pub mod app;
pub mod components;
pub mod cursor;
pub mod dialog;
pub mod drag;
pub mod editor;
pub mod events;
pub mod rich_text;
pub mod theme;
pub mod ui;

pub use app::{App, AppMode};
