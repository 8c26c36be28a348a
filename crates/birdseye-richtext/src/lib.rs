//! Rich-text card descriptions.
//!
//! Descriptions are stored as HTML strings. This crate parses them into a
//! small document model for display, turns edited markdown back into HTML,
//! and exposes the formatting toolbar with per-selection state.

pub mod document;
pub mod editor;
pub mod html;
pub mod markdown;
pub mod toolbar;

pub use document::{Block, Document, ListItem, ListKind, Mark, TextRun};
pub use editor::{Editor, Selection};
pub use toolbar::{Toolbar, ToolbarCommand, ToolbarItem};
