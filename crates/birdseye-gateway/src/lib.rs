//! Access to the remote tables that own all board data.
//!
//! The board only ever reads whole tables, inserts single rows and
//! batch-upserts rows. [`RemoteGateway`] captures exactly that surface; the
//! backends differ in where the rows live.

pub mod atomic_writer;
pub mod filter;
pub mod image;
pub mod json_file;
pub mod memory;
pub mod rest;
pub mod table_set;
pub mod traits;

pub use atomic_writer::AtomicWriter;
pub use filter::RowFilter;
pub use image::{DirectoryImageSource, ImageSource, SignedUrlImageSource};
pub use json_file::JsonFileGateway;
pub use memory::MemoryGateway;
pub use rest::RestGateway;
pub use table_set::TableSet;
pub use traits::RemoteGateway;
