//! Depth-sorted vector export.
//!
//! A figure is traversed into flat 2D primitives that keep their window
//! depth, sorted back to front (simple or BSP) and handed to a format writer.
//! The writers live behind the `vector` feature.

mod flags;
mod primitive;
mod renderer;
pub mod sort;

#[cfg(feature = "vector")]
pub mod writer;

pub use flags::{Format, FormatFlags, SortMode};
pub use primitive::{Document, Primitive};
pub use renderer::VectorExportRenderer;
pub use sort::depth_sort;
