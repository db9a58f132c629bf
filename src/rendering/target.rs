//! The drawing surface seam shared by the rasterizer and the vector exporter.

use serde::Deserialize;

use crate::{Dimensions, Rgba};

/// A point in window coordinates.
///
/// `x`/`y` are pixels from the bottom-left corner, `z` is depth in `[0, 1]`
/// with 0 nearest to the viewer.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Point on the segment `self -> other` at parameter `t`.
    #[inline]
    pub fn lerp(self, other: Vertex, t: f64) -> Vertex {
        Vertex {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Horizontal text alignment relative to the anchor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A string to place at an anchor; the anchor sits on the text baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub string: String,
    pub color: Rgba,
    pub font_size: f64,
    pub halign: HAlign,
}

/// Receiver of the drawing commands produced by a scene traversal.
///
/// The traversal calls `begin` once, then any number of primitives in scene
/// order. Implementations decide whether primitives are composited
/// immediately (raster) or collected and depth-sorted (vector).
pub trait RenderTarget {
    /// Start a frame of the given size, cleared to `background`.
    fn begin(&mut self, viewport: Dimensions, background: Rgba);

    /// Filled convex polygon.
    fn polygon(&mut self, vertices: &[Vertex], color: Rgba);

    /// Line segment `width` pixels wide.
    fn line(&mut self, from: Vertex, to: Vertex, color: Rgba, width: f64);

    /// Square point marker `size` pixels wide.
    fn point(&mut self, at: Vertex, color: Rgba, size: f64);

    /// Text anchored at `at`.
    fn text(&mut self, at: Vertex, item: &TextItem);

    /// When false the traversal skips text objects without laying them out.
    fn text_enabled(&self) -> bool {
        true
    }
}
