use crate::rendering::{TextItem, Vertex};
use crate::Rgba;

/// A 2D drawing primitive with window-space depth.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Polygon { vertices: Vec<Vertex>, color: Rgba },
    Line { from: Vertex, to: Vertex, color: Rgba, width: f64 },
    Point { at: Vertex, color: Rgba, size: f64 },
    Text { at: Vertex, item: TextItem },
}

impl Primitive {
    /// Mean depth of the primitive's vertices.
    pub fn depth(&self) -> f64 {
        match self {
            Primitive::Polygon { vertices, .. } => {
                if vertices.is_empty() {
                    return 0.0;
                }
                vertices.iter().map(|v| v.z).sum::<f64>() / vertices.len() as f64
            }
            Primitive::Line { from, to, .. } => (from.z + to.z) / 2.0,
            Primitive::Point { at, .. } | Primitive::Text { at, .. } => at.z,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Primitive::Text { .. })
    }
}

/// A depth-sorted page ready to be written in some format.
///
/// Coordinates are window pixels with a bottom-left origin; writers use one
/// pixel per point.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    pub title: String,
    /// Back to front.
    pub primitives: Vec<Primitive>,
}

impl Document {
    pub fn text_count(&self) -> usize {
        self.primitives.iter().filter(|p| p.is_text()).count()
    }
}
