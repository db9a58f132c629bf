//! Scene graph collaborator.
//!
//! The renderer only sees figures through the [`SceneHost`] seam: handle
//! resolution, bounding boxes and visibility. [`GraphicsManager`] is the
//! in-memory implementation shipped with the crate.

mod draw;
mod file;
mod manager;
mod object;
mod projection;

pub use draw::{draw_figure, Draw, DrawContext};
pub use file::{AxesSpec, ChildSpec, FigureSpec, SceneFile};
pub use manager::GraphicsManager;
pub use object::{Axes, Figure, GraphicsObject, Line, Marker, Patch, Surface, Text};
pub use projection::Projection;

use std::fmt;

/// Handle of an object owned by a [`SceneHost`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub u32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position and size of a figure, `(x, y, width, height)` in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Object management as seen by the renderer.
pub trait SceneHost {
    /// Look up a live object.
    fn resolve(&self, handle: Handle) -> Option<&GraphicsObject>;

    /// Whether `obj` can be rendered as a root.
    fn is_figure_root(&self, obj: &GraphicsObject) -> bool {
        matches!(obj, GraphicsObject::Figure(_))
    }

    /// Bounding box of a figure. `internal` selects pixel coordinates with a
    /// bottom-left origin; otherwise `y` is measured from the top of the screen.
    fn bounding_box(&self, figure: Handle, internal: bool) -> Option<BoundingBox>;

    fn is_visible(&self, figure: Handle) -> bool;

    fn set_visible(&mut self, figure: Handle, visible: bool);
}
