//! offprint
//!
//! Off-screen rendering of figure scene graphs. A figure is drawn into a
//! software rendering context without any visible display surface and the
//! result is handed back either as an RGB image tensor or as a depth-sorted
//! vector document (eps, ps, pdf, svg, pgf, tex).
//!
//! # Features
//!
//! - **Raster mode**: renders into an RGBA pixel buffer and returns a
//!   `(3, height, width)` [`ImageTensor`] with a top-left origin
//! - **Vector mode** (feature `vector`, default): exports simple or BSP
//!   depth-sorted primitives to one or more page-description formats
//! - **Context hygiene**: the off-screen context is destroyed on every exit
//!   path and the previously current on-screen context is re-selected
//!
//! # Example
//!
//! ```no_run
//! use offprint::scene::{Axes, GraphicsManager, GraphicsObject, Line};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut manager = GraphicsManager::new();
//! let figure = manager.add_figure(Default::default());
//! let axes = manager.add_child(figure, GraphicsObject::Axes(Axes::default()))?;
//! manager.add_child(
//!     axes,
//!     GraphicsObject::Line(Line {
//!         xdata: vec![0.0, 0.5, 1.0],
//!         ydata: vec![0.0, 1.0, 0.0],
//!         ..Default::default()
//!     }),
//! )?;
//!
//! let image = offprint::render_image(&mut manager, figure)?;
//! println!("shape: {:?}", image.shape());
//!
//! offprint::render_to_file(&mut manager, figure, "figure.svg", "svgis2D")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::Deserialize;

pub mod error;
pub use error::{Error, Result};

pub mod logging;

// Scene graph collaborator: object model, handle manager, traversal
pub mod scene;

// Software context, rasterizer and image extraction
pub mod rendering;

// Depth-sorted vector export
pub mod export;

pub mod session;

pub use export::{Format, FormatFlags, SortMode};
pub use rendering::{ImageTensor, PixelBuffer};
pub use scene::{GraphicsManager, Handle, SceneHost};
pub use session::{OutputMode, RenderOutput, RenderSession, SessionState};

/// Whether this build carries the vector document writers.
pub const VECTOR_EXPORT_AVAILABLE: bool = cfg!(feature = "vector");

/// Configuration for a render session
///
/// The rendering context itself is not configurable (see
/// [`rendering::ContextConfig::SOFTWARE`]); these options cover the limits and
/// output metadata around it.
///
/// # Examples
///
/// ```
/// let cfg = offprint::PrintConfig::default();
/// assert_eq!(cfg.max_viewport, 16384);
/// assert!(cfg.log_capabilities);
/// ```
#[derive(Debug, Clone)]
pub struct PrintConfig {
    /// Largest width or height an off-screen context accepts
    pub max_viewport: u32,
    /// Query and log the effective depth/stencil/accumulation bits after bind
    pub log_capabilities: bool,
    /// Plane classification tolerance for BSP depth sorting, in pixels with
    /// depth stretched by [`export::sort::DEPTH_SCALE`]
    pub bsp_epsilon: f64,
    /// Title written into the metadata of exported documents
    pub document_title: String,
    /// Runtime capability flag for vector export
    pub vector_export: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            max_viewport: rendering::MAX_VIEWPORT,
            log_capabilities: true,
            bsp_epsilon: 1e-3,
            document_title: "offprint figure".to_string(),
            vector_export: VECTOR_EXPORT_AVAILABLE,
        }
    }
}

/// Pixel dimensions of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte length of an RGBA buffer of these dimensions, `None` on overflow.
    pub fn rgba_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4))
    }
}

/// Straight-alpha RGBA color with components in `[0, 1]`.
///
/// Scene files spell colors as `[r, g, b]` or `[r, g, b, a]`.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f32>")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation between `self` (t = 0) and `other` (t = 1).
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Quantizes to 8-bit RGBA.
    pub fn to_u8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::BLACK
    }
}

impl TryFrom<Vec<f32>> for Rgba {
    type Error = String;

    fn try_from(v: Vec<f32>) -> std::result::Result<Self, Self::Error> {
        match v.as_slice() {
            [r, g, b] => Ok(Rgba::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Rgba::new(*r, *g, *b, *a)),
            _ => Err(format!("color needs 3 or 4 components, got {}", v.len())),
        }
    }
}

/// Render a figure off-screen and return its RGB image.
pub fn render_image(host: &mut dyn SceneHost, handle: Handle) -> Result<ImageTensor> {
    RenderSession::new(PrintConfig::default()).render_image(host, handle)
}

/// Render a figure off-screen and export it to `path`.
///
/// `term` is a concatenation of the tokens `eps`, `pdf`, `ps`, `svg`, `pgf`,
/// `tex`, `is2D` and `notext`, matched case-insensitively.
pub fn render_to_file(
    host: &mut dyn SceneHost,
    handle: Handle,
    path: impl AsRef<Path>,
    term: &str,
) -> Result<()> {
    RenderSession::new(PrintConfig::default())
        .render_to_file(host, handle, path.as_ref(), term)
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PrintConfig::default();
        assert_eq!(config.max_viewport, 16384);
        assert_eq!(config.vector_export, VECTOR_EXPORT_AVAILABLE);
        assert_eq!(config.document_title, "offprint figure");
    }

    #[test]
    fn test_dimensions() {
        let dims = Dimensions::new(1920, 1080);
        assert_eq!(dims.rgba_len(), Some(1920 * 1080 * 4));
        assert!(!dims.is_empty());
        assert!(Dimensions::new(0, 10).is_empty());
    }

    #[test]
    fn color_parses_from_arrays() {
        let c: Rgba = serde_json::from_str("[1.0, 0.5, 0.0]").unwrap();
        assert_eq!(c, Rgba::rgb(1.0, 0.5, 0.0));
        let c: Rgba = serde_json::from_str("[0, 0, 1, 0.25]").unwrap();
        assert_eq!(c.a, 0.25);
        assert!(serde_json::from_str::<Rgba>("[1, 2]").is_err());
    }

    #[test]
    fn color_quantizes_and_blends() {
        assert_eq!(Rgba::WHITE.to_u8(), [255, 255, 255, 255]);
        assert_eq!(Rgba::new(2.0, -1.0, 0.5, 1.0).to_u8(), [255, 0, 128, 255]);
        let mid = Rgba::BLACK.lerp(Rgba::WHITE, 0.5);
        assert_eq!(mid.to_u8(), [128, 128, 128, 255]);
    }
}
