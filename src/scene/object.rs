use serde::Deserialize;

use crate::rendering::HAlign;
use crate::{Dimensions, Rgba};

use super::Handle;

/// Closed set of scene objects.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsObject {
    Figure(Figure),
    Axes(Axes),
    Line(Line),
    Patch(Patch),
    Surface(Surface),
    Text(Text),
}

impl GraphicsObject {
    pub fn kind(&self) -> &'static str {
        match self {
            GraphicsObject::Figure(_) => "figure",
            GraphicsObject::Axes(_) => "axes",
            GraphicsObject::Line(_) => "line",
            GraphicsObject::Patch(_) => "patch",
            GraphicsObject::Surface(_) => "surface",
            GraphicsObject::Text(_) => "text",
        }
    }

    pub fn children(&self) -> &[Handle] {
        match self {
            GraphicsObject::Figure(f) => &f.children,
            GraphicsObject::Axes(a) => &a.children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Handle>> {
        match self {
            GraphicsObject::Figure(f) => Some(&mut f.children),
            GraphicsObject::Axes(a) => Some(&mut a.children),
            _ => None,
        }
    }
}

/// Top-level window-like object; the root of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// `[x, y, width, height]` in pixels, origin bottom-left.
    pub position: [f64; 4],
    pub color: Rgba,
    pub visible: bool,
    pub children: Vec<Handle>,
}

impl Figure {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            position: [0.0, 0.0, width, height],
            ..Default::default()
        }
    }

    /// Pixel size, truncated toward zero; negative sizes count as zero.
    pub fn dimensions(&self) -> Dimensions {
        let clamp = |v: f64| {
            if v.is_finite() && v > 0.0 {
                v.min(u32::MAX as f64) as u32
            } else {
                0
            }
        };
        Dimensions::new(clamp(self.position[2]), clamp(self.position[3]))
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 560.0, 420.0],
            color: Rgba::WHITE,
            visible: true,
            children: Vec::new(),
        }
    }
}

/// Coordinate system holding plot objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    /// `[left, bottom, width, height]` normalized to the figure.
    pub position: [f64; 4],
    pub xlim: [f64; 2],
    pub ylim: [f64; 2],
    pub zlim: [f64; 2],
    /// `[azimuth, elevation]` in degrees.
    pub view: [f64; 2],
    /// Background of the back plane; `None` leaves it transparent.
    pub color: Option<Rgba>,
    /// Frame around the back plane; `None` draws no frame.
    pub box_color: Option<Rgba>,
    pub title: Option<String>,
    pub children: Vec<Handle>,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            position: [0.13, 0.11, 0.775, 0.815],
            xlim: [0.0, 1.0],
            ylim: [0.0, 1.0],
            zlim: [-1.0, 1.0],
            view: [0.0, 90.0],
            color: Some(Rgba::WHITE),
            box_color: Some(Rgba::BLACK),
            title: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Point,
    Plus,
    Square,
}

/// Polyline through `(xdata[i], ydata[i], zdata[i])`.
///
/// Missing z values are 0; non-finite points break the line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Line {
    pub xdata: Vec<f64>,
    pub ydata: Vec<f64>,
    pub zdata: Vec<f64>,
    pub color: Rgba,
    pub line_width: f64,
    pub marker: Option<Marker>,
    pub marker_size: f64,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            xdata: Vec::new(),
            ydata: Vec::new(),
            zdata: Vec::new(),
            color: Rgba::rgb(0.0, 0.447, 0.741),
            line_width: 0.5,
            marker: None,
            marker_size: 6.0,
        }
    }
}

impl Line {
    pub fn point(&self, i: usize) -> Option<[f64; 3]> {
        let x = *self.xdata.get(i)?;
        let y = *self.ydata.get(i)?;
        let z = self.zdata.get(i).copied().unwrap_or(0.0);
        Some([x, y, z])
    }

    pub fn len(&self) -> usize {
        self.xdata.len().min(self.ydata.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Polygons given as faces indexing into a shared vertex list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Patch {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Vec<usize>>,
    pub face_color: Rgba,
    pub face_alpha: f32,
    pub edge_color: Option<Rgba>,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            face_color: Rgba::rgb(0.0, 0.447, 0.741),
            face_alpha: 1.0,
            edge_color: Some(Rgba::BLACK),
        }
    }
}

/// Height field over the grid `xdata` x `ydata`; `zdata[row][col]` pairs
/// with `ydata[row]` and `xdata[col]`.
///
/// Cells are colored between `low_color` and `high_color` by mean height.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Surface {
    pub xdata: Vec<f64>,
    pub ydata: Vec<f64>,
    pub zdata: Vec<Vec<f64>>,
    pub low_color: Rgba,
    pub high_color: Rgba,
    pub edge_color: Option<Rgba>,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            xdata: Vec::new(),
            ydata: Vec::new(),
            zdata: Vec::new(),
            low_color: Rgba::rgb(0.267, 0.005, 0.329),
            high_color: Rgba::rgb(0.993, 0.906, 0.144),
            edge_color: Some(Rgba::BLACK),
        }
    }
}

impl Surface {
    /// Finite `(min, max)` of the height data.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.zdata
            .iter()
            .flatten()
            .copied()
            .filter(|z| z.is_finite())
            .fold(None, |acc, z| match acc {
                None => Some((z, z)),
                Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
            })
    }
}

/// A string placed in data coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Text {
    pub position: [f64; 3],
    pub string: String,
    pub color: Rgba,
    pub font_size: f64,
    pub halign: HAlign,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            string: String::new(),
            color: Rgba::BLACK,
            font_size: 10.0,
            halign: HAlign::Left,
        }
    }
}
