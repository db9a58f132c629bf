//! JSON scene descriptions.
//!
//! ```json
//! {
//!   "figures": [{
//!     "position": [0, 0, 320, 240],
//!     "axes": [{
//!       "title": "sine",
//!       "children": [
//!         { "type": "line", "xdata": [0, 0.5, 1], "ydata": [0, 1, 0] }
//!       ]
//!     }]
//!   }]
//! }
//! ```

use serde::Deserialize;

use crate::Rgba;

use super::{Axes, Figure, Line, Patch, Surface, Text};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub figures: Vec<FigureSpec>,
}

impl SceneFile {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FigureSpec {
    pub position: [f64; 4],
    pub color: Rgba,
    pub visible: bool,
    pub axes: Vec<AxesSpec>,
}

impl Default for FigureSpec {
    fn default() -> Self {
        let fig = Figure::default();
        Self {
            position: fig.position,
            color: fig.color,
            visible: fig.visible,
            axes: Vec::new(),
        }
    }
}

impl FigureSpec {
    /// The figure object without children.
    pub fn to_figure(&self) -> Figure {
        Figure {
            position: self.position,
            color: self.color,
            visible: self.visible,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AxesSpec {
    pub position: [f64; 4],
    pub xlim: [f64; 2],
    pub ylim: [f64; 2],
    pub zlim: [f64; 2],
    pub view: [f64; 2],
    pub color: Option<Rgba>,
    pub box_color: Option<Rgba>,
    pub title: Option<String>,
    pub children: Vec<ChildSpec>,
}

impl Default for AxesSpec {
    fn default() -> Self {
        let axes = Axes::default();
        Self {
            position: axes.position,
            xlim: axes.xlim,
            ylim: axes.ylim,
            zlim: axes.zlim,
            view: axes.view,
            color: axes.color,
            box_color: axes.box_color,
            title: None,
            children: Vec::new(),
        }
    }
}

impl AxesSpec {
    /// The axes object without children.
    pub fn to_axes(&self) -> Axes {
        Axes {
            position: self.position,
            xlim: self.xlim,
            ylim: self.ylim,
            zlim: self.zlim,
            view: self.view,
            color: self.color,
            box_color: self.box_color,
            title: self.title.clone(),
            children: Vec::new(),
        }
    }
}

/// A plot object inside an axes, tagged by `"type"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildSpec {
    Line(Line),
    Patch(Patch),
    Surface(Surface),
    Text(Text),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::HAlign;

    #[test]
    fn parses_nested_scene_with_defaults() {
        let json = r#"{
            "figures": [{
                "position": [0, 0, 320, 240],
                "axes": [{
                    "view": [-37.5, 30],
                    "children": [
                        { "type": "line", "xdata": [0, 1], "ydata": [1, 0], "color": [1, 0, 0] },
                        { "type": "text", "position": [0.5, 0.5, 0], "string": "hi", "halign": "center" },
                        { "type": "patch", "vertices": [[0,0,0],[1,0,0],[0,1,0]], "faces": [[0,1,2]], "face_alpha": 0.5 }
                    ]
                }]
            }]
        }"#;
        let scene = SceneFile::from_json(json).unwrap();
        let fig = &scene.figures[0];
        assert_eq!(fig.position[2], 320.0);
        assert!(fig.visible);
        let axes = &fig.axes[0];
        assert_eq!(axes.view, [-37.5, 30.0]);
        assert_eq!(axes.xlim, [0.0, 1.0]);
        match &axes.children[..] {
            [ChildSpec::Line(l), ChildSpec::Text(t), ChildSpec::Patch(p)] => {
                assert_eq!(l.color, Rgba::rgb(1.0, 0.0, 0.0));
                assert_eq!(l.line_width, 0.5);
                assert_eq!(t.halign, HAlign::Center);
                assert_eq!(p.face_alpha, 0.5);
            }
            other => panic!("unexpected children: {:?}", other),
        }
    }

    #[test]
    fn unknown_child_type_is_a_scene_error() {
        let json = r#"{ "figures": [{ "axes": [{ "children": [{ "type": "bar" }] }] }] }"#;
        assert!(matches!(
            SceneFile::from_json(json),
            Err(crate::Error::SceneError(_))
        ));
    }
}
