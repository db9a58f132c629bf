//! Scene traversal: every object kind knows how to issue its own drawing
//! commands against a [`RenderTarget`].

use crate::rendering::{HAlign, RenderTarget, TextItem, Vertex};
use crate::{Dimensions, Rgba};

use super::{Axes, GraphicsObject, Handle, Line, Marker, Patch, Projection, SceneHost, Surface, Text};

/// State handed down the traversal.
#[derive(Clone, Copy)]
pub struct DrawContext<'a> {
    pub host: &'a dyn SceneHost,
    pub viewport: Dimensions,
    /// Data-to-window transform of the enclosing axes.
    pub projection: Option<Projection>,
}

impl DrawContext<'_> {
    fn project(&self, p: [f64; 3]) -> Option<Vertex> {
        self.projection.and_then(|proj| proj.project(p))
    }

    fn draw_children(&self, children: &[Handle], target: &mut dyn RenderTarget) {
        for &child in children {
            match self.host.resolve(child) {
                Some(obj) => obj.draw(self, target),
                None => log::debug!("skipping dangling child handle {}", child),
            }
        }
    }
}

/// Drawing capability of a scene object.
pub trait Draw {
    fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget);
}

/// Traverse the figure `figure` into `target`. Non-figure handles draw nothing.
pub fn draw_figure(host: &dyn SceneHost, figure: Handle, target: &mut dyn RenderTarget) {
    let Some(GraphicsObject::Figure(fig)) = host.resolve(figure) else {
        log::debug!("handle {} is not a figure, nothing to draw", figure);
        return;
    };
    let ctx = DrawContext {
        host,
        viewport: fig.dimensions(),
        projection: None,
    };
    target.begin(ctx.viewport, fig.color);
    ctx.draw_children(&fig.children, target);
}

impl Draw for GraphicsObject {
    fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        match self {
            // nested figures are not drawable
            GraphicsObject::Figure(_) => {}
            GraphicsObject::Axes(a) => a.draw(ctx, target),
            GraphicsObject::Line(l) => l.draw(ctx, target),
            GraphicsObject::Patch(p) => p.draw(ctx, target),
            GraphicsObject::Surface(s) => s.draw(ctx, target),
            GraphicsObject::Text(t) => t.draw(ctx, target),
        }
    }
}

impl Draw for Axes {
    fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        let projection = Projection::new(self, ctx.viewport);
        let [x0, x1] = self.xlim;
        let [y0, y1] = self.ylim;
        let z0 = self.zlim[0];
        let back: Vec<Vertex> = [[x0, y0, z0], [x1, y0, z0], [x1, y1, z0], [x0, y1, z0]]
            .into_iter()
            .filter_map(|p| projection.project(p))
            .collect();

        if back.len() == 4 {
            if let Some(color) = self.color {
                target.polygon(&back, color);
            }
            if let Some(color) = self.box_color {
                for i in 0..4 {
                    target.line(back[i], back[(i + 1) % 4], color, 0.5);
                }
            }
        }

        let inner = DrawContext {
            projection: Some(projection),
            ..*ctx
        };
        inner.draw_children(&self.children, target);

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            if target.text_enabled() {
                let [rx, ry, rw, rh] = projection.pixel_rect();
                let item = TextItem {
                    string: title.to_string(),
                    color: Rgba::BLACK,
                    font_size: 11.0,
                    halign: HAlign::Center,
                };
                target.text(Vertex::new(rx + rw / 2.0, ry + rh + 4.0, 0.0), &item);
            }
        }
    }
}

impl Draw for Line {
    fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        let points: Vec<Option<Vertex>> = (0..self.len())
            .map(|i| self.point(i).and_then(|p| ctx.project(p)))
            .collect();

        for pair in points.windows(2) {
            if let [Some(a), Some(b)] = pair {
                target.line(*a, *b, self.color, self.line_width);
            }
        }

        let Some(marker) = self.marker else {
            return;
        };
        let size = self.marker_size;
        for v in points.iter().flatten() {
            match marker {
                Marker::Point => target.point(*v, self.color, (size / 3.0).max(1.0)),
                Marker::Square => {
                    let h = size / 2.0;
                    let corners = [
                        Vertex::new(v.x - h, v.y - h, v.z),
                        Vertex::new(v.x + h, v.y - h, v.z),
                        Vertex::new(v.x + h, v.y + h, v.z),
                        Vertex::new(v.x - h, v.y + h, v.z),
                    ];
                    for i in 0..4 {
                        target.line(corners[i], corners[(i + 1) % 4], self.color, self.line_width);
                    }
                }
                Marker::Plus => {
                    let h = size / 2.0;
                    target.line(
                        Vertex::new(v.x - h, v.y, v.z),
                        Vertex::new(v.x + h, v.y, v.z),
                        self.color,
                        self.line_width,
                    );
                    target.line(
                        Vertex::new(v.x, v.y - h, v.z),
                        Vertex::new(v.x, v.y + h, v.z),
                        self.color,
                        self.line_width,
                    );
                }
            }
        }
    }
}

impl Draw for Patch {
    fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        let color = self.face_color.with_alpha(self.face_color.a * self.face_alpha);
        for face in &self.faces {
            let polygon: Option<Vec<Vertex>> = face
                .iter()
                .map(|&i| self.vertices.get(i).and_then(|&p| ctx.project(p)))
                .collect();
            let Some(polygon) = polygon.filter(|p| p.len() >= 3) else {
                continue;
            };
            target.polygon(&polygon, color);
            if let Some(edge) = self.edge_color {
                for i in 0..polygon.len() {
                    target.line(polygon[i], polygon[(i + 1) % polygon.len()], edge, 0.5);
                }
            }
        }
    }
}

impl Draw for Surface {
    fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        let Some((zmin, zmax)) = self.z_range() else {
            return;
        };
        let zspan = if zmax > zmin { zmax - zmin } else { 1.0 };
        let at = |row: usize, col: usize| -> Option<[f64; 3]> {
            let z = *self.zdata.get(row)?.get(col)?;
            Some([*self.xdata.get(col)?, *self.ydata.get(row)?, z])
        };

        for row in 0..self.ydata.len().saturating_sub(1) {
            for col in 0..self.xdata.len().saturating_sub(1) {
                let cell = [
                    at(row, col),
                    at(row, col + 1),
                    at(row + 1, col + 1),
                    at(row + 1, col),
                ];
                let Some(cell) = cell.into_iter().collect::<Option<Vec<[f64; 3]>>>() else {
                    continue;
                };
                let Some(quad) = cell.iter().map(|&p| ctx.project(p)).collect::<Option<Vec<Vertex>>>()
                else {
                    continue;
                };
                let mean = cell.iter().map(|p| p[2]).sum::<f64>() / 4.0;
                let t = ((mean - zmin) / zspan) as f32;
                target.polygon(&quad, self.low_color.lerp(self.high_color, t));
                if let Some(edge) = self.edge_color {
                    for i in 0..4 {
                        target.line(quad[i], quad[(i + 1) % 4], edge, 0.5);
                    }
                }
            }
        }
    }
}

impl Draw for Text {
    fn draw(&self, ctx: &DrawContext<'_>, target: &mut dyn RenderTarget) {
        if !target.text_enabled() || self.string.is_empty() {
            return;
        }
        let Some(at) = ctx.project(self.position) else {
            return;
        };
        let item = TextItem {
            string: self.string.clone(),
            color: self.color,
            font_size: self.font_size,
            halign: self.halign,
        };
        target.text(at, &item);
    }
}
