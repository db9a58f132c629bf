use std::io::Write;

use crate::rendering::{RenderTarget, TextItem, Vertex};
use crate::scene::{draw_figure, Handle, SceneHost};
use crate::{Dimensions, Rgba};

use super::sort::depth_sort;
use super::{Document, FormatFlags, Primitive};

/// Collects the traversal's drawing commands as primitives.
struct Collector {
    viewport: Dimensions,
    background: Rgba,
    text: bool,
    primitives: Vec<Primitive>,
}

impl RenderTarget for Collector {
    fn begin(&mut self, viewport: Dimensions, background: Rgba) {
        self.viewport = viewport;
        self.background = background;
        self.primitives.clear();
    }

    fn polygon(&mut self, vertices: &[Vertex], color: Rgba) {
        if vertices.len() >= 3 {
            self.primitives.push(Primitive::Polygon {
                vertices: vertices.to_vec(),
                color,
            });
        }
    }

    fn line(&mut self, from: Vertex, to: Vertex, color: Rgba, width: f64) {
        self.primitives.push(Primitive::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn point(&mut self, at: Vertex, color: Rgba, size: f64) {
        self.primitives.push(Primitive::Point { at, color, size });
    }

    fn text(&mut self, at: Vertex, item: &TextItem) {
        if self.text {
            self.primitives.push(Primitive::Text {
                at,
                item: item.clone(),
            });
        }
    }

    fn text_enabled(&self) -> bool {
        self.text
    }
}

/// Draws a scene as depth-sorted 2D primitives and writes them as a
/// page-description document.
#[derive(Debug, Clone)]
pub struct VectorExportRenderer {
    title: String,
    epsilon: f64,
}

impl VectorExportRenderer {
    pub fn new(title: impl Into<String>, epsilon: f64) -> Self {
        Self {
            title: title.into(),
            epsilon,
        }
    }

    /// Traverse and sort `figure` without writing anything.
    pub fn document(&self, host: &dyn SceneHost, figure: Handle, flags: &FormatFlags) -> Document {
        let mut collector = Collector {
            viewport: Dimensions::default(),
            background: Rgba::WHITE,
            text: flags.text,
            primitives: Vec::new(),
        };
        draw_figure(host, figure, &mut collector);

        Document {
            width: collector.viewport.width,
            height: collector.viewport.height,
            background: collector.background,
            title: self.title.clone(),
            primitives: depth_sort(collector.primitives, flags.sort, self.epsilon),
        }
    }

    /// Render `figure` in the primary format of `flags` into `sink`.
    ///
    /// The sink is neither opened nor closed here.
    #[cfg(feature = "vector")]
    pub fn draw(
        &self,
        host: &dyn SceneHost,
        figure: Handle,
        sink: &mut dyn Write,
        flags: &FormatFlags,
    ) -> crate::Result<()> {
        let doc = self.document(host, figure, flags);
        log::debug!(
            "writing {} document: {} primitives, {} text",
            flags.primary(),
            doc.primitives.len(),
            doc.text_count()
        );
        super::writer::writer_for(flags.primary()).write(&doc, sink)?;
        Ok(())
    }

    #[cfg(not(feature = "vector"))]
    pub fn draw(
        &self,
        _host: &dyn SceneHost,
        _figure: Handle,
        _sink: &mut dyn Write,
        flags: &FormatFlags,
    ) -> crate::Result<()> {
        Err(crate::Error::UnsupportedBuildConfiguration(format!(
            "{} export requires the `vector` feature",
            flags.primary()
        )))
    }
}
