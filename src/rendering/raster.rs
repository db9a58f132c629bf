//! Software rasterizer drawing into the bound off-screen context.

use crate::scene::{draw_figure, Handle, SceneHost};
use crate::{Dimensions, Rgba};

use super::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::{HAlign, OffscreenContext, PixelBuffer, RenderTarget, TextItem, Vertex};

/// Draws a scene into an [`OffscreenContext`]'s color and depth buffers.
///
/// Polygons are filled at pixel centers with a 16-bit depth test (less or
/// equal) and source-over blending. Drawing on an unbound context is a no-op.
pub struct RasterRenderer<'a> {
    ctx: &'a mut OffscreenContext,
}

impl<'a> RasterRenderer<'a> {
    pub fn new(ctx: &'a mut OffscreenContext) -> Self {
        if ctx.is_bound() && !ctx.is_current() {
            log::debug!("{} was displaced, making it current again", ctx.id());
            ctx.make_current();
        }
        Self { ctx }
    }

    /// Draw the figure `figure` into the context's buffer.
    pub fn draw(&mut self, host: &dyn SceneHost, figure: Handle) {
        draw_figure(host, figure, self);
    }

    /// Fill a convex polygon. Each covered pixel is written once, with depth
    /// interpolated in the fan triangle that contains its center.
    fn fill_convex(&mut self, vertices: &[Vertex], color: Rgba) {
        let Some((buf, depth)) = self.ctx.surfaces_mut() else {
            return;
        };
        let [first, rest @ ..] = vertices else {
            return;
        };
        let fan: Vec<(Vertex, Vertex, Vertex, f64)> = rest
            .windows(2)
            .filter_map(|pair| {
                let area = edge(*first, pair[0], pair[1].x, pair[1].y);
                (area.is_finite() && area.abs() >= 1e-12)
                    .then_some((*first, pair[0], pair[1], area))
            })
            .collect();
        if fan.is_empty() {
            return;
        }

        let (mut lo_x, mut lo_y) = (f64::INFINITY, f64::INFINITY);
        let (mut hi_x, mut hi_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in vertices {
            lo_x = lo_x.min(v.x);
            lo_y = lo_y.min(v.y);
            hi_x = hi_x.max(v.x);
            hi_y = hi_y.max(v.y);
        }
        let x0 = lo_x.floor().max(0.0) as i64;
        let x1 = hi_x.ceil().min(buf.width() as f64 - 1.0) as i64;
        let y0 = lo_y.floor().max(0.0) as i64;
        let y1 = hi_y.ceil().min(buf.height() as f64 - 1.0) as i64;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let (sx, sy) = (px as f64 + 0.5, py as f64 + 0.5);
                let hit = fan.iter().find_map(|&(a, b, c, area)| {
                    let w0 = edge(b, c, sx, sy) / area;
                    let w1 = edge(c, a, sx, sy) / area;
                    let w2 = edge(a, b, sx, sy) / area;
                    (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0).then(|| w0 * a.z + w1 * b.z + w2 * c.z)
                });
                if let Some(z) = hit {
                    write_fragment(buf, depth, px, py, z, color);
                }
            }
        }
    }

    fn fill_cell(&mut self, x: i64, y: i64, size: u32, z: f64, color: Rgba) {
        let Some((buf, depth)) = self.ctx.surfaces_mut() else {
            return;
        };
        let size = size as i64;
        let (x0, x1) = (x.max(0), x.saturating_add(size).min(buf.width() as i64));
        let (y0, y1) = (y.max(0), y.saturating_add(size).min(buf.height() as i64));
        for py in y0..y1 {
            for px in x0..x1 {
                write_fragment(buf, depth, px, py, z, color);
            }
        }
    }
}

impl RenderTarget for RasterRenderer<'_> {
    fn begin(&mut self, viewport: Dimensions, background: Rgba) {
        let Some((buf, depth)) = self.ctx.surfaces_mut() else {
            return;
        };
        if buf.dimensions() != viewport {
            log::debug!(
                "viewport {}x{} differs from bound buffer {}x{}",
                viewport.width,
                viewport.height,
                buf.width(),
                buf.height()
            );
        }
        buf.fill(background.with_alpha(1.0).to_u8());
        depth.fill(u16::MAX);
    }

    fn polygon(&mut self, vertices: &[Vertex], color: Rgba) {
        self.fill_convex(vertices, color);
    }

    fn line(&mut self, from: Vertex, to: Vertex, color: Rgba, width: f64) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len = dx.hypot(dy);
        if len < 1e-9 {
            self.point(from, color, width);
            return;
        }
        let half = width.max(1.0) / 2.0;
        let (nx, ny) = (-dy / len * half, dx / len * half);
        self.fill_convex(
            &[
                Vertex::new(from.x + nx, from.y + ny, from.z),
                Vertex::new(to.x + nx, to.y + ny, to.z),
                Vertex::new(to.x - nx, to.y - ny, to.z),
                Vertex::new(from.x - nx, from.y - ny, from.z),
            ],
            color,
        );
    }

    fn point(&mut self, at: Vertex, color: Rgba, size: f64) {
        let h = size.max(1.0) / 2.0;
        self.fill_convex(
            &[
                Vertex::new(at.x - h, at.y - h, at.z),
                Vertex::new(at.x + h, at.y - h, at.z),
                Vertex::new(at.x + h, at.y + h, at.z),
                Vertex::new(at.x - h, at.y + h, at.z),
            ],
            color,
        );
    }

    fn text(&mut self, at: Vertex, item: &TextItem) {
        let scale = font::scale_for(item.font_size);
        let width = font::text_width(&item.string, scale) as f64;
        let left = match item.halign {
            HAlign::Left => at.x,
            HAlign::Center => at.x - width / 2.0,
            HAlign::Right => at.x - width,
        }
        .round() as i64;
        let baseline = at.y.round() as i64;

        let cell = scale as i64;
        for (i, ch) in item.string.chars().enumerate() {
            let gx = left.saturating_add((i as i64).saturating_mul(ADVANCE as i64 * cell));
            for (row, bits) in font::glyph(ch).iter().enumerate() {
                let gy = baseline.saturating_add((GLYPH_HEIGHT as i64 - 1 - row as i64) * cell);
                for col in 0..GLYPH_WIDTH as i64 {
                    if bits & (0x10 >> col) != 0 {
                        self.fill_cell(gx.saturating_add(col * cell), gy, scale, at.z, item.color);
                    }
                }
            }
        }
    }
}

#[inline]
fn edge(a: Vertex, b: Vertex, x: f64, y: f64) -> f64 {
    (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x)
}

#[inline]
fn depth16(z: f64) -> u16 {
    (z.clamp(0.0, 1.0) * 65535.0).round() as u16
}

fn write_fragment(buf: &mut PixelBuffer, depth: &mut [u16], x: i64, y: i64, z: f64, color: Rgba) {
    let (w, h) = (buf.width() as i64, buf.height() as i64);
    if x < 0 || y < 0 || x >= w || y >= h {
        return;
    }
    let idx = (y * w + x) as usize;
    if let Some(stored) = depth.get_mut(idx) {
        let d = depth16(z);
        if d > *stored {
            return;
        }
        *stored = d;
    }
    blend(&mut buf.as_bytes_mut()[idx * 4..idx * 4 + 4], color);
}

fn blend(dst: &mut [u8], src: Rgba) {
    let a = src.a.clamp(0.0, 1.0);
    let s = src.with_alpha(1.0).to_u8();
    if a >= 1.0 {
        dst.copy_from_slice(&s);
        return;
    }
    for i in 0..3 {
        dst[i] = (s[i] as f32 * a + dst[i] as f32 * (1.0 - a)).round() as u8;
    }
    dst[3] = ((a + dst[3] as f32 / 255.0 * (1.0 - a)) * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::ContextConfig;

    fn bound_context(w: u32, h: u32) -> OffscreenContext {
        let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE).unwrap();
        assert!(ctx.bind(PixelBuffer::allocate(w, h).unwrap(), w, h));
        ctx
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64, z: f64) -> [Vertex; 4] {
        [
            Vertex::new(x0, y0, z),
            Vertex::new(x1, y0, z),
            Vertex::new(x1, y1, z),
            Vertex::new(x0, y1, z),
        ]
    }

    #[test]
    fn begin_clears_to_background() {
        let mut ctx = bound_context(4, 4);
        RasterRenderer::new(&mut ctx).begin(Dimensions::new(4, 4), Rgba::rgb(1.0, 0.0, 0.0));
        let buf = ctx.buffer().unwrap();
        assert!(buf.as_bytes().chunks(4).all(|px| px == [255, 0, 0, 255]));
    }

    #[test]
    fn polygon_fills_covered_pixels() {
        let mut ctx = bound_context(8, 8);
        let mut r = RasterRenderer::new(&mut ctx);
        r.begin(Dimensions::new(8, 8), Rgba::WHITE);
        r.polygon(&square(2.0, 2.0, 6.0, 6.0, 0.5), Rgba::rgb(0.0, 0.0, 1.0));
        let buf = ctx.buffer().unwrap();
        assert_eq!(buf.pixel(3, 3), Some([0, 0, 255, 255]));
        assert_eq!(buf.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(buf.pixel(7, 7), Some([255, 255, 255, 255]));
    }

    #[test]
    fn nearer_fragments_win_regardless_of_order() {
        let mut ctx = bound_context(8, 8);
        let mut r = RasterRenderer::new(&mut ctx);
        r.begin(Dimensions::new(8, 8), Rgba::WHITE);
        r.polygon(&square(0.0, 0.0, 8.0, 8.0, 0.2), Rgba::rgb(0.0, 0.0, 1.0));
        r.polygon(&square(0.0, 0.0, 8.0, 8.0, 0.8), Rgba::rgb(1.0, 0.0, 0.0));
        assert_eq!(ctx.buffer().unwrap().pixel(4, 4), Some([0, 0, 255, 255]));
    }

    #[test]
    fn translucent_polygon_blends() {
        let mut ctx = bound_context(4, 4);
        let mut r = RasterRenderer::new(&mut ctx);
        r.begin(Dimensions::new(4, 4), Rgba::WHITE);
        r.polygon(&square(0.0, 0.0, 4.0, 4.0, 0.5), Rgba::new(0.0, 0.0, 0.0, 0.5));
        let px = ctx.buffer().unwrap().pixel(1, 1).unwrap();
        // (1, 1) sits on the fan diagonal and must only be blended once
        assert_eq!(&px[..3], &[128, 128, 128]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn horizontal_line_covers_its_row() {
        let mut ctx = bound_context(10, 5);
        let mut r = RasterRenderer::new(&mut ctx);
        r.begin(Dimensions::new(10, 5), Rgba::WHITE);
        r.line(
            Vertex::new(0.0, 2.5, 0.5),
            Vertex::new(10.0, 2.5, 0.5),
            Rgba::BLACK,
            1.0,
        );
        let buf = ctx.buffer().unwrap();
        for x in 0..10 {
            assert_eq!(buf.pixel(x, 2), Some([0, 0, 0, 255]), "column {}", x);
        }
        assert_eq!(buf.pixel(5, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn text_marks_pixels_above_baseline() {
        let mut ctx = bound_context(32, 16);
        let mut r = RasterRenderer::new(&mut ctx);
        r.begin(Dimensions::new(32, 16), Rgba::WHITE);
        r.text(
            Vertex::new(2.0, 2.0, 0.0),
            &TextItem {
                string: "T".into(),
                color: Rgba::BLACK,
                font_size: 8.0,
                halign: HAlign::Left,
            },
        );
        let buf = ctx.buffer().unwrap();
        // top bar of the T spans the glyph's first row
        for x in 2..7 {
            assert_eq!(buf.pixel(x, 8), Some([0, 0, 0, 255]));
        }
        // stem
        assert_eq!(buf.pixel(4, 2), Some([0, 0, 0, 255]));
        assert_eq!(buf.pixel(2, 2), Some([255, 255, 255, 255]));
    }

    #[test]
    fn oversized_text_is_clipped_to_the_buffer() {
        let mut ctx = bound_context(8, 8);
        let mut r = RasterRenderer::new(&mut ctx);
        r.begin(Dimensions::new(8, 8), Rgba::WHITE);
        r.text(
            Vertex::new(4.0, 0.0, 0.0),
            &TextItem {
                string: "T".into(),
                color: Rgba::BLACK,
                font_size: 1e10,
                halign: HAlign::Center,
            },
        );
        // the stem of the T alone is wider than the buffer
        let buf = ctx.buffer().unwrap();
        assert!(buf.as_bytes().chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn unbound_context_ignores_drawing() {
        let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE).unwrap();
        let mut r = RasterRenderer::new(&mut ctx);
        r.begin(Dimensions::new(4, 4), Rgba::WHITE);
        r.polygon(&square(0.0, 0.0, 4.0, 4.0, 0.0), Rgba::BLACK);
        assert!(ctx.buffer().is_none());
    }
}
