//! Orthographic view transform from axes data space to window coordinates.

use crate::rendering::Vertex;
use crate::Dimensions;

use super::Axes;

/// Half the diagonal of the unit cube; bounds the rotated depth.
const CUBE_RADIUS: f64 = 0.866_025_403_784_438_6;

/// Maps data points of one axes to window coordinates.
///
/// Data is normalized to the unit cube spanned by the axes limits, rotated by
/// the view angles (azimuth about z measured from -y, elevation above the xy
/// plane) and stretched so the projected cube fills the axes rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    lo: [f64; 3],
    span: [f64; 3],
    cos_az: f64,
    sin_az: f64,
    cos_el: f64,
    sin_el: f64,
    rect: [f64; 4],
    origin: [f64; 2],
    scale: [f64; 2],
}

impl Projection {
    pub fn new(axes: &Axes, viewport: Dimensions) -> Self {
        let (vw, vh) = (viewport.width as f64, viewport.height as f64);
        let rect = [
            axes.position[0] * vw,
            axes.position[1] * vh,
            axes.position[2] * vw,
            axes.position[3] * vh,
        ];

        let mut lo = [0.0; 3];
        let mut span = [1.0; 3];
        for (i, lim) in [axes.xlim, axes.ylim, axes.zlim].iter().enumerate() {
            let s = lim[1] - lim[0];
            if s.is_finite() && s != 0.0 {
                lo[i] = lim[0];
                span[i] = s;
            } else if lim[0].is_finite() {
                lo[i] = lim[0] - 0.5;
            }
        }

        let (az, el) = (axes.view[0].to_radians(), axes.view[1].to_radians());
        let mut p = Self {
            lo,
            span,
            cos_az: az.cos(),
            sin_az: az.sin(),
            cos_el: el.cos(),
            sin_el: el.sin(),
            rect,
            origin: [0.0; 2],
            scale: [1.0; 2],
        };

        let (mut min, mut max) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
        for corner in 0..8 {
            let n = [
                if corner & 1 == 0 { -0.5 } else { 0.5 },
                if corner & 2 == 0 { -0.5 } else { 0.5 },
                if corner & 4 == 0 { -0.5 } else { 0.5 },
            ];
            let r = p.rotate(n);
            for k in 0..2 {
                min[k] = min[k].min(r[k]);
                max[k] = max[k].max(r[k]);
            }
        }
        for k in 0..2 {
            let extent = max[k] - min[k];
            p.origin[k] = min[k];
            p.scale[k] = if extent > 1e-12 { rect[k + 2] / extent } else { 1.0 };
        }
        p
    }

    /// `[screen x, screen y, depth toward the viewer]` of a normalized point.
    fn rotate(&self, n: [f64; 3]) -> [f64; 3] {
        let sx = n[0] * self.cos_az + n[1] * self.sin_az;
        let t = -n[0] * self.sin_az + n[1] * self.cos_az;
        let sy = n[2] * self.cos_el + t * self.sin_el;
        let toward = n[2] * self.sin_el - t * self.cos_el;
        [sx, sy, toward]
    }

    /// Window position of a data point; `None` for non-finite input.
    pub fn project(&self, p: [f64; 3]) -> Option<Vertex> {
        if !p.iter().all(|v| v.is_finite()) {
            return None;
        }
        let n = [
            (p[0] - self.lo[0]) / self.span[0] - 0.5,
            (p[1] - self.lo[1]) / self.span[1] - 0.5,
            (p[2] - self.lo[2]) / self.span[2] - 0.5,
        ];
        let [sx, sy, toward] = self.rotate(n);
        Some(Vertex::new(
            self.rect[0] + (sx - self.origin[0]) * self.scale[0],
            self.rect[1] + (sy - self.origin[1]) * self.scale[1],
            (0.5 - toward / (2.0 * CUBE_RADIUS)).clamp(0.0, 1.0),
        ))
    }

    /// Axes rectangle in pixels, `[x, y, width, height]`.
    pub fn pixel_rect(&self) -> [f64; 4] {
        self.rect
    }
}
