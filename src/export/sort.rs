//! Back-to-front ordering of collected primitives.
//!
//! The viewer looks down the +z axis from z = -inf, so smaller depth is
//! nearer and a primitive must be emitted before anything that occludes it.

use std::cmp::Ordering;

use crate::rendering::Vertex;

use super::{Primitive, SortMode};

/// Window depth is stretched by this factor before plane tests so that the
/// classification tolerance is measured in roughly pixel-sized units.
pub const DEPTH_SCALE: f64 = 1000.0;

/// Number of splitter candidates scored at each BSP level.
const SPLITTER_CANDIDATES: usize = 7;

/// Order `primitives` back to front.
///
/// `epsilon` is the BSP plane tolerance, in pixels with depth scaled by
/// [`DEPTH_SCALE`]. It is ignored by the simple sort.
pub fn depth_sort(primitives: Vec<Primitive>, mode: SortMode, epsilon: f64) -> Vec<Primitive> {
    let input = primitives.len();
    let sorted = match mode {
        SortMode::Simple => simple_sort(primitives),
        SortMode::Bsp => bsp_sort(planar_pieces(primitives, epsilon), epsilon),
    };
    log::debug!(
        "{:?} sort: {} primitives in, {} out",
        mode,
        input,
        sorted.len()
    );
    sorted
}

/// Stable sort by mean depth, farthest first. Ties keep scene order.
fn simple_sort(mut primitives: Vec<Primitive>) -> Vec<Primitive> {
    primitives.sort_by(|a, b| b.depth().partial_cmp(&a.depth()).unwrap_or(Ordering::Equal));
    primitives
}

#[inline]
fn scaled(v: Vertex) -> [f64; 3] {
    [v.x, v.y, v.z * DEPTH_SCALE]
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Plane {
    normal: [f64; 3],
    d: f64,
}

impl Plane {
    /// Plane through a polygon using Newell's method; `None` if degenerate.
    fn from_polygon(vertices: &[Vertex]) -> Option<Plane> {
        if vertices.len() < 3 {
            return None;
        }
        let mut n = [0.0f64; 3];
        let mut c = [0.0f64; 3];
        for (i, a) in vertices.iter().enumerate() {
            let a = scaled(*a);
            let b = scaled(vertices[(i + 1) % vertices.len()]);
            n[0] += (a[1] - b[1]) * (a[2] + b[2]);
            n[1] += (a[2] - b[2]) * (a[0] + b[0]);
            n[2] += (a[0] - b[0]) * (a[1] + b[1]);
            for k in 0..3 {
                c[k] += a[k];
            }
        }
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if !len.is_finite() || len < 1e-12 {
            return None;
        }
        let k = vertices.len() as f64;
        let normal = [n[0] / len, n[1] / len, n[2] / len];
        let d = -(normal[0] * c[0] + normal[1] * c[1] + normal[2] * c[2]) / k;
        Some(Plane { normal, d })
    }

    /// Signed distance in scaled space. Interpolation parameters derived from
    /// it are the same in window space, since the scaling is linear.
    fn distance(&self, v: Vertex) -> f64 {
        let p = scaled(v);
        self.normal[0] * p[0] + self.normal[1] * p[1] + self.normal[2] * p[2] + self.d
    }

    /// The viewer sits on the positive side when the normal faces -z.
    fn viewer_in_front(&self) -> bool {
        self.normal[2] <= 0.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Side {
    Front,
    Back,
    On,
}

fn side(distance: f64, epsilon: f64) -> Side {
    if distance > epsilon {
        Side::Front
    } else if distance < -epsilon {
        Side::Back
    } else {
        Side::On
    }
}

/// Fan-split polygons whose corners do not share a plane, so every polygon
/// that reaches the BSP is planar within `epsilon`.
fn planar_pieces(primitives: Vec<Primitive>, epsilon: f64) -> Vec<Primitive> {
    let mut out = Vec::with_capacity(primitives.len());
    for primitive in primitives {
        match primitive {
            Primitive::Polygon { vertices, color }
                if vertices.len() > 3 && !is_planar(&vertices, epsilon) =>
            {
                let apex = vertices[0];
                out.extend(vertices[1..].windows(2).map(|pair| Primitive::Polygon {
                    vertices: vec![apex, pair[0], pair[1]],
                    color,
                }));
            }
            other => out.push(other),
        }
    }
    out
}

fn is_planar(vertices: &[Vertex], epsilon: f64) -> bool {
    Plane::from_polygon(vertices).map_or(true, |plane| {
        vertices
            .iter()
            .all(|v| plane.distance(*v).abs() <= epsilon)
    })
}

enum Task {
    Sort(Vec<Primitive>),
    Emit(Vec<Primitive>),
}

/// BSP ordering driven by an explicit work stack.
///
/// Each `Sort` task picks a splitter polygon, files it with everything lying
/// in its plane, and schedules the far side, the plane and the near side.
/// The splitter always leaves the set, so every task shrinks the problem.
fn bsp_sort(primitives: Vec<Primitive>, epsilon: f64) -> Vec<Primitive> {
    let mut out = Vec::with_capacity(primitives.len());
    let mut work = vec![Task::Sort(primitives)];
    while let Some(task) = work.pop() {
        let primitives = match task {
            Task::Emit(primitives) => {
                out.extend(primitives);
                continue;
            }
            Task::Sort(primitives) => primitives,
        };
        let Some((index, plane)) = choose_splitter(&primitives, epsilon) else {
            out.extend(simple_sort(primitives));
            continue;
        };

        let mut parts = Partition::default();
        for (i, primitive) in primitives.into_iter().enumerate() {
            if i == index {
                parts.coplanar.push(primitive);
            } else {
                parts.classify(primitive, &plane, epsilon);
            }
        }
        let (far, near) = if plane.viewer_in_front() {
            (parts.back, parts.front)
        } else {
            (parts.front, parts.back)
        };
        if !near.is_empty() {
            work.push(Task::Sort(near));
        }
        work.push(Task::Emit(parts.coplanar));
        if !far.is_empty() {
            work.push(Task::Sort(far));
        }
    }
    out
}

/// Pick the splitter among a few evenly spaced polygons, preferring planes
/// that cut little and divide the rest evenly.
fn choose_splitter(primitives: &[Primitive], epsilon: f64) -> Option<(usize, Plane)> {
    let candidates: Vec<(usize, Plane)> = primitives
        .iter()
        .enumerate()
        .filter_map(|(i, p)| match p {
            Primitive::Polygon { vertices, .. } => Plane::from_polygon(vertices).map(|pl| (i, pl)),
            _ => None,
        })
        .collect();
    if candidates.len() <= 1 {
        return candidates.into_iter().next();
    }

    let picks = SPLITTER_CANDIDATES.min(candidates.len());
    let step = (candidates.len() - 1) as f64 / (picks - 1).max(1) as f64;
    (0..picks)
        .map(|k| candidates[(k as f64 * step).round() as usize])
        .min_by_key(|&(index, plane)| splitter_cost(primitives, index, &plane, epsilon))
}

fn splitter_cost(primitives: &[Primitive], index: usize, plane: &Plane, epsilon: f64) -> usize {
    let (mut front, mut back, mut cut) = (0usize, 0usize, 0usize);
    for (i, primitive) in primitives.iter().enumerate() {
        if i == index {
            continue;
        }
        let (mut f, mut b) = (false, false);
        let mut tally = |v: Vertex| match side(plane.distance(v), epsilon) {
            Side::Front => f = true,
            Side::Back => b = true,
            Side::On => {}
        };
        match primitive {
            Primitive::Polygon { vertices, .. } => vertices.iter().for_each(|v| tally(*v)),
            Primitive::Line { from, to, .. } => {
                tally(*from);
                tally(*to);
            }
            Primitive::Point { at, .. } | Primitive::Text { at, .. } => tally(*at),
        }
        match (f, b) {
            (true, true) => cut += 1,
            (true, false) => front += 1,
            (false, true) => back += 1,
            (false, false) => {}
        }
    }
    cut * 8 + front.abs_diff(back)
}

#[derive(Default)]
struct Partition {
    back: Vec<Primitive>,
    coplanar: Vec<Primitive>,
    front: Vec<Primitive>,
}
impl Partition {
    fn classify(&mut self, primitive: Primitive, plane: &Plane, epsilon: f64) {
        match primitive {
            Primitive::Polygon { vertices, color } => {
                let sides: Vec<Side> = vertices
                    .iter()
                    .map(|v| side(plane.distance(*v), epsilon))
                    .collect();
                let any_front = sides.contains(&Side::Front);
                let any_back = sides.contains(&Side::Back);
                match (any_front, any_back) {
                    (false, false) => self.coplanar.push(Primitive::Polygon { vertices, color }),
                    (true, false) => self.front.push(Primitive::Polygon { vertices, color }),
                    (false, true) => self.back.push(Primitive::Polygon { vertices, color }),
                    (true, true) => {
                        let (front, back) = split_polygon(&vertices, &sides, plane);
                        if front.len() >= 3 {
                            self.front.push(Primitive::Polygon {
                                vertices: front,
                                color,
                            });
                        }
                        if back.len() >= 3 {
                            self.back.push(Primitive::Polygon {
                                vertices: back,
                                color,
                            });
                        }
                    }
                }
            }
            Primitive::Line {
                from,
                to,
                color,
                width,
            } => {
                let (da, db) = (plane.distance(from), plane.distance(to));
                let line = |from, to| Primitive::Line {
                    from,
                    to,
                    color,
                    width,
                };
                match (side(da, epsilon), side(db, epsilon)) {
                    (Side::On, Side::On) => self.coplanar.push(line(from, to)),
                    (Side::Front, Side::Back) | (Side::Back, Side::Front) => {
                        let mid = from.lerp(to, da / (da - db));
                        let (a, b) = (line(from, mid), line(mid, to));
                        if da > 0.0 {
                            self.front.push(a);
                            self.back.push(b);
                        } else {
                            self.back.push(a);
                            self.front.push(b);
                        }
                    }
                    (Side::Front, _) | (_, Side::Front) => self.front.push(line(from, to)),
                    _ => self.back.push(line(from, to)),
                }
            }
            Primitive::Point { at, .. } | Primitive::Text { at, .. } => {
                match side(plane.distance(at), epsilon) {
                    Side::Front => self.front.push(primitive),
                    Side::Back => self.back.push(primitive),
                    Side::On => self.coplanar.push(primitive),
                }
            }
        }
    }
}

/// Clip a polygon against a plane, returning the front and back pieces.
fn split_polygon(vertices: &[Vertex], sides: &[Side], plane: &Plane) -> (Vec<Vertex>, Vec<Vertex>) {
    let mut front = Vec::with_capacity(vertices.len() + 1);
    let mut back = Vec::with_capacity(vertices.len() + 1);
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        let (a, b) = (vertices[i], vertices[j]);
        match sides[i] {
            Side::Front => front.push(a),
            Side::Back => back.push(a),
            Side::On => {
                front.push(a);
                back.push(a);
            }
        }
        if matches!(
            (sides[i], sides[j]),
            (Side::Front, Side::Back) | (Side::Back, Side::Front)
        ) {
            let (da, db) = (plane.distance(a), plane.distance(b));
            let p = a.lerp(b, da / (da - db));
            front.push(p);
            back.push(p);
        }
    }
    (front, back)
}
