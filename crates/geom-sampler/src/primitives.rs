//! Synthetic solids with deterministic topology for the mock sampler.
//!
//! Every face is a planar patch parameterized over the unit square:
//! `origin + s * u_axis + t * v_axis`. Faces that do not fill their square
//! carry an outline polygon in `(s, t)` space, and samples outside it are
//! reported as outside the trimmed face.

use std::f64::consts::PI;

/// Planar face of a mock solid.
#[derive(Debug, Clone)]
pub struct MockFace {
    pub origin: [f64; 3],
    pub u_axis: [f64; 3],
    pub v_axis: [f64; 3],
    pub normal: [f64; 3],
    /// Trim polygon in unit-square coordinates; `None` means the full square.
    pub outline: Option<Vec<[f64; 2]>>,
    /// Indices into the solid's edge list.
    pub edges: Vec<usize>,
}

/// Straight boundary edge of a mock solid.
#[derive(Debug, Clone)]
pub struct MockEdge {
    pub start: [f64; 3],
    pub end: [f64; 3],
    /// Whether the edge exposes a parametric curve.
    pub has_curve: bool,
}

/// A synthetic solid: faces in traversal order plus their boundary edges.
#[derive(Debug, Clone)]
pub struct MockSolid {
    pub faces: Vec<MockFace>,
    pub edges: Vec<MockEdge>,
}

impl MockSolid {
    /// Axis-aligned box with 6 faces and 12 edges.
    /// Origin at (0,0,0), extending to (w,h,d).
    pub fn box_solid(w: f64, h: f64, d: f64) -> Self {
        let p = [
            [0.0, 0.0, 0.0],
            [w, 0.0, 0.0],
            [w, h, 0.0],
            [0.0, h, 0.0],
            [0.0, 0.0, d],
            [w, 0.0, d],
            [w, h, d],
            [0.0, h, d],
        ];

        // 4 bottom, 4 top, 4 vertical
        let edge_pairs = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        let edges = edge_pairs
            .iter()
            .map(|&(s, e)| MockEdge {
                start: p[s],
                end: p[e],
                has_curve: true,
            })
            .collect();

        let quad = |origin: [f64; 3], u: [f64; 3], v: [f64; 3], n: [f64; 3], e: [usize; 4]| {
            MockFace {
                origin,
                u_axis: u,
                v_axis: v,
                normal: n,
                outline: None,
                edges: e.to_vec(),
            }
        };

        let faces = vec![
            // Bottom (z=0)
            quad(p[0], [w, 0.0, 0.0], [0.0, h, 0.0], [0.0, 0.0, -1.0], [0, 1, 2, 3]),
            // Top (z=d)
            quad(p[4], [w, 0.0, 0.0], [0.0, h, 0.0], [0.0, 0.0, 1.0], [4, 5, 6, 7]),
            // Front (y=0)
            quad(p[0], [w, 0.0, 0.0], [0.0, 0.0, d], [0.0, -1.0, 0.0], [0, 9, 4, 8]),
            // Back (y=h)
            quad(p[3], [w, 0.0, 0.0], [0.0, 0.0, d], [0.0, 1.0, 0.0], [2, 11, 6, 10]),
            // Left (x=0)
            quad(p[0], [0.0, h, 0.0], [0.0, 0.0, d], [-1.0, 0.0, 0.0], [3, 8, 7, 11]),
            // Right (x=w)
            quad(p[1], [0.0, h, 0.0], [0.0, 0.0, d], [1.0, 0.0, 0.0], [1, 10, 5, 9]),
        ];

        Self { faces, edges }
    }

    /// Right prism over a regular polygon with `sides` sides.
    ///
    /// Faces are ordered bottom cap, top cap, then one side face per polygon edge.
    /// The caps are trimmed by their polygon outline.
    pub fn prism(sides: usize, radius: f64, height: f64) -> Self {
        let n = sides.max(3);
        let angle = |i: usize| 2.0 * PI * (i % n) as f64 / n as f64;
        let bottom: Vec<[f64; 3]> = (0..n)
            .map(|i| [radius * angle(i).cos(), radius * angle(i).sin(), 0.0])
            .collect();
        let top: Vec<[f64; 3]> = bottom.iter().map(|q| [q[0], q[1], height]).collect();

        let mut edges = Vec::with_capacity(3 * n);
        for i in 0..n {
            edges.push(MockEdge {
                start: bottom[i],
                end: bottom[(i + 1) % n],
                has_curve: true,
            });
        }
        for i in 0..n {
            edges.push(MockEdge {
                start: top[i],
                end: top[(i + 1) % n],
                has_curve: true,
            });
        }
        for i in 0..n {
            edges.push(MockEdge {
                start: bottom[i],
                end: top[i],
                has_curve: true,
            });
        }

        let outline: Vec<[f64; 2]> = (0..n)
            .map(|i| [(angle(i).cos() + 1.0) / 2.0, (angle(i).sin() + 1.0) / 2.0])
            .collect();
        let span = 2.0 * radius;

        let mut faces = vec![
            MockFace {
                origin: [-radius, -radius, 0.0],
                u_axis: [span, 0.0, 0.0],
                v_axis: [0.0, span, 0.0],
                normal: [0.0, 0.0, -1.0],
                outline: Some(outline.clone()),
                edges: (0..n).collect(),
            },
            MockFace {
                origin: [-radius, -radius, height],
                u_axis: [span, 0.0, 0.0],
                v_axis: [0.0, span, 0.0],
                normal: [0.0, 0.0, 1.0],
                outline: Some(outline),
                edges: (n..2 * n).collect(),
            },
        ];

        for i in 0..n {
            let a = bottom[i];
            let b = bottom[(i + 1) % n];
            let mid = (angle(i) + angle(i + 1) + if i + 1 == n { 2.0 * PI } else { 0.0 }) / 2.0;
            faces.push(MockFace {
                origin: a,
                u_axis: [b[0] - a[0], b[1] - a[1], 0.0],
                v_axis: [0.0, 0.0, height],
                normal: [mid.cos(), mid.sin(), 0.0],
                outline: None,
                edges: vec![i, n + i, 2 * n + i, 2 * n + (i + 1) % n],
            });
        }

        Self { faces, edges }
    }

    /// Mark an edge as lacking a parametric curve.
    pub fn without_curve(mut self, edge: usize) -> Self {
        if let Some(e) = self.edges.get_mut(edge) {
            e.has_curve = false;
        }
        self
    }

    /// Pairs of face indices sharing each edge, in edge order.
    ///
    /// Edges bounding fewer than two faces are skipped.
    pub fn shared_edges(&self) -> Vec<(usize, usize, usize)> {
        let mut out = Vec::new();
        for edge in 0..self.edges.len() {
            let owners: Vec<usize> = self
                .faces
                .iter()
                .enumerate()
                .filter(|(_, f)| f.edges.contains(&edge))
                .map(|(i, _)| i)
                .collect();
            if let [a, b, ..] = owners[..] {
                out.push((edge, a, b));
            }
        }
        out
    }
}

impl MockFace {
    /// Evaluate the face plane at unit-square coordinates `(s, t)`.
    pub fn point_at(&self, s: f64, t: f64) -> [f64; 3] {
        [
            self.origin[0] + s * self.u_axis[0] + t * self.v_axis[0],
            self.origin[1] + s * self.u_axis[1] + t * self.v_axis[1],
            self.origin[2] + s * self.u_axis[2] + t * self.v_axis[2],
        ]
    }

    /// Classify `(s, t)` against the trim outline:
    /// 0 inside, 1 outside, 2 on the boundary.
    pub fn classify(&self, s: f64, t: f64) -> u8 {
        const EPS: f64 = 1e-9;
        let Some(outline) = &self.outline else {
            return 0;
        };
        let n = outline.len();
        for i in 0..n {
            if distance_to_segment([s, t], outline[i], outline[(i + 1) % n]) < EPS {
                return 2;
            }
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (outline[i], outline[j]);
            if (a[1] > t) != (b[1] > t) && s < (b[0] - a[0]) * (t - a[1]) / (b[1] - a[1]) + a[0] {
                inside = !inside;
            }
            j = i;
        }
        if inside {
            0
        } else {
            1
        }
    }
}

fn distance_to_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len2 > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dx = ap[0] - t * ab[0];
    let dy = ap[1] - t * ab[1];
    (dx * dx + dy * dy).sqrt()
}
