//! Orthographic 3D → 2D projection with equal-aspect axis limits.

/// Data limits shared by all three axes.
///
/// Every axis spans the same width (the largest data range) around its own
/// midpoint, so distances compare visually across x, y and z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub center: [f64; 3],
    pub span: f64,
}

impl Default for Bounds {
    /// The unit cube.
    fn default() -> Self {
        Self {
            center: [0.5; 3],
            span: 1.0,
        }
    }
}

impl Bounds {
    /// Equal-aspect bounds around `points`. Non-finite coordinates are skipped.
    pub fn equal_aspect<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        let mut any = false;

        for p in points {
            if !p.iter().all(|c| c.is_finite()) {
                continue;
            }
            any = true;
            for a in 0..3 {
                min[a] = min[a].min(p[a]);
                max[a] = max[a].max(p[a]);
            }
        }
        if !any {
            return Self::default();
        }

        // Ranges near f64::MAX overflow; halve before adding, clamp the span.
        let span = (0..3)
            .map(|a| max[a] - min[a])
            .fold(0.0, f64::max)
            .min(f64::MAX);
        Self {
            center: [0, 1, 2].map(|a| min[a] / 2.0 + max[a] / 2.0),
            span: if span > 0.0 { span } else { 1.0 },
        }
    }

    /// `(low, high)` limits of axis `a`.
    pub fn limits(&self, a: usize) -> (f64, f64) {
        let half = self.span / 2.0;
        (self.center[a] - half, self.center[a] + half)
    }

    /// Map a data point into the cube `[-0.5, 0.5]³`.
    pub fn normalize(&self, p: [f64; 3]) -> [f64; 3] {
        [
            (p[0] - self.center[0]) / self.span,
            (p[1] - self.center[1]) / self.span,
            (p[2] - self.center[2]) / self.span,
        ]
    }

    /// Inverse of [`Bounds::normalize`] for one axis.
    pub fn denormalize(&self, a: usize, t: f64) -> f64 {
        self.center[a] + t * self.span
    }
}

/// A projected point: `u` right, `v` up, larger `depth` is nearer the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub u: f64,
    pub v: f64,
    pub depth: f64,
}

/// Orthographic camera looking at the origin. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub elevation: f64,
    pub azimuth: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            elevation: 30.0,
            azimuth: -60.0,
        }
    }
}

impl Camera {
    pub fn new(elevation: f64, azimuth: f64) -> Self {
        Self {
            elevation,
            azimuth,
        }
    }

    pub fn project(&self, p: [f64; 3]) -> Projected {
        let (se, ce) = self.elevation.to_radians().sin_cos();
        let (sa, ca) = self.azimuth.to_radians().sin_cos();

        // right × up == eye
        let right = [-sa, ca, 0.0];
        let up = [-se * ca, -se * sa, ce];
        let eye = [ce * ca, ce * sa, se];

        Projected {
            u: dot(p, right),
            v: dot(p, up),
            depth: dot(p, eye),
        }
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Pixel canvas onto which the normalized cube is fitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pixels per normalized unit. The cube's projection is at most √3 wide.
    pub fn scale(&self) -> f64 {
        self.width.min(self.height) * 0.42 / (3f64.sqrt() / 2.0)
    }

    /// SVG-style pixel coordinates, y pointing down.
    pub fn to_screen(&self, p: Projected) -> (f64, f64) {
        let s = self.scale();
        (self.width / 2.0 + p.u * s, self.height / 2.0 - p.v * s)
    }
}

/// The 12 edges of the normalized cube as corner pairs.
pub fn cube_edges() -> Vec<([f64; 3], [f64; 3])> {
    let mut edges = Vec::with_capacity(12);
    for axis in 0..3 {
        for a in [-0.5, 0.5] {
            for b in [-0.5, 0.5] {
                let mut start = [0.0; 3];
                let (i, j) = ((axis + 1) % 3, (axis + 2) % 3);
                start[i] = a;
                start[j] = b;
                let mut end = start;
                start[axis] = -0.5;
                end[axis] = 0.5;
                edges.push((start, end));
            }
        }
    }
    edges
}
