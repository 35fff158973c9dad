use serde::{Deserialize, Serialize};

use crate::geometry::{scale_point, Normalized, Origin, Pixel, Point, Rect, Size};

/// Four-corner candidate for a physical rectangle, plus detector confidence.
///
/// Corner roles are fixed at construction and never reordered by anything in
/// this workspace; [`Quad::corners`] always yields TL, TR, BR, BL.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Quad<S> {
    pub top_left: Point<S>,
    pub top_right: Point<S>,
    pub bottom_right: Point<S>,
    pub bottom_left: Point<S>,
    /// Detector / tracker confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl<S> Clone for Quad<S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Quad<S> {}

/// Corner triples left after dropping one corner each.
const TRIANGLES: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

impl<S> Quad<S> {
    pub fn new(
        top_left: Point<S>,
        top_right: Point<S>,
        bottom_right: Point<S>,
        bottom_left: Point<S>,
        confidence: f32,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
            confidence,
        }
    }

    /// Build from corners in polygon order TL, TR, BR, BL.
    pub fn from_corners(corners: [Point<S>; 4], confidence: f32) -> Self {
        let [tl, tr, br, bl] = corners;
        Self::new(tl, tr, br, bl, confidence)
    }

    /// Corners in polygon order TL, TR, BR, BL.
    #[inline]
    pub fn corners(&self) -> [Point<S>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Axis-aligned envelope of the four corners.
    pub fn bounding_box(&self) -> Rect<S> {
        let c = self.corners();
        let x0 = c.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let y0 = c.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let x1 = c.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let y1 = c.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Absolute polygon area (shoelace).
    pub fn area(&self) -> f32 {
        let c = self.corners();
        let mut twice = 0.0f32;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            twice += a.x * b.y - b.x * a.y;
        }
        twice.abs() * 0.5
    }

    /// Mean displacement between corresponding corners.
    pub fn mean_corner_distance(&self, other: &Quad<S>) -> f32 {
        self.corners()
            .iter()
            .zip(other.corners().iter())
            .map(|(a, b)| a.distance(*b))
            .sum::<f32>()
            / 4.0
    }

    /// Edge lengths in order: top, right, bottom, left.
    pub fn edge_lengths(&self) -> [f32; 4] {
        [
            self.top_left.distance(self.top_right),
            self.top_right.distance(self.bottom_right),
            self.bottom_right.distance(self.bottom_left),
            self.bottom_left.distance(self.top_left),
        ]
    }

    /// True when all consecutive turns have the same, non-zero orientation.
    pub fn is_convex(&self) -> bool {
        let c = self.corners();
        let mut sign = 0.0f32;
        for i in 0..4 {
            let z = cross(c[i], c[(i + 1) % 4], c[(i + 2) % 4]);
            if z == 0.0 {
                return false;
            }
            if sign == 0.0 {
                sign = z.signum();
            } else if z.signum() != sign {
                return false;
            }
        }
        true
    }

    /// Non-finite corners, any three corners collinear within `tol`
    /// (sine of the enclosed angle), or a self-intersecting outline.
    pub fn is_degenerate(&self, tol: f32) -> bool {
        let c = self.corners();
        if c.iter().any(|p| !p.is_finite()) {
            return true;
        }
        if TRIANGLES
            .iter()
            .any(|&[a, b, d]| nearly_collinear(c[a], c[b], c[d], tol))
        {
            return true;
        }
        segments_cross(c[0], c[1], c[2], c[3]) || segments_cross(c[1], c[2], c[3], c[0])
    }
}

impl Quad<Normalized> {
    /// Axis-aligned quad covering `rect`, with top-left origin semantics.
    pub fn from_rect(rect: Rect<Normalized>, confidence: f32) -> Self {
        Self::new(
            Point::new(rect.min_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.max_y()),
            Point::new(rect.min_x(), rect.max_y()),
            confidence,
        )
    }

    /// Convert into a top-left-origin pixel space of `size`.
    pub fn to_pixels(&self, size: Size, origin: Origin) -> Quad<Pixel> {
        let map = |p: Point<Normalized>| scale_point(origin.to_top_left(p), size);
        Quad::new(
            map(self.top_left),
            map(self.top_right),
            map(self.bottom_right),
            map(self.bottom_left),
            self.confidence,
        )
    }
}

#[inline]
fn cross<S>(o: Point<S>, a: Point<S>, b: Point<S>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn nearly_collinear<S>(a: Point<S>, b: Point<S>, c: Point<S>, tol: f32) -> bool {
    let ab = a.distance(b);
    let ac = a.distance(c);
    let bc = b.distance(c);
    let longest = ab.max(ac).max(bc);
    if longest <= f32::EPSILON {
        return true;
    }
    // Height of the triangle relative to its longest side.
    let twice_area = cross(a, b, c).abs();
    twice_area / (longest * longest) <= tol
}

/// Proper intersection of segments `p1-p2` and `p3-p4`.
fn segments_cross<S>(p1: Point<S>, p2: Point<S>, p3: Point<S>, p4: Point<S>) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
