//! Coordinate spaces, points, sizes and rectangles.
//!
//! Every point and rectangle is tagged with the coordinate space it lives in.
//! Detector output is [`Normalized`] (both axes in `[0, 1]`), anything drawn
//! or sampled is [`Pixel`]. The only way from one to the other is an explicit
//! call to [`scale_point`] / [`scale_rect`].

use std::marker::PhantomData;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Unit-normalized image space, both axes in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Normalized;

/// Pixel (or screen point) space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel;

/// 2D point tagged with its coordinate space `S`.
///
/// `Clone`/`Copy` are implemented by hand so they hold for every `S`, not
/// only for markers that are themselves `Copy`.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Point<S> {
    pub x: f32,
    pub y: f32,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S> Clone for Point<S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Point<S> {}

impl<S> Point<S> {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    #[inline]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Drop the space tag for nalgebra math.
    #[inline]
    pub fn to_point2(self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn from_point2(p: Point2<f32>) -> Self {
        Self::new(p.x, p.y)
    }
}

impl Point<Normalized> {
    /// Mirror vertically inside the unit square (bottom-left <-> top-left origin).
    #[inline]
    pub fn flip_y(self) -> Self {
        Self::new(self.x, 1.0 - self.y)
    }

    /// True if both coordinates lie in `[0, 1]`.
    #[inline]
    pub fn is_unit(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Width/height pair. Used for pixel extents and for aspect ratios alike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn area(self) -> f32 {
        self.width * self.height
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Same size with width and height exchanged.
    #[inline]
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Axis-aligned rectangle in space `S`.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Rect<S> {
    pub origin: Point<S>,
    pub size: Size,
}

impl<S> Clone for Rect<S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Rect<S> {}

impl<S> Rect<S> {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle spanning `(0, 0)` to `size`.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::new(0.0, 0.0),
            size,
        }
    }

    #[inline]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            origin: self.origin.translated(dx, dy),
            size: self.size,
        }
    }

    /// Axis-aligned envelope of a set of points. `None` for an empty set.
    pub fn enclosing(points: impl IntoIterator<Item = Point<S>>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in it {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.size.area()
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains_point(&self, p: Point<S>) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// True if `other` lies fully inside `self`, boundary included.
    #[inline]
    pub fn contains_rect(&self, other: &Rect<S>) -> bool {
        other.min_x() >= self.min_x()
            && other.min_y() >= self.min_y()
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }
}

/// Origin convention of a normalized coordinate system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// y grows downwards, like raster rows.
    #[default]
    TopLeft,
    /// y grows upwards.
    BottomLeft,
}

impl Origin {
    /// Express a point given in this convention with a top-left origin.
    #[inline]
    pub fn to_top_left(self, p: Point<Normalized>) -> Point<Normalized> {
        match self {
            Origin::TopLeft => p,
            Origin::BottomLeft => p.flip_y(),
        }
    }
}

/// Scale a normalized point into pixel space of `size`.
#[inline]
pub fn scale_point(point: Point<Normalized>, size: Size) -> Point<Pixel> {
    Point::new(point.x * size.width, point.y * size.height)
}

/// Scale origin and extent of a normalized rectangle into pixel space of `size`.
#[inline]
pub fn scale_rect(rect: Rect<Normalized>, size: Size) -> Rect<Pixel> {
    Rect::new(
        rect.origin.x * size.width,
        rect.origin.y * size.height,
        rect.size.width * size.width,
        rect.size.height * size.height,
    )
}

/// Largest size with the proportions of `aspect_ratio` that fits inside `bounding`.
///
/// With equal scale factors on both axes `bounding` is returned unchanged.
pub fn aspect_fit(aspect_ratio: Size, bounding: Size) -> Size {
    let mut out = bounding;
    let mw = bounding.width / aspect_ratio.width;
    let mh = bounding.height / aspect_ratio.height;

    if mh < mw {
        out.width = bounding.height / aspect_ratio.height * aspect_ratio.width;
    } else if mw < mh {
        out.height = bounding.width / aspect_ratio.width * aspect_ratio.height;
    }
    out
}

/// Smallest size with the proportions of `aspect_ratio` that covers `minimum`.
pub fn aspect_fill(aspect_ratio: Size, minimum: Size) -> Size {
    let mut out = minimum;
    let mw = minimum.width / aspect_ratio.width;
    let mh = minimum.height / aspect_ratio.height;

    if mh > mw {
        out.width = minimum.height / aspect_ratio.height * aspect_ratio.width;
    } else if mw > mh {
        out.height = minimum.width / aspect_ratio.width * aspect_ratio.height;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sizes() -> Vec<Size> {
        vec![
            Size::new(1.0, 1.0),
            Size::new(300.0, 400.0),
            Size::new(400.0, 800.0),
            Size::new(1920.0, 1080.0),
            Size::new(3.0, 1000.0),
            Size::new(0.5, 0.25),
        ]
    }

    #[test]
    fn scaled_unit_points_stay_inside_target() {
        for s in sizes() {
            for i in 0..=10 {
                for j in 0..=10 {
                    let p = Point::<Normalized>::new(i as f32 / 10.0, j as f32 / 10.0);
                    let q = scale_point(p, s);
                    assert!(q.x >= 0.0 && q.x <= s.width, "{q:?} outside {s:?}");
                    assert!(q.y >= 0.0 && q.y <= s.height, "{q:?} outside {s:?}");
                }
            }
        }
    }

    #[test]
    fn scale_rect_scales_origin_and_extent() {
        let r = Rect::<Normalized>::new(0.25, 0.5, 0.5, 0.25);
        let out = scale_rect(r, Size::new(200.0, 100.0));
        assert_eq!(out, Rect::<Pixel>::new(50.0, 50.0, 100.0, 25.0));
    }

    #[test]
    fn aspect_fit_stays_inside_and_keeps_ratio() {
        for ratio in sizes() {
            for bound in sizes() {
                let fit = aspect_fit(ratio, bound);
                assert!(fit.width <= bound.width * (1.0 + 1e-5));
                assert!(fit.height <= bound.height * (1.0 + 1e-5));
                assert_relative_eq!(
                    fit.width / fit.height,
                    ratio.width / ratio.height,
                    max_relative = 1e-4
                );
            }
        }
    }

    #[test]
    fn aspect_fill_covers_and_keeps_ratio() {
        for ratio in sizes() {
            for min in sizes() {
                let fill = aspect_fill(ratio, min);
                assert!(fill.width >= min.width * (1.0 - 1e-5));
                assert!(fill.height >= min.height * (1.0 - 1e-5));
                assert_relative_eq!(
                    fill.width / fill.height,
                    ratio.width / ratio.height,
                    max_relative = 1e-4
                );
            }
        }
    }

    #[test]
    fn equal_ratios_return_bound_unchanged() {
        let bound = Size::new(400.0, 800.0);
        assert_eq!(aspect_fit(Size::new(1.0, 2.0), bound), bound);
        assert_eq!(aspect_fill(Size::new(1.0, 2.0), bound), bound);
    }

    #[test]
    fn portrait_frame_in_tall_viewport_is_width_limited() {
        let fit = aspect_fit(Size::new(300.0, 400.0), Size::new(400.0, 800.0));
        assert_relative_eq!(fit.width, 400.0);
        assert_relative_eq!(fit.height, 400.0 / 300.0 * 400.0, max_relative = 1e-6);
    }

    #[test]
    fn bottom_left_origin_flips_y() {
        let p = Point::<Normalized>::new(0.2, 0.1);
        assert_eq!(Origin::TopLeft.to_top_left(p), p);
        let q = Origin::BottomLeft.to_top_left(p);
        assert_relative_eq!(q.x, 0.2);
        assert_relative_eq!(q.y, 0.9);
    }

    #[test]
    fn rect_containment_is_inclusive() {
        let outer = Rect::<Pixel>::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains_rect(&Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!outer.contains_rect(&Rect::new(0.0, 0.0, 11.0, 10.0)));
        assert!(!outer.contains_rect(&Rect::new(-1.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn point_serializes_without_space_tag() {
        let p = Point::<Pixel>::new(1.5, 2.0);
        let json = serde_json::to_string(&p).expect("serialize");
        assert_eq!(json, r#"{"x":1.5,"y":2.0}"#);
        let back: Point<Pixel> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, p);
    }

    /// Marker with no derives at all.
    struct Opaque;

    fn copy_twice<S>(p: Point<S>, r: Rect<S>) -> (f32, Rect<S>) {
        let a = p;
        let b = p.translated(3.0, 4.0);
        let moved = r.translated(1.0, 0.0);
        (a.distance(b), if moved.contains_point(p) { r } else { moved })
    }

    #[test]
    fn points_and_rects_copy_for_any_space() {
        let p = Point::<Opaque>::new(0.0, 0.0);
        let r = Rect::<Opaque>::new(0.0, 0.0, 2.0, 2.0);
        let (d, out) = copy_twice(p, r);
        assert_relative_eq!(d, 5.0);
        assert_relative_eq!(out.min_x(), 1.0);
        assert_relative_eq!(r.min_x(), 0.0);
    }
}
