//! Affine transform tracking for nested translate/rotate frames.
//!
//! Canvases that need absolute coordinates (the recording canvas, bounds
//! checks in tests) keep a stack of these and compose them as frames are
//! entered.
//!
//! ## Rotation Convention
//!
//! Coordinates are y-up and positive angles rotate counter-clockwise, in
//! degrees, matching the PDF `cm` operator with `[cos sin -sin cos 0 0]`.

use crate::layout::types::{BoundingBox, Point};

/// A 2D affine transform `[a b c d e f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            e: x,
            f: y,
            ..Self::identity()
        }
    }

    /// Counter-clockwise rotation about the origin
    pub fn rotate(angle_degrees: f64) -> Self {
        let radians = angle_degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Check if this is effectively a no-op
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// `self` applied after entering `inner`: the result maps inner-frame
    /// coordinates straight to this transform's target frame.
    pub fn then(&self, inner: &Affine) -> Affine {
        Affine {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn transform_point(&self, point: Point) -> Point {
        Point {
            x: self.a * point.x + self.c * point.y + self.e,
            y: self.b * point.x + self.d * point.y + self.f,
        }
    }

    /// Transform a bounding box using loose bounds: the axis-aligned box of
    /// the four transformed corners.
    pub fn transform_bounds(&self, bounds: &BoundingBox) -> BoundingBox {
        let corners = [
            Point::new(bounds.x, bounds.y),
            Point::new(bounds.right(), bounds.y),
            Point::new(bounds.x, bounds.top()),
            Point::new(bounds.right(), bounds.top()),
        ];
        let rotated = corners.map(|p| self.transform_point(p));

        let min_x = rotated.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = rotated.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = rotated.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = rotated.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}
