//! Coordinate spaces and the affine transforms between them.
//!
//! Responsibilities:
//! - Representing a rectangular coordinate space (data extent, visible
//!   window, physical surface) as an origin plus extent
//! - Deriving the affine map from one space onto another
//! - Composing and applying scale + translate transforms
//!
//! Transforms carry no rotation or shear: the timeline only ever scales and
//! translates, so four components (`a`, `d`, `e`, `f`) are enough.

/// An axis-aligned rectangular coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Space {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Space {
    /// Creates a space from its origin and extent.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a space of the given extent with its origin at (0, 0).
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Returns the x coordinate of the right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Derives the affine transform mapping coordinates in this space onto
    /// `other`, so that this space's origin lands on `other`'s origin and the
    /// extents line up.
    ///
    /// # Panics
    /// Panics when this space has a zero extent on either axis: no transform
    /// out of it exists, and every caller holds spaces that are non-degenerate
    /// by construction.
    pub fn between(&self, other: &Space) -> Transform {
        assert!(
            self.width != 0.0 && self.height != 0.0,
            "cannot derive a transform from a zero-extent space: {self:?}"
        );
        let a = other.width / self.width;
        let d = other.height / self.height;
        Transform {
            a,
            d,
            e: other.x - self.x * a,
            f: other.y - self.y * d,
        }
    }

    /// Returns this space mapped through `matrix`.
    pub fn transform(&self, matrix: &Transform) -> Space {
        Space {
            x: matrix.a * self.x + matrix.e,
            y: matrix.d * self.y + matrix.f,
            width: matrix.a * self.width,
            height: matrix.d * self.height,
        }
    }
}

/// A scale + translate transform: `x' = a*x + e`, `y' = d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal scale.
    pub a: f64,
    /// Vertical scale.
    pub d: f64,
    /// Horizontal translate.
    pub e: f64,
    /// Vertical translate.
    pub f: f64,
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self { a: 1.0, d: 1.0, e: 0.0, f: 0.0 }
    }

    /// A transform scaling by `(sx, sy)` about the fixed point `(cx, cy)`.
    pub fn scale_about(sx: f64, sy: f64, cx: f64, cy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            e: cx * (1.0 - sx),
            f: cy * (1.0 - sy),
        }
    }

    /// Composes this transform with `next`, applying `self` first.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            a: next.a * self.a,
            d: next.d * self.d,
            e: next.a * self.e + next.e,
            f: next.d * self.f + next.f,
        }
    }

    /// Applies the transform to a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.e, self.d * y + self.f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_between_maps_corners() {
        let from = Space::sized(1000.0, 10.0);
        let to = Space::new(50.0, 0.0, 500.0, 20.0);
        let m = from.between(&to);

        assert_eq!(m.apply(0.0, 0.0), (50.0, 0.0));
        assert_eq!(m.apply(1000.0, 10.0), (550.0, 20.0));
    }

    #[test]
    fn test_between_with_offset_origins() {
        // Neither space starts at zero; the map still lines up the origins.
        let from = Space::new(200.0, 5.0, 400.0, 10.0);
        let to = Space::new(-100.0, 0.0, 800.0, 40.0);
        let m = from.between(&to);

        let (x, y) = m.apply(200.0, 5.0);
        assert!(close(x, -100.0) && close(y, 0.0));
        let (x, y) = m.apply(600.0, 15.0);
        assert!(close(x, 700.0) && close(y, 40.0));
    }

    #[test]
    #[should_panic(expected = "zero-extent")]
    fn test_between_rejects_zero_extent() {
        let degenerate = Space::sized(0.0, 10.0);
        let _ = degenerate.between(&Space::sized(1.0, 1.0));
    }

    #[test]
    fn test_then_composes_left_to_right() {
        let first = Space::sized(100.0, 1.0).between(&Space::sized(200.0, 1.0));
        let second = Space::sized(200.0, 1.0).between(&Space::new(10.0, 0.0, 50.0, 1.0));
        let composed = first.then(&second);

        // Composition equals applying the two maps in sequence.
        let (x, _) = first.apply(40.0, 0.0);
        let (expect, _) = second.apply(x, 0.0);
        let (got, _) = composed.apply(40.0, 0.0);
        assert!(close(got, expect));
    }

    #[test]
    fn test_transform_maps_rect() {
        let rect = Space::new(10.0, 0.0, 20.0, 5.0);
        let m = Transform { a: 2.0, d: 3.0, e: 1.0, f: -1.0 };
        let out = rect.transform(&m);

        assert_eq!(out, Space::new(21.0, -1.0, 40.0, 15.0));
    }

    #[test]
    fn test_scale_about_keeps_fixed_point() {
        let m = Transform::scale_about(0.5, 1.0, 300.0, 0.0);
        let (x, _) = m.apply(300.0, 0.0);
        assert!(close(x, 300.0));

        // An inverse scale about the same point round-trips exactly.
        let inverse = Transform::scale_about(2.0, 1.0, 300.0, 0.0);
        let rect = Space::new(100.0, 0.0, 800.0, 1.0);
        let back = rect.transform(&m).transform(&inverse);
        assert!(close(back.x, rect.x) && close(back.width, rect.width));
    }
}
