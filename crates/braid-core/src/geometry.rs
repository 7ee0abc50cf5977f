//! Geometric primitives used by the layout graph and the refiner.

/// A position in layout space.
///
/// Coordinates start out as NaN ("unset") until either the upstream
/// builder or the refiner's seeding pass assigns them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a point with both coordinates unset (NaN)
    pub fn unset() -> Self {
        Self {
            x: f32::NAN,
            y: f32::NAN,
        }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Checks whether the x-coordinate has not been assigned yet
    pub fn x_is_unset(self) -> bool {
        self.x.is_nan()
    }

    /// Checks whether the y-coordinate has not been assigned yet
    pub fn y_is_unset(self) -> bool {
        self.y.is_nan()
    }

    /// Returns a new point with the x-coordinate replaced
    pub fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    /// Returns a new point with the y-coordinate replaced
    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Converts a point and size into a bounds rectangle
    ///
    /// The point is treated as the center of the bounds, and the size
    /// is distributed equally in all directions around that center.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds {
            min_x: self.x - size.half_width(),
            min_y: self.y - size.half_height(),
            max_x: self.x + size.half_width(),
            max_y: self.y + size.half_height(),
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns half of the width, the horizontal distance from center to edge
    pub fn half_width(self) -> f32 {
        self.width / 2.0
    }

    /// Returns half of the height, the vertical distance from center to edge
    pub fn half_height(self) -> f32 {
        self.height / 2.0
    }

    /// Returns true if both width and height are finite numbers
    pub fn is_finite(self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Shrinks the bounds vertically by the given amount on both sides.
    ///
    /// Used for containment: a child whose center stays inside the
    /// parent's bounds shrunk by the child's half-height keeps its full
    /// extent inside the parent. The result may be inverted (min above
    /// max) when the child is taller than the parent; [`clamp_saturating`]
    /// handles that case.
    pub fn shrink_vertical(self, amount: f32) -> Self {
        Self {
            min_y: self.min_y + amount,
            max_y: self.max_y - amount,
            ..self
        }
    }

    /// Clamps a y value into the vertical range of these bounds.
    pub fn clamp_y(self, y: f32) -> f32 {
        clamp_saturating(y, self.min_y, self.max_y)
    }

    /// Checks whether another bounds lies fully inside this one, with a
    /// small tolerance for floating point noise.
    pub fn contains(self, other: Bounds, tolerance: f32) -> bool {
        other.min_x >= self.min_x - tolerance
            && other.min_y >= self.min_y - tolerance
            && other.max_x <= self.max_x + tolerance
            && other.max_y <= self.max_y + tolerance
    }
}

/// Clamps `value` into `[lo, hi]`, saturating to `lo` when the range is
/// inverted (`lo > hi`).
///
/// `f32::clamp` panics on inverted ranges; here an inverted range arises
/// legitimately when a child node is larger than the region it must stay
/// inside, and the lower bound wins.
pub fn clamp_saturating(value: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_unset() {
        let point = Point::unset();
        assert!(point.x_is_unset());
        assert!(point.y_is_unset());

        let assigned = point.with_x(1.0);
        assert!(!assigned.x_is_unset());
        assert!(assigned.y_is_unset());
    }

    #[test]
    fn test_point_with_coordinates() {
        let point = Point::new(1.0, 2.0).with_x(5.0).with_y(-3.0);
        assert_eq!(point.x(), 5.0);
        assert_eq!(point.y(), -3.0);
    }

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(1.0, 2.0);
        let p2 = Point::new(3.0, 4.0);

        let sum = p1.add_point(p2);
        assert_eq!(sum.x(), 4.0);
        assert_eq!(sum.y(), 6.0);

        let diff = sum.sub_point(p2);
        assert_approx_eq!(f32, diff.x(), p1.x());
        assert_approx_eq!(f32, diff.y(), p1.y());
    }

    #[test]
    fn test_point_hypot() {
        assert_eq!(Point::new(3.0, 4.0).hypot(), 5.0);
        assert_eq!(Point::new(0.0, 0.0).hypot(), 0.0);
    }

    #[test]
    fn test_point_to_bounds() {
        let bounds = Point::new(10.0, 20.0).to_bounds(Size::new(6.0, 8.0));

        assert_eq!(bounds.min_x(), 7.0);
        assert_eq!(bounds.min_y(), 16.0);
        assert_eq!(bounds.max_x(), 13.0);
        assert_eq!(bounds.max_y(), 24.0);
        assert_eq!(bounds.width(), 6.0);
        assert_eq!(bounds.height(), 8.0);
    }

    #[test]
    fn test_size_halves() {
        let size = Size::new(10.0, 30.0);
        assert_eq!(size.half_width(), 5.0);
        assert_eq!(size.half_height(), 15.0);
    }

    #[test]
    fn test_size_is_finite() {
        assert!(Size::new(1.0, 2.0).is_finite());
        assert!(Size::new(0.0, 0.0).is_finite());
        assert!(!Size::new(f32::NAN, 2.0).is_finite());
        assert!(!Size::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_bounds_shrink_vertical() {
        let bounds = Point::new(0.0, 50.0).to_bounds(Size::new(10.0, 40.0));
        let shrunk = bounds.shrink_vertical(5.0);

        assert_eq!(shrunk.min_y(), 35.0);
        assert_eq!(shrunk.max_y(), 65.0);
        // Horizontal extent is untouched
        assert_eq!(shrunk.min_x(), bounds.min_x());
        assert_eq!(shrunk.max_x(), bounds.max_x());
    }

    #[test]
    fn test_bounds_clamp_y() {
        let bounds = Point::new(0.0, 50.0).to_bounds(Size::new(10.0, 20.0));

        assert_eq!(bounds.clamp_y(50.0), 50.0);
        assert_eq!(bounds.clamp_y(0.0), 40.0);
        assert_eq!(bounds.clamp_y(100.0), 60.0);
    }

    #[test]
    fn test_bounds_contains() {
        let outer = Point::new(0.0, 0.0).to_bounds(Size::new(100.0, 100.0));
        let inner = Point::new(10.0, 10.0).to_bounds(Size::new(20.0, 20.0));
        let crossing = Point::new(45.0, 0.0).to_bounds(Size::new(20.0, 20.0));

        assert!(outer.contains(inner, 0.0));
        assert!(!outer.contains(crossing, 0.0));
        // Tolerance admits a slightly protruding box
        assert!(outer.contains(crossing, 10.0));
    }

    #[test]
    fn test_clamp_saturating_in_range() {
        assert_eq!(clamp_saturating(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_saturating(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_saturating(11.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_clamp_saturating_inverted_range() {
        // A child taller than its parent produces lo > hi; the lower
        // bound wins instead of panicking.
        assert_eq!(clamp_saturating(5.0, 8.0, 2.0), 8.0);
        assert_eq!(clamp_saturating(100.0, 8.0, 2.0), 8.0);
    }

    fn coordinate_strategy() -> impl Strategy<Value = f32> {
        -1000.0f32..1000.0
    }

    proptest! {
        #[test]
        fn clamp_saturating_stays_at_or_above_lo(
            value in coordinate_strategy(),
            lo in coordinate_strategy(),
            hi in coordinate_strategy(),
        ) {
            prop_assert!(clamp_saturating(value, lo, hi) >= lo);
        }

        #[test]
        fn clamp_saturating_is_idempotent(
            value in coordinate_strategy(),
            lo in coordinate_strategy(),
            hi in coordinate_strategy(),
        ) {
            let once = clamp_saturating(value, lo, hi);
            let twice = clamp_saturating(once, lo, hi);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn bounds_from_center_are_symmetric(
            x in coordinate_strategy(),
            y in coordinate_strategy(),
            w in 0.0f32..500.0,
            h in 0.0f32..500.0,
        ) {
            let bounds = Point::new(x, y).to_bounds(Size::new(w, h));
            prop_assert!((bounds.max_x() - x) - (x - bounds.min_x()) < 0.001);
            prop_assert!((bounds.max_y() - y) - (y - bounds.min_y()) < 0.001);
        }
    }
}
