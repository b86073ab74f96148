use crate::Point;

/// The bounding box of a raster grid in its native coordinate system.
///
/// Invariant: `xmin < xmax` and `ymin < ymax`. Constructors panic on violation
/// since an inverted extent is always a caller bug, never recoverable input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        assert!(xmin < xmax, "extent xmin must be < xmax");
        assert!(ymin < ymax, "extent ymin must be < ymax");
        Extent { xmin, xmax, ymin, ymax }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.xmin, self.ymax)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.xmax, self.ymin)
    }

    pub fn intersects(&self, other: &Extent) -> bool {
        self.xmin < other.xmax && self.xmax > other.xmin && self.ymin < other.ymax && self.ymax > other.ymin
    }
}

impl approx::AbsDiffEq for Extent {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.xmin, &other.xmin, epsilon)
            && f64::abs_diff_eq(&self.xmax, &other.xmax, epsilon)
            && f64::abs_diff_eq(&self.ymin, &other.ymin, epsilon)
            && f64::abs_diff_eq(&self.ymax, &other.ymax, epsilon)
    }
}
