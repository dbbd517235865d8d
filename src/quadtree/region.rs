use crate::utils::GalaxyError;

/// One of the four children of a subdivided region.
///
/// The discriminant is the index of the child in its parent's array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum District {
    NE = 0,
    SE = 1,
    SW = 2,
    NW = 3,
}

impl District {
    pub const ALL: [District; 4] = [District::NE, District::SE, District::SW, District::NW];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// An axis-aligned rectangle in 2D space.
///
/// Each node of the quadtree owns one. The bounds are fixed at construction and
/// the centre is derived once, so every child split and every district lookup
/// agree on exactly the same dividing lines.
///
/// # Examples
///
/// ```
/// use rs_galaxy::quadtree::{District, Region};
///
/// let region = Region::new((-10.0, -10.0), (10.0, 10.0)).expect("valid region");
///
/// assert!(region.contains((10.0, -10.0))); // boundaries are inclusive
/// assert!(!region.contains((10.5, 0.0)));
/// assert_eq!(region.district((1.0, 1.0)), District::NE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    min: (f32, f32),
    max: (f32, f32),
    center: (f32, f32),
}

impl Region {
    /// Creates a region from its lower-left and upper-right corners.
    ///
    /// # Errors
    ///
    /// Returns `GalaxyError::InvalidRegion` if a bound is not finite or if
    /// `min` is not strictly below `max` on both axes.
    pub fn new(min: (f32, f32), max: (f32, f32)) -> Result<Self, GalaxyError> {
        let finite = [min.0, min.1, max.0, max.1].iter().all(|v| v.is_finite());
        if !finite {
            return Err(GalaxyError::InvalidRegion(format!("bounds must be finite: {:?} {:?}", min, max)));
        }
        if !(min.0 < max.0 && min.1 < max.1) {
            return Err(GalaxyError::InvalidRegion(format!("min {:?} must be below max {:?}", min, max)));
        }
        Ok(Self::from_bounds(min, max))
    }

    pub(crate) fn from_bounds(min: (f32, f32), max: (f32, f32)) -> Self {
        Self {
            min,
            max,
            center: (
                min.0 + (max.0 - min.0) / 2.0,
                min.1 + (max.1 - min.1) / 2.0,
            ),
        }
    }

    pub fn min(&self) -> (f32, f32) {
        self.min
    }

    pub fn max(&self) -> (f32, f32) {
        self.max
    }

    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.max.0 - self.min.0
    }

    pub fn height(&self) -> f32 {
        self.max.1 - self.min.1
    }

    /// Returns true if `point` lies inside the region, boundaries included.
    ///
    /// The test walks the four edges counter-clockwise and requires the point
    /// to be on the left of (or on) each one. It holds for any convex
    /// quadrilateral. For an axis-aligned rectangle it reduces to the usual
    /// bound comparisons. Cross products are taken in f64 so that a point a
    /// hair outside an edge cannot round onto it. NaN components are never
    /// contained.
    pub fn contains(&self, point: (f32, f32)) -> bool {
        let corners = [
            (self.min.0, self.min.1),
            (self.max.0, self.min.1),
            (self.max.0, self.max.1),
            (self.min.0, self.max.1),
        ];
        let (px, py) = (point.0 as f64, point.1 as f64);
        (0..4).all(|i| {
            let (ax, ay) = (corners[i].0 as f64, corners[i].1 as f64);
            let (bx, by) = (corners[(i + 1) % 4].0 as f64, corners[(i + 1) % 4].1 as f64);
            (bx - ax) * (py - ay) - (by - ay) * (px - ax) >= 0.0
        })
    }

    /// Classifies `point` into one of the four districts around the centre.
    ///
    /// Ties are broken by checking NE, SE, SW, NW in that order with
    /// inclusive comparisons. A point on the vertical axis goes east, a point
    /// on the horizontal axis goes north (or south if it is west of the
    /// centre), and the centre itself is NE.
    ///
    /// # Panics
    ///
    /// Panics if no branch matches, which only a NaN coordinate can cause.
    /// Callers reject such points through `contains` first.
    pub fn district(&self, point: (f32, f32)) -> District {
        let (x, y) = point;
        let (cx, cy) = self.center;
        if x >= cx && y >= cy {
            return District::NE;
        }
        if x >= cx && y <= cy {
            return District::SE;
        }
        if x <= cx && y <= cy {
            return District::SW;
        }
        if x <= cx && y >= cy {
            return District::NW;
        }
        panic!("can't determine district of {:?} in {:?}", point, self);
    }

    /// Splits the region at its centre into four children, indexed by `District`.
    pub fn subdivide(&self) -> [Region; 4] {
        let (cx, cy) = self.center;
        [
            Region::from_bounds((cx, cy), self.max),                       // NE
            Region::from_bounds((cx, self.min.1), (self.max.0, cy)),       // SE
            Region::from_bounds(self.min, (cx, cy)),                       // SW
            Region::from_bounds((self.min.0, cy), (cx, self.max.1)),       // NW
        ]
    }
}
