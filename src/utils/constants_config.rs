use crate::quadtree::Region;
use crate::particles::Category;
use crate::utils::{DEFAULT_TREE_CONSTANTS, GalaxyError};

/// Tunables for building and querying a frame's quadtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConstants {
    /// Half the side of the square simulation domain, centred on the origin.
    pub half_extent: f32,
    /// Opening angle. A node is approximated when `side / distance < theta`.
    pub theta: f64,
    /// Gravitational constant.
    pub gamma: f64,
    /// Merge distance. Two particles closer than this never cause a subdivision.
    pub too_close: f32,
    /// Per-component acceleration limit for stars and uncategorised particles.
    pub star_accel_limit: f32,
    /// Per-component acceleration limit for blackholes.
    pub blackhole_accel_limit: f32,
    /// Sigma of the log-normal used to displace merged particles.
    pub nudge_sigma: f64,
}

impl Default for TreeConstants {
    fn default() -> Self {
        DEFAULT_TREE_CONSTANTS
    }
}

impl TreeConstants {
    pub fn new(
        half_extent: Option<f32>,
        theta: Option<f64>,
        gamma: Option<f64>,
        too_close: Option<f32>,
        star_accel_limit: Option<f32>,
        blackhole_accel_limit: Option<f32>,
        nudge_sigma: Option<f64>,
    ) -> Self {
        let default = DEFAULT_TREE_CONSTANTS;
        Self {
            half_extent: half_extent.unwrap_or(default.half_extent),
            theta: theta.unwrap_or(default.theta),
            gamma: gamma.unwrap_or(default.gamma),
            too_close: too_close.unwrap_or(default.too_close),
            star_accel_limit: star_accel_limit.unwrap_or(default.star_accel_limit),
            blackhole_accel_limit: blackhole_accel_limit.unwrap_or(default.blackhole_accel_limit),
            nudge_sigma: nudge_sigma.unwrap_or(default.nudge_sigma),
        }
    }

    /// Checks every tunable against its allowed range.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_galaxy::utils::{GalaxyError, TreeConstants};
    ///
    /// assert!(TreeConstants::default().validate().is_ok());
    ///
    /// let degenerate = TreeConstants { too_close: 0.0, ..TreeConstants::default() };
    /// assert!(matches!(degenerate.validate(), Err(GalaxyError::InvalidConstant(_))));
    /// ```
    pub fn validate(&self) -> Result<(), GalaxyError> {
        if !self.half_extent.is_finite() || self.half_extent <= 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("half_extent must be positive, got {}", self.half_extent)));
        }
        if !self.theta.is_finite() || self.theta < 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("theta must be non-negative, got {}", self.theta)));
        }
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("gamma must be non-negative, got {}", self.gamma)));
        }
        // A zero merge distance lets coincident particles subdivide forever.
        if !self.too_close.is_finite() || self.too_close <= 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("too_close must be positive, got {}", self.too_close)));
        }
        if !self.star_accel_limit.is_finite() || self.star_accel_limit < 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("star_accel_limit must be non-negative, got {}", self.star_accel_limit)));
        }
        if !self.blackhole_accel_limit.is_finite() || self.blackhole_accel_limit < 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("blackhole_accel_limit must be non-negative, got {}", self.blackhole_accel_limit)));
        }
        if !self.nudge_sigma.is_finite() || self.nudge_sigma < 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("nudge_sigma must be non-negative, got {}", self.nudge_sigma)));
        }
        Ok(())
    }

    /// The square domain `[-half_extent, half_extent]²`.
    pub fn root_region(&self) -> Result<Region, GalaxyError> {
        Region::new(
            (-self.half_extent, -self.half_extent),
            (self.half_extent, self.half_extent),
        )
    }

    /// The acceleration clamp that applies to particles of `category`.
    pub fn accel_limit(&self, category: Category) -> f32 {
        match category {
            Category::Blackhole => self.blackhole_accel_limit,
            Category::Star | Category::Other => self.star_accel_limit,
        }
    }
}
