use crate::utils::TreeConstants;

pub const DEFAULT_TREE_CONSTANTS: TreeConstants = TreeConstants {
    half_extent: 42.0,
    theta: 0.6,
    gamma: 0.000_000_01,
    too_close: 0.001,
    star_accel_limit: 0.01,
    blackhole_accel_limit: 0.000_1,
    nudge_sigma: 1.0,
};

/// Where absorbed particles are parked. Far outside any sane domain, so the
/// next frame's containment check drops them.
pub const OFF_DOMAIN: (f32, f32) = (f32::MAX, f32::MAX);
