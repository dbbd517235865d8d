use crate::particles::{distance, Body};
use crate::quadtree::Quadrant;

/// Acceleration that a point mass at `source` imparts on a body at `target`:
/// `gamma * mass / r³ * (source - target)`.
///
/// There is no softening. Coincident points contribute nothing rather than
/// dividing by zero.
///
/// # Arguments
///
/// * `target` - Position of the body being pulled
/// * `source` - Position of the attracting point mass
/// * `mass` - Mass at `source`
/// * `gamma` - The gravitational constant
///
/// # Examples
///
/// ```
/// use rs_galaxy::quadtree::pairwise_acceleration;
///
/// let (ax, ay) = pairwise_acceleration((0.0, 0.0), (2.0, 0.0), 4.0, 1.0);
/// assert_eq!((ax, ay), (1.0, 0.0));
/// assert_eq!(pairwise_acceleration((1.0, 1.0), (1.0, 1.0), 4.0, 1.0), (0.0, 0.0));
/// ```
pub fn pairwise_acceleration(target: (f32, f32), source: (f32, f32), mass: f64, gamma: f64) -> (f64, f64) {
    let dx = source.0 as f64 - target.0 as f64;
    let dy = source.1 as f64 - target.1 as f64;
    let r = (dx * dx + dy * dy).sqrt();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let scale = gamma * mass / (r * r * r);
    (scale * dx, scale * dy)
}

impl Quadrant {
    /// Unclamped Barnes–Hut acceleration on `body` from this subtree.
    ///
    /// - A node without mass contributes nothing.
    /// - A leaf contributes its particle's pull, unless that particle is
    ///   `body` itself (compared by handle, not position).
    /// - An internal node whose `side / distance` is below `theta` is treated
    ///   as a point mass at its centre of mass. Otherwise its four children
    ///   are summed.
    ///
    /// The tree must have been aggregated with `compute_mass`. No locks are
    /// taken, so any number of threads may query the same tree.
    pub fn acceleration_on(&self, body: &Body, theta: f64, gamma: f64) -> (f64, f64) {
        if self.mass == 0.0 {
            return (0.0, 0.0);
        }

        match self.children.get() {
            None => match self.resident {
                Some(id) if id != body.id => {
                    pairwise_acceleration(body.position, self.center_of_mass, self.mass, gamma)
                }
                _ => (0.0, 0.0),
            },
            Some(children) => {
                let r = distance(body.position, self.center_of_mass);
                if r > 0.0 && (self.region.height() as f64) / r < theta {
                    return pairwise_acceleration(body.position, self.center_of_mass, self.mass, gamma);
                }
                children.iter().fold((0.0, 0.0), |(ax, ay), child| {
                    let (cx, cy) = child.acceleration_on(body, theta, gamma);
                    (ax + cx, ay + cy)
                })
            }
        }
    }
}
