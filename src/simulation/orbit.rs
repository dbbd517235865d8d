//! Circular-orbit drift of galaxy stars around their host blackhole.
//!
//! Every frame, each star that belongs to a galaxy is moved tangentially at
//! the speed of a circular orbit around its host, on top of the tree force.
use rayon::prelude::*;

use crate::particles::{Particle, ParticleRef, Spin};

/// Tangential displacement for one frame of a circular orbit around a host.
///
/// The speed is `sqrt(gamma * host_mass / r)` and the direction is
/// perpendicular to the line between the star and its host.
///
/// # Arguments
///
/// * `star` - Position of the orbiting star
/// * `host` - Position of the blackhole it circles
/// * `host_mass` - Mass of that blackhole
/// * `spin` - Which way round the star goes
/// * `gamma` - The gravitational constant
///
/// # Examples
///
/// ```
/// use rs_galaxy::particles::Spin;
/// use rs_galaxy::simulation::orbital_step;
///
/// // v = sqrt(1 * 4 / 1) = 2, straight down for a clockwise star east of its host.
/// assert_eq!(orbital_step((1.0, 0.0), (0.0, 0.0), 4.0, Spin::Clockwise, 1.0), (0.0, -2.0));
/// ```
pub fn orbital_step(star: (f32, f32), host: (f32, f32), host_mass: f64, spin: Spin, gamma: f64) -> (f32, f32) {
    let rx = host.0 as f64 - star.0 as f64;
    let ry = host.1 as f64 - star.1 as f64;
    let r = (rx * rx + ry * ry).sqrt();
    if r == 0.0 || !r.is_finite() {
        return (0.0, 0.0);
    }
    let scale = (gamma * host_mass / r).sqrt() / r;
    match spin {
        Spin::Clockwise => ((-ry * scale) as f32, (rx * scale) as f32),
        Spin::CounterClockwise => ((ry * scale) as f32, (-rx * scale) as f32),
    }
}

/// Orbital displacement of every particle, computed in parallel.
///
/// Particles without an orbit, blackholes, and particles whose host handle
/// is dangling or points at themselves get `(0.0, 0.0)`.
pub fn orbital_steps(particles: &[Particle], gamma: f64) -> Vec<(f32, f32)> {
    particles
        .par_iter()
        .enumerate()
        .map(|(index, particle)| {
            let Some(orbit) = particle.orbit else {
                return (0.0, 0.0);
            };
            if particle.is_blackhole() || orbit.host == ParticleRef(index) {
                return (0.0, 0.0);
            }
            match particles.get(orbit.host.index()) {
                Some(host) => orbital_step(particle.position, host.position, host.mass, orbit.spin, gamma),
                None => (0.0, 0.0),
            }
        })
        .collect()
}
