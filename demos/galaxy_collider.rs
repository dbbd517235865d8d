//! Two galaxies, spinning in opposite directions, falling into each other.
//!
//! Run with `RUST_LOG=info cargo run --release --example galaxy_collider [frames]`.
use std::f64::consts::PI;
use std::time::{Duration, Instant};

use log::{info, warn};
use rand::Rng;
use rand_distr::{Distribution, LogNormal};

use rs_galaxy::particles::{Particle, ParticleRef, Spin};
use rs_galaxy::simulation::Universe;
use rs_galaxy::utils::{GalaxyError, TreeConstants};

const STARS_PER_GALAXY: usize = 20_000;
const BLACKHOLE_MASS: f64 = 1453.485;
const REPORT_EVERY: Duration = Duration::from_secs(5);

/// Appends a blackhole at `center` and a cloud of stars circling it.
fn galaxy<R: Rng>(
    particles: &mut Vec<Particle>,
    center: (f32, f32),
    spin: Spin,
    rng: &mut R,
) -> Result<(), GalaxyError> {
    let radius = LogNormal::new(0.0, 0.8).map_err(|e| GalaxyError::InvalidConstant(e.to_string()))?;
    let extra_mass = LogNormal::new(0.0, 1.0).map_err(|e| GalaxyError::InvalidConstant(e.to_string()))?;

    let host = ParticleRef(particles.len());
    particles.push(Particle::blackhole(center.0, center.1, BLACKHOLE_MASS)?);
    for _ in 0..STARS_PER_GALAXY {
        let angle = rng.random_range(0.0..2.0 * PI);
        let r = radius.sample(rng);
        let x = center.0 + (r * angle.cos()) as f32;
        let y = center.1 + (r * angle.sin()) as f32;
        let star = Particle::star(x, y, 0.76 + extra_mass.sample(rng) / 100.0)?;
        particles.push(star.orbiting(host, spin));
    }
    Ok(())
}

fn main() -> Result<(), GalaxyError> {
    env_logger::init();

    let frames: u64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse().map_err(|_| GalaxyError::InvalidConstant(format!("not a frame count: {}", arg)))?,
        None => 1_000,
    };

    let mut rng = rand::rng();
    let mut particles = Vec::with_capacity(2 * (STARS_PER_GALAXY + 1));
    galaxy(&mut particles, (5.0, -4.0), Spin::Clockwise, &mut rng)?;
    galaxy(&mut particles, (-4.0, 3.0), Spin::CounterClockwise, &mut rng)?;

    let mut universe = Universe::with_particles(TreeConstants::default(), particles)?;
    info!("simulating {} particles for {} frames", universe.particles().len(), frames);

    let mut last_report = Instant::now();
    for _ in 0..frames {
        let stats = universe.step()?;
        if stats.escaped > universe.particles().len() / 2 {
            warn!("most particles have left the domain, stopping");
            break;
        }
        if last_report.elapsed() >= REPORT_EVERY {
            info!("{}", stats);
            last_report = Instant::now();
        }
    }

    info!("{}", universe.snapshot()?);
    Ok(())
}
