//! One frame's tree: build, aggregate, then answer force queries.
//!
//! The three phases are strictly ordered. `build_frame` returns only after
//! every insert has finished and the masses are aggregated. The returned
//! `QuadtreeRoot` is read-only from then on.
use std::fmt;
use std::time::Instant;

use log::{debug, trace};
use rayon::prelude::*;

use crate::particles::{Body, Particle, ParticleRef};
use crate::quadtree::{Displacement, Insertion, MergeKind, MergeRules, Quadrant, Region};
use crate::utils::{GalaxyError, TreeConstants};

/// Smallest number of particles a worker inserts in one go.
const INSERT_CHUNK: usize = 64;

/// A fully built and aggregated quadtree for one frame.
///
/// # Examples
///
/// ```
/// use rs_galaxy::particles::Particle;
/// use rs_galaxy::quadtree::{build_frame, Region};
/// use rs_galaxy::utils::TreeConstants;
///
/// let particles = vec![
///     Particle::star(1.0, 1.0, 1.0).unwrap(),
///     Particle::star(2.0, -3.0, 1.0).unwrap(),
/// ];
/// let region = Region::new((-10.0, -10.0), (10.0, 10.0)).unwrap();
///
/// let tree = build_frame(region, &particles, &TreeConstants::default()).unwrap();
/// assert_eq!(tree.particle_count(), 2);
/// assert_eq!(tree.total_mass(), 2.0);
///
/// let accelerations = tree.accelerations(&particles);
/// // The two stars pull on each other in opposite directions.
/// assert!(accelerations[0].1 < 0.0 && accelerations[1].1 > 0.0);
/// ```
#[derive(Debug)]
pub struct QuadtreeRoot {
    root: Quadrant,
    constants: TreeConstants,
    displaced: Vec<Displacement>,
    escaped: usize,
}

/// Builds and aggregates the tree for one frame.
///
/// Particles are inserted in parallel. `particles[i]` is identified by
/// `ParticleRef(i)`. Particles outside `region` are dropped and counted as
/// escaped. Particles that lose a merge are recorded and can be written back
/// with `QuadtreeRoot::settle`.
///
/// # Arguments
///
/// * `region` - The fixed domain covered by the root
/// * `particles` - Every particle of the frame, indexed by `ParticleRef`
/// * `constants` - Opening angle, gravity, merge distance and clamps
///
/// # Errors
///
/// Returns an error if `constants` fail validation or a node lock was poisoned.
pub fn build_frame(region: Region, particles: &[Particle], constants: &TreeConstants) -> Result<QuadtreeRoot, GalaxyError> {
    QuadtreeRoot::build(region, particles, constants)
}

impl QuadtreeRoot {
    pub fn build(region: Region, particles: &[Particle], constants: &TreeConstants) -> Result<Self, GalaxyError> {
        constants.validate()?;
        let rules = MergeRules::new(constants)?;
        let mut root = Quadrant::new(region);

        let started = Instant::now();
        let outcomes = particles
            .par_iter()
            .enumerate()
            .with_min_len(INSERT_CHUNK)
            .map(|(index, particle)| root.insert(Body::new(ParticleRef(index), particle), &rules))
            .collect::<Result<Vec<_>, _>>()?;
        let inserted_in = started.elapsed();

        let mut escaped = 0;
        let mut displaced = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Insertion::Inserted => {}
                Insertion::Escaped => {
                    trace!("particle {} escaped the domain", index);
                    escaped += 1;
                }
                Insertion::Merged(displacement) => displaced.push(displacement),
            }
        }

        let started = Instant::now();
        root.compute_mass();
        let aggregated_in = started.elapsed();

        debug!(
            "built quadtree: {} inserted, {} escaped, {} merged, depth {} (insert {:?}, aggregate {:?})",
            root.particle_count(),
            escaped,
            displaced.len(),
            root.depth(),
            inserted_in,
            aggregated_in
        );

        Ok(Self {
            root,
            constants: *constants,
            displaced,
            escaped,
        })
    }

    pub fn root(&self) -> &Quadrant {
        &self.root
    }

    pub fn region(&self) -> Region {
        self.root.region()
    }

    pub fn constants(&self) -> &TreeConstants {
        &self.constants
    }

    pub fn total_mass(&self) -> f64 {
        self.root.mass()
    }

    pub fn particle_count(&self) -> u64 {
        self.root.particle_count()
    }

    pub fn center_of_mass(&self) -> (f32, f32) {
        self.root.center_of_mass()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of particles dropped for lying outside the domain.
    pub fn escaped(&self) -> usize {
        self.escaped
    }

    /// Particles that lost a merge this frame, in particle order.
    pub fn displaced(&self) -> &[Displacement] {
        &self.displaced
    }

    pub fn absorbed(&self) -> usize {
        self.displaced.iter().filter(|d| d.kind == MergeKind::Absorbed).count()
    }

    /// Acceleration on `body`, clamped per component by its category's limit.
    ///
    /// Safe to call from any number of threads at once.
    pub fn force_on(&self, body: &Body) -> (f32, f32) {
        let (ax, ay) = self.root.acceleration_on(body, self.constants.theta, self.constants.gamma);
        let limit = self.constants.accel_limit(body.category) as f64;
        (ax.clamp(-limit, limit) as f32, ay.clamp(-limit, limit) as f32)
    }

    /// Clamped accelerations for every particle, computed in parallel.
    ///
    /// `particles` must be the slice the tree was built from.
    pub fn accelerations(&self, particles: &[Particle]) -> Vec<(f32, f32)> {
        particles
            .par_iter()
            .enumerate()
            .map(|(index, particle)| self.force_on(&Body::new(ParticleRef(index), particle)))
            .collect()
    }

    /// Writes this frame's merge results back to the particles.
    ///
    /// Every leaf resident takes its post-merge mass. Every displaced particle
    /// takes its new position and mass. Absorbed ones end up at `OFF_DOMAIN`,
    /// so the next frame drops them. Call this only after all force queries
    /// for the frame are done.
    pub fn settle(&self, particles: &mut [Particle]) {
        self.root.visit(&mut |node: &Quadrant| {
            if let Some(id) = node.resident() {
                if let Some(particle) = particles.get_mut(id.index()) {
                    particle.mass = node.mass();
                }
            }
        });

        for displacement in &self.displaced {
            if let Some(particle) = particles.get_mut(displacement.particle.index()) {
                particle.position = displacement.position;
                particle.mass = displacement.mass;
            }
        }
    }

    /// The region of every node, for drawing the tree.
    pub fn outlines(&self) -> Vec<Region> {
        let mut outlines = Vec::new();
        self.root.visit(&mut |node: &Quadrant| outlines.push(node.region()));
        outlines
    }
}

impl fmt::Display for QuadtreeRoot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (x, y) = self.center_of_mass();
        write!(
            f,
            "Quadtree: {} particles, mass {:.4}, center of mass ({:.4}, {:.4}), depth {}",
            self.particle_count(),
            self.total_mass(),
            x,
            y,
            self.depth()
        )
    }
}
