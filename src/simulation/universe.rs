use std::fmt;
use std::time::{Duration, Instant};

use log::debug;
use rayon::prelude::*;

use crate::particles::{Particle, ParticleRef};
use crate::quadtree::{build_frame, QuadtreeRoot, Region};
use crate::simulation::orbital_steps;
use crate::utils::{GalaxyError, TreeConstants};

/// What happened during one call to `Universe::step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub inserted: u64,
    pub escaped: usize,
    pub nudged: usize,
    pub absorbed: usize,
    pub total_mass: f64,
    pub center_of_mass: (f32, f32),
    pub elapsed: Duration,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "frame {}: {} in tree, {} escaped, {} nudged, {} absorbed, mass {:.4} at ({:.4}, {:.4}) in {:?}",
            self.frame,
            self.inserted,
            self.escaped,
            self.nudged,
            self.absorbed,
            self.total_mass,
            self.center_of_mass.0,
            self.center_of_mass.1,
            self.elapsed
        )
    }
}

/// Owns the particles and drives them frame by frame.
///
/// Every frame rebuilds the quadtree from scratch over the fixed square
/// domain described by the constants.
#[derive(Debug)]
pub struct Universe {
    particles: Vec<Particle>,
    constants: TreeConstants,
    region: Region,
    frame: u64,
}

impl Universe {
    /// # Errors
    ///
    /// Returns an error if `constants` fail validation.
    pub fn new(constants: TreeConstants) -> Result<Self, GalaxyError> {
        constants.validate()?;
        let region = constants.root_region()?;
        Ok(Self {
            particles: Vec::new(),
            constants,
            region,
            frame: 0,
        })
    }

    pub fn with_particles(constants: TreeConstants, particles: Vec<Particle>) -> Result<Self, GalaxyError> {
        let mut universe = Self::new(constants)?;
        universe.particles = particles;
        Ok(universe)
    }

    /// Adds a particle and returns the handle the tree will know it by.
    pub fn push(&mut self, particle: Particle) -> ParticleRef {
        self.particles.push(particle);
        ParticleRef(self.particles.len() - 1)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get(&self, id: ParticleRef) -> Option<&Particle> {
        self.particles.get(id.index())
    }

    pub fn constants(&self) -> &TreeConstants {
        &self.constants
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Builds this frame's tree without advancing anything.
    pub fn snapshot(&self) -> Result<QuadtreeRoot, GalaxyError> {
        build_frame(self.region, &self.particles, &self.constants)
    }

    /// Runs one frame: build and aggregate the tree, evaluate every
    /// acceleration, write back merges, then move the particles.
    ///
    /// Positions only change after every acceleration has been computed.
    /// Each move is the clamped acceleration plus, for galaxy stars, one
    /// step of circular orbit around the host blackhole. Every particle
    /// moves, so an escaped star can still be pulled back into the domain.
    pub fn step(&mut self) -> Result<FrameStats, GalaxyError> {
        let started = Instant::now();
        let tree = build_frame(self.region, &self.particles, &self.constants)?;
        let accelerations = tree.accelerations(&self.particles);
        tree.settle(&mut self.particles);

        let orbits = orbital_steps(&self.particles, self.constants.gamma);

        self.particles
            .par_iter_mut()
            .zip(accelerations.par_iter().zip(orbits.par_iter()))
            .for_each(|(particle, (&(ax, ay), &(ox, oy)))| {
                particle.position.0 += ax + ox;
                particle.position.1 += ay + oy;
            });

        self.frame += 1;
        let absorbed = tree.absorbed();
        let stats = FrameStats {
            frame: self.frame,
            inserted: tree.particle_count(),
            escaped: tree.escaped(),
            nudged: tree.displaced().len() - absorbed,
            absorbed,
            total_mass: tree.total_mass(),
            center_of_mass: tree.center_of_mass(),
            elapsed: started.elapsed(),
        };
        debug!("{}", stats);
        Ok(stats)
    }
}
