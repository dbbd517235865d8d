//! Degenerate-collision handling for particles that land within the merge
//! distance of a leaf's resident.
//!
//! Subdividing for such a pair would recurse until the region shrinks below
//! their separation, and forever when they coincide. Instead the incoming
//! particle is nudged aside and gives some of its mass to the resident. If
//! the nudge still lands inside the merge radius, it is absorbed and parked
//! off-domain.
//!
//! The mass split is a tunable heuristic, not a collision model. Every
//! branch conserves the combined mass of the pair.
use std::f64::consts::PI;

use log::trace;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};

use crate::particles::{distance, Body, ParticleRef};
use crate::utils::{GalaxyError, TreeConstants, OFF_DOMAIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// Moved by a small random offset, keeping part of its mass.
    Nudged,
    /// Swallowed by the resident and parked at `OFF_DOMAIN`.
    Absorbed,
}

/// The new state of a particle that lost a merge, written back after the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub particle: ParticleRef,
    pub position: (f32, f32),
    pub mass: f64,
    pub kind: MergeKind,
}

/// Merge distance plus the distribution the nudge offsets are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct MergeRules {
    too_close: f32,
    spread: LogNormal<f64>,
}

impl MergeRules {
    pub fn new(constants: &TreeConstants) -> Result<Self, GalaxyError> {
        if !constants.too_close.is_finite() || constants.too_close <= 0.0 {
            return Err(GalaxyError::InvalidConstant(format!("too_close must be positive, got {}", constants.too_close)));
        }
        let spread = LogNormal::new(0.0, constants.nudge_sigma)
            .map_err(|e| GalaxyError::InvalidConstant(format!("nudge_sigma: {}", e)))?;
        Ok(Self { too_close: constants.too_close, spread })
    }

    pub fn too_close(&self) -> f32 {
        self.too_close
    }

    pub fn is_too_close(&self, distance: f64) -> bool {
        distance < self.too_close as f64
    }

    /// Draws a displacement whose angle and radius are both log-normal
    /// multiples, of a full turn and of the merge distance respectively.
    pub fn sample_offset<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, f32) {
        let angle = self.spread.sample(rng) * 2.0 * PI;
        let radius = self.spread.sample(rng) * self.too_close as f64;
        ((radius * angle.cos()) as f32, (radius * angle.sin()) as f32)
    }

    /// Resolves `incoming` colliding with the leaf's `resident`.
    ///
    /// `resident` stays in the leaf and its mass is updated in place. The
    /// returned `Displacement` describes the particle that lost the merge.
    ///
    /// Blackholes are never displaced. An incoming blackhole takes over the
    /// leaf, and the star it lands on is handled as the displaced particle. Two
    /// blackholes coalesce: the resident takes all of the incoming mass.
    ///
    /// # Arguments
    ///
    /// * `resident` - The body already held by the leaf
    /// * `incoming` - The body that landed within `too_close` of it
    /// * `rng` - Source of the log-normal nudge
    pub fn resolve<R: Rng + ?Sized>(&self, resident: &mut Body, mut incoming: Body, rng: &mut R) -> Displacement {
        if incoming.is_blackhole() {
            if resident.is_blackhole() {
                resident.mass += incoming.mass;
                trace!("blackhole {:?} coalesced into {:?}", incoming.id, resident.id);
                return Displacement {
                    particle: incoming.id,
                    position: OFF_DOMAIN,
                    mass: 0.0,
                    kind: MergeKind::Absorbed,
                };
            }
            std::mem::swap(resident, &mut incoming);
        }

        let separation = resident.distance_to(&incoming);
        let offset = self.sample_offset(rng);
        let nudged = (incoming.position.0 + offset.0, incoming.position.1 + offset.1);

        if self.is_too_close(distance(nudged, resident.position)) {
            let absorbed = incoming.mass / 2.0;
            resident.mass += absorbed;
            trace!("{:?} absorbed into {:?}", incoming.id, resident.id);
            return Displacement {
                particle: incoming.id,
                position: OFF_DOMAIN,
                mass: incoming.mass - absorbed,
                kind: MergeKind::Absorbed,
            };
        }

        // The closer the pair, the more of the incoming mass the resident takes.
        let ratio = (separation / self.too_close as f64).clamp(0.0, 1.0);
        let transferred = incoming.mass * (1.0 - ratio);
        resident.mass += transferred;
        trace!("{:?} nudged off {:?}, transferring {}", incoming.id, resident.id, transferred);
        Displacement {
            particle: incoming.id,
            position: nudged,
            mass: incoming.mass - transferred,
            kind: MergeKind::Nudged,
        }
    }
}
