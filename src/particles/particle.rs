use crate::utils::GalaxyError;

/// What kind of simulation object a particle stands for.
///
/// Blackholes are the dominant masses at the heart of each galaxy. They are
/// never displaced by a merge and get a much tighter acceleration clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Star,
    Blackhole,
    Other,
}

/// Direction a star circles its host blackhole, as seen with y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

/// Galaxy membership: the blackhole a star orbits and which way it goes round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orbit {
    pub host: ParticleRef,
    pub spin: Spin,
}

/// A point mass owned by the simulation, not by the tree.
///
/// The position is moved by the integrator every frame. The mass only
/// changes when a merge is written back by `QuadtreeRoot::settle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position represented as (x, y).
    pub position: (f32, f32),
    pub mass: f64,
    pub category: Category,
    /// Set for stars that belong to a galaxy. `None` means free-floating.
    pub orbit: Option<Orbit>,
}

impl Particle {
    /// Creates a new Particle.
    ///
    /// # Errors
    ///
    /// Returns an error if `mass` is negative or not finite, or if either
    /// position component is not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_galaxy::particles::{Category, Particle};
    /// use rs_galaxy::utils::GalaxyError;
    ///
    /// let star = Particle::new((1.0, 2.0), 0.8, Category::Star).expect("valid star");
    /// assert_eq!(star.position, (1.0, 2.0));
    ///
    /// let bad = Particle::new((0.0, 0.0), -1.0, Category::Star);
    /// assert_eq!(bad, Err(GalaxyError::InvalidMass));
    /// ```
    pub fn new(position: (f32, f32), mass: f64, category: Category) -> Result<Self, GalaxyError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(GalaxyError::InvalidMass);
        }
        if !position.0.is_finite() || !position.1.is_finite() {
            return Err(GalaxyError::InvalidPosition);
        }
        Ok(Self { position, mass, category, orbit: None })
    }

    pub fn star(x: f32, y: f32, mass: f64) -> Result<Self, GalaxyError> {
        Self::new((x, y), mass, Category::Star)
    }

    pub fn blackhole(x: f32, y: f32, mass: f64) -> Result<Self, GalaxyError> {
        Self::new((x, y), mass, Category::Blackhole)
    }

    pub fn is_blackhole(&self) -> bool {
        self.category == Category::Blackhole
    }

    /// Makes this particle circle `host` every frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_galaxy::particles::{Orbit, Particle, ParticleRef, Spin};
    ///
    /// let star = Particle::star(6.0, -4.0, 0.8).unwrap().orbiting(ParticleRef(0), Spin::Clockwise);
    /// assert_eq!(star.orbit, Some(Orbit { host: ParticleRef(0), spin: Spin::Clockwise }));
    /// ```
    pub fn orbiting(mut self, host: ParticleRef, spin: Spin) -> Self {
        self.orbit = Some(Orbit { host, spin });
        self
    }
}

/// Non-owning handle to a particle: its index in the frame's particle slice.
///
/// Self-interaction is suppressed by comparing handles, so two distinct
/// particles sharing a position still attract each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleRef(pub usize);

impl ParticleRef {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The view of a particle that travels through the tree during one frame.
///
/// `mass` starts as the particle's own mass. It grows when the body is the
/// resident of a merge. The grown value is written back at the end of the
/// frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: ParticleRef,
    pub position: (f32, f32),
    pub mass: f64,
    pub category: Category,
}

impl Body {
    pub fn new(id: ParticleRef, particle: &Particle) -> Self {
        Self {
            id,
            position: particle.position,
            mass: particle.mass,
            category: particle.category,
        }
    }

    pub fn is_blackhole(&self) -> bool {
        self.category == Category::Blackhole
    }

    /// Euclidean distance to another body, computed in f64.
    pub fn distance_to(&self, other: &Body) -> f64 {
        distance(self.position, other.position)
    }
}

/// Euclidean distance between two points, computed in f64 so that f32
/// positions near the merge threshold do not lose their separation.
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f64 {
    let dx = b.0 as f64 - a.0 as f64;
    let dy = b.1 as f64 - a.1 as f64;
    (dx * dx + dy * dy).sqrt()
}
