use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use rand::Rng;

use crate::particles::{Body, ParticleRef};
use crate::quadtree::{Displacement, MergeRules, Region};
use crate::utils::GalaxyError;

/// What a node holds while the tree is being built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Content {
    Empty,
    Leaf(Body),
    /// The children are published in `Quadrant::children`.
    Internal,
}

/// Coarse shape of a node, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Empty,
    Leaf,
    Internal,
}

/// Result of inserting one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Insertion {
    /// The particle now sits in a leaf of the tree.
    Inserted,
    /// The particle lies outside the node's region and was dropped.
    Escaped,
    /// The particle collided with a leaf's resident and lost the merge.
    Merged(Displacement),
}

/// A node of the Barnes–Hut quadtree.
///
/// The tree is built concurrently. `content` is only locked while a single
/// node decides what to do with a particle. Once a node has split, its
/// children are reachable through `children` without taking the lock, so
/// threads descending into disjoint subtrees never contend.
///
/// `mass`, `center_of_mass` and `resident` are filled in by `compute_mass`
/// once insertion is over. They are read lock-free during force evaluation.
///
/// # Examples
///
/// ```
/// use rs_galaxy::particles::{Body, Particle, ParticleRef};
/// use rs_galaxy::quadtree::{Insertion, MergeRules, NodeKind, Quadrant, Region};
/// use rs_galaxy::utils::TreeConstants;
///
/// let rules = MergeRules::new(&TreeConstants::default()).unwrap();
/// let region = Region::new((-10.0, -10.0), (10.0, 10.0)).unwrap();
/// let node = Quadrant::new(region);
///
/// let star = Particle::star(1.0, 1.0, 1.0).unwrap();
/// assert_eq!(node.insert(Body::new(ParticleRef(0), &star), &rules), Ok(Insertion::Inserted));
/// assert_eq!(node.kind(), NodeKind::Leaf);
/// assert_eq!(node.particle_count(), 1);
/// ```
#[derive(Debug)]
pub struct Quadrant {
    pub(super) region: Region,
    pub(super) content: Mutex<Content>,
    pub(super) children: OnceLock<Box<[Quadrant; 4]>>,
    pub(super) total_particles: AtomicU64,
    pub(super) mass: f64,
    pub(super) center_of_mass: (f32, f32),
    pub(super) resident: Option<ParticleRef>,
}

impl Quadrant {
    /// Creates an empty node covering `region`.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            content: Mutex::new(Content::Empty),
            children: OnceLock::new(),
            total_particles: AtomicU64::new(0),
            mass: 0.0,
            center_of_mass: (0.0, 0.0),
            resident: None,
        }
    }

    fn with_resident(region: Region, body: Body) -> Self {
        Self {
            content: Mutex::new(Content::Leaf(body)),
            total_particles: AtomicU64::new(1),
            ..Self::new(region)
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Number of particles inserted into this subtree. Merged particles are not counted.
    pub fn particle_count(&self) -> u64 {
        self.total_particles.load(Ordering::Relaxed)
    }

    /// Aggregate mass. Zero until `compute_mass` has run.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Mass-weighted centre of the subtree. `(0, 0)` until `compute_mass` has run,
    /// and it stays there for a subtree without mass.
    pub fn center_of_mass(&self) -> (f32, f32) {
        self.center_of_mass
    }

    /// The particle held by this leaf, once `compute_mass` has run.
    pub fn resident(&self) -> Option<ParticleRef> {
        self.resident
    }

    /// The four children, in `District` order, once the node has split.
    pub fn children(&self) -> Option<&[Quadrant; 4]> {
        self.children.get().map(|children| &**children)
    }

    pub fn kind(&self) -> NodeKind {
        if self.children.get().is_some() {
            return NodeKind::Internal;
        }
        match *self.content.lock().unwrap_or_else(PoisonError::into_inner) {
            Content::Empty => NodeKind::Empty,
            Content::Leaf(_) => NodeKind::Leaf,
            Content::Internal => NodeKind::Internal,
        }
    }

    /// The body currently held by this node, if it is a leaf.
    pub fn leaf_body(&self) -> Option<Body> {
        match *self.content.lock().unwrap_or_else(PoisonError::into_inner) {
            Content::Leaf(body) => Some(body),
            _ => None,
        }
    }

    /// Inserts `body`, drawing merge displacements from the thread-local RNG.
    pub fn insert(&self, body: Body, rules: &MergeRules) -> Result<Insertion, GalaxyError> {
        self.insert_with(body, rules, &mut rand::rng())
    }

    /// Inserts `body` into this subtree.
    ///
    /// Bodies outside the region are dropped silently: the domain is fixed and
    /// anything outside it has escaped. Inside, the node's lock is held only
    /// while this node's content is decided. Descending into a child happens
    /// after the lock is released.
    ///
    /// # Errors
    ///
    /// Returns `GalaxyError::LockPoisoned` if a node lock was poisoned by a
    /// panicking insert.
    pub fn insert_with<R: Rng + ?Sized>(
        &self,
        body: Body,
        rules: &MergeRules,
        rng: &mut R,
    ) -> Result<Insertion, GalaxyError> {
        if !self.region.contains(body.position) {
            return Ok(Insertion::Escaped);
        }

        let outcome = match self.children.get() {
            Some(children) => self.descend(children, body, rules, rng)?,
            None => self.insert_locked(body, rules, rng)?,
        };

        if outcome == Insertion::Inserted {
            self.total_particles.fetch_add(1, Ordering::Relaxed);
        }
        Ok(outcome)
    }

    fn insert_locked<R: Rng + ?Sized>(
        &self,
        body: Body,
        rules: &MergeRules,
        rng: &mut R,
    ) -> Result<Insertion, GalaxyError> {
        let mut content = self.content.lock().map_err(|_| GalaxyError::LockPoisoned)?;

        if *content == Content::Empty {
            *content = Content::Leaf(body);
            return Ok(Insertion::Inserted);
        }

        let split_off = match &mut *content {
            Content::Empty => unreachable!("empty quadrant is filled above"),
            Content::Leaf(resident) if rules.is_too_close(resident.distance_to(&body)) => {
                return Ok(Insertion::Merged(rules.resolve(resident, body, rng)));
            }
            Content::Leaf(resident) => Some(*resident),
            // Another thread split this node between our check and the lock.
            Content::Internal => None,
        };

        if let Some(resident) = split_off {
            // The resident moves straight into an empty child, so the new
            // children are complete before anyone else can see them.
            self.children.get_or_init(|| Box::new(self.split(resident)));
            *content = Content::Internal;
        }
        drop(content);

        match self.children.get() {
            Some(children) => self.descend(children, body, rules, rng),
            None => unreachable!("internal quadrant {:?} has no children", self.region),
        }
    }

    fn split(&self, resident: Body) -> [Quadrant; 4] {
        let regions = self.region.subdivide();
        let home = self.region.district(resident.position).index();
        std::array::from_fn(|i| {
            if i == home {
                Quadrant::with_resident(regions[i], resident)
            } else {
                Quadrant::new(regions[i])
            }
        })
    }

    fn descend<R: Rng + ?Sized>(
        &self,
        children: &[Quadrant; 4],
        body: Body,
        rules: &MergeRules,
        rng: &mut R,
    ) -> Result<Insertion, GalaxyError> {
        let district = self.region.district(body.position);
        children[district.index()].insert_with(body, rules, rng)
    }

    /// Visits every node of the subtree, parents before children.
    pub fn visit<F: FnMut(&Quadrant)>(&self, f: &mut F) {
        f(self);
        if let Some(children) = self.children.get() {
            for child in children.iter() {
                child.visit(f);
            }
        }
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        match self.children.get() {
            Some(children) => 1 + children.iter().map(Quadrant::depth).max().unwrap_or(0),
            None => 1,
        }
    }
}
