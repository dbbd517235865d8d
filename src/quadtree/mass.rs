use std::sync::PoisonError;

use super::quadrant::Content;
use crate::quadtree::Quadrant;

impl Quadrant {
    /// Computes the mass and centre of mass of every node, bottom-up.
    ///
    /// Must run after every insert has returned. Taking `&mut self` enforces
    /// that. Each non-empty child is aggregated in its own rayon task, and
    /// the parent waits for all of them before summing. Empty children keep
    /// their zero mass and are skipped.
    pub fn compute_mass(&mut self) {
        // A poisoned lock means an insert panicked, and that panic has already
        // been propagated to the builder.
        let content = self.content.get_mut().unwrap_or_else(PoisonError::into_inner);

        match content {
            Content::Empty => {
                self.mass = 0.0;
                self.center_of_mass = (0.0, 0.0);
                self.resident = None;
            }
            Content::Leaf(body) => {
                self.mass = body.mass;
                self.center_of_mass = body.position;
                self.resident = Some(body.id);
            }
            Content::Internal => {
                self.resident = None;
                let Some(children) = self.children.get_mut() else {
                    return;
                };

                rayon::scope(|s| {
                    for child in children.iter_mut().filter(|child| child.particle_count() > 0) {
                        s.spawn(move |_| child.compute_mass());
                    }
                });

                let mut mass = 0.0;
                let (mut weighted_x, mut weighted_y) = (0.0_f64, 0.0_f64);
                for child in children.iter() {
                    mass += child.mass;
                    weighted_x += child.mass * child.center_of_mass.0 as f64;
                    weighted_y += child.mass * child.center_of_mass.1 as f64;
                }

                self.mass = mass;
                if mass > 0.0 {
                    self.center_of_mass = ((weighted_x / mass) as f32, (weighted_y / mass) as f32);
                }
            }
        }
    }
}
