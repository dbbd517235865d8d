use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::particles::{Body, Particle, ParticleRef};
use crate::quadtree::{District, Insertion, MergeRules, NodeKind, Quadrant, Region};
use crate::utils::TreeConstants;

fn rules() -> MergeRules {
    MergeRules::new(&TreeConstants::default()).expect("valid rules")
}

fn domain() -> Region {
    Region::new((-10.0, -10.0), (10.0, 10.0)).expect("valid region")
}

fn star(id: usize, x: f32, y: f32) -> Body {
    Body::new(ParticleRef(id), &Particle::star(x, y, 1.0).unwrap())
}

#[test]
fn test_insert_into_empty_makes_leaf() {
    let node = Quadrant::new(domain());
    assert_eq!(node.kind(), NodeKind::Empty);

    assert_eq!(node.insert(star(0, 1.0, 1.0), &rules()), Ok(Insertion::Inserted));

    assert_eq!(node.kind(), NodeKind::Leaf);
    assert_eq!(node.particle_count(), 1);
    assert_eq!(node.leaf_body().map(|b| b.id), Some(ParticleRef(0)));
    assert!(node.children().is_none());
}

#[test]
fn test_insert_outside_is_dropped() {
    let node = Quadrant::new(domain());
    node.insert(star(0, 1.0, 1.0), &rules()).unwrap();

    for (i, (x, y)) in [(10.5, 0.0), (0.0, -11.0), (f32::MAX, f32::MAX), (-100.0, 100.0)].into_iter().enumerate() {
        assert_eq!(node.insert(star(i + 1, x, y), &rules()), Ok(Insertion::Escaped));
    }

    assert_eq!(node.particle_count(), 1);
    assert_eq!(node.kind(), NodeKind::Leaf);
}

#[test]
fn test_two_particles_split_root() {
    let node = Quadrant::new(domain());
    node.insert(star(0, 1.0, 1.0), &rules()).unwrap();
    node.insert(star(1, 2.0, -3.0), &rules()).unwrap();

    assert_eq!(node.kind(), NodeKind::Internal);
    assert_eq!(node.particle_count(), 2);

    let children = node.children().expect("root has split");
    let ne = &children[District::NE.index()];
    let se = &children[District::SE.index()];
    assert_eq!(ne.particle_count(), 1);
    assert_eq!(se.particle_count(), 1);
    assert_eq!(ne.leaf_body().map(|b| b.id), Some(ParticleRef(0)));
    assert_eq!(se.leaf_body().map(|b| b.id), Some(ParticleRef(1)));
    assert_eq!(children[District::SW.index()].kind(), NodeKind::Empty);
    assert_eq!(children[District::NW.index()].kind(), NodeKind::Empty);
}

#[test]
fn test_close_particle_merges_instead_of_splitting() {
    let node = Quadrant::new(domain());
    node.insert(star(0, 1.0, 1.0), &rules()).unwrap();
    node.insert(star(1, 2.0, -3.0), &rules()).unwrap();

    let outcome = node.insert(star(2, 1.9999, -3.00001), &rules()).unwrap();

    match outcome {
        Insertion::Merged(displacement) => {
            assert_eq!(displacement.particle, ParticleRef(2));
        }
        other => panic!("expected a merge, got {:?}", other),
    }
    assert_eq!(node.particle_count(), 2);
    let se = &node.children().unwrap()[District::SE.index()];
    assert_eq!(se.kind(), NodeKind::Leaf);
    assert_eq!(se.particle_count(), 1);
    assert_eq!(se.leaf_body().map(|b| b.id), Some(ParticleRef(1)));
    assert_eq!(node.depth(), 2);
}

#[test]
fn test_merge_grows_resident_mass() {
    let node = Quadrant::new(domain());
    let mut rng = StdRng::seed_from_u64(9);
    node.insert_with(star(0, 2.0, -3.0), &rules(), &mut rng).unwrap();

    let outcome = node.insert_with(star(1, 2.0, -3.0), &rules(), &mut rng).unwrap();

    let Insertion::Merged(displacement) = outcome else {
        panic!("coincident particles must merge");
    };
    let resident = node.leaf_body().expect("still a leaf");
    assert!((resident.mass + displacement.mass - 2.0).abs() < 1e-12);
    assert!(resident.mass > 1.0);
}

#[test]
fn test_coincident_particles_do_not_recurse() {
    let node = Quadrant::new(domain());
    for i in 0..1000 {
        node.insert(star(i, 0.0, 0.0), &rules()).unwrap();
    }
    assert_eq!(node.particle_count(), 1);
    assert_eq!(node.depth(), 1);
}

#[test]
fn test_nearby_particles_split_until_separated() {
    let node = Quadrant::new(domain());
    node.insert(star(0, 0.1, 0.1), &rules()).unwrap();
    node.insert(star(1, 0.1015, 0.1), &rules()).unwrap();

    assert_eq!(node.particle_count(), 2);
    // 20 / 2^depth must drop below the 0.0015 separation.
    assert!(node.depth() > 10);
    assert!(node.depth() < 30);
}

#[test]
fn test_concurrent_insert_counts_every_particle() {
    let node = Quadrant::new(domain());
    let rules = rules();
    let bodies: Vec<Body> = (0..80)
        .flat_map(|i| (0..80).map(move |j| (i, j)))
        .enumerate()
        .map(|(id, (i, j))| star(id, -9.9 + i as f32 * 0.25, -9.9 + j as f32 * 0.25))
        .collect();

    let outcomes: Vec<Insertion> = bodies
        .par_iter()
        .map(|body| node.insert(*body, &rules).unwrap())
        .collect();

    assert!(outcomes.iter().all(|o| *o == Insertion::Inserted));
    assert_eq!(node.particle_count(), bodies.len() as u64);

    let mut leaves = 0;
    node.visit(&mut |q: &Quadrant| {
        if q.kind() == NodeKind::Leaf {
            leaves += 1;
        }
    });
    assert_eq!(leaves, bodies.len());
}

#[test]
fn test_counts_are_consistent_down_the_tree() {
    let node = Quadrant::new(domain());
    for (i, (x, y)) in [(1.0, 1.0), (-2.0, 3.0), (4.0, -4.0), (-5.0, -5.0), (1.5, 1.5), (0.0, 0.0)].into_iter().enumerate() {
        node.insert(star(i, x, y), &rules()).unwrap();
    }
    node.visit(&mut |q: &Quadrant| {
        if let Some(children) = q.children() {
            let sum: u64 = children.iter().map(Quadrant::particle_count).sum();
            assert_eq!(sum, q.particle_count());
        }
    });
}
