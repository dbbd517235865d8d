use approx::assert_relative_eq;

use crate::particles::{Body, Particle, ParticleRef};
use crate::quadtree::{build_frame, MergeKind, NodeKind, QuadtreeRoot, Region};
use crate::utils::{GalaxyError, TreeConstants, OFF_DOMAIN};

fn domain() -> Region {
    Region::new((-10.0, -10.0), (10.0, 10.0)).expect("valid region")
}

fn scenario() -> Vec<Particle> {
    vec![
        Particle::star(1.0, 1.0, 1.0).unwrap(),
        Particle::star(2.0, -3.0, 1.0).unwrap(),
        Particle::star(1.9999, -3.00001, 1.0).unwrap(),
    ]
}

#[test]
fn test_build_rejects_invalid_constants() {
    let constants = TreeConstants { theta: -1.0, ..TreeConstants::default() };
    let result = build_frame(domain(), &scenario(), &constants);
    assert!(matches!(result, Err(GalaxyError::InvalidConstant(_))));
}

#[test]
fn test_empty_frame() {
    let tree = build_frame(domain(), &[], &TreeConstants::default()).unwrap();
    assert_eq!(tree.particle_count(), 0);
    assert_eq!(tree.total_mass(), 0.0);
    assert_eq!(tree.center_of_mass(), (0.0, 0.0));
    assert_eq!(tree.depth(), 1);
    assert!(tree.accelerations(&[]).is_empty());
}

#[test]
fn test_scenario_merges_third_particle() {
    let particles = scenario();
    let tree = build_frame(domain(), &particles, &TreeConstants::default()).unwrap();

    assert_eq!(tree.root().kind(), NodeKind::Internal);
    assert_eq!(tree.particle_count(), 2);
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.escaped(), 0);

    // Whichever of the two close stars won the race, the pair conserved its mass.
    assert_eq!(tree.displaced().len(), 1);
    let loser = tree.displaced()[0];
    assert!(loser.particle == ParticleRef(1) || loser.particle == ParticleRef(2));
    assert_relative_eq!(tree.total_mass() + loser.mass, 3.0, max_relative = 1e-12);
}

#[test]
fn test_escaped_particles_are_counted() {
    let mut particles = scenario();
    particles.push(Particle::star(50.0, 0.0, 1.0).unwrap());
    particles.push(Particle::star(OFF_DOMAIN.0, OFF_DOMAIN.1, 1.0).unwrap());

    let tree = build_frame(domain(), &particles, &TreeConstants::default()).unwrap();

    assert_eq!(tree.escaped(), 2);
    assert_eq!(tree.particle_count(), 2);
}

#[test]
fn test_settle_writes_back_merges() {
    let mut particles = scenario();
    let tree = build_frame(domain(), &particles, &TreeConstants::default()).unwrap();
    let loser = tree.displaced()[0];
    let winner = if loser.particle == ParticleRef(1) { 2 } else { 1 };

    tree.settle(&mut particles);

    let moved = particles[loser.particle.index()];
    assert_eq!(moved.position, loser.position);
    assert_eq!(moved.mass, loser.mass);
    if loser.kind == MergeKind::Absorbed {
        assert_eq!(moved.position, OFF_DOMAIN);
    }
    assert_relative_eq!(particles[winner].mass + moved.mass, 2.0, max_relative = 1e-12);
    assert_eq!(particles[0].mass, 1.0);
    let total: f64 = particles.iter().map(|p| p.mass).sum();
    assert_relative_eq!(total, 3.0, max_relative = 1e-12);
}

#[test]
fn test_force_is_clamped_by_category() {
    let constants = TreeConstants {
        gamma: 1.0,
        star_accel_limit: 0.5,
        blackhole_accel_limit: 0.01,
        ..TreeConstants::default()
    };
    let particles = vec![
        Particle::blackhole(0.0, 0.0, 1000.0).unwrap(),
        Particle::star(1.0, 0.0, 1.0).unwrap(),
        Particle::blackhole(-1.0, 0.0, 1000.0).unwrap(),
    ];
    let tree = build_frame(domain(), &particles, &constants).unwrap();
    let accelerations = tree.accelerations(&particles);

    // Star: pulled left by two huge masses, capped at the star limit.
    assert_eq!(accelerations[1].0, -0.5);
    // Blackholes: pulled toward each other, capped much lower.
    assert_eq!(accelerations[0].0, -0.01);
    assert_eq!(accelerations[2].0, 0.01);
    for (_, ay) in &accelerations {
        assert!(ay.abs() <= 0.01);
    }
}

#[test]
fn test_accelerations_match_single_queries() {
    let particles: Vec<Particle> = (0..200)
        .map(|i| Particle::star(-9.0 + (i % 20) as f32 * 0.9, -9.0 + (i / 20) as f32 * 1.7, 1.0).unwrap())
        .collect();
    let tree = build_frame(domain(), &particles, &TreeConstants::default()).unwrap();

    let batch = tree.accelerations(&particles);
    for (i, particle) in particles.iter().enumerate() {
        assert_eq!(batch[i], tree.force_on(&Body::new(ParticleRef(i), particle)));
    }
}

#[test]
fn test_outlines_cover_every_node() {
    let particles = scenario();
    let tree: QuadtreeRoot = build_frame(domain(), &particles, &TreeConstants::default()).unwrap();
    let outlines = tree.outlines();
    // Root plus its four children.
    assert_eq!(outlines.len(), 5);
    assert_eq!(outlines[0], domain());
}

#[test]
fn test_display_summary() {
    let tree = build_frame(domain(), &scenario()[..2], &TreeConstants::default()).unwrap();
    let summary = tree.to_string();
    assert!(summary.starts_with("Quadtree: 2 particles"), "{}", summary);
    assert!(summary.contains("depth 2"));
}
