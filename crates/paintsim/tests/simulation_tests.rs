//! Integration tests for the watercolor particle core.
//! Run with: cargo test -p paintsim --release
//!
//! These tests verify critical simulation behaviors:
//! - P1: The particle pool never exceeds its capacity
//! - P2: Merging is mass-conserving and idempotent at equal masses
//! - P3: The spatial hash stays consistent across cell migrations
//! - P4: Pylon containment keeps a wash bounded under constant gravity
//! - P5: A dry medium freezes the wash completely
//! - P6: Clearing invalidates handles and leaves a usable simulation

use glam::{Vec2, Vec3};
use paintsim::{DepositProps, PaintParams, PaintSimulation, ParticleKind, StrokeSample};
use rand::rngs::StdRng;
use rand::SeedableRng;

const FRAME_MILLIS: f64 = 16.0;

fn paint_props(mass: f32) -> DepositProps {
    DepositProps {
        color: Vec3::new(0.7, 0.2, 0.1),
        radius_scale: 1.0,
        mass,
        granulation: 0.0,
        resistance: 0.0,
        force_create: true,
        kind: ParticleKind::Paint,
        stroke_id: 0,
    }
}

fn pylon_props() -> DepositProps {
    DepositProps {
        kind: ParticleKind::Pylon,
        mass: 0.0,
        force_create: false,
        ..paint_props(0.0)
    }
}

fn step(sim: &mut PaintSimulation, params: &PaintParams) -> paintsim::TickResult {
    sim.advance_time(FRAME_MILLIS);
    sim.tick(params, 1.0)
}

/// P1: No amount of stamping may push the live count past the pool capacity.
#[test]
fn test_pool_capacity_is_a_hard_bound() {
    const CAPACITY: usize = 50;
    let mut sim = PaintSimulation::with_capacity(CAPACITY);
    let mut rng = StdRng::seed_from_u64(42);

    for i in 0..40 {
        let sample = StrokeSample {
            position: Vec3::new(i as f32 * 24.0, 0.0, (i % 5) as f32 * 24.0),
            pressure: 1.0,
            force: true,
        };
        sim.deposit_stamp(&sample, &paint_props(0.5), &mut (), &mut rng, |_| {});
        assert!(sim.live_count() <= CAPACITY);
    }
    assert_eq!(sim.live_count(), CAPACITY);

    // A full pool rejects cleanly instead of panicking.
    assert!(sim
        .interact(Vec3::new(5000.0, 0.0, 0.0), &paint_props(0.5), &mut (), |_| {})
        .is_none());
}

/// P2: Merging two equal masses yields the same mass back, so re-stamping
/// the same spot with the same brush is idempotent.
#[test]
fn test_merge_is_idempotent_at_equal_mass() {
    let mut sim = PaintSimulation::with_capacity(16);
    let id = sim
        .interact(Vec3::ZERO, &paint_props(0.5), &mut (), |_| {})
        .unwrap();

    let mut merge = paint_props(0.5);
    merge.force_create = false;
    for _ in 0..10 {
        assert!(sim.interact(Vec3::ZERO, &merge, &mut (), |_| {}).is_none());
        let p = sim.get(id).unwrap();
        assert!((p.pigment.mass - 0.5).abs() < 1e-6);
        assert_eq!(p.radius_max, 32.0);
    }
    assert_eq!(sim.live_count(), 1);
}

/// P3: A particle pushed across a cell boundary must be re-bucketed, so
/// point queries at its new position still find it and removal stays clean.
#[test]
fn test_grid_stays_consistent_across_cell_migration() {
    let mut sim = PaintSimulation::with_capacity(16);
    sim.interact(Vec3::new(20.0, 0.0, 0.0), &pylon_props(), &mut (), |_| {})
        .unwrap();
    let id = sim
        .interact(Vec3::new(31.0, 0.0, 0.0), &paint_props(0.5), &mut (), |_| {})
        .unwrap();

    // Constant rightward gravity drives the paint over the x = 32 cell edge.
    let params = PaintParams {
        gravity: Vec2::new(3.0, 0.0),
        ..Default::default()
    };
    for _ in 0..4 {
        step(&mut sim, &params);
    }

    let position = sim.get(id).unwrap().position;
    assert!(position.x > 32.0, "paint should have crossed the cell edge");

    let hits = sim.remove_at(position, 4.0);
    assert!(hits.contains(&id), "query at the new position must find it");
    // Removal through the migrated bucket must succeed (and not trip the
    // grid's internal consistency check).
    assert!(sim.remove(id));
    assert!(sim.get(id).is_none());
}

/// P4: Paint inside a pylon's radius stays contained under constant gravity;
/// surface tension at the wash edge balances the pull.
#[test]
fn test_pylon_containment_bounds_the_wash() {
    let mut sim = PaintSimulation::with_capacity(16);
    let pylon = sim
        .interact(Vec3::ZERO, &pylon_props(), &mut (), |_| {})
        .unwrap();
    let paint = sim
        .interact(Vec3::new(8.0, 0.0, 0.0), &paint_props(0.5), &mut (), |_| {})
        .unwrap();

    let params = PaintParams {
        gravity: Vec2::new(0.25, 0.0),
        ..Default::default()
    };
    for _ in 0..300 {
        step(&mut sim, &params);
        let p = sim.get(paint).unwrap();
        assert!(p.pylon.is_some(), "paint must stay linked to its pylon");
        assert!(
            p.pylon_distance < 1.3,
            "containment failed: pylon_distance = {}",
            p.pylon_distance
        );
    }

    // It did drift toward the edge before tension caught it.
    let p = sim.get(paint).unwrap();
    assert!(p.position.x > 8.0);
    assert_eq!(p.pylon, Some(pylon));
}

/// P5: A dry medium never moves paint and never diffuses color.
#[test]
fn test_dry_medium_freezes_everything() {
    let mut sim = PaintSimulation::with_capacity(16);
    sim.interact(Vec3::ZERO, &pylon_props(), &mut (), |_| {})
        .unwrap();
    let a = sim
        .interact(Vec3::new(4.0, 0.0, 0.0), &paint_props(0.5), &mut (), |_| {})
        .unwrap();
    let mut blue = paint_props(0.5);
    blue.color = Vec3::new(0.0, 0.0, 1.0);
    let b = sim
        .interact(Vec3::new(7.0, 0.0, 0.0), &blue, &mut (), |_| {})
        .unwrap();

    let dry = PaintParams {
        resistance: 1.0,
        gravity: Vec2::new(10.0, 0.0),
        ..Default::default()
    };
    let before_a = sim.get(a).unwrap().position;
    let before_color = sim.get(b).unwrap().color;
    for _ in 0..50 {
        let result = step(&mut sim, &dry);
        assert!(!result.colors_changed);
    }
    assert_eq!(sim.get(a).unwrap().position, before_a);
    assert_eq!(sim.get(b).unwrap().color, before_color);
}

/// P6: Clearing kills every handle but leaves the simulation fully usable.
#[test]
fn test_clear_then_repaint() {
    let mut sim = PaintSimulation::with_capacity(16);
    let mut rng = StdRng::seed_from_u64(1);
    let sample = StrokeSample {
        position: Vec3::ZERO,
        pressure: 1.0,
        force: true,
    };
    sim.deposit_stamp(&sample, &paint_props(0.5), &mut (), &mut rng, |_| {});
    let stale: Vec<_> = sim.particles().map(|p| p.id()).collect();
    let params = PaintParams {
        gravity: Vec2::new(1.0, 0.0),
        ..Default::default()
    };
    step(&mut sim, &params);

    sim.clear();
    assert_eq!(sim.live_count(), 0);
    for id in stale {
        assert!(sim.get(id).is_none());
        assert!(!sim.remove(id));
    }

    // Slots are recycled for a fresh stroke and the solver runs clean.
    sim.deposit_stamp(&sample, &paint_props(0.5), &mut (), &mut rng, |_| {});
    assert!(sim.live_count() > 0);
    for _ in 0..10 {
        step(&mut sim, &params);
    }
}

/// A lone deposit with no pylon anywhere: density stays at rest, nothing
/// moves, and ticks settle into reporting no changes.
#[test]
fn test_lone_deposit_reaches_steady_state() {
    let mut sim = PaintSimulation::with_capacity(4);
    let id = sim
        .interact(Vec3::new(3.0, 0.0, 9.0), &paint_props(0.8), &mut (), |_| {})
        .unwrap();

    let params = PaintParams {
        gravity: Vec2::new(0.0, 5.0),
        ..Default::default()
    };
    let mut last = Default::default();
    for _ in 0..5 {
        last = step(&mut sim, &params);
    }
    assert_eq!(last, paintsim::TickResult::default());

    let p = sim.get(id).unwrap();
    assert_eq!(p.position, Vec3::new(3.0, 0.0, 9.0));
    assert_eq!(p.density, 1.0);
    assert_eq!(p.radius(), 32.0);
}

/// End-to-end stroke: stamp a short line, drive it with gravity for a while,
/// and check the wash stays near the stroke and keeps its handles valid.
#[test]
fn test_stroke_wash_stays_near_the_stroke() {
    let mut sim = PaintSimulation::with_capacity(256);
    let mut rng = StdRng::seed_from_u64(99);

    for i in 0..8 {
        let sample = StrokeSample {
            position: Vec3::new(i as f32 * 12.0, 0.0, 0.0),
            pressure: 1.0,
            force: i == 0,
        };
        sim.deposit_stamp(&sample, &paint_props(0.6), &mut (), &mut rng, |_| {});
    }
    let ids: Vec<_> = sim.particles().map(|p| p.id()).collect();

    let params = PaintParams {
        gravity: Vec2::new(0.0, 0.5),
        viscosity: 0.3,
        ..Default::default()
    };
    for _ in 0..200 {
        step(&mut sim, &params);
    }

    for id in ids {
        let p = sim.get(id).expect("ticking must not invalidate handles");
        // Stroke spans x in [0, 84] with 32-unit footprints; contained paint
        // cannot wander far past the pylon lattice.
        assert!(p.position.x > -120.0 && p.position.x < 220.0);
        assert!(p.position.z.abs() < 160.0, "wash escaped: z = {}", p.position.z);
    }
}
