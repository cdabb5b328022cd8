//! 2D smoothed-particle watercolor core.
//!
//! Framework-agnostic: this crate owns the particle state and the solver and
//! nothing else. A host application feeds it brush samples, advances its
//! clock, ticks it, and reads particle state back out for rendering. The
//! wash lives in the XZ plane; the Y coordinate is carried through untouched
//! as the render height.
//!
//! Typical frame loop:
//!
//! ```
//! use paintsim::{PaintParams, PaintSimulation, DepositProps, ParticleKind, Vec3};
//!
//! let mut sim = PaintSimulation::new();
//! let props = DepositProps {
//!     color: Vec3::new(0.1, 0.3, 0.8),
//!     radius_scale: 1.0,
//!     mass: 0.5,
//!     granulation: 0.0,
//!     resistance: 0.0,
//!     force_create: true,
//!     kind: ParticleKind::Paint,
//!     stroke_id: 0,
//! };
//! sim.interact(Vec3::ZERO, &props, &mut (), |_| {});
//!
//! sim.advance_time(16.0);
//! let result = sim.tick(&PaintParams::default(), 1.0);
//! if result.positions_changed {
//!     for p in sim.particles() {
//!         let _transform = p.transform; // sync into the render buffer
//!     }
//! }
//! ```

pub mod deposit;
pub mod grid;
pub mod kernels;
pub mod particle;
pub mod physics;
pub mod simulation;
pub mod sph;
pub mod stroke;

pub use deposit::{BrushFeedback, DepositProps};
pub use particle::{Particle, ParticleId, ParticleKind, Pigment};
pub use simulation::PaintSimulation;
pub use sph::{PaintParams, TickResult};
pub use stroke::StrokeSample;

pub use glam::{Vec2, Vec3};
