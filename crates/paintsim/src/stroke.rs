//! Stroke stamping: fanning one brush sample out into paint and pylons.
//!
//! A stroke sample is not a single particle. Each stamp scatters a handful
//! of paint deposits across the brush footprint and lays a lattice of pylons
//! over it so the wash has a boundary to pool against. Hosts that need finer
//! control can call [`PaintSimulation::interact`] directly.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::deposit::{BrushFeedback, DepositProps};
use crate::particle::{Particle, ParticleId, ParticleKind};
use crate::physics::PARTICLE_R;
use crate::simulation::PaintSimulation;

/// One resampled point along a stroke.
#[derive(Clone, Copy, Debug)]
pub struct StrokeSample {
    /// Stamp center. Y is the wash-plane height and is passed through.
    pub position: Vec3,
    /// Pen pressure in `[0, 1]`; scales the deposited pigment mass.
    pub pressure: f32,
    /// Force-create paint even over existing particles. Set on the first
    /// sample of a stroke so a dab always leaves a mark.
    pub force: bool,
}

impl PaintSimulation {
    /// Stamp one stroke sample.
    ///
    /// `props.radius_scale` is the brush footprint in particle radii, clamped
    /// to `[0.01, 2]`. Paint deposits are jittered uniformly across the
    /// footprint; pylons go on a regular lattice spanning it. Returns how
    /// many particles were created (merged-away samples count zero).
    pub fn deposit_stamp<B, R, F>(
        &mut self,
        sample: &StrokeSample,
        props: &DepositProps,
        brush: &mut B,
        rng: &mut R,
        mut on_changed: F,
    ) -> usize
    where
        B: BrushFeedback + ?Sized,
        R: Rng + ?Sized,
        F: FnMut(&Particle),
    {
        let scale = props.radius_scale.clamp(0.01, 2.0);
        let mut created = 0;

        // Paint: floor(scale^2) + 1 jittered deposits. The deposits are
        // nominal-size particles; the footprint only spreads them out.
        let spread = scale * PARTICLE_R;
        let count = (scale * scale) as u32 + 1;
        let paint = DepositProps {
            radius_scale: 1.0,
            mass: props.mass * sample.pressure,
            force_create: sample.force,
            ..*props
        };
        for _ in 0..count {
            let jitter = Vec3::new(
                (rng.gen::<f32>() - 0.5) * spread,
                0.0,
                (rng.gen::<f32>() - 0.5) * spread,
            );
            if self
                .interact(sample.position + jitter, &paint, brush, &mut on_changed)
                .is_some()
            {
                created += 1;
            }
        }

        // Pylons: a lattice of pitch `min(scale, 1)`, subdivided so wide
        // brushes still get interior anchors. Dedup against earlier stamps
        // happens in `interact` (pylons merge within their own radius).
        let mut pitch = scale.min(1.0);
        if scale > 1.0 {
            let n = (scale / pitch).round() + 1.0;
            pitch = scale / n;
        }
        let pylon = DepositProps {
            kind: ParticleKind::Pylon,
            radius_scale: pitch,
            mass: 0.0,
            granulation: 0.0,
            resistance: 0.0,
            force_create: false,
            ..*props
        };
        let mut z = -scale + pitch;
        while z <= scale - pitch + f32::EPSILON {
            let mut x = -scale + pitch;
            while x <= scale - pitch + f32::EPSILON {
                let at = sample.position + Vec3::new(PARTICLE_R * x, 0.0, PARTICLE_R * z);
                if self.interact(at, &pylon, brush, &mut on_changed).is_some() {
                    created += 1;
                }
                x += pitch;
            }
            z += pitch;
        }

        created
    }

    /// Impose a brush advection force on a pylon and snap it to full size.
    ///
    /// Called when a stroke drags across its own wash; the force decays at
    /// rest and is broadcast to nearby paint each tick. Returns `false` for
    /// stale handles and for paint particles.
    pub fn set_pylon_force(&mut self, id: ParticleId, force: Vec2) -> bool {
        match self.pool.get_mut(id) {
            Some(p) if p.is_pylon() => {
                p.force = force;
                p.transform.w = p.radius_max;
                true
            }
            _ => false,
        }
    }
}
