//! Deposition: turning a brush-stroke sample into a merge-or-create update.
//!
//! Every sample either consolidates into nearby particles of the same kind
//! (mixing color and mass, feeding dilution back to the brush) or claims a
//! fresh slot from the pool. Overlapping strokes merge into EVERY matching
//! neighbor within the threshold, not just the closest one; that is what
//! consolidates mass when a stroke doubles back over itself.

use glam::Vec3;

use crate::particle::{scaled_radius, Particle, ParticleId, ParticleKind};
use crate::physics::{
    COLOR_FEEDBACK, FORCED_MERGE_RADIUS, MERGE_RADIUS, MIN_BLOOM_FLOW, MIN_MERGE_MASS,
    WATER_FEEDBACK,
};
use crate::simulation::PaintSimulation;

/// Brush-side feedback channel for deposition.
///
/// Depositing pigment onto a wetter or heavier spot than the brush carries
/// dilutes the brush; these two calls are how the core reports that back.
pub trait BrushFeedback {
    /// Water picked up by (positive) or taken from the brush.
    fn water_update(&mut self, delta: f32);
    /// Pull the brush color toward `color` with the given lerp weight.
    fn color_update(&mut self, weight: f32, color: Vec3);
}

/// No-op sink for hosts that do not track brush state.
impl BrushFeedback for () {
    fn water_update(&mut self, _delta: f32) {}
    fn color_update(&mut self, _weight: f32, _color: Vec3) {}
}

/// Properties of one deposition sample.
#[derive(Clone, Copy, Debug)]
pub struct DepositProps {
    /// Pigment color carried by the brush.
    pub color: Vec3,
    /// Brush size scale; the candidate radius is `32 * radius_scale`,
    /// clamped to `[16, 32]`.
    pub radius_scale: f32,
    /// Pigment mass deposited by this sample. Pylons carry none.
    pub mass: f32,
    /// Pigment granulation, passed through to the particle.
    pub granulation: f32,
    /// Paint resistance of the medium; the new particle's flow is
    /// `1 - resistance`.
    pub resistance: f32,
    /// Create a particle even if the sample merged into neighbors.
    pub force_create: bool,
    /// Paint or pylon.
    pub kind: ParticleKind,
    /// Stroke the sample belongs to.
    pub stroke_id: u32,
}

impl PaintSimulation {
    /// Deposit one sample at `point`.
    ///
    /// Returns the created particle's handle, or `None` when the sample was
    /// absorbed by a merge (and not force-created) or the pool is exhausted.
    /// `on_changed` fires for every particle touched or created, so the host
    /// can sync its vertex attributes.
    pub fn interact<B, F>(
        &mut self,
        point: Vec3,
        props: &DepositProps,
        brush: &mut B,
        mut on_changed: F,
    ) -> Option<ParticleId>
    where
        B: BrushFeedback + ?Sized,
        F: FnMut(&Particle),
    {
        let flow = 1.0 - props.resistance;
        let radius = scaled_radius(props.radius_scale);
        let key = self.grid.key(point.x, point.z);

        // Pylons merge within their own radius; paint merges much tighter so
        // strokes stay granular enough to flow.
        let threshold = if props.kind == ParticleKind::Pylon {
            radius
        } else {
            MERGE_RADIUS
        };
        let threshold_sq = threshold * threshold;

        let neighbors = {
            let mut buf = self.take_scratch();
            self.gather_cells(key, None, &mut buf);
            buf
        };

        let mut found = false;
        for &slot in &neighbors {
            let n = self.pool.slot_mut(slot);
            if n.kind != props.kind {
                continue;
            }
            let dx = n.position.x - point.x;
            let dz = n.position.z - point.z;
            if dx * dx + dz * dz >= threshold_sq {
                continue;
            }

            let old_mass = n.pigment.mass;
            let combined = old_mass + props.mass;
            if combined > MIN_MERGE_MASS {
                if props.kind == ParticleKind::Paint {
                    n.color = n.color.lerp(props.color, props.mass / combined);
                }
                n.pigment.mass = 0.5 * combined;
                n.radius_max = n.radius_max.max(radius);

                // More pigment on the canvas than on the brush wets the
                // brush and pulls its color toward the mix; the reverse
                // dries and dilutes it.
                let dm = old_mass - props.mass;
                brush.water_update(WATER_FEEDBACK * dm.max(0.0));
                brush.color_update(COLOR_FEEDBACK * (1.0 + dm), n.color);
            }

            on_changed(n);
            found = true;
        }
        self.put_scratch(neighbors);

        if found && !props.force_create {
            return None;
        }

        // A forced deposit on top of a merge starts small and blooms; a
        // deposit on open canvas starts at full size.
        let initial_radius = if found && flow > MIN_BLOOM_FLOW {
            FORCED_MERGE_RADIUS
        } else {
            radius
        };

        let Some(slot) = self.pool.claim() else {
            log::debug!("particle pool exhausted at {} slots", self.pool.capacity());
            return None;
        };

        let p = self.pool.slot_mut(slot);
        p.activate(
            point,
            props.color,
            props.mass,
            props.granulation,
            flow,
            initial_radius,
            radius,
            props.kind,
            props.stroke_id,
            key,
        );
        let id = p.id();

        self.grid.insert(slot, key);
        self.live.push(slot);
        on_changed(self.pool.slot(slot));
        Some(id)
    }
}
