//! The wash solver: per-frame SPH pass over the live particle list.
//!
//! Three strictly ordered phases, each depending on the previous one:
//! density + pylon linkage, then forces, then integration. Pylons never
//! integrate; they only decay the advection force the brush imposed on them
//! and broadcast it to nearby paint in the force phase.
//!
//! Reference: Müller, Charypar, Gross. "Particle-Based Fluid Simulation for
//! Interactive Applications", 2003.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::kernels;
use crate::particle::ParticleKind;
use crate::physics::{
    COLOR_DIFFUSION_RANGE, COLOR_DIFFUSION_RATE, DRY_RESISTANCE, FLOW_DECAY, MOVE_EPSILON,
    MOVE_NOTIFY_DISTANCE, PRESSURE_STIFFNESS, PYLON_FORCE_DECAY, RADIUS_GROWTH_PER_TICK,
    REST_DENSITY, SMOOTHING_RADIUS, SMOOTHING_RADIUS_SQ, SURFACE_TENSION_ONSET,
    VELOCITY_ATTENUATION,
};
use crate::simulation::PaintSimulation;

/// Medium parameters supplied fresh by the host each tick.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintParams {
    /// Viscosity coefficient for the velocity-diffusion force.
    pub viscosity: f32,
    /// Pigment granulation of the medium (render-side, carried for hosts).
    pub granulation: f32,
    /// Paint resistance in `[0, 1]`; at `>= 0.999` the medium is dry and the
    /// solver short-circuits.
    pub resistance: f32,
    /// Gravity in the XZ plane (tilting the canvas).
    pub gravity: Vec2,
}

impl Default for PaintParams {
    fn default() -> Self {
        Self {
            viscosity: 0.3,
            granulation: 0.0,
            resistance: 0.0,
            gravity: Vec2::ZERO,
        }
    }
}

/// What a tick changed, so the host knows which buffers to re-upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickResult {
    pub positions_changed: bool,
    pub colors_changed: bool,
}

impl PaintSimulation {
    /// Run one solver tick over the live list.
    ///
    /// The driver must have advanced the simulation clock exactly once since
    /// the previous tick (see [`advance_time`](Self::advance_time)).
    pub fn tick(&mut self, paint: &PaintParams, dt: f32) -> TickResult {
        let mut pos_changed = 0usize;
        let mut clr_changed = 0usize;

        if self.live.is_empty() {
            return TickResult::default();
        }

        // Dry media cannot flow: snap radii and skip the physics entirely.
        // This also freezes color diffusion and containment on purpose.
        if paint.resistance >= DRY_RESISTANCE {
            for i in 0..self.live.len() {
                let slot = self.live[i];
                let p = self.pool.slot_mut(slot);
                if p.transform.w < p.radius_max {
                    p.transform.w = p.radius_max;
                    pos_changed += 1;
                }
            }
            return TickResult {
                positions_changed: pos_changed > 0,
                colors_changed: false,
            };
        }

        let live = std::mem::take(&mut self.live);

        // Phase A: radius growth, densities, pylon linkage.
        for &slot in &live {
            {
                let p = self.pool.slot_mut(slot);
                if p.transform.w < p.radius_max {
                    p.transform.w = (p.transform.w + RADIUS_GROWTH_PER_TICK).min(p.radius_max);
                    pos_changed += 1;
                }
                if p.kind == ParticleKind::Pylon {
                    // The brush influence recorded on the pylon fades at rest.
                    p.force *= PYLON_FORCE_DECAY.powf(dt);
                    continue;
                }
            }

            self.refresh_neighbors(slot);

            let (pos2, major) = {
                let p = self.pool.slot(slot);
                (p.planar(), p.major_normal)
            };
            let neighbors = std::mem::take(&mut self.pool.slot_mut(slot).neighbors);

            let mut density = REST_DENSITY;
            let mut norm = Vec2::ZERO;
            let mut best_sq = f32::INFINITY;
            let mut best_pylon: Option<u32> = None;
            for &j in &neighbors {
                let n = self.pool.slot(j);
                if n.detached {
                    continue;
                }
                let dv = pos2 - n.planar();
                let dist_sq = dv.length_squared();
                let d2 = dist_sq / SMOOTHING_RADIUS_SQ;
                // Everything past the kernel support is invisible this tick:
                // no density, no linkage, no say in the containment normal.
                if d2 >= 1.0 {
                    continue;
                }
                density += n.pigment.mass * kernels::poly6(d2);
                if n.kind == ParticleKind::Pylon {
                    let r_sq = n.radius() * n.radius();
                    if r_sq > 0.0 {
                        let normalized = dist_sq / r_sq;
                        if normalized < best_sq {
                            best_sq = normalized;
                            best_pylon = Some(j);
                        }
                    }
                    // Only pylons on the same side as the recorded major
                    // normal may shape the containment direction.
                    if let Some(major) = major {
                        if major.dot(dv) > 0.0 {
                            norm += dv.normalize_or_zero();
                        }
                    }
                }
            }

            // Resolve the pylon link before writing the particle back.
            let fresh_link = best_pylon.map(|j| {
                let pylon = self.pool.slot(j);
                (pylon.id(), pos2 - pylon.planar(), best_sq.sqrt())
            });
            let mut cached_distance = None;
            let mut link_died = false;
            if fresh_link.is_none() {
                if let Some(id) = self.pool.slot(slot).pylon {
                    match self.pool.get(id) {
                        // Out of range this tick: keep the link, refresh the
                        // distance from live positions instead of going stale.
                        Some(pylon) => {
                            cached_distance =
                                Some(pos2.distance(pylon.planar()) / pylon.radius().max(1e-6));
                        }
                        None => link_died = true,
                    }
                }
            }

            let p = self.pool.slot_mut(slot);
            p.neighbors = neighbors;
            p.force = Vec2::ZERO;
            p.density = density;
            p.pressure = PRESSURE_STIFFNESS * (density - REST_DENSITY);
            p.mass_over_density = p.pigment.mass / density;
            if let Some((id, from_pylon, distance)) = fresh_link {
                p.pylon = Some(id);
                p.major_normal = Some(from_pylon);
                p.pylon_distance = distance;
                p.normal = norm.normalize_or_zero();
            } else if link_died {
                p.pylon = None;
                p.pylon_distance = 0.0;
            } else if let Some(distance) = cached_distance {
                p.pylon_distance = distance;
            } else {
                p.pylon_distance = 0.0;
            }
        }

        // Phase B: pressure, viscosity, color diffusion, edge containment.
        for &slot in &live {
            {
                let p = self.pool.slot(slot);
                if p.is_pylon() {
                    continue;
                }
            }
            let (pos2, vel, flow, pressure_i, pylon_d, normal, mut force, mut color) = {
                let p = self.pool.slot(slot);
                (
                    p.planar(),
                    p.velocity,
                    p.pigment.flow,
                    p.pressure,
                    p.pylon_distance,
                    p.normal,
                    p.force,
                    p.color,
                )
            };
            let neighbors = std::mem::take(&mut self.pool.slot_mut(slot).neighbors);

            for &j in &neighbors {
                let n = self.pool.slot(j);
                if n.detached {
                    continue;
                }
                let toward = n.planar() - pos2;
                let dist_sq = toward.length_squared();
                if dist_sq >= SMOOTHING_RADIUS_SQ {
                    continue;
                }
                if n.is_pylon() {
                    // Pylons broadcast the brush's advection force.
                    force += n.force;
                } else {
                    let d = dist_sq.sqrt() / SMOOTHING_RADIUS;

                    if d < COLOR_DIFFUSION_RANGE {
                        color = color.lerp(n.color, COLOR_DIFFUSION_RATE * dt * flow);
                        clr_changed += 1;
                    }

                    // Symmetric pressure push, spiky-weighted.
                    force += toward.normalize_or_zero()
                        * (-0.5
                            * n.mass_over_density
                            * (pressure_i + n.pressure)
                            * kernels::spiky_gradient(d));

                    // Viscous drag toward the neighbor's velocity.
                    force += (n.velocity - vel)
                        * (paint.viscosity * n.mass_over_density * kernels::viscosity_laplacian(d));
                }
            }

            // Pooling at the wash edge: past half the pylon radius, surface
            // tension ramps in cubically and pulls the particle back.
            if pylon_d > SURFACE_TENSION_ONSET {
                let t = (2.0 * pylon_d - 1.0).clamp(0.0, 1.0);
                force -= normal * (2.0 * kernels::POLY6_NORM * t * t * t);
            }

            let p = self.pool.slot_mut(slot);
            p.neighbors = neighbors;
            p.force = force;
            p.color = color;
        }

        // Phase C: integrate and re-bucket moved particles.
        let attenuation = VELOCITY_ATTENUATION * (1.0 - paint.resistance);
        for &slot in &live {
            {
                let p = self.pool.slot(slot);
                // Pylons never move; paint that has never been contained by
                // a pylon is held stationary by contract.
                if p.is_pylon() || p.pylon.is_none() {
                    continue;
                }
            }
            let p = self.pool.slot_mut(slot);
            p.force += paint.gravity * p.pigment.mass;
            let acceleration = p.force * (dt / p.density);
            p.velocity = (p.velocity + acceleration) * (attenuation * p.pigment.flow);
            p.pigment.flow *= FLOW_DECAY;

            let displacement = p.velocity * dt;
            if displacement.x.abs() + displacement.y.abs() <= MOVE_EPSILON {
                continue;
            }
            p.position.x += displacement.x;
            p.position.z += displacement.y;
            p.transform.x = p.position.x;
            p.transform.z = p.position.z;
            if p.position.distance(p.last_position) > MOVE_NOTIFY_DISTANCE {
                p.last_position = p.position;
                pos_changed += 1;
            }
            let old_key = p.last_hash;
            let (x, z) = (p.position.x, p.position.z);

            let new_key = self.grid.key(x, z);
            if new_key != old_key {
                self.grid.migrate(slot, old_key, new_key);
                self.pool.slot_mut(slot).last_hash = new_key;
            }
        }

        self.live = live;
        TickResult {
            positions_changed: pos_changed > 0,
            colors_changed: clr_changed > 0,
        }
    }
}
