//! Paint particles and the fixed-capacity pool they live in.
//!
//! Particles come in two kinds: mobile paint blobs carrying pigment, and
//! stationary pylons that anchor the boundary of a stroke. Records are
//! pre-allocated once and handed out by slot index, so steady-state painting
//! never allocates.

use glam::{Vec2, Vec3, Vec4};

use crate::physics::PARTICLE_R;

/// Pigment carried by a paint particle.
///
/// `flow` is the remaining ability to move and diffuse; it decays every tick
/// and is reset only when a fresh deposit merges in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pigment {
    /// Mass of pigment suspended in the particle.
    pub mass: f32,
    /// Granulation tendency of the pigment (render-side property).
    pub granulation: f32,
    /// Ability to flow, in `[0, 1]`.
    pub flow: f32,
}

impl Pigment {
    /// Four-lane export for vertex attribute sync; the last lane is padding.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.mass, self.granulation, self.flow, 0.0]
    }
}

/// Particle kind discriminator.
///
/// Pylons never integrate velocity; they only broadcast a decaying force and
/// mark the stroke boundary for nearby paint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ParticleKind {
    /// A mobile blob of pigment-laden liquid, subject to SPH forces.
    #[default]
    Paint,
    /// A stationary containment anchor at the stroke edge.
    Pylon,
}

/// Weak handle to a pooled particle: slot index plus generation.
///
/// Handles never own the particle. Lookups through [`ParticlePool::get`]
/// tolerate stale handles (recycled or removed slots) by returning `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleId {
    pub slot: u32,
    pub generation: u32,
}

/// A pooled simulation particle.
///
/// `position.y` is the fixed render height of the wash plane; all dynamics
/// happen in the XZ plane.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Current position. X and Z are planar, Y is the render height.
    pub position: Vec3,
    /// Snapshot used to detect movement worth reporting (> 1 unit).
    pub last_position: Vec3,
    /// Pigment payload.
    pub pigment: Pigment,
    /// Externally observed position + visible radius (`w`), mirrored into a
    /// vertex attribute by the host. The radius grows toward `radius_max`
    /// and never shrinks while the particle is live.
    pub transform: Vec4,
    /// Planar velocity.
    pub velocity: Vec2,
    /// Planar force accumulator. For pylons this is the brush-imposed
    /// advection force, decaying at rest.
    pub force: Vec2,
    /// Accumulated pylon-anchored containment direction.
    pub normal: Vec2,
    /// Offset from the last known closest pylon to this particle (particle
    /// minus pylon, pointing outward); gates which neighbor pylons may
    /// contribute to `normal` (same-side filter). `None` until the particle
    /// has been linked once.
    pub major_normal: Option<Vec2>,
    /// Particle color, mutated by mixing on merge and diffusion in the solver.
    pub color: Vec3,
    /// Target visible radius.
    pub radius_max: f32,
    /// Paint or pylon.
    pub kind: ParticleKind,
    /// Weak link to the closest containing pylon, if any. A paint particle
    /// with no link is held stationary by the solver.
    pub pylon: Option<ParticleId>,
    /// Normalized distance to the linked pylon: 0 at its center, 1 at its
    /// radius. Drives edge surface tension.
    pub pylon_distance: f32,
    /// Stroke the particle belongs to, for host-side bookkeeping.
    pub stroke_id: u32,

    // Per-tick scratch, written by the solver's density pass.
    pub density: f32,
    pub pressure: f32,
    pub mass_over_density: f32,

    pub(crate) slot: u32,
    pub(crate) generation: u32,
    /// Slot was individually removed; skip it when it shows up in stale
    /// neighbor caches.
    pub(crate) detached: bool,
    /// Grid bucket the particle was last filed under.
    pub(crate) last_hash: i64,
    /// Cached neighborhood (slot indices) and the sim time it was built at.
    pub(crate) neighbors: Vec<u32>,
    pub(crate) neighbor_time: f64,
}

impl Particle {
    pub(crate) fn vacant(slot: u32, generation: u32) -> Self {
        Self {
            position: Vec3::ZERO,
            last_position: Vec3::ZERO,
            pigment: Pigment::default(),
            transform: Vec4::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            normal: Vec2::ZERO,
            major_normal: None,
            color: Vec3::ZERO,
            radius_max: 0.0,
            kind: ParticleKind::Paint,
            pylon: None,
            pylon_distance: 0.0,
            stroke_id: 0,
            density: 0.0,
            pressure: 0.0,
            mass_over_density: 0.0,
            slot,
            generation,
            detached: false,
            last_hash: 0,
            neighbors: Vec::new(),
            neighbor_time: f64::NEG_INFINITY,
        }
    }

    /// Handle to this particle, valid until its slot is recycled or removed.
    #[inline]
    pub fn id(&self) -> ParticleId {
        ParticleId {
            slot: self.slot,
            generation: self.generation,
        }
    }

    /// Current visible radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.transform.w
    }

    #[inline]
    pub fn is_pylon(&self) -> bool {
        self.kind == ParticleKind::Pylon
    }

    /// Position projected onto the XZ plane.
    #[inline]
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    /// Re-initialize a claimed slot for a fresh deposit.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn activate(
        &mut self,
        position: Vec3,
        color: Vec3,
        mass: f32,
        granulation: f32,
        flow: f32,
        radius: f32,
        radius_max: f32,
        kind: ParticleKind,
        stroke_id: u32,
        hash: i64,
    ) {
        self.position = position;
        self.last_position = position;
        self.pigment = Pigment {
            mass,
            granulation,
            flow,
        };
        self.transform = Vec4::new(position.x, position.y, position.z, radius);
        self.velocity = Vec2::ZERO;
        self.force = Vec2::ZERO;
        self.normal = Vec2::ZERO;
        self.major_normal = None;
        self.color = color;
        self.radius_max = radius_max;
        self.kind = kind;
        self.pylon = None;
        self.pylon_distance = 0.0;
        self.stroke_id = stroke_id;
        self.density = 0.0;
        self.pressure = 0.0;
        self.mass_over_density = 0.0;
        self.detached = false;
        self.last_hash = hash;
        self.neighbors.clear();
        self.neighbor_time = f64::NEG_INFINITY;
    }
}

/// Fixed-capacity particle pool.
///
/// Slots are handed out in allocation order and only return to the unused
/// state in bulk, via [`reset`](Self::reset) or [`resize`](Self::resize).
/// Individually removed slots stay claimed (but detached) until the next
/// reset; removal exists for point erasure, not steady-state churn.
pub struct ParticlePool {
    slots: Vec<Particle>,
    allocated: usize,
    /// Monotonic generation source; bumped whenever handles must die.
    epoch: u32,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        let epoch = 1;
        Self {
            slots: (0..capacity)
                .map(|i| Particle::vacant(i as u32, epoch))
                .collect(),
            allocated: 0,
            epoch,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots claimed since the last reset, including detached ones.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Claim the next unused slot, or `None` when the pool is exhausted.
    pub(crate) fn claim(&mut self) -> Option<u32> {
        if self.allocated == self.slots.len() {
            return None;
        }
        let slot = self.allocated as u32;
        self.allocated += 1;
        Some(slot)
    }

    /// Resolve a handle, tolerating stale ones.
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        let p = self.slots.get(id.slot as usize)?;
        if p.generation == id.generation && !p.detached && (id.slot as usize) < self.allocated {
            Some(p)
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        let allocated = self.allocated;
        let p = self.slots.get_mut(id.slot as usize)?;
        if p.generation == id.generation && !p.detached && (id.slot as usize) < allocated {
            Some(p)
        } else {
            None
        }
    }

    /// Direct slot access for internal hot loops. The caller guarantees the
    /// index came from the live list, the grid, or a neighbor cache.
    #[inline]
    pub(crate) fn slot(&self, slot: u32) -> &Particle {
        &self.slots[slot as usize]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, slot: u32) -> &mut Particle {
        &mut self.slots[slot as usize]
    }

    /// Detach an individually removed slot so outstanding handles die.
    pub(crate) fn detach(&mut self, slot: u32) {
        self.slots[slot as usize].detached = true;
    }

    /// Return every slot to the unused state, invalidating all handles.
    pub(crate) fn reset(&mut self) {
        self.epoch += 1;
        for p in &mut self.slots {
            p.generation = self.epoch;
            p.detached = false;
            p.pylon = None;
            p.neighbors.clear();
            p.neighbor_time = f64::NEG_INFINITY;
        }
        self.allocated = 0;
    }

    /// Destructive capacity change: drops every particle and reallocates.
    pub(crate) fn resize(&mut self, capacity: usize) {
        self.epoch += 1;
        let epoch = self.epoch;
        self.slots = (0..capacity)
            .map(|i| Particle::vacant(i as u32, epoch))
            .collect();
        self.allocated = 0;
    }
}

/// Default radius helper: how large a deposit at this scale may grow.
#[inline]
pub fn scaled_radius(radius_scale: f32) -> f32 {
    (PARTICLE_R * radius_scale).clamp(crate::physics::MIN_DEPOSIT_RADIUS, PARTICLE_R)
}
