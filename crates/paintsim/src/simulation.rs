//! Central simulation state: particle pool + spatial hash + live list.
//!
//! [`PaintSimulation`] is the facade a host application drives. Its frame
//! loop is: drain the stroke queue through [`interact`](Self::interact) (or
//! [`deposit_stamp`](Self::deposit_stamp)), advance the simulation clock
//! once, then run [`tick`](Self::tick) and sync whatever the tick reports as
//! changed. Everything runs on the caller's thread; nothing here blocks.

use glam::Vec3;

use crate::grid::SpatialHash;
use crate::particle::{Particle, ParticleId, ParticlePool};
use crate::physics::{DEFAULT_MAX_PARTICLES, NEIGHBOR_CACHE_TTL, PARTICLE_R};

/// The paint particle system.
pub struct PaintSimulation {
    pub(crate) pool: ParticlePool,
    pub(crate) grid: SpatialHash,
    /// Slots currently attached to the grid, in allocation order.
    pub(crate) live: Vec<u32>,
    /// Simulated time in milliseconds. Advanced explicitly by the driver,
    /// never read from a wall clock; the neighbor cache TTL depends on it.
    time: f64,
    /// Reusable buffer for point queries, to keep them allocation-free.
    scratch: Vec<u32>,
}

impl PaintSimulation {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PARTICLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: ParticlePool::new(capacity),
            grid: SpatialHash::new(PARTICLE_R),
            live: Vec::with_capacity(capacity),
            time: 0.0,
            scratch: Vec::new(),
        }
    }

    /// Reallocate the pool. Destructive: every particle is dropped and every
    /// outstanding [`ParticleId`] is invalidated.
    pub fn set_capacity(&mut self, capacity: usize) {
        log::debug!("pool capacity {} -> {}", self.pool.capacity(), capacity);
        self.pool.resize(capacity);
        self.grid.clear();
        self.live.clear();
    }

    /// Advance the simulation clock. Call exactly once per frame, before
    /// [`tick`](Self::tick); the neighbor cache refreshes against this clock.
    pub fn advance_time(&mut self, dt_millis: f64) {
        self.time += dt_millis;
    }

    /// Current simulated time in milliseconds.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Read-only iteration over the live particles, in allocation order.
    /// For debug overlays and render-buffer sync.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.live.iter().map(move |&slot| self.pool.slot(slot))
    }

    /// Resolve a handle; `None` if the particle is gone or the pool was
    /// recycled since the handle was taken.
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.pool.get(id)
    }

    /// Remove all particles. The grid drops its backing store wholesale and
    /// every outstanding handle dies.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.live.clear();
        self.pool.reset();
    }

    /// Detach one particle from the grid and the live list (point erasure).
    /// Returns `false` for stale handles.
    pub fn remove(&mut self, id: ParticleId) -> bool {
        let Some(p) = self.pool.get(id) else {
            return false;
        };
        let key = p.last_hash;
        self.grid.remove(id.slot, key);
        if let Some(i) = self.live.iter().position(|&s| s == id.slot) {
            self.live.remove(i);
        }
        self.pool.detach(id.slot);
        true
    }

    /// Paint particles within `radius` of a point, for eraser flows.
    /// Pylons are deliberately excluded; they fall only with their stroke.
    pub fn remove_at(&mut self, point: Vec3, radius: f32) -> Vec<ParticleId> {
        let key = self.grid.key(point.x, point.z);
        let radius_sq = radius * radius;
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        self.gather_cells(key, None, &mut scratch);

        let mut found = Vec::new();
        for &slot in &scratch {
            let p = self.pool.slot(slot);
            if p.is_pylon() {
                continue;
            }
            let dx = p.position.x - point.x;
            let dz = p.position.z - point.z;
            if dx * dx + dz * dz < radius_sq {
                found.push(p.id());
            }
        }
        self.scratch = scratch;
        found
    }

    /// Gather every slot in the 3x3 cell neighborhood of `key`, excluding at
    /// most one slot (a particle never neighbors itself).
    pub(crate) fn gather_cells(&self, key: i64, exclude: Option<u32>, out: &mut Vec<u32>) {
        for k in SpatialHash::neighbor_keys(key) {
            for &slot in self.grid.bucket(k) {
                if exclude != Some(slot) {
                    out.push(slot);
                }
            }
        }
    }

    /// Rebuild a particle's cached neighborhood if the cache is older than
    /// the TTL. Candidates are unfiltered; the solver re-filters against the
    /// smoothing radius itself.
    pub(crate) fn refresh_neighbors(&mut self, slot: u32) {
        let (key, stamp) = {
            let p = self.pool.slot(slot);
            (p.last_hash, p.neighbor_time)
        };
        if self.time - stamp < NEIGHBOR_CACHE_TTL {
            return;
        }
        let mut cache = std::mem::take(&mut self.pool.slot_mut(slot).neighbors);
        cache.clear();
        self.gather_cells(key, Some(slot), &mut cache);
        let p = self.pool.slot_mut(slot);
        p.neighbors = cache;
        p.neighbor_time = self.time;
    }

    /// Take the scratch buffer out for a query; pair with `put_scratch`.
    pub(crate) fn take_scratch(&mut self) -> Vec<u32> {
        let mut buf = std::mem::take(&mut self.scratch);
        buf.clear();
        buf
    }

    pub(crate) fn put_scratch(&mut self, buf: Vec<u32>) {
        self.scratch = buf;
    }
}

impl Default for PaintSimulation {
    fn default() -> Self {
        Self::new()
    }
}
