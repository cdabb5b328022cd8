//! Unified tuning constants for the paint particle simulation.
//!
//! All simulation modules should use these constants instead of defining their
//! own. This prevents drift between subsystems and makes tuning easier.

/// Nominal paint particle radius in canvas units. Also the spatial hash cell
/// size, so one cell holds at most a handful of fully grown particles.
pub const PARTICLE_R: f32 = 32.0;

/// SPH smoothing kernel support radius.
///
/// Historically tuned between 32 and 48; kept equal to [`PARTICLE_R`] but
/// named separately because the two are independent knobs.
pub const SMOOTHING_RADIUS: f32 = 32.0;

/// Squared value, for distance tests in the hot loops.
pub const SMOOTHING_RADIUS_SQ: f32 = SMOOTHING_RADIUS * SMOOTHING_RADIUS;

/// Particle rest density. Doubles as the density floor, so the pressure and
/// viscosity denominators can never reach zero.
pub const REST_DENSITY: f32 = 1.0;

/// Default particle pool capacity.
pub const DEFAULT_MAX_PARTICLES: usize = 1000;

/// Neighbor cache lifetime in simulated milliseconds.
///
/// Measured against the driver-advanced simulation clock, never wall clock.
/// Empirically tuned; one frame at 60 Hz is ~16 ms, so a cache survives a
/// handful of frames.
pub const NEIGHBOR_CACHE_TTL: f64 = 100.0;

/// Smallest radius a deposited particle can request.
pub const MIN_DEPOSIT_RADIUS: f32 = 16.0;

/// Merge threshold for paint deposits. Pylons use their own radius instead.
pub const MERGE_RADIUS: f32 = PARTICLE_R / 3.0;

/// Initial visible radius for a particle force-created on top of a merge.
/// It grows toward `radius_max` from here, so fresh dabs bloom outward.
pub const FORCED_MERGE_RADIUS: f32 = 8.0;

/// Flow below which a forced deposit over a merge skips the bloom and starts
/// at full size. Distinct from [`MIN_MERGE_MASS`] even though the values
/// match; the two gate unrelated quantities.
pub const MIN_BLOOM_FLOW: f32 = 0.001;

/// Combined-mass floor below which a merge only notifies, never mixes.
/// Keeps massless pylon overlaps from producing NaN blend weights.
pub const MIN_MERGE_MASS: f32 = 0.001;

/// Brush water feedback gain on merge (`water_update` scale).
pub const WATER_FEEDBACK: f32 = 0.10;

/// Brush color feedback gain on merge (`color_update` scale).
pub const COLOR_FEEDBACK: f32 = 0.05;

/// Pressure stiffness: `pressure = K * (density - REST_DENSITY)`.
pub const PRESSURE_STIFFNESS: f32 = 0.5;

/// Normalized distance below which two paint particles exchange color.
pub const COLOR_DIFFUSION_RANGE: f32 = 0.2;

/// Color diffusion lerp rate per unit dt at full flow.
pub const COLOR_DIFFUSION_RATE: f32 = 0.01;

/// Per-dt exponential decay base for a pylon's broadcast force.
pub const PYLON_FORCE_DECAY: f32 = 0.99;

/// Per-tick multiplicative decay of a particle's ability to flow.
pub const FLOW_DECAY: f32 = 0.999;

/// Base velocity attenuation, further scaled by `(1 - resistance)` and flow.
pub const VELOCITY_ATTENUATION: f32 = 0.8;

/// Visible radius growth per tick, up to `radius_max`.
pub const RADIUS_GROWTH_PER_TICK: f32 = 1.0;

/// Resistance at or above which the medium is considered dry and the solver
/// short-circuits to radius growth only.
pub const DRY_RESISTANCE: f32 = 0.999;

/// Normalized pylon distance past which edge surface tension engages.
pub const SURFACE_TENSION_ONSET: f32 = 0.5;

/// L1 displacement below which a particle is left in place for the tick.
pub const MOVE_EPSILON: f32 = 0.001;

/// Drift since `last_position` that counts as a reportable position change.
pub const MOVE_NOTIFY_DISTANCE: f32 = 1.0;
