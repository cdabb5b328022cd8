//! SPH kernel weights over unit support.
//!
//! Distances are pre-normalized by the smoothing radius, so every kernel here
//! takes `d` (or `d²`) in `[0, 1]` and the radius-dependent normalization
//! collapses into a single constant.
//!
//! Reference: Müller, Charypar, Gross. "Particle-Based Fluid Simulation for
//! Interactive Applications", 2003.

/// Poly6 normalization for unit support.
pub const POLY6_NORM: f32 = 1.715_889_2;

/// Spiky-gradient / viscosity-Laplacian normalization for unit support.
pub const SPIKY_NORM: f32 = 14.323_94;

/// Poly6 density weight, `W(d²) = k6 * (1 - d²)³`.
///
/// Caller guarantees `d2 < 1`.
#[inline]
pub fn poly6(d2: f32) -> f32 {
    let t = 1.0 - d2;
    POLY6_NORM * t * t * t
}

/// Spiky kernel gradient magnitude, `k * (1 - d)³`. Used for pressure.
#[inline]
pub fn spiky_gradient(d: f32) -> f32 {
    let t = 1.0 - d;
    SPIKY_NORM * t * t * t
}

/// Viscosity kernel Laplacian, `k * (1 - d)`. Used for velocity diffusion.
#[inline]
pub fn viscosity_laplacian(d: f32) -> f32 {
    SPIKY_NORM * (1.0 - d)
}
