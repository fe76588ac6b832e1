//! Orbital-mechanics helpers for the body pair
//!
//! Works on relative coordinates (x1 - x2, v1 - v2) and the total mass, so
//! the same formulas apply in both the dynamic and fixed-primary conventions.

use crate::simulation::states::NVec3;

/// Osculating semi-major axis and eccentricity from a relative phase-space
/// point
///
/// Uses vis-viva for `a` and the specific angular momentum for `e`:
/// `a = (2/r - v^2/mu)^-1`, `e = sqrt(1 - |h|^2 / (mu a))` with `mu = G M`.
/// The eccentricity argument is clamped at zero so circular orbits do not
/// produce NaN from roundoff.
pub fn orbital_elements(dx: NVec3, dv: NVec3, m_tot: f64, g: f64) -> (f64, f64) {
    let mu = g * m_tot;
    let r = dx.norm();
    let v_sq = dv.norm_squared();

    let a = 1.0 / (2.0 / r - v_sq / mu);

    let h = dx.cross(&dv);
    let e_sq = 1.0 - h.norm_squared() / (mu * a);

    (a, e_sq.max(0.0).sqrt())
}

/// Kepler orbital period for semi-major axis `a`
pub fn t_orb(a: f64, m_tot: f64, g: f64) -> f64 {
    2.0 * std::f64::consts::PI * (a.powi(3) / (g * m_tot)).sqrt()
}
