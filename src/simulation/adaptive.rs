//! Adaptive sub-stepping near close tracer-secondary encounters
//!
//! A macro timestep is subdivided when it exceeds a fraction `eta` of the
//! local dynamical period at the closest tracer-secondary separation. Each
//! sub-step is a complete, independent run of the chosen multi-stage scheme
//! (with its own internal force evaluations), never a shortcut.

use log::debug;

use crate::error::{Error, Result};
use crate::simulation::forces::ForceModel;
use crate::simulation::integrator::{full_step, Scheme};
use crate::simulation::states::SystemState;

pub const DEFAULT_ETA: f64 = 0.01;
pub const DEFAULT_N_SUB_MAX: usize = 100;

/// Timestep resolving a fraction `eta` of the circular-orbit period at
/// radius `r` around mass `m`
pub fn dt_opt(r: f64, m: f64, g: f64, eta: f64) -> f64 {
    eta * 2.0 * std::f64::consts::PI * (r.powi(3) / (g * m)).sqrt()
}

/// Number of equal sub-steps the macro step `dt` must be split into
///
/// Always 1 when there are no tracers (no closest approach is defined). May
/// trigger one force evaluation if `r2_min` has not been computed at the
/// current positions yet. The raw secondary mass sets the dynamical period,
/// in both mass conventions.
pub fn decide_substeps(
    state: &mut SystemState,
    forces: &ForceModel,
    dt: f64,
    eta: f64,
    n_sub_max: usize,
) -> Result<usize> {
    if state.tracers.is_empty() {
        return Ok(1);
    }

    let r2_min = match state.r2_min {
        Some(r) => r,
        None => {
            forces.evaluate(state)?;
            state.r2_min.ok_or_else(|| {
                Error::Degenerate("closest tracer-secondary separation unavailable".into())
            })?
        }
    };

    let dt_opt = dt_opt(r2_min, state.body2.m, forces.g, eta);
    if dt_opt >= dt {
        Ok(1)
    } else {
        Ok(((dt / dt_opt).ceil() as usize).min(n_sub_max))
    }
}

/// Take one macro step of size `dt`, subdivided as `decide_substeps` dictates
///
/// Returns the number of sub-steps actually taken.
pub fn adaptive_step(
    state: &mut SystemState,
    forces: &ForceModel,
    dt: f64,
    scheme: Scheme,
    eta: f64,
    n_sub_max: usize,
) -> Result<usize> {
    let n_sub = decide_substeps(state, forces, dt, eta, n_sub_max)?;

    if n_sub == 1 {
        full_step(state, forces, dt, scheme, None)?;
        return Ok(1);
    }

    debug!("refining macro step into {n_sub} sub-steps (r2_min = {:?})", state.r2_min);
    let dt_sub = dt / n_sub as f64;
    for _ in 0..n_sub {
        full_step(state, forces, dt_sub, scheme, None)?;
    }
    Ok(n_sub)
}
