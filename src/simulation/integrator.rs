//! Multi-stage symplectic (time-reversible) leapfrog schemes
//!
//! Every scheme is an ordered sequence of drifts and kicks with a force
//! evaluation immediately preceding each kick. The stage order is strict:
//! reordering, fusing, or reusing a stale acceleration breaks
//! time-reversibility, so the sequences below are spelled out stage by stage
//! rather than generated.

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::forces::ForceModel;
use crate::simulation::states::SystemState;

// PEFRL stage coefficients (Omelyan, Mryglod & Folk 2002)
const XI: f64 = 0.1786178958448091;
const LAM: f64 = -0.2123418310626054;
const CHI: f64 = -0.066_264_582_669_818_49;

/// Which multi-stage scheme `full_step` executes
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// 2nd order drift-kick-drift leapfrog (1 force evaluation per step)
    #[serde(rename = "DKD")]
    Dkd,

    /// 2nd order kick-drift-kick leapfrog (2 force evaluations per step)
    #[serde(rename = "KDK")]
    Kdk,

    /// 4th order Forest-Ruth, 7 stages (3 force evaluations per step)
    #[serde(rename = "FR")]
    Fr,

    /// 4th order Position-Extended Forest-Ruth-Like, 11 stages
    /// (4 force evaluations per step)
    #[serde(rename = "PEFRL")]
    Pefrl,
}

impl Scheme {
    /// Formal order of the scheme
    pub fn order(self) -> u32 {
        match self {
            Scheme::Dkd | Scheme::Kdk => 2,
            Scheme::Fr | Scheme::Pefrl => 4,
        }
    }
}

/// Advance the system by exactly `dt` with the chosen scheme
///
/// `inds`, if given, restricts the drift/kick updates to that subset of
/// tracers (the bodies are always advanced). Accelerations are recomputed
/// from the current positions before every kick; on return the cached
/// accelerations match the final positions only for schemes ending in a kick.
pub fn full_step(
    state: &mut SystemState,
    forces: &ForceModel,
    dt: f64,
    scheme: Scheme,
    inds: Option<&[usize]>,
) -> Result<()> {
    match scheme {
        Scheme::Dkd => {
            state.xstep(0.5 * dt, inds);
            forces.evaluate(state)?;
            state.vstep(dt, inds);
            state.xstep(0.5 * dt, inds);
        }

        Scheme::Kdk => {
            forces.evaluate(state)?;
            state.vstep(0.5 * dt, inds);
            state.xstep(dt, inds);
            forces.evaluate(state)?;
            state.vstep(0.5 * dt, inds);
        }

        Scheme::Fr => {
            let theta = 1.0 / (2.0 - 2f64.powf(1.0 / 3.0));
            state.xstep(theta * dt / 2.0, inds);
            forces.evaluate(state)?;
            state.vstep(theta * dt, inds);
            state.xstep((1.0 - theta) * dt / 2.0, inds);
            forces.evaluate(state)?;
            state.vstep((1.0 - 2.0 * theta) * dt, inds);
            state.xstep((1.0 - theta) * dt / 2.0, inds);
            forces.evaluate(state)?;
            state.vstep(theta * dt, inds);
            state.xstep(theta * dt / 2.0, inds);
        }

        Scheme::Pefrl => {
            state.xstep(XI * dt, inds);
            forces.evaluate(state)?;
            state.vstep((1.0 - 2.0 * LAM) * dt / 2.0, inds);
            state.xstep(CHI * dt, inds);
            forces.evaluate(state)?;
            state.vstep(LAM * dt, inds);
            state.xstep((1.0 - 2.0 * (CHI + XI)) * dt, inds);
            forces.evaluate(state)?;
            state.vstep(LAM * dt, inds);
            state.xstep(CHI * dt, inds);
            forces.evaluate(state)?;
            state.vstep((1.0 - 2.0 * LAM) * dt / 2.0, inds);
            state.xstep(XI * dt, inds);
        }
    }

    state.t += dt;
    Ok(())
}
