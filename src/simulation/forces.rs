//! Force model: softened body-tracer gravity plus unsoftened body-body
//! gravity
//!
//! Each tracer feels both massive bodies through a configurable softening
//! kernel (a different kernel/softening length per body), and reacts back on
//! each body through the mass-weighted sum of its kernel accelerations, so
//! Newton's third law holds exactly. Tracer-tracer gravity does not exist.
//!
//! The per-tracer loop is a data-parallel reduction and runs on rayon; the
//! two reaction sums and the minimum separations are merged from per-thread
//! partials, so summation order (and least-significant bits) may vary between
//! runs.

use rayon::prelude::*;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::simulation::states::{NVec3, SystemState, TracerSet};

/// Regularization applied to the body-tracer force law near close encounters
///
/// All kernels take the *unit* separation vector and reduce to the Newtonian
/// acceleration `-G M r_hat / r^2` far outside the softening length.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SofteningKernel {
    /// `a = -G M r_hat / (r^2 + r_soft^2)`
    #[serde(rename = "plummer")]
    Plummer,

    /// `a = -G M r (r_hat/2) (2 r^2 + 5 r_soft^2) (r^2 + r_soft^2)^(-5/2)`
    #[serde(rename = "plummer2")]
    Plummer2,

    /// Finite sphere of uniform density: interior force grows linearly with
    /// r, matching the Newtonian value exactly at `r = r_soft`
    #[serde(rename = "uniform")]
    Uniform,

    /// Newtonian with the squared separation clamped below at `r_soft^2`
    #[serde(rename = "truncate")]
    Truncate,

    /// Zero force inside `r_soft`, exactly Newtonian outside
    #[serde(rename = "empty_shell")]
    EmptyShell,
}

impl SofteningKernel {
    /// Kernel acceleration for one tracer-body pair
    ///
    /// `gm` is `G * M_eff`, `u` the unit vector from body to tracer, `r_sq`
    /// the squared separation. Caller guarantees `r_sq > 0`.
    pub fn accel(self, gm: f64, u: NVec3, r_sq: f64, r_soft_sq: f64) -> NVec3 {
        match self {
            SofteningKernel::Plummer => -gm * u / (r_sq + r_soft_sq),
            SofteningKernel::Plummer2 => {
                let d = r_sq + r_soft_sq;
                -gm * r_sq.sqrt() * (u / 2.0) * (2.0 * r_sq + 5.0 * r_soft_sq) * d.powf(-2.5)
            }
            SofteningKernel::Uniform => {
                // x = r / r_soft; interior of the sphere pulls linearly in r
                let x_sq = r_sq / r_soft_sq;
                if x_sq <= 1.0 {
                    -gm * u * x_sq.sqrt() / r_soft_sq
                } else {
                    -gm * u / r_sq
                }
            }
            SofteningKernel::Truncate => -gm * u / r_sq.max(r_soft_sq),
            SofteningKernel::EmptyShell => {
                if r_sq < r_soft_sq {
                    NVec3::zeros()
                } else {
                    -gm * u / r_sq
                }
            }
        }
    }
}

/// Optional external acceleration field, added to every body and tracer after
/// the internal force sum (it carries no reaction force)
pub type BackgroundField = Box<dyn Fn(&NVec3) -> NVec3 + Send + Sync>;

/// Per-thread partial of the tracer reduction: mass-weighted reaction sums
/// and running minimum separations
struct Partial {
    react1: NVec3,
    react2: NVec3,
    r1_min: f64,
    r2_min: f64,
}

impl Partial {
    fn identity() -> Self {
        Self {
            react1: NVec3::zeros(),
            react2: NVec3::zeros(),
            r1_min: f64::INFINITY,
            r2_min: f64::INFINITY,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            react1: self.react1 + other.react1,
            react2: self.react2 + other.react2,
            r1_min: self.r1_min.min(other.r1_min),
            r2_min: self.r2_min.min(other.r2_min),
        }
    }
}

/// Kernel acceleration with the fail-fast degeneracy policy applied
///
/// An exactly coincident tracer-body pair has no defined direction; only the
/// empty-shell kernel (with a positive softening length) regularizes it, by
/// returning zero. Everything else is a hard error rather than a NaN that
/// would silently poison the state.
fn tracer_accel(
    kernel: SofteningKernel,
    gm: f64,
    dx: NVec3,
    r: f64,
    r_sq: f64,
    r_soft_sq: f64,
) -> Result<NVec3> {
    if r_sq == 0.0 {
        return match kernel {
            SofteningKernel::EmptyShell if r_soft_sq > 0.0 => Ok(NVec3::zeros()),
            _ => Err(Error::Degenerate(
                "tracer coincides with a massive body".into(),
            )),
        };
    }
    Ok(kernel.accel(gm, dx / r, r_sq, r_soft_sq))
}

/// Computes accelerations for both bodies and every tracer from the current
/// positions, and refreshes `r1_min` / `r2_min`
pub struct ForceModel {
    pub g: f64, // gravitational constant
    pub kernel1: SofteningKernel, // tracer-primary kernel
    pub r_soft_sq1: f64,
    pub kernel2: SofteningKernel, // tracer-secondary kernel
    pub r_soft_sq2: f64,
    background: Option<BackgroundField>,
}

impl ForceModel {
    /// New force model with the given tracer-secondary softening. The
    /// tracer-primary interaction defaults to the `uniform` kernel with the
    /// same softening length.
    pub fn new(g: f64, kernel2: SofteningKernel, r_soft_sq2: f64) -> Self {
        Self {
            g,
            kernel1: SofteningKernel::Uniform,
            r_soft_sq1: r_soft_sq2,
            kernel2,
            r_soft_sq2,
            background: None,
        }
    }

    /// Override the tracer-primary kernel and softening
    pub fn with_primary_kernel(mut self, kernel1: SofteningKernel, r_soft_sq1: f64) -> Self {
        self.kernel1 = kernel1;
        self.r_soft_sq1 = r_soft_sq1;
        self
    }

    /// Attach a background acceleration field
    pub fn with_background(mut self, field: BackgroundField) -> Self {
        self.background = Some(field);
        self
    }

    /// Evaluate all accelerations at the current positions
    ///
    /// Tracer i receives the kernel contributions from both bodies plus the
    /// background field. Each body receives the unsoftened Newtonian pull of
    /// the other plus the reaction `-(1/M_eff) * sum_i m_i a_i` over its own
    /// tracer contributions (background excluded from the reaction). A fixed
    /// primary keeps zero internal acceleration.
    pub fn evaluate(&self, state: &mut SystemState) -> Result<()> {
        let (m1_eff, m2_eff) = state.effective_masses();
        let x1 = state.body1.x;
        let x2 = state.body2.x;
        let g = self.g;
        let n = state.tracers.len();

        let partial = if n > 0 {
            let TracerSet { m, x, a, .. } = &mut state.tracers;
            let m = &m[..];
            let x = &x[..];
            let background = self.background.as_deref();
            let kernel1 = self.kernel1;
            let kernel2 = self.kernel2;
            let r_soft_sq1 = self.r_soft_sq1;
            let r_soft_sq2 = self.r_soft_sq2;

            a.par_iter_mut()
                .enumerate()
                .map(|(i, ai)| -> Result<Partial> {
                    let dx1 = x[i] - x1;
                    let r1_sq = dx1.norm_squared();
                    let r1 = r1_sq.sqrt();
                    let acc1 = tracer_accel(kernel1, g * m1_eff, dx1, r1, r1_sq, r_soft_sq1)?;

                    let dx2 = x[i] - x2;
                    let r2_sq = dx2.norm_squared();
                    let r2 = r2_sq.sqrt();
                    let acc2 = tracer_accel(kernel2, g * m2_eff, dx2, r2, r2_sq, r_soft_sq2)?;

                    *ai = acc1 + acc2;
                    if let Some(field) = background {
                        *ai += field(&x[i]);
                    }

                    Ok(Partial {
                        react1: m[i] * acc1,
                        react2: m[i] * acc2,
                        r1_min: r1,
                        r2_min: r2,
                    })
                })
                .try_reduce(Partial::identity, |lhs, rhs| Ok(lhs.merge(rhs)))?
        } else {
            Partial::identity()
        };

        // Body-body term: unsoftened Newtonian with the effective masses.
        // acc_bh is the acceleration of the primary due to the secondary.
        let dx12 = x1 - x2;
        let r12_sq = dx12.norm_squared();
        if r12_sq == 0.0 {
            return Err(Error::Degenerate("body-body separation is zero".into()));
        }
        let inv_r12_cubed = 1.0 / (r12_sq * r12_sq.sqrt());
        let acc_bh = -g * m2_eff * dx12 * inv_r12_cubed;

        state.body1.a = if state.body1.dynamic {
            acc_bh - partial.react1 / m1_eff
        } else {
            NVec3::zeros()
        };
        state.body2.a = -(m1_eff / m2_eff) * acc_bh - partial.react2 / m2_eff;

        if let Some(field) = &self.background {
            state.body1.a += field(&state.body1.x);
            state.body2.a += field(&state.body2.x);
        }

        state.r1_min = (n > 0).then_some(partial.r1_min);
        state.r2_min = (n > 0).then_some(partial.r2_min);

        Ok(())
    }
}
