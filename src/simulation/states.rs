//! Core state types for the binary + tracer-cloud system
//!
//! Defines the mutable aggregate advanced by the integrator:
//! - `MassiveBody`   — one of the two heavy bodies (primary, secondary)
//! - `TracerSet`     — the cloud of light pseudo-particles
//! - `SystemState`   — both bodies + tracers + cached minimum separations
//!
//! The drift (`xstep`) and kick (`vstep`) primitives live here; the
//! integrator composes them into multi-stage schemes and enforces the
//! stage ordering.

use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::simulation::orbits;

pub type NVec3 = Vector3<f64>;

/// One of the two heavy bodies in the system
#[derive(Debug, Clone)]
pub struct MassiveBody {
    pub m: f64, // mass
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub a: NVec3, // acceleration (valid only right after a force evaluation)
    pub dynamic: bool, // false = held fixed, never drifted or kicked
}

impl MassiveBody {
    pub fn new(m: f64, x: NVec3, v: NVec3) -> Self {
        Self {
            m,
            x,
            v,
            a: NVec3::zeros(),
            dynamic: true,
        }
    }
}

/// Cloud of tracer particles in struct-of-arrays layout
///
/// All four arrays share the same leading dimension N. Tracers feel both
/// bodies and react back on them, but never on each other.
#[derive(Debug, Clone, Default)]
pub struct TracerSet {
    pub m: Vec<f64>,
    pub x: Vec<NVec3>,
    pub v: Vec<NVec3>,
    pub a: Vec<NVec3>,
}

impl TracerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Append one tracer, keeping the arrays in lockstep
    pub fn push(&mut self, m: f64, x: NVec3, v: NVec3) {
        self.m.push(m);
        self.x.push(x);
        self.v.push(v);
        self.a.push(NVec3::zeros());
    }

    pub fn total_mass(&self) -> f64 {
        self.m.iter().sum()
    }
}

/// Complete physical state of the system at time `t`
///
/// Constructed once from initial conditions, then mutated in place by the
/// integrator for the duration of the run. `r1_min`/`r2_min` hold the closest
/// current tracer separation from each body; they are `None` until the first
/// force evaluation (and always `None` when there are no tracers).
#[derive(Debug, Clone)]
pub struct SystemState {
    pub body1: MassiveBody, // primary
    pub body2: MassiveBody, // secondary
    pub tracers: TracerSet,
    pub t: f64,
    pub r1_min: Option<f64>,
    pub r2_min: Option<f64>,
}

impl SystemState {
    pub fn new(body1: MassiveBody, body2: MassiveBody) -> Self {
        Self {
            body1,
            body2,
            tracers: TracerSet::new(),
            t: 0.0,
            r1_min: None,
            r2_min: None,
        }
    }

    /// Set up a two-body binary with semi-major axis `a_i` and eccentricity
    /// `e_i`, starting at apoapsis in the x-y plane.
    ///
    /// With `dynamic = true` both bodies orbit their common centre of mass.
    /// With `dynamic = false` the primary is pinned at the origin and the
    /// secondary carries the full relative orbit; the force model then
    /// switches to the reduced-mass convention (see `effective_masses`).
    pub fn binary(m1: f64, m2: f64, a_i: f64, e_i: f64, dynamic: bool, g: f64) -> Result<Self> {
        if m1 <= 0.0 || m2 <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "body masses must be positive (got m1 = {m1}, m2 = {m2})"
            )));
        }
        if a_i <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "semi-major axis must be positive (got {a_i})"
            )));
        }
        if !(0.0..1.0).contains(&e_i) {
            return Err(Error::InvalidConfig(format!(
                "eccentricity must lie in [0, 1) (got {e_i})"
            )));
        }

        let m_tot = m1 + m2;

        // Apoapsis separation and the matching vis-viva speed
        let r_i = a_i * (1.0 + e_i);
        let v_i = (g * m_tot * (2.0 / r_i - 1.0 / a_i)).sqrt();

        // Offset about the centre of mass; a fixed primary sits at the origin
        // and the secondary carries the whole relative motion
        let f = if dynamic { m2 / m_tot } else { 0.0 };

        let mut body1 = MassiveBody::new(
            m1,
            NVec3::new(-r_i * f, 0.0, 0.0),
            NVec3::new(0.0, v_i * f, 0.0),
        );
        body1.dynamic = dynamic;

        let body2 = MassiveBody::new(
            m2,
            NVec3::new(r_i * (1.0 - f), 0.0, 0.0),
            NVec3::new(0.0, -v_i * (1.0 - f), 0.0),
        );

        Ok(Self::new(body1, body2))
    }

    pub fn m_tot(&self) -> f64 {
        self.body1.m + self.body2.m
    }

    /// Masses entering the force computation
    ///
    /// Both bodies dynamic: the bare masses `(M1, M2)`. Fixed primary: the
    /// primary absorbs the total mass `M1 + M2` and the secondary becomes the
    /// reduced mass `M1*M2/(M1+M2)`, so the secondary traces the exact
    /// relative two-body orbit around the pinned primary.
    pub fn effective_masses(&self) -> (f64, f64) {
        if self.body1.dynamic {
            (self.body1.m, self.body2.m)
        } else {
            let m_tot = self.m_tot();
            (m_tot, self.body1.m * self.body2.m / m_tot)
        }
    }

    /// Drift: positions advance by `v * h`
    ///
    /// `inds`, if given, restricts the update to that subset of tracers;
    /// excluded tracers do not move. Bodies are unaffected by the mask, and a
    /// non-dynamic body never moves at all.
    pub fn xstep(&mut self, h: f64, inds: Option<&[usize]>) {
        if self.body1.dynamic {
            self.body1.x += self.body1.v * h;
        }
        if self.body2.dynamic {
            self.body2.x += self.body2.v * h;
        }
        match inds {
            None => {
                for (x, v) in self.tracers.x.iter_mut().zip(self.tracers.v.iter()) {
                    *x += v * h;
                }
            }
            Some(inds) => {
                for &i in inds {
                    let v = self.tracers.v[i];
                    self.tracers.x[i] += v * h;
                }
            }
        }
    }

    /// Kick: velocities advance by `a * h`
    ///
    /// Accelerations must have been computed at the *current* positions; the
    /// integrator guarantees a force evaluation immediately before every kick.
    pub fn vstep(&mut self, h: f64, inds: Option<&[usize]>) {
        if self.body1.dynamic {
            self.body1.v += self.body1.a * h;
        }
        if self.body2.dynamic {
            self.body2.v += self.body2.a * h;
        }
        match inds {
            None => {
                for (v, a) in self.tracers.v.iter_mut().zip(self.tracers.a.iter()) {
                    *v += a * h;
                }
            }
            Some(inds) => {
                for &i in inds {
                    let a = self.tracers.a[i];
                    self.tracers.v[i] += a * h;
                }
            }
        }
    }

    /// Current osculating orbital elements (a, e) of the body pair
    pub fn orbital_elements(&self, g: f64) -> (f64, f64) {
        orbits::orbital_elements(
            self.body1.x - self.body2.x,
            self.body1.v - self.body2.v,
            self.m_tot(),
            g,
        )
    }

    /// Orbital period of the body pair at its current semi-major axis
    pub fn t_orb(&self, g: f64) -> f64 {
        let (a, _e) = self.orbital_elements(g);
        orbits::t_orb(a, self.m_tot(), g)
    }

    /// Kepler energy of the body pair alone (tracers excluded)
    pub fn two_body_energy(&self, g: f64) -> f64 {
        let dv = self.body1.v - self.body2.v;
        let r = (self.body1.x - self.body2.x).norm();
        let mu_red = self.body1.m * self.body2.m / self.m_tot();
        0.5 * mu_red * dv.norm_squared() - g * self.body1.m * self.body2.m / r
    }
}
