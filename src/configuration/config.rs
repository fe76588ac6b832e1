//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`BinaryConfig`]  – masses and initial orbit of the two massive bodies
//! - [`ForcesConfig`]  – gravitational constant, softening kernels and lengths
//! - [`RunConfig`]     – scheme, timestep, cadences, adaptive settings, output
//! - [`TracerConfig`]  – optional explicit tracer phase-space points
//!
//! # YAML format
//! ```yaml
//! binary:
//!   m1: 1.0e6            # primary mass
//!   m2: 10.0             # secondary mass
//!   a_i: 1.0             # initial semi-major axis
//!   e_i: 0.0             # initial eccentricity
//!   dynamic: true        # false -> pin the primary, reduced-mass convention
//!
//! forces:
//!   g: 1.0               # gravitational constant
//!   kernel: "plummer"    # tracer-secondary kernel
//!   r_soft_sq: 1.0e-6    # squared softening length for the secondary
//!   # kernel1/r_soft_sq1 override the tracer-primary interaction
//!   # (default: "uniform" with the secondary's softening)
//!
//! run:
//!   scheme: "PEFRL"      # or "DKD", "KDK", "FR"
//!   dt: 1.0e-3
//!   t_end: 10.0
//!   eta: 0.01            # omit to disable adaptive sub-stepping
//!   n_sub_max: 100
//!   n_save: 1            # save body states every n_save steps
//!   n_update: 10000      # flush to the sink every n_update steps
//!   output: "run.csv"    # omit to keep history in memory only
//!
//! tracers:               # optional; omitting it means zero tracers
//!   - { m: 1.0e-4, x: [0.1, 0.0, 0.0], v: [0.0, 3.0, 0.0] }
//! ```
//!
//! Unknown kernel or scheme names fail at deserialization; numeric ranges are
//! validated when the scenario is built, before any stepping.

use std::path::PathBuf;

use serde::Deserialize;

use crate::simulation::adaptive::DEFAULT_N_SUB_MAX;
use crate::simulation::forces::SofteningKernel;
use crate::simulation::integrator::Scheme;

/// Masses and initial orbit of the body pair
#[derive(Deserialize, Debug, Clone)]
pub struct BinaryConfig {
    pub m1: f64, // primary mass (> 0)
    pub m2: f64, // secondary mass (> 0)
    pub a_i: f64, // initial semi-major axis (> 0)
    #[serde(default)]
    pub e_i: f64, // initial eccentricity, in [0, 1)
    #[serde(default = "default_true")]
    pub dynamic: bool, // false pins the primary at the origin
}

/// Force-law settings
#[derive(Deserialize, Debug, Clone)]
pub struct ForcesConfig {
    #[serde(default = "default_g")]
    pub g: f64, // gravitational constant
    pub kernel: SofteningKernel, // tracer-secondary softening kernel
    pub r_soft_sq: f64, // squared softening length for the secondary
    pub kernel1: Option<SofteningKernel>, // tracer-primary kernel override
    pub r_soft_sq1: Option<f64>, // tracer-primary softening override
}

/// Run-loop settings
#[derive(Deserialize, Debug, Clone)]
pub struct RunConfig {
    pub scheme: Scheme,
    pub dt: f64, // macro timestep (> 0)
    pub t_end: f64, // end time (> 0)
    pub eta: Option<f64>, // adaptive accuracy parameter; None = fixed steps
    #[serde(default = "default_n_sub_max")]
    pub n_sub_max: usize, // cap on sub-steps per macro step (>= 1)
    #[serde(default = "default_one")]
    pub n_save: usize, // save cadence in steps (>= 1)
    #[serde(default = "default_n_update")]
    pub n_update: usize, // sink-flush cadence in steps (>= 1)
    pub output: Option<PathBuf>, // CSV output path; None = in-memory only
}

/// One explicitly-specified tracer
#[derive(Deserialize, Debug, Clone)]
pub struct TracerConfig {
    pub m: f64, // tracer mass (>= 0)
    pub x: [f64; 3],
    pub v: [f64; 3],
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub binary: BinaryConfig,
    pub forces: ForcesConfig,
    pub run: RunConfig,
    /// Absent means zero tracers; this default is logged when the scenario is
    /// built, never applied silently
    pub tracers: Option<Vec<TracerConfig>>,
}

fn default_true() -> bool {
    true
}

fn default_g() -> f64 {
    1.0
}

fn default_one() -> usize {
    1
}

fn default_n_sub_max() -> usize {
    DEFAULT_N_SUB_MAX
}

fn default_n_update() -> usize {
    10_000
}
