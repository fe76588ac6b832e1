//! Build a fully-initialized simulator from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle:
//! system state at t = 0, force model, and a `Simulator` wired with the run
//! settings. All range validation happens here, before any stepping.

use log::info;

use crate::configuration::config::ScenarioConfig;
use crate::error::{Error, Result};
use crate::output::sink::CsvSink;
use crate::simulation::driver::Simulator;
use crate::simulation::forces::{ForceModel, SofteningKernel};
use crate::simulation::states::{NVec3, SystemState};

/// Runtime bundle: a ready-to-run simulator plus the loop settings that the
/// caller passes to `Simulator::run`
pub struct Scenario {
    pub sim: Simulator,
    pub dt: f64,
    pub t_end: f64,
    pub n_save: usize,
    pub n_update: usize,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("dt", &self.dt)
            .field("t_end", &self.t_end)
            .field("n_save", &self.n_save)
            .field("n_update", &self.n_update)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self> {
        validate(&cfg)?;

        let b = &cfg.binary;
        let mut system =
            SystemState::binary(b.m1, b.m2, b.a_i, b.e_i, b.dynamic, cfg.forces.g)?;

        // Tracers: map configs to runtime arrays. An absent list is the
        // explicit documented default of zero tracers.
        match &cfg.tracers {
            Some(tracers) => {
                for t in tracers {
                    system.tracers.push(
                        t.m,
                        NVec3::new(t.x[0], t.x[1], t.x[2]),
                        NVec3::new(t.v[0], t.v[1], t.v[2]),
                    );
                }
            }
            None => info!("no tracer list in scenario; running with zero tracers"),
        }

        let f = &cfg.forces;
        let mut forces = ForceModel::new(f.g, f.kernel, f.r_soft_sq);
        if f.kernel1.is_some() || f.r_soft_sq1.is_some() {
            let kernel1 = f.kernel1.unwrap_or(SofteningKernel::Uniform);
            let r_soft_sq1 = f.r_soft_sq1.unwrap_or(f.r_soft_sq);
            forces = forces.with_primary_kernel(kernel1, r_soft_sq1);
        }

        let mut sim = Simulator::new(system, forces, cfg.run.scheme);
        if let Some(eta) = cfg.run.eta {
            sim = sim.with_adaptive(eta, cfg.run.n_sub_max);
        }
        if let Some(path) = &cfg.run.output {
            sim = sim.with_sink(Box::new(CsvSink::create(path)?));
        }

        Ok(Self {
            sim,
            dt: cfg.run.dt,
            t_end: cfg.run.t_end,
            n_save: cfg.run.n_save,
            n_update: cfg.run.n_update,
        })
    }
}

fn validate(cfg: &ScenarioConfig) -> Result<()> {
    let reject = |cond: bool, msg: &str| -> Result<()> {
        if cond {
            Err(Error::InvalidConfig(msg.to_string()))
        } else {
            Ok(())
        }
    };

    // Body masses, orbit shape, and eccentricity are checked again by
    // SystemState::binary; the run parameters only here.
    reject(cfg.forces.g <= 0.0, "g must be positive")?;
    reject(cfg.forces.r_soft_sq < 0.0, "r_soft_sq must be non-negative")?;
    reject(
        cfg.forces.r_soft_sq1.is_some_and(|r| r < 0.0),
        "r_soft_sq1 must be non-negative",
    )?;
    reject(cfg.run.dt <= 0.0, "dt must be positive")?;
    reject(cfg.run.t_end <= 0.0, "t_end must be positive")?;
    reject(cfg.run.n_sub_max < 1, "n_sub_max must be at least 1")?;
    reject(cfg.run.n_save < 1, "n_save must be at least 1")?;
    reject(cfg.run.n_update < 1, "n_update must be at least 1")?;
    reject(
        cfg.run.eta.is_some_and(|eta| eta <= 0.0),
        "eta must be positive",
    )?;
    if let Some(tracers) = &cfg.tracers {
        reject(
            tracers.iter().any(|t| t.m < 0.0),
            "tracer masses must be non-negative",
        )?;
    }
    Ok(())
}
