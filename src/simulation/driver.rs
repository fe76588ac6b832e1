//! Simulation driver: the macro step loop
//!
//! Owns the single live `SystemState`, applies the optional per-step
//! state-check hook, delegates stepping to the integrator (directly or
//! through the adaptive controller), records body trajectories at the save
//! cadence, and flushes them to a persistence sink at the update cadence.

use log::{info, warn};

use crate::error::Result;
use crate::output::sink::{PersistenceSink, TracerSnapshot};
use crate::simulation::adaptive::{adaptive_step, DEFAULT_N_SUB_MAX};
use crate::simulation::forces::ForceModel;
use crate::simulation::integrator::{full_step, Scheme};
use crate::simulation::orbits;
use crate::simulation::states::{NVec3, SystemState};

/// Verdict returned by the per-step state-check hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCheck {
    Continue,
    /// Stop the loop; the previous step stays fully applied, no partial step
    /// is ever taken
    Abort,
}

/// Hook invoked once per macro step, before stepping; may mutate the state
/// (e.g. remove captured tracers) or request an abort
pub type StateCheckHook = Box<dyn FnMut(&mut SystemState, usize) -> StateCheck + Send>;

/// One saved sample of the body trajectories
#[derive(Debug, Clone, Copy)]
pub struct BodyRecord {
    pub t: f64,
    pub m1: f64,
    pub m2: f64,
    pub x1: NVec3,
    pub v1: NVec3,
    pub x2: NVec3,
    pub v2: NVec3,
}

/// Runs the step loop and records trajectories
///
/// Adaptive sub-stepping is off by default; enable it with `with_adaptive`.
pub struct Simulator {
    pub system: SystemState,
    pub forces: ForceModel,
    pub scheme: Scheme,
    eta: Option<f64>,
    n_sub_max: usize,
    check_state: Option<StateCheckHook>,
    sink: Option<Box<dyn PersistenceSink>>,
    history: Vec<BodyRecord>,
    flushed: usize,
    current_step: usize,
    finished: bool,
}

impl Simulator {
    pub fn new(system: SystemState, forces: ForceModel, scheme: Scheme) -> Self {
        Self {
            system,
            forces,
            scheme,
            eta: None,
            n_sub_max: DEFAULT_N_SUB_MAX,
            check_state: None,
            sink: None,
            history: Vec::new(),
            flushed: 0,
            current_step: 0,
            finished: false,
        }
    }

    /// Enable adaptive sub-stepping near tracer-secondary close approaches
    pub fn with_adaptive(mut self, eta: f64, n_sub_max: usize) -> Self {
        self.eta = Some(eta);
        self.n_sub_max = n_sub_max;
        self
    }

    /// Install the per-step state-check hook
    pub fn with_check_state(mut self, hook: StateCheckHook) -> Self {
        self.check_state = Some(hook);
        self
    }

    /// Attach a persistence sink for history flushes
    pub fn with_sink(mut self, sink: Box<dyn PersistenceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// One macro step of size `dt` (subdivided if adaptive mode is enabled)
    pub fn step(&mut self, dt: f64) -> Result<()> {
        match self.eta {
            None => full_step(&mut self.system, &self.forces, dt, self.scheme, None)?,
            Some(eta) => {
                adaptive_step(
                    &mut self.system,
                    &self.forces,
                    dt,
                    self.scheme,
                    eta,
                    self.n_sub_max,
                )?;
            }
        }
        Ok(())
    }

    /// Run `ceil(t_end / dt)` macro steps, saving every `n_save` steps and
    /// flushing to the sink every `n_update` steps
    pub fn run(&mut self, dt: f64, t_end: f64, n_save: usize, n_update: usize) -> Result<()> {
        let n_step = (t_end / dt).ceil() as usize;
        info!(
            "simulating {n_step} steps of dt = {dt} ({:?}, adaptive = {})",
            self.scheme,
            self.eta.is_some()
        );

        let initial_tracers = self.tracer_snapshot();

        for it in 0..n_step {
            if let Some(check) = self.check_state.as_mut() {
                if check(&mut self.system, it) == StateCheck::Abort {
                    warn!("state check requested abort at step {it}");
                    break;
                }
            }

            if it % n_save == 0 {
                self.record();
            }
            if it % n_update == 0 {
                self.flush()?;
            }

            self.step(dt)?;
            self.current_step += 1;
        }

        self.flush()?;
        if let Some(sink) = self.sink.as_mut() {
            let fin = TracerSnapshot {
                m: self.system.tracers.m.clone(),
                x: self.system.tracers.x.clone(),
                v: self.system.tracers.v.clone(),
            };
            sink.finalize(&initial_tracers, &fin)?;
        }

        self.finished = true;
        info!("simulation completed at t = {}", self.system.t);
        Ok(())
    }

    /// Save the current binary configuration to the in-memory history
    fn record(&mut self) {
        self.history.push(BodyRecord {
            t: self.system.t,
            m1: self.system.body1.m,
            m2: self.system.body2.m,
            x1: self.system.body1.x,
            v1: self.system.body1.v,
            x2: self.system.body2.x,
            v2: self.system.body2.v,
        });
    }

    /// Hand rows recorded since the previous flush to the sink
    fn flush(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush(&self.history[self.flushed..])?;
        }
        self.flushed = self.history.len();
        Ok(())
    }

    fn tracer_snapshot(&self) -> TracerSnapshot {
        TracerSnapshot {
            m: self.system.tracers.m.clone(),
            x: self.system.tracers.x.clone(),
            v: self.system.tracers.v.clone(),
        }
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn steps_taken(&self) -> usize {
        self.current_step
    }

    pub fn history(&self) -> &[BodyRecord] {
        &self.history
    }

    /// Orbital-element time series `(t, a, e)` derived from the recorded
    /// history; `None` until the run has finished
    pub fn orbital_history(&self) -> Option<Vec<(f64, f64, f64)>> {
        if !self.finished {
            return None;
        }
        Some(
            self.history
                .iter()
                .map(|r| {
                    let (a, e) =
                        orbits::orbital_elements(r.x1 - r.x2, r.v1 - r.v2, r.m1 + r.m2, self.forces.g);
                    (r.t, a, e)
                })
                .collect(),
        )
    }
}
