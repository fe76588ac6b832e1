pub mod configuration;
pub mod error;
pub mod output;
pub mod simulation;

pub use simulation::states::{MassiveBody, NVec3, SystemState, TracerSet};
pub use simulation::forces::{BackgroundField, ForceModel, SofteningKernel};
pub use simulation::integrator::{full_step, Scheme};
pub use simulation::adaptive::{adaptive_step, decide_substeps, DEFAULT_ETA, DEFAULT_N_SUB_MAX};
pub use simulation::driver::{BodyRecord, Simulator, StateCheck, StateCheckHook};
pub use simulation::scenario::Scenario;
pub use simulation::orbits;

pub use configuration::config::ScenarioConfig;

pub use output::sink::{CsvSink, MemorySink, PersistenceSink, TracerSnapshot};

pub use error::{Error, Result};
