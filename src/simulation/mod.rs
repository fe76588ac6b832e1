pub mod adaptive;
pub mod driver;
pub mod forces;
pub mod integrator;
pub mod orbits;
pub mod scenario;
pub mod states;
