pub mod run;
pub mod tracing;
pub mod wiring;

pub use run::run;
pub use wiring::{wire_infrastructure, wire_passport_deps, WiringError};
