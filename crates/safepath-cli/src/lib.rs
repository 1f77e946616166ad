//! Safepath CLI - offline route scenario evaluation.
//!
//! The `safepath` binary reads a scenario file (candidate routes plus hazard
//! zones), runs the engine over it and prints the evaluation as JSON.

pub mod scenario;

pub use scenario::Scenario;
