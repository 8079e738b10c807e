//! trackbar CLI
//!
//! Replays scripted pointer, scroll and resize interactions against a
//! scroll container on the headless host, and reports the observed state.

pub mod assert;
pub mod config;
pub mod report;
pub mod runner;
pub mod scenario;

pub use report::{ReportStatus, ScenarioReport};
pub use runner::{run_loaded_scenario, run_scenario, RunOutcome};
pub use scenario::{Scenario, ScenarioStep};
