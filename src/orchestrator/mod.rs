//! Orchestrator - single and multiple runs of the simulation
//!
//! Runs the per-consignment pipeline (generate → contaminate → release
//! program → inspect), aggregates per-run statistics, and averages them
//! across stochastic iterations.
//!
//! See `engine.rs` for the full implementation.

pub mod engine;

pub use engine::{
    run_simulation, simulation, CancelToken, RunOptions, RunRecord, SimulationError,
    SimulationSummary, SimulationTotals,
};
