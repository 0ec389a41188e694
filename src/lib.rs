//! Border Inspection Simulator - Rust Engine
//!
//! Stochastic Monte-Carlo simulation of a border-inspection pipeline for
//! agricultural consignments with deterministic execution.
//!
//! # Architecture
//!
//! - **models**: Domain types (Consignment, compact bitmaps)
//! - **generators**: Consignment synthesis (parameters, F280/AQIM records)
//! - **contamination**: Contaminant injection (rates, arrangements, rules)
//! - **programs**: Release programs (CFRP variants, skip lot state machines)
//! - **inspection**: Sampling, selection, and inspector simulation
//! - **orchestrator**: Main simulation loop and aggregation
//! - **outputs**: F280 records, pretty printing, success rates
//! - **scenarios**: Configuration sweeps over a scenario table
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG, explicitly threaded)
//! 2. Within one iteration, consignments are processed in strict order
//! 3. Per-item state is stored as compact bitmaps (~1 bit per item)

pub mod config;
pub mod contamination;
pub mod generators;
pub mod inputs;
pub mod inspection;
pub mod models;
pub mod orchestrator;
pub mod outputs;
pub mod programs;
pub mod rng;
pub mod scenarios;

// Re-exports for convenience
pub use config::{ConfigError, Diagnostic, DiagnosticCategory, SimulationConfig};
pub use contamination::{Arrangement, ContaminationConfig, RateDistribution};
pub use generators::{ConsignmentConfig, ConsignmentGenerator};
pub use inspection::{InspectionConfig, InspectionObservation, SampleStrategy, SelectionStrategy};
pub use models::{Bitmap, Consignment};
pub use orchestrator::{
    run_simulation, simulation, CancelToken, RunOptions, SimulationError, SimulationSummary,
    SimulationTotals,
};
pub use rng::SimRng;
