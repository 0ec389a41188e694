//! Simulation engine: the per-consignment pipeline and run aggregation
//!
//! One stochastic iteration processes `num_consignments` consignments in
//! strict order:
//!
//! ```text
//! For each consignment:
//! 1. Generate (parameters or records)
//! 2. Contaminate (rules, rate, arrangement)
//! 3. Release program (may release uninspected)
//! 4. Inspect (sample, select, examine)
//! 5. Feed result back to the program, record statistics
//! ```
//!
//! The RNG draws happen in exactly that order, which makes runs
//! reproducible bit for bit for a fixed (seed, configuration, iteration)
//! triple. Iterations derive their seeds from the master seed with
//! [`SimRng::split_seed`], so the orchestrator may spread iterations over
//! threads without changing any iteration's stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{Diagnostic, SimulationConfig};
use crate::contamination::{contaminate, ContaminationError};
use crate::inputs::DataError;
use crate::inspection::{inspect, InspectionObservation};
use crate::outputs::{pretty_consignment, F280OutputRecord, PrettyStyle, SuccessRates};
use crate::programs::ProgramDecision;
use crate::rng::SimRng;

/// Cooperative cancellation signal, observed between consignments.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; running iterations stop at the next
    /// consignment boundary and report partial aggregates.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Options for one simulation run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Collect per-consignment run records (first iteration only)
    pub detailed: bool,

    /// Collect pretty renditions of each consignment (first iteration only)
    pub pretty: Option<PrettyStyle>,

    /// Collect F280 output records
    pub emit_f280: bool,

    /// Cooperative cancellation
    pub cancel: Option<CancelToken>,

    /// Worker threads for independent iterations (1 = sequential)
    pub num_threads: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            detailed: false,
            pretty: None,
            emit_f280: false,
            cancel: None,
            num_threads: 1,
        }
    }
}

/// Per-consignment observations (detailed mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub was_contaminated: bool,
    pub was_inspected: bool,
    pub detected: bool,
    pub true_contamination_rate: f64,
    pub items_inspected_to_detection: usize,
    pub items_inspected_to_completion: usize,
    pub boxes_opened_to_detection: usize,
    pub boxes_opened_to_completion: usize,
    /// Contaminated items examined but not flagged before the inspection
    /// would have stopped
    pub missed_contaminants_to_detection: usize,
    /// Contaminated items examined but not flagged over the whole sample
    pub missed_contaminants_to_completion: usize,
    /// Contaminated items the inspector flagged over the whole sample
    pub intercepted_contaminants_to_completion: usize,
    pub release_program: Option<String>,
}

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{0}")]
    Config(#[from] Diagnostic),

    #[error("{0}")]
    Data(#[from] DataError),

    #[error("{0}")]
    Contamination(#[from] ContaminationError),
}

/// Aggregated observations of one stochastic iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Consignments actually processed (smaller than requested only after
    /// cancellation)
    pub num_consignments: usize,

    /// False when the run was cancelled mid-way
    pub complete: bool,

    /// Percentage of contaminated consignments that passed inspection
    pub missing_pct: f64,
    pub false_negatives: usize,

    /// Missed consignments whose contamination rate was below the
    /// tolerance level
    pub missed_within_tolerance: usize,

    /// Contaminated consignments caught (true positives)
    pub intercepted: usize,

    pub num_inspections: usize,
    pub total_num_boxes: usize,
    pub total_num_items: usize,

    pub avg_boxes_opened_completion: f64,
    pub avg_boxes_opened_detection: f64,
    pub pct_boxes_opened_completion: f64,
    pub pct_boxes_opened_detection: f64,
    pub avg_items_inspected_completion: f64,
    pub avg_items_inspected_detection: f64,
    pub pct_items_inspected_completion: f64,
    pub pct_items_inspected_detection: f64,

    /// Share of contaminants that would go unreported if inspections
    /// stopped at first detection
    pub pct_contaminant_unreported_if_detection: f64,

    /// Mean true contamination rate over all consignments
    pub true_contamination_rate: f64,

    pub max_missed_contamination_rate: Option<f64>,
    pub avg_missed_contamination_rate: Option<f64>,
    pub max_intercepted_contamination_rate: Option<f64>,
    pub avg_intercepted_contamination_rate: Option<f64>,

    /// Contaminants in consignments that slipped through, total
    pub total_missed_contaminants: usize,

    /// Contaminants in consignments that were caught, total
    pub total_intercepted_contaminants: usize,

    /// Contaminated items examined but not flagged before inspections
    /// would have stopped, summed over inspected consignments
    pub sample_missed_contaminants_to_detection: usize,

    /// Contaminated items examined but not flagged, summed over full
    /// samples
    pub sample_missed_contaminants_to_completion: usize,

    /// F280 records, one per consignment (when requested)
    pub f280_records: Vec<F280OutputRecord>,

    /// Pretty renditions (when requested)
    pub pretty_renditions: Vec<String>,

    /// Per-consignment records (detailed mode)
    pub run_records: Option<Vec<RunRecord>>,
}

/// Simulate consignments, their contamination, and their inspection once.
pub fn simulation(
    config: &SimulationConfig,
    num_consignments: usize,
    seed: u64,
    options: &RunOptions,
) -> Result<SimulationSummary, SimulationError> {
    let mut rng = SimRng::from_seed(seed);
    let mut generator = config.consignment.build_generator(config.strict_input);
    let mut program = match &config.release_programs {
        Some(programs) => programs.build()?,
        None => None,
    };
    let tolerance_level = config.inspection.tolerance_level;
    let pretty_config = config.pretty.clone().unwrap_or_default();

    let mut summary = SimulationSummary {
        complete: true,
        run_records: options.detailed.then(Vec::new),
        ..Default::default()
    };
    let mut success_rates = SuccessRates::default();
    let mut missed_rates: Vec<f64> = Vec::new();
    let mut intercepted_rates: Vec<f64> = Vec::new();
    let mut true_rate_sum = 0.0;
    let mut boxes_opened_completion = 0usize;
    let mut boxes_opened_detection = 0usize;
    let mut items_inspected_completion = 0usize;
    let mut items_inspected_detection = 0usize;
    let mut contaminated_items_detection = 0usize;
    let mut contaminated_items_completion = 0usize;
    let mut missed_in_sample_detection = 0usize;
    let mut missed_in_sample_completion = 0usize;

    for _ in 0..num_consignments {
        if options
            .cancel
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
        {
            summary.complete = false;
            break;
        }

        let mut consignment = generator.generate(&mut rng)?;
        contaminate(&mut consignment, &config.contamination, &mut rng)?;
        if let Some(style) = options.pretty {
            summary
                .pretty_renditions
                .push(pretty_consignment(&consignment, style, &pretty_config));
        }

        let decision = match program.as_deref_mut() {
            Some(program) => program.evaluate(&consignment, &mut rng),
            None => ProgramDecision::inspect_always(),
        };

        let observation = if decision.inspect {
            inspect(
                &mut consignment,
                &config.inspection,
                &mut rng,
                options.detailed,
            )
        } else {
            // released: nothing is examined, the consignment passes
            InspectionObservation {
                checked_ok: true,
                contaminant_present: consignment.is_contaminated(),
                ..Default::default()
            }
        };
        let checked_ok = observation.checked_ok;

        if let Some(program) = program.as_deref_mut() {
            program.record_result(&consignment, decision.inspect, checked_ok);
        }

        summary.num_consignments += 1;
        summary.total_num_boxes += consignment.num_boxes();
        summary.total_num_items += consignment.num_items();
        if decision.inspect {
            summary.num_inspections += 1;
            boxes_opened_completion += observation.boxes_opened_completion;
            boxes_opened_detection += observation.boxes_opened_detection;
            items_inspected_completion += observation.items_inspected_completion;
            items_inspected_detection += observation.items_inspected_detection;
            contaminated_items_detection += observation.contaminated_items_detection;
            contaminated_items_completion += observation.intercepted_contaminants_completion;
            missed_in_sample_detection += observation.missed_contaminants_detection;
            missed_in_sample_completion += observation.missed_contaminants_completion;
        }

        if options.emit_f280 {
            summary.f280_records.push(F280OutputRecord::fill(
                &consignment,
                checked_ok,
                decision.inspect,
                decision.program.as_deref(),
                config.disposition_codes.as_ref(),
            ));
        }

        let actually_ok = !consignment.is_contaminated();
        success_rates.record(checked_ok, actually_ok, &consignment);
        let true_rate = consignment.contamination_rate();
        true_rate_sum += true_rate;
        if !actually_ok {
            if checked_ok {
                if true_rate < tolerance_level {
                    summary.missed_within_tolerance += 1;
                }
                missed_rates.push(true_rate);
                summary.total_missed_contaminants += consignment.count_contaminated();
            } else {
                intercepted_rates.push(true_rate);
                summary.total_intercepted_contaminants += consignment.count_contaminated();
            }
        }

        if let Some(records) = &mut summary.run_records {
            records.push(RunRecord {
                was_contaminated: !actually_ok,
                was_inspected: decision.inspect,
                detected: observation.detected,
                true_contamination_rate: true_rate,
                items_inspected_to_detection: observation.items_inspected_detection,
                items_inspected_to_completion: observation.items_inspected_completion,
                boxes_opened_to_detection: observation.boxes_opened_detection,
                boxes_opened_to_completion: observation.boxes_opened_completion,
                missed_contaminants_to_detection: observation.missed_contaminants_detection,
                missed_contaminants_to_completion: observation.missed_contaminants_completion,
                intercepted_contaminants_to_completion: observation
                    .intercepted_contaminants_completion,
                release_program: decision.program.clone(),
            });
        }
    }

    let processed = summary.num_consignments;
    summary.false_negatives = success_rates.false_negative;
    summary.intercepted = success_rates.true_positive;
    let num_contaminated = success_rates.true_positive + success_rates.false_negative;
    summary.missing_pct = if num_contaminated > 0 {
        100.0 * success_rates.false_negative as f64 / num_contaminated as f64
    } else {
        0.0
    };

    if processed > 0 {
        summary.avg_boxes_opened_completion = boxes_opened_completion as f64 / processed as f64;
        summary.avg_boxes_opened_detection = boxes_opened_detection as f64 / processed as f64;
        summary.avg_items_inspected_completion =
            items_inspected_completion as f64 / processed as f64;
        summary.avg_items_inspected_detection = items_inspected_detection as f64 / processed as f64;
        summary.true_contamination_rate = true_rate_sum / processed as f64;
    }
    if summary.total_num_boxes > 0 {
        summary.pct_boxes_opened_completion =
            100.0 * boxes_opened_completion as f64 / summary.total_num_boxes as f64;
        summary.pct_boxes_opened_detection =
            100.0 * boxes_opened_detection as f64 / summary.total_num_boxes as f64;
    }
    if summary.total_num_items > 0 {
        summary.pct_items_inspected_completion =
            100.0 * items_inspected_completion as f64 / summary.total_num_items as f64;
        summary.pct_items_inspected_detection =
            100.0 * items_inspected_detection as f64 / summary.total_num_items as f64;
    }
    if contaminated_items_completion > 0 {
        summary.pct_contaminant_unreported_if_detection = 100.0
            * (1.0 - contaminated_items_detection as f64 / contaminated_items_completion as f64);
    }

    summary.sample_missed_contaminants_to_detection = missed_in_sample_detection;
    summary.sample_missed_contaminants_to_completion = missed_in_sample_completion;

    summary.max_missed_contamination_rate = max_of(&missed_rates);
    summary.avg_missed_contamination_rate = mean_of(&missed_rates);
    summary.max_intercepted_contamination_rate = max_of(&intercepted_rates);
    summary.avg_intercepted_contamination_rate = mean_of(&intercepted_rates);

    Ok(summary)
}

fn max_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Averages over all stochastic iterations of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationTotals {
    /// Iterations that produced results
    pub num_simulations: usize,

    /// False when cancellation cut iterations or consignments short
    pub complete: bool,

    pub missing_pct: f64,
    pub false_negatives: f64,
    pub missed_within_tolerance: f64,
    pub intercepted: f64,
    pub num_inspections: f64,
    pub num_boxes: f64,
    pub num_items: f64,
    pub avg_boxes_opened_completion: f64,
    pub avg_boxes_opened_detection: f64,
    pub pct_boxes_opened_completion: f64,
    pub pct_boxes_opened_detection: f64,
    pub avg_items_inspected_completion: f64,
    pub avg_items_inspected_detection: f64,
    pub pct_items_inspected_completion: f64,
    pub pct_items_inspected_detection: f64,
    pub pct_contaminant_unreported_if_detection: f64,
    pub true_contamination_rate: f64,
    pub max_missed_contamination_rate: Option<f64>,
    pub avg_missed_contamination_rate: Option<f64>,
    pub max_intercepted_contamination_rate: Option<f64>,
    pub avg_intercepted_contamination_rate: Option<f64>,
    pub total_missed_contaminants: f64,
    pub total_intercepted_contaminants: f64,
    pub sample_missed_contaminants_to_detection: f64,
    pub sample_missed_contaminants_to_completion: f64,

    /// F280 records from every iteration, in iteration order
    pub f280_records: Vec<F280OutputRecord>,

    /// Pretty renditions from the first iteration
    pub pretty_renditions: Vec<String>,

    /// Per-consignment records from the first iteration (detailed mode)
    pub details: Option<Vec<RunRecord>>,
}

/// Run the simulation `num_simulations` times and average the results.
///
/// Iteration `i` runs with seed `SimRng::split_seed(master_seed, i)`.
/// With `options.num_threads > 1`, iterations run on worker threads;
/// results are merged in iteration order, so the aggregate matches the
/// sequential run exactly.
pub fn run_simulation(
    config: &SimulationConfig,
    num_simulations: usize,
    num_consignments: usize,
    master_seed: u64,
    options: &RunOptions,
) -> Result<SimulationTotals, SimulationError> {
    let num_threads = options.num_threads.max(1);
    let mut results: Vec<Option<Result<SimulationSummary, SimulationError>>> =
        (0..num_simulations).map(|_| None).collect();

    let chunk_size = num_simulations.div_ceil(num_threads.min(num_simulations.max(1))).max(1);
    std::thread::scope(|scope| {
        for (chunk_index, chunk) in results.chunks_mut(chunk_size).enumerate() {
            let start = chunk_index * chunk_size;
            let options = options.clone();
            scope.spawn(move || {
                for (offset, slot) in chunk.iter_mut().enumerate() {
                    let iteration = start + offset;
                    if options
                        .cancel
                        .as_ref()
                        .is_some_and(CancelToken::is_cancelled)
                    {
                        break;
                    }
                    // detailed and pretty output come from the first
                    // iteration only
                    let iteration_options = RunOptions {
                        detailed: options.detailed && iteration == 0,
                        pretty: options.pretty.filter(|_| iteration == 0),
                        ..options.clone()
                    };
                    let seed = SimRng::split_seed(master_seed, iteration as u64);
                    *slot = Some(simulation(
                        config,
                        num_consignments,
                        seed,
                        &iteration_options,
                    ));
                }
            });
        }
    });

    let mut totals = SimulationTotals {
        complete: true,
        ..Default::default()
    };
    let mut missed_max_sum = 0.0;
    let mut missed_avg_sum = 0.0;
    let mut missed_present = 0usize;
    let mut intercepted_max_sum = 0.0;
    let mut intercepted_avg_sum = 0.0;
    let mut intercepted_present = 0usize;

    for slot in results {
        let Some(result) = slot else {
            totals.complete = false;
            continue;
        };
        let summary = result?;
        totals.num_simulations += 1;
        totals.complete &= summary.complete;
        totals.missing_pct += summary.missing_pct;
        totals.false_negatives += summary.false_negatives as f64;
        totals.missed_within_tolerance += summary.missed_within_tolerance as f64;
        totals.intercepted += summary.intercepted as f64;
        totals.num_inspections += summary.num_inspections as f64;
        totals.num_boxes += summary.total_num_boxes as f64;
        totals.num_items += summary.total_num_items as f64;
        totals.avg_boxes_opened_completion += summary.avg_boxes_opened_completion;
        totals.avg_boxes_opened_detection += summary.avg_boxes_opened_detection;
        totals.pct_boxes_opened_completion += summary.pct_boxes_opened_completion;
        totals.pct_boxes_opened_detection += summary.pct_boxes_opened_detection;
        totals.avg_items_inspected_completion += summary.avg_items_inspected_completion;
        totals.avg_items_inspected_detection += summary.avg_items_inspected_detection;
        totals.pct_items_inspected_completion += summary.pct_items_inspected_completion;
        totals.pct_items_inspected_detection += summary.pct_items_inspected_detection;
        totals.pct_contaminant_unreported_if_detection +=
            summary.pct_contaminant_unreported_if_detection;
        totals.true_contamination_rate += summary.true_contamination_rate;
        totals.total_missed_contaminants += summary.total_missed_contaminants as f64;
        totals.total_intercepted_contaminants += summary.total_intercepted_contaminants as f64;
        totals.sample_missed_contaminants_to_detection +=
            summary.sample_missed_contaminants_to_detection as f64;
        totals.sample_missed_contaminants_to_completion +=
            summary.sample_missed_contaminants_to_completion as f64;
        if let (Some(max), Some(avg)) = (
            summary.max_missed_contamination_rate,
            summary.avg_missed_contamination_rate,
        ) {
            missed_max_sum += max;
            missed_avg_sum += avg;
            missed_present += 1;
        }
        if let (Some(max), Some(avg)) = (
            summary.max_intercepted_contamination_rate,
            summary.avg_intercepted_contamination_rate,
        ) {
            intercepted_max_sum += max;
            intercepted_avg_sum += avg;
            intercepted_present += 1;
        }
        totals.f280_records.extend(summary.f280_records);
        if !summary.pretty_renditions.is_empty() {
            totals.pretty_renditions = summary.pretty_renditions;
        }
        if summary.run_records.is_some() && totals.details.is_none() {
            totals.details = summary.run_records;
        }
    }

    let runs = totals.num_simulations;
    if runs > 0 {
        let runs = runs as f64;
        totals.missing_pct /= runs;
        totals.false_negatives /= runs;
        totals.missed_within_tolerance /= runs;
        totals.intercepted /= runs;
        totals.num_inspections /= runs;
        totals.num_boxes /= runs;
        totals.num_items /= runs;
        totals.avg_boxes_opened_completion /= runs;
        totals.avg_boxes_opened_detection /= runs;
        totals.pct_boxes_opened_completion /= runs;
        totals.pct_boxes_opened_detection /= runs;
        totals.avg_items_inspected_completion /= runs;
        totals.avg_items_inspected_detection /= runs;
        totals.pct_items_inspected_completion /= runs;
        totals.pct_items_inspected_detection /= runs;
        totals.pct_contaminant_unreported_if_detection /= runs;
        totals.true_contamination_rate /= runs;
        totals.total_missed_contaminants /= runs;
        totals.total_intercepted_contaminants /= runs;
        totals.sample_missed_contaminants_to_detection /= runs;
        totals.sample_missed_contaminants_to_completion /= runs;
    }
    if missed_present > 0 {
        totals.max_missed_contamination_rate = Some(missed_max_sum / missed_present as f64);
        totals.avg_missed_contamination_rate = Some(missed_avg_sum / missed_present as f64);
    }
    if intercepted_present > 0 {
        totals.max_intercepted_contamination_rate =
            Some(intercepted_max_sum / intercepted_present as f64);
        totals.avg_intercepted_contamination_rate =
            Some(intercepted_avg_sum / intercepted_present as f64);
    }

    info!(
        simulations = totals.num_simulations,
        consignments_per_run = num_consignments,
        complete = totals.complete,
        "simulation run finished"
    );
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contamination::{Arrangement, ContaminationConfig, ContaminationUnit, RateDistribution};
    use crate::generators::{
        BoxCountRange, ConsignmentConfig, GenerationMethod, ItemsPerBoxConfig,
        ParameterBasedConfig,
    };
    use crate::inspection::{InspectionConfig, InspectionUnit, SampleStrategy, SelectionStrategy};

    fn base_config() -> SimulationConfig {
        SimulationConfig {
            consignment: ConsignmentConfig {
                generation_method: GenerationMethod::ParameterBased,
                items_per_box: ItemsPerBoxConfig {
                    default: 10,
                    air: None,
                    maritime: None,
                },
                start_date: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                parameter_based: Some(ParameterBasedConfig {
                    boxes: BoxCountRange { min: 1, max: 5 },
                    commodities: vec!["Rosa".into(), "Gerbera".into()],
                    origins: vec!["Netherlands".into(), "Mexico".into()],
                    ports: vec!["NY JFK CBP".into()],
                }),
                f280: None,
                aqim: None,
            },
            contamination: ContaminationConfig {
                contamination_unit: ContaminationUnit::Item,
                contamination_rate: RateDistribution::Fixed { value: 0.2 },
                arrangement: Arrangement::Random,
                consignments: None,
            },
            inspection: InspectionConfig {
                unit: InspectionUnit::Item,
                within_box_proportion: 1.0,
                tolerance_level: 0.0,
                sample_strategy: SampleStrategy::Proportion { value: 0.5 },
                selection_strategy: SelectionStrategy::Random,
                min_boxes: 0,
                effectiveness: 1.0,
            },
            release_programs: None,
            pretty: None,
            disposition_codes: None,
            strict_input: false,
        }
    }

    #[test]
    fn test_single_run_accounts_for_every_consignment() {
        let config = base_config();
        let summary = simulation(&config, 50, 42, &RunOptions::default()).unwrap();
        assert_eq!(summary.num_consignments, 50);
        assert!(summary.complete);
        assert_eq!(summary.num_inspections, 50);
        assert!(summary.intercepted + summary.false_negatives <= 50);
        assert!((0.0..=100.0).contains(&summary.missing_pct));
        assert!(summary.true_contamination_rate > 0.0);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let config = base_config();
        let options = RunOptions {
            emit_f280: true,
            ..Default::default()
        };
        let a = run_simulation(&config, 3, 20, 42, &options).unwrap();
        let b = run_simulation(&config, 3, 20, 42, &options).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let config = base_config();
        let sequential = run_simulation(&config, 4, 25, 7, &RunOptions::default()).unwrap();
        let parallel = run_simulation(
            &config,
            4,
            25,
            7,
            &RunOptions {
                num_threads: 4,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            serde_json::to_string(&sequential).unwrap(),
            serde_json::to_string(&parallel).unwrap()
        );
    }

    #[test]
    fn test_cancellation_yields_partial_incomplete_aggregates() {
        let config = base_config();
        let cancel = CancelToken::new();
        cancel.cancel();
        let options = RunOptions {
            cancel: Some(cancel),
            ..Default::default()
        };
        let summary = simulation(&config, 100, 42, &options).unwrap();
        assert!(!summary.complete);
        assert_eq!(summary.num_consignments, 0);
    }

    #[test]
    fn test_detailed_records_one_per_consignment() {
        let config = base_config();
        let options = RunOptions {
            detailed: true,
            ..Default::default()
        };
        let summary = simulation(&config, 10, 42, &options).unwrap();
        let records = summary.run_records.unwrap();
        assert_eq!(records.len(), 10);
        for record in &records {
            assert!(record.was_inspected);
            assert!(record.release_program.is_none());
        }
    }
}
