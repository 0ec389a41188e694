//! Inspection of consignments
//!
//! Computes a sample size, selects which units to inspect, and simulates an
//! inspector of configurable effectiveness. Every inspection produces two
//! results side by side:
//!
//! - **to detection**: the inspection stops once the inspector flags a
//!   contaminated unit (at box granularity for box-grouped selections, at
//!   item granularity otherwise)
//! - **to completion**: the inspection works through the entire sample
//!
//! The two results share effectiveness draws: one Bernoulli(effectiveness)
//! draw per contaminated item examined feeds both tallies, so the RNG
//! stream does not depend on which end strategy a report reads.

mod sample_size;
mod selection;

use serde::{Deserialize, Serialize};

use crate::config::Diagnostic;
use crate::models::Consignment;
use crate::rng::SimRng;

pub use sample_size::hypergeometric_sample_size;

/// Unit the sample size is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionUnit {
    Item,
    Box,
}

/// How the sample size is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStrategy {
    /// Fixed proportion of all units
    Proportion { value: f64 },

    /// Sample size for detecting contamination at `detection_level`
    /// prevalence with `confidence_level` confidence (Fosgate 2009)
    Hypergeometric {
        detection_level: f64,
        confidence_level: f64,
    },

    /// Fixed unit count, clamped to what the consignment allows
    FixedN { n: usize },

    /// Every unit
    All,
}

/// How boxes are picked for cluster selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterSelection {
    Random,
    Interval,
}

fn default_interval() -> usize {
    1
}

/// How the sampled units are chosen from the consignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Uniformly at random without replacement
    Random,

    /// First units in index order
    Convenience,

    /// Whole boxes opened and partially inspected (`unit = item` only)
    Cluster {
        cluster_selection: ClusterSelection,
        #[serde(default = "default_interval")]
        interval: usize,
    },
}

fn default_effectiveness() -> f64 {
    1.0
}

/// Inspection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionConfig {
    pub unit: InspectionUnit,

    /// Proportion of each opened box that gets inspected, in (0, 1]
    pub within_box_proportion: f64,

    /// Contamination rate below which a missed consignment is excluded
    /// from the adjusted slippage statistic
    pub tolerance_level: f64,

    pub sample_strategy: SampleStrategy,
    pub selection_strategy: SelectionStrategy,

    /// Minimum number of boxes to open
    #[serde(default)]
    pub min_boxes: usize,

    /// Probability the inspector flags a contaminated item it examines
    #[serde(default = "default_effectiveness")]
    pub effectiveness: f64,
}

impl InspectionConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        if !(self.within_box_proportion > 0.0 && self.within_box_proportion <= 1.0) {
            return Err(Diagnostic::config(
                "inspection/within_box_proportion",
                format!(
                    "within_box_proportion {} outside (0, 1]",
                    self.within_box_proportion
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.tolerance_level) {
            return Err(Diagnostic::config(
                "inspection/tolerance_level",
                format!("tolerance_level {} outside [0, 1]", self.tolerance_level),
            ));
        }
        if !(0.0..=1.0).contains(&self.effectiveness) {
            return Err(Diagnostic::config(
                "inspection/effectiveness",
                format!("effectiveness {} outside [0, 1]", self.effectiveness),
            ));
        }
        match &self.sample_strategy {
            SampleStrategy::Proportion { value } => {
                if !(0.0..=1.0).contains(value) {
                    return Err(Diagnostic::config(
                        "inspection/sample_strategy/proportion/value",
                        format!("proportion {value} outside [0, 1]"),
                    ));
                }
            }
            SampleStrategy::Hypergeometric {
                detection_level,
                confidence_level,
            } => {
                if !(0.0..=1.0).contains(detection_level) {
                    return Err(Diagnostic::config(
                        "inspection/sample_strategy/hypergeometric/detection_level",
                        format!("detection_level {detection_level} outside [0, 1]"),
                    ));
                }
                if !(*confidence_level > 0.0 && *confidence_level < 1.0) {
                    return Err(Diagnostic::config(
                        "inspection/sample_strategy/hypergeometric/confidence_level",
                        format!("confidence_level {confidence_level} outside (0, 1)"),
                    ));
                }
            }
            SampleStrategy::FixedN { .. } | SampleStrategy::All => {}
        }
        if let SelectionStrategy::Cluster { interval, .. } = &self.selection_strategy {
            if self.unit == InspectionUnit::Box {
                return Err(Diagnostic::config(
                    "inspection/selection_strategy",
                    "cluster selection requires unit = item",
                ));
            }
            if *interval == 0 {
                return Err(Diagnostic::config(
                    "inspection/selection_strategy/cluster/interval",
                    "interval must be at least 1",
                ));
            }
        }
        Ok(())
    }

    /// Items inspected per opened box.
    pub(crate) fn inspect_per_box(&self, items_per_box: usize) -> usize {
        ((self.within_box_proportion * items_per_box as f64).ceil() as usize).min(items_per_box)
    }
}

/// Everything one inspection observed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectionObservation {
    /// Units the sample-size strategy asked for
    pub sample_size: usize,

    /// Item indices inspected, in inspection order (filled in detailed mode)
    pub inspected_item_indexes: Vec<usize>,

    pub boxes_opened_completion: usize,
    pub boxes_opened_detection: usize,
    pub items_inspected_completion: usize,
    pub items_inspected_detection: usize,

    /// Contaminated items counted before the inspection would have stopped
    pub contaminated_items_detection: usize,

    /// Contaminated items examined but not flagged before the inspection
    /// would have stopped
    pub missed_contaminants_detection: usize,

    /// Contaminated items the inspector flagged across the whole sample
    pub intercepted_contaminants_completion: usize,

    /// Contaminated items examined but not flagged across the whole sample
    pub missed_contaminants_completion: usize,

    /// True when the inspector flagged at least one contaminated item
    pub detected: bool,

    /// True when the inspection found nothing (PASS)
    pub checked_ok: bool,

    /// True when the consignment holds any contaminant at all
    /// (for slippage reporting)
    pub contaminant_present: bool,
}

/// Inspect one consignment, marking inspected items and producing the
/// observation for both end strategies.
pub fn inspect(
    consignment: &mut Consignment,
    config: &InspectionConfig,
    rng: &mut SimRng,
    detailed: bool,
) -> InspectionObservation {
    let mut observation = InspectionObservation {
        checked_ok: true,
        contaminant_present: consignment.is_contaminated(),
        ..Default::default()
    };
    if consignment.num_items() == 0 {
        return observation;
    }

    let sample_size = sample_size::sample_size(config, consignment);
    observation.sample_size = sample_size;
    if sample_size == 0 {
        return observation;
    }

    let items = selection::select_items(config, consignment, sample_size, rng);

    // Box-grouped selections detect at box granularity: the inspector
    // finishes the open box before deciding to stop.
    let box_granular = config.unit == InspectionUnit::Box
        || matches!(config.selection_strategy, SelectionStrategy::Cluster { .. });

    let num_boxes = consignment.num_boxes();
    let mut opened_completion = vec![false; num_boxes];
    let mut opened_detection = vec![false; num_boxes];
    let mut detected = false;

    let mut index = 0;
    while index < items.len() {
        let group_box = consignment.box_of_item(items[index]);
        let group_end = if box_granular {
            items[index..]
                .iter()
                .position(|&item| consignment.box_of_item(item) != group_box)
                .map_or(items.len(), |offset| index + offset)
        } else {
            index + 1
        };

        for &item in &items[index..group_end] {
            let box_index = consignment.box_of_item(item);
            consignment.mark_item_inspected(item);
            if detailed {
                observation.inspected_item_indexes.push(item);
            }
            observation.items_inspected_completion += 1;
            if !opened_completion[box_index] {
                opened_completion[box_index] = true;
                observation.boxes_opened_completion += 1;
            }
            if !detected {
                observation.items_inspected_detection += 1;
                if !opened_detection[box_index] {
                    opened_detection[box_index] = true;
                    observation.boxes_opened_detection += 1;
                }
            }
            if consignment.is_item_contaminated(item) {
                // one draw feeds both end strategies
                if rng.bernoulli(config.effectiveness) {
                    observation.intercepted_contaminants_completion += 1;
                    if !detected {
                        observation.contaminated_items_detection += 1;
                    }
                } else {
                    observation.missed_contaminants_completion += 1;
                    if !detected {
                        observation.missed_contaminants_detection += 1;
                    }
                }
            }
        }
        if !detected && observation.contaminated_items_detection > 0 {
            detected = true;
        }
        index = group_end;
    }

    observation.detected = detected;
    observation.checked_ok = observation.intercepted_contaminants_completion == 0;
    observation
}
