//! Sample-size strategies

use super::{InspectionConfig, InspectionUnit, SampleStrategy};
use crate::models::Consignment;

/// Sample size using the hypergeometric approximation (Fosgate 2009).
///
/// `K = round(detection_level * population)` is the number of contaminated
/// units the inspection is designed to detect; with `alpha = 1 -
/// confidence_level` the sample size is
/// `ceil((1 - alpha^(1/K)) * (population - (K - 1) / 2))`, clamped to
/// [0, population]. `K = 0` yields 0.
pub fn hypergeometric_sample_size(
    detection_level: f64,
    confidence_level: f64,
    population: usize,
) -> usize {
    if population == 0 {
        return 0;
    }
    let n = population as f64;
    let k = (detection_level * n).round();
    if k < 1.0 {
        return 0;
    }
    let alpha = 1.0 - confidence_level;
    let sample = ((1.0 - alpha.powf(1.0 / k)) * (n - (k - 1.0) / 2.0)).ceil();
    (sample.max(0.0) as usize).min(population)
}

/// Largest item sample the within-box proportion allows.
fn max_inspectable_items(config: &InspectionConfig, consignment: &Consignment) -> usize {
    consignment.num_boxes() * config.inspect_per_box(consignment.items_per_box())
}

/// Number of units (items or boxes, per `config.unit`) to inspect.
pub(super) fn sample_size(config: &InspectionConfig, consignment: &Consignment) -> usize {
    match config.unit {
        InspectionUnit::Item => item_sample_size(config, consignment),
        InspectionUnit::Box => box_sample_size(config, consignment),
    }
}

fn item_sample_size(config: &InspectionConfig, consignment: &Consignment) -> usize {
    let num_items = consignment.num_items();
    let requested = match &config.sample_strategy {
        SampleStrategy::All => num_items,
        SampleStrategy::Proportion { value } => (value * num_items as f64).round() as usize,
        SampleStrategy::FixedN { n } => *n,
        SampleStrategy::Hypergeometric {
            detection_level,
            confidence_level,
        } => hypergeometric_sample_size(*detection_level, *confidence_level, num_items),
    };
    requested.min(max_inspectable_items(config, consignment))
}

fn box_sample_size(config: &InspectionConfig, consignment: &Consignment) -> usize {
    let num_boxes = consignment.num_boxes();
    let requested = match &config.sample_strategy {
        SampleStrategy::All => num_boxes,
        SampleStrategy::Proportion { value } => {
            ((value * num_boxes as f64).round() as usize).max(config.min_boxes)
        }
        SampleStrategy::FixedN { n } => (*n).max(config.min_boxes),
        SampleStrategy::Hypergeometric {
            detection_level,
            confidence_level,
        } => hypergeometric_sample_size(*detection_level, *confidence_level, num_boxes),
    };
    requested.min(num_boxes)
}
