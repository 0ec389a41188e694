//! Contaminant addition to consignments
//!
//! Selects a contamination rate, converts it to a target unit count, and
//! arranges contaminated units under one of the arrangement regimes:
//!
//! - `random`: uniform without replacement across all items
//! - `clustered_single`: one circular window whose size shrinks as the
//!   clustering parameter grows
//! - `clustered_multi`: fixed-size clusters placed into non-overlapping
//!   strata, spread randomly or laid down contiguously
//! - `random_box`: whole boxes hit with a configured probability and ratio
//!
//! Per-consignment rules can override the top-level configuration; rules
//! are evaluated in declaration order and the first match wins.

mod clusters;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::Diagnostic;
use crate::models::Consignment;
use crate::rng::SimRng;

use clusters::{choose_strata_for_clusters, split_into_cluster_sizes};

/// Whether rates and targets are expressed in items or boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContaminationUnit {
    Item,
    Box,
}

/// Distribution the per-consignment contamination rate is drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDistribution {
    /// Every consignment gets the same rate
    Fixed { value: f64 },

    /// Rate drawn from Beta(alpha, beta) per consignment
    Beta { alpha: f64, beta: f64 },
}

impl RateDistribution {
    /// Draw one rate, clamped to [0, 1].
    pub fn draw(&self, rng: &mut SimRng) -> f64 {
        let rate = match self {
            RateDistribution::Fixed { value } => *value,
            RateDistribution::Beta { alpha, beta } => rng.beta(*alpha, *beta),
        };
        rate.clamp(0.0, 1.0)
    }

    fn validate(&self, path: &str) -> Result<(), Diagnostic> {
        match self {
            RateDistribution::Fixed { value } => {
                if !(0.0..=1.0).contains(value) {
                    return Err(Diagnostic::config(
                        path,
                        format!("fixed rate {value} outside [0, 1]"),
                    ));
                }
            }
            RateDistribution::Beta { alpha, beta } => {
                if *alpha <= 0.0 || *beta <= 0.0 {
                    return Err(Diagnostic::config(
                        path,
                        format!("beta parameters ({alpha}, {beta}) must be positive"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// How clusters spread within their strata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterDistribution {
    /// Cluster items placed uniformly within a stratum of this width
    Random { cluster_item_width: usize },

    /// Cluster items laid down contiguously
    Continuous,
}

/// Placement of contaminant within one selected box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InBoxArrangement {
    /// Every item in the box
    All,
    /// Only the first item
    First,
    /// One item picked uniformly
    OneRandom,
    /// A random subset sized by the rate distribution applied within-box
    Random,
}

/// Spatial arrangement of contaminated units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    Random,

    /// Single circular window; `value >= 0`, larger values shrink the
    /// window (`value = 0` spans the whole consignment)
    ClusteredSingle { value: f64 },

    ClusteredMulti {
        contaminated_units_per_cluster: usize,
        distribution: ClusterDistribution,
    },

    RandomBox {
        probability: f64,
        ratio: f64,
        in_box_arrangement: InBoxArrangement,
    },
}

/// Partial contamination settings carried by a consignment rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContaminationOverride {
    #[serde(default)]
    pub contamination_unit: Option<ContaminationUnit>,
    #[serde(default)]
    pub contamination_rate: Option<RateDistribution>,
    #[serde(default)]
    pub arrangement: Option<Arrangement>,
}

/// Predicate + overrides applied to matching consignments.
///
/// A consignment matches when every present field equals the consignment's
/// corresponding attribute and the date (if bounded) lies in
/// [start_date, end_date].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsignmentRule {
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub contamination: Option<ContaminationOverride>,
    /// Fall back to the top-level contamination settings for fields the
    /// rule leaves out
    #[serde(default)]
    pub use_contamination_defaults: bool,
}

impl ConsignmentRule {
    fn matches(&self, consignment: &Consignment) -> bool {
        if let Some(commodity) = &self.commodity {
            if commodity != &consignment.commodity {
                return false;
            }
        }
        if let Some(origin) = &self.origin {
            if origin != &consignment.origin {
                return false;
            }
        }
        if let Some(port) = &self.port {
            if port != &consignment.port {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if consignment.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if consignment.date > end {
                return false;
            }
        }
        true
    }
}

/// Contamination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminationConfig {
    pub contamination_unit: ContaminationUnit,
    pub contamination_rate: RateDistribution,
    pub arrangement: Arrangement,

    /// Per-consignment rules; when present, only matching consignments are
    /// contaminated (first match wins)
    #[serde(default)]
    pub consignments: Option<Vec<ConsignmentRule>>,
}

/// Fully resolved settings for one consignment.
#[derive(Debug, Clone)]
struct EffectiveContamination {
    unit: ContaminationUnit,
    rate: RateDistribution,
    arrangement: Arrangement,
}

impl ContaminationConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        validate_settings(
            &self.contamination_unit,
            &self.contamination_rate,
            &self.arrangement,
            "contamination",
        )?;
        if let Some(rules) = &self.consignments {
            for (index, rule) in rules.iter().enumerate() {
                let path = format!("contamination/consignments[{index}]");
                if let (Some(start), Some(end)) = (rule.start_date, rule.end_date) {
                    if start > end {
                        return Err(Diagnostic::config(
                            format!("{path}/start_date"),
                            "start_date is after end_date",
                        ));
                    }
                }
                let overrides = rule.contamination.clone().unwrap_or_default();
                if !rule.use_contamination_defaults {
                    if overrides.contamination_unit.is_none()
                        || overrides.contamination_rate.is_none()
                        || overrides.arrangement.is_none()
                    {
                        return Err(Diagnostic::config(
                            format!("{path}/contamination"),
                            "rule without use_contamination_defaults must set unit, rate, \
                             and arrangement",
                        ));
                    }
                }
                let effective = resolve_rule(self, rule);
                validate_settings(&effective.unit, &effective.rate, &effective.arrangement, &path)?;
            }
        }
        Ok(())
    }

    /// Resolve the settings applying to one consignment.
    ///
    /// Returns None when a rule list is present and no rule matches; such
    /// consignments stay clean.
    fn resolve(&self, consignment: &Consignment) -> Option<EffectiveContamination> {
        match &self.consignments {
            None => Some(EffectiveContamination {
                unit: self.contamination_unit,
                rate: self.contamination_rate.clone(),
                arrangement: self.arrangement.clone(),
            }),
            Some(rules) => rules
                .iter()
                .find(|rule| rule.matches(consignment))
                .map(|rule| resolve_rule(self, rule)),
        }
    }
}

fn resolve_rule(config: &ContaminationConfig, rule: &ConsignmentRule) -> EffectiveContamination {
    let overrides = rule.contamination.clone().unwrap_or_default();
    EffectiveContamination {
        unit: overrides
            .contamination_unit
            .unwrap_or(config.contamination_unit),
        rate: overrides
            .contamination_rate
            .unwrap_or_else(|| config.contamination_rate.clone()),
        arrangement: overrides
            .arrangement
            .unwrap_or_else(|| config.arrangement.clone()),
    }
}

fn validate_settings(
    unit: &ContaminationUnit,
    rate: &RateDistribution,
    arrangement: &Arrangement,
    path: &str,
) -> Result<(), Diagnostic> {
    rate.validate(&format!("{path}/contamination_rate"))?;
    match arrangement {
        Arrangement::Random => {}
        Arrangement::ClusteredSingle { value } => {
            if *value < 0.0 {
                return Err(Diagnostic::config(
                    format!("{path}/arrangement/clustered_single/value"),
                    format!("clustering value {value} must be non-negative"),
                ));
            }
        }
        Arrangement::ClusteredMulti {
            contaminated_units_per_cluster,
            distribution,
        } => {
            if *contaminated_units_per_cluster == 0 {
                return Err(Diagnostic::config(
                    format!("{path}/arrangement/clustered_multi"),
                    "contaminated_units_per_cluster must be positive",
                ));
            }
            if let ClusterDistribution::Random { cluster_item_width } = distribution {
                if cluster_item_width < contaminated_units_per_cluster {
                    return Err(Diagnostic::config(
                        format!("{path}/arrangement/clustered_multi/cluster_item_width"),
                        format!(
                            "cluster_item_width {cluster_item_width} must be at least \
                             contaminated_units_per_cluster {contaminated_units_per_cluster}"
                        ),
                    ));
                }
            }
            if *unit == ContaminationUnit::Box {
                return Err(Diagnostic::config(
                    format!("{path}/arrangement"),
                    "clustered_multi applies to item contamination only; \
                     box contamination is placed contiguously",
                ));
            }
        }
        Arrangement::RandomBox {
            probability, ratio, ..
        } => {
            if !(0.0..=1.0).contains(probability) {
                return Err(Diagnostic::config(
                    format!("{path}/arrangement/random_box/probability"),
                    format!("probability {probability} outside [0, 1]"),
                ));
            }
            if !(0.0..=1.0).contains(ratio) {
                return Err(Diagnostic::config(
                    format!("{path}/arrangement/random_box/ratio"),
                    format!("ratio {ratio} outside [0, 1]"),
                ));
            }
        }
    }
    Ok(())
}

/// Arrangement errors that survive configuration validation (they depend on
/// the consignment's dimensions).
#[derive(Debug, Error)]
pub enum ContaminationError {
    #[error(
        "cannot avoid overlapping clusters: {num_clusters} clusters do not fit in \
         {num_strata} strata; increase contaminated_units_per_cluster or decrease \
         cluster_item_width"
    )]
    ClustersOverlap {
        num_clusters: usize,
        num_strata: usize,
    },

    #[error("cluster of {cluster_size} items does not fit in stratum of width {stratum_width}")]
    ClusterDoesNotFit {
        cluster_size: usize,
        stratum_width: usize,
    },
}

/// Contaminate one consignment in place.
///
/// Resolves the effective settings (rules first), draws a rate, converts it
/// to a target count, and applies the arrangement. A consignment matched by
/// no rule, an empty consignment, and a zero target all stay clean.
pub fn contaminate(
    consignment: &mut Consignment,
    config: &ContaminationConfig,
    rng: &mut SimRng,
) -> Result<(), ContaminationError> {
    let Some(effective) = config.resolve(consignment) else {
        return Ok(());
    };
    if consignment.num_items() == 0 {
        return Ok(());
    }
    match effective.unit {
        ContaminationUnit::Box => contaminate_boxes(consignment, &effective.rate, rng),
        ContaminationUnit::Item => {
            contaminate_items(consignment, &effective.rate, &effective.arrangement, rng)
        }
    }
}

/// Box-unit contamination: full boxes plus a partial box, contiguous from
/// item 0 of box 0.
fn contaminate_boxes(
    consignment: &mut Consignment,
    rate: &RateDistribution,
    rng: &mut SimRng,
) -> Result<(), ContaminationError> {
    let num_boxes = consignment.num_boxes();
    let items_per_box = consignment.items_per_box();
    let target_boxes = rate.draw(rng) * num_boxes as f64;
    if target_boxes == 0.0 {
        return Ok(());
    }
    let full_boxes = (target_boxes.floor() as usize).min(num_boxes);
    let residual = target_boxes - target_boxes.floor();
    let mut contaminated_items = full_boxes * items_per_box;
    if full_boxes < num_boxes {
        contaminated_items += (residual * items_per_box as f64).round() as usize;
    }
    for item in 0..contaminated_items.min(consignment.num_items()) {
        consignment.contaminate_item(item);
    }
    Ok(())
}

/// Item-unit contamination under the configured arrangement.
fn contaminate_items(
    consignment: &mut Consignment,
    rate: &RateDistribution,
    arrangement: &Arrangement,
    rng: &mut SimRng,
) -> Result<(), ContaminationError> {
    if let Arrangement::RandomBox {
        probability,
        ratio,
        in_box_arrangement,
    } = arrangement
    {
        return contaminate_random_boxes(
            consignment,
            rate,
            *probability,
            *ratio,
            *in_box_arrangement,
            rng,
        );
    }

    let num_items = consignment.num_items();
    let mut target = (rate.draw(rng) * num_items as f64).round() as usize;
    if target > num_items {
        warn!(
            target,
            num_items, "requested contaminated items exceed consignment size; clamping"
        );
        target = num_items;
    }
    if target == 0 {
        return Ok(());
    }

    let indices = match arrangement {
        Arrangement::Random => rng.sample_without_replacement(num_items, target),
        Arrangement::ClusteredSingle { value } => {
            // window shrinks as value grows; value = 0 spans everything
            let window = ((num_items as f64 / (1.0 + value)).round() as usize)
                .max(target)
                .min(num_items);
            let start = rng.uniform_int(0, num_items - 1);
            rng.sample_without_replacement(window, target)
                .into_iter()
                .map(|offset| (start + offset) % num_items)
                .collect()
        }
        Arrangement::ClusteredMulti {
            contaminated_units_per_cluster,
            distribution,
        } => place_clusters(
            num_items,
            target,
            *contaminated_units_per_cluster,
            distribution,
            rng,
        )?,
        Arrangement::RandomBox { .. } => unreachable!("handled above"),
    };

    for index in &indices {
        consignment.contaminate_item(*index);
    }
    debug_assert_eq!(consignment.count_contaminated(), target);
    Ok(())
}

/// Place `target` contaminated items in non-overlapping clusters.
fn place_clusters(
    num_items: usize,
    target: usize,
    units_per_cluster: usize,
    distribution: &ClusterDistribution,
    rng: &mut SimRng,
) -> Result<Vec<usize>, ContaminationError> {
    let cluster_sizes = split_into_cluster_sizes(target, units_per_cluster);
    let mut indices = Vec::with_capacity(target);
    match distribution {
        ClusterDistribution::Random { cluster_item_width } => {
            // a cluster cannot be wider than the consignment
            let width = (*cluster_item_width).min(num_items);
            let strata = choose_strata_for_clusters(num_items, width, cluster_sizes.len(), rng)?;
            for (stratum, cluster_size) in strata.iter().zip(&cluster_sizes) {
                let start = width * stratum;
                // the remainder stratum at the end may be narrower
                let stratum_width = width.min(num_items - start);
                if stratum_width < *cluster_size {
                    return Err(ContaminationError::ClusterDoesNotFit {
                        cluster_size: *cluster_size,
                        stratum_width,
                    });
                }
                for offset in rng.sample_without_replacement(stratum_width, *cluster_size) {
                    indices.push(start + offset);
                }
            }
        }
        ClusterDistribution::Continuous => {
            let strata =
                choose_strata_for_clusters(num_items, units_per_cluster, cluster_sizes.len(), rng)?;
            for (stratum, cluster_size) in strata.iter().zip(&cluster_sizes) {
                let start = units_per_cluster * stratum;
                indices.extend(start..start + cluster_size);
            }
        }
    }
    debug_assert!(indices.iter().all(|&i| i < num_items));
    Ok(indices)
}

/// Random-box contamination: hit the whole consignment with `probability`,
/// then contaminate `ceil(ratio * B)` boxes.
fn contaminate_random_boxes(
    consignment: &mut Consignment,
    rate: &RateDistribution,
    probability: f64,
    ratio: f64,
    in_box: InBoxArrangement,
    rng: &mut SimRng,
) -> Result<(), ContaminationError> {
    if !rng.bernoulli(probability) {
        return Ok(());
    }
    let num_boxes = consignment.num_boxes();
    let items_per_box = consignment.items_per_box();
    let boxes_to_hit = ((ratio * num_boxes as f64).ceil() as usize).min(num_boxes);
    if boxes_to_hit == 0 {
        return Ok(());
    }
    for box_index in rng.sample_without_replacement(num_boxes, boxes_to_hit) {
        let range = consignment.items_of_box(box_index);
        match in_box {
            InBoxArrangement::All => {
                for item in range {
                    consignment.contaminate_item(item);
                }
            }
            InBoxArrangement::First => consignment.contaminate_item(range.start),
            InBoxArrangement::OneRandom => {
                let offset = rng.uniform_int(0, items_per_box - 1);
                consignment.contaminate_item(range.start + offset);
            }
            InBoxArrangement::Random => {
                // the rate distribution is re-drawn per box and interpreted
                // as a within-box rate
                let count = ((rate.draw(rng) * items_per_box as f64).round() as usize)
                    .min(items_per_box);
                for offset in rng.sample_without_replacement(items_per_box, count) {
                    consignment.contaminate_item(range.start + offset);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn consignment(num_boxes: usize, items_per_box: usize) -> Consignment {
        Consignment::new(
            "Rosa",
            "Netherlands",
            "NY JFK CBP",
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            "airport",
            num_boxes,
            items_per_box,
        )
    }

    fn item_config(rate: RateDistribution, arrangement: Arrangement) -> ContaminationConfig {
        ContaminationConfig {
            contamination_unit: ContaminationUnit::Item,
            contamination_rate: rate,
            arrangement,
            consignments: None,
        }
    }

    #[test]
    fn test_fixed_rate_random_exact_count() {
        let config = item_config(RateDistribution::Fixed { value: 0.1 }, Arrangement::Random);
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(3, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 3);
    }

    #[test]
    fn test_zero_rate_stays_clean() {
        let config = item_config(RateDistribution::Fixed { value: 0.0 }, Arrangement::Random);
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(2, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert!(!subject.is_contaminated());
    }

    #[test]
    fn test_full_rate_contaminates_everything() {
        let config = item_config(RateDistribution::Fixed { value: 1.0 }, Arrangement::Random);
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(2, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 20);
    }

    #[test]
    fn test_empty_consignment_skipped() {
        let config = item_config(RateDistribution::Fixed { value: 0.5 }, Arrangement::Random);
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(0, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 0);
    }

    #[test]
    fn test_box_unit_contiguous_from_item_zero() {
        // 10 boxes x 100 items, rate 0.01 => 0 full boxes, 10 residual items
        let config = ContaminationConfig {
            contamination_unit: ContaminationUnit::Box,
            contamination_rate: RateDistribution::Fixed { value: 0.01 },
            arrangement: Arrangement::Random,
            consignments: None,
        };
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(10, 100);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 10);
        for item in 0..10 {
            assert!(subject.is_item_contaminated(item));
        }
        assert_eq!(subject.count_contaminated_boxes(), 1);
    }

    #[test]
    fn test_box_unit_full_and_partial() {
        // 4 boxes x 10 items, rate 0.625 => 2 full boxes + 5 residual items
        let config = ContaminationConfig {
            contamination_unit: ContaminationUnit::Box,
            contamination_rate: RateDistribution::Fixed { value: 0.625 },
            arrangement: Arrangement::Random,
            consignments: None,
        };
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(4, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 25);
        assert_eq!(subject.count_contaminated_boxes(), 3);
    }

    #[test]
    fn test_clustered_single_zero_value_covers_whole_consignment() {
        let config = item_config(
            RateDistribution::Fixed { value: 0.2 },
            Arrangement::ClusteredSingle { value: 0.0 },
        );
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(10, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 20);
    }

    #[test]
    fn test_clustered_single_confines_to_window() {
        // value 9 => window of round(100 / 10) = 10 items (circular)
        let config = item_config(
            RateDistribution::Fixed { value: 0.05 },
            Arrangement::ClusteredSingle { value: 9.0 },
        );
        for seed in 0..20 {
            let mut rng = SimRng::from_seed(seed);
            let mut subject = consignment(10, 10);
            contaminate(&mut subject, &config, &mut rng).unwrap();
            assert_eq!(subject.count_contaminated(), 5);
            // all contaminated items fit in some circular window of 10
            let ones: Vec<usize> = subject.contaminated_bits().ones().collect();
            let fits = (0..100).any(|start| {
                ones.iter()
                    .all(|&i| (i + 100 - start) % 100 < 10)
            });
            assert!(fits, "seed {seed}: items {ones:?} not within one window");
        }
    }

    #[test]
    fn test_clustered_multi_continuous_runs() {
        let config = item_config(
            RateDistribution::Fixed { value: 0.2 },
            Arrangement::ClusteredMulti {
                contaminated_units_per_cluster: 10,
                distribution: ClusterDistribution::Continuous,
            },
        );
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(10, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 20);
        // exactly two strata of ten, each fully contaminated
        let full_strata = (0..10)
            .filter(|stratum| (stratum * 10..stratum * 10 + 10).all(|i| subject.is_item_contaminated(i)))
            .count();
        assert_eq!(full_strata, 2);
    }

    #[test]
    fn test_clustered_multi_random_within_strata() {
        let config = item_config(
            RateDistribution::Fixed { value: 0.1 },
            Arrangement::ClusteredMulti {
                contaminated_units_per_cluster: 5,
                distribution: ClusterDistribution::Random {
                    cluster_item_width: 20,
                },
            },
        );
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(10, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 10);
    }

    #[test]
    fn test_clustered_multi_overlap_rejected() {
        // 30 items, clusters of 5 with width 15 => 2 strata, but target 20
        // needs 4 clusters
        let config = item_config(
            RateDistribution::Fixed { value: 0.66 },
            Arrangement::ClusteredMulti {
                contaminated_units_per_cluster: 5,
                distribution: ClusterDistribution::Random {
                    cluster_item_width: 15,
                },
            },
        );
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(3, 10);
        let err = contaminate(&mut subject, &config, &mut rng).unwrap_err();
        assert!(matches!(err, ContaminationError::ClustersOverlap { .. }));
    }

    #[test]
    fn test_random_box_all() {
        let config = item_config(
            RateDistribution::Fixed { value: 0.3 },
            Arrangement::RandomBox {
                probability: 1.0,
                ratio: 0.4,
                in_box_arrangement: InBoxArrangement::All,
            },
        );
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(5, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated_boxes(), 2);
        assert_eq!(subject.count_contaminated(), 20);
    }

    #[test]
    fn test_random_box_zero_probability() {
        let config = item_config(
            RateDistribution::Fixed { value: 0.3 },
            Arrangement::RandomBox {
                probability: 0.0,
                ratio: 1.0,
                in_box_arrangement: InBoxArrangement::All,
            },
        );
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(5, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert!(!subject.is_contaminated());
    }

    #[test]
    fn test_random_box_first_marks_first_item() {
        let config = item_config(
            RateDistribution::Fixed { value: 0.3 },
            Arrangement::RandomBox {
                probability: 1.0,
                ratio: 1.0,
                in_box_arrangement: InBoxArrangement::First,
            },
        );
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(4, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert_eq!(subject.count_contaminated(), 4);
        for box_index in 0..4 {
            assert!(subject.is_item_contaminated(box_index * 10));
        }
    }

    #[test]
    fn test_rules_first_match_wins() {
        let mut config = item_config(RateDistribution::Fixed { value: 0.5 }, Arrangement::Random);
        config.consignments = Some(vec![
            ConsignmentRule {
                commodity: Some("Rosa".into()),
                origin: None,
                port: None,
                start_date: None,
                end_date: None,
                contamination: Some(ContaminationOverride {
                    contamination_rate: Some(RateDistribution::Fixed { value: 0.1 }),
                    ..Default::default()
                }),
                use_contamination_defaults: true,
            },
            ConsignmentRule {
                commodity: None,
                origin: Some("Netherlands".into()),
                port: None,
                start_date: None,
                end_date: None,
                contamination: Some(ContaminationOverride {
                    contamination_rate: Some(RateDistribution::Fixed { value: 1.0 }),
                    ..Default::default()
                }),
                use_contamination_defaults: true,
            },
        ]);
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(3, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        // first rule matched (rate 0.1), not the second (rate 1.0)
        assert_eq!(subject.count_contaminated(), 3);
    }

    #[test]
    fn test_unmatched_consignment_stays_clean() {
        let mut config = item_config(RateDistribution::Fixed { value: 1.0 }, Arrangement::Random);
        config.consignments = Some(vec![ConsignmentRule {
            commodity: Some("Tulipa".into()),
            origin: None,
            port: None,
            start_date: None,
            end_date: None,
            contamination: None,
            use_contamination_defaults: true,
        }]);
        let mut rng = SimRng::from_seed(42);
        let mut subject = consignment(3, 10);
        contaminate(&mut subject, &config, &mut rng).unwrap();
        assert!(!subject.is_contaminated());
    }

    #[test]
    fn test_rule_date_window() {
        let mut config = item_config(RateDistribution::Fixed { value: 1.0 }, Arrangement::Random);
        config.consignments = Some(vec![ConsignmentRule {
            commodity: None,
            origin: None,
            port: None,
            start_date: NaiveDate::from_ymd_opt(2020, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2020, 6, 30),
            contamination: None,
            use_contamination_defaults: true,
        }]);
        let mut rng = SimRng::from_seed(42);
        let mut in_window = consignment(2, 10);
        contaminate(&mut in_window, &config, &mut rng).unwrap();
        assert!(in_window.is_contaminated());

        let mut outside = consignment(2, 10);
        outside.date = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap();
        contaminate(&mut outside, &config, &mut rng).unwrap();
        assert!(!outside.is_contaminated());
    }

    #[test]
    fn test_incomplete_rule_without_defaults_rejected() {
        let mut config = item_config(RateDistribution::Fixed { value: 0.5 }, Arrangement::Random);
        config.consignments = Some(vec![ConsignmentRule {
            commodity: Some("Rosa".into()),
            origin: None,
            port: None,
            start_date: None,
            end_date: None,
            contamination: Some(ContaminationOverride {
                contamination_rate: Some(RateDistribution::Fixed { value: 0.2 }),
                ..Default::default()
            }),
            use_contamination_defaults: false,
        }]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_narrow_cluster_width_rejected_by_validation() {
        let config = item_config(
            RateDistribution::Fixed { value: 0.1 },
            Arrangement::ClusteredMulti {
                contaminated_units_per_cluster: 10,
                distribution: ClusterDistribution::Random {
                    cluster_item_width: 5,
                },
            },
        );
        assert!(config.validate().is_err());
    }
}
