//! Selection strategies: which units the inspector actually opens
//!
//! Every strategy resolves to a list of item indices in inspection order;
//! box-based strategies expand each opened box to the first
//! `within_box_proportion` share of its items.

use tracing::warn;

use super::{ClusterSelection, InspectionConfig, InspectionUnit, SelectionStrategy};
use crate::models::Consignment;
use crate::rng::SimRng;

/// Item indices to inspect, in inspection order.
pub(super) fn select_items(
    config: &InspectionConfig,
    consignment: &Consignment,
    sample_size: usize,
    rng: &mut SimRng,
) -> Vec<usize> {
    match config.unit {
        InspectionUnit::Box => select_for_boxes(config, consignment, sample_size, rng),
        InspectionUnit::Item => select_for_items(config, consignment, sample_size, rng),
    }
}

fn select_for_boxes(
    config: &InspectionConfig,
    consignment: &Consignment,
    num_boxes_to_open: usize,
    rng: &mut SimRng,
) -> Vec<usize> {
    let per_box = config.inspect_per_box(consignment.items_per_box());
    let boxes: Vec<usize> = match &config.selection_strategy {
        SelectionStrategy::Random => {
            let mut boxes =
                rng.sample_without_replacement(consignment.num_boxes(), num_boxes_to_open);
            boxes.sort_unstable();
            boxes
        }
        SelectionStrategy::Convenience => (0..num_boxes_to_open).collect(),
        // validation rejects cluster selection with box unit
        SelectionStrategy::Cluster { .. } => unreachable!("cluster selection requires unit = item"),
    };
    expand_boxes(consignment, &boxes, per_box, usize::MAX)
}

fn select_for_items(
    config: &InspectionConfig,
    consignment: &Consignment,
    sample_size: usize,
    rng: &mut SimRng,
) -> Vec<usize> {
    match &config.selection_strategy {
        SelectionStrategy::Random => {
            let mut items =
                rng.sample_without_replacement(consignment.num_items(), sample_size);
            items.sort_unstable();
            top_up_boxes_random(config, consignment, items, rng)
        }
        SelectionStrategy::Convenience => {
            let per_box = config.inspect_per_box(consignment.items_per_box());
            let mut items = Vec::with_capacity(sample_size);
            'boxes: for box_index in 0..consignment.num_boxes() {
                for item in consignment.items_of_box(box_index).take(per_box) {
                    items.push(item);
                    if items.len() == sample_size {
                        break 'boxes;
                    }
                }
            }
            top_up_boxes_in_order(config, consignment, items)
        }
        SelectionStrategy::Cluster {
            cluster_selection,
            interval,
        } => select_clusters(config, consignment, sample_size, *cluster_selection, *interval, rng),
    }
}

/// Open whole boxes until the item sample size is reached.
fn select_clusters(
    config: &InspectionConfig,
    consignment: &Consignment,
    sample_size: usize,
    cluster_selection: ClusterSelection,
    interval: usize,
    rng: &mut SimRng,
) -> Vec<usize> {
    let num_boxes = consignment.num_boxes();
    let items_per_box = consignment.items_per_box();
    let mut per_box = config.inspect_per_box(items_per_box);
    if num_boxes * per_box < sample_size {
        warn!(
            sample_size,
            "within box proportion too low to achieve sample size; \
             automatically increasing it"
        );
        per_box = sample_size.div_ceil(num_boxes).min(items_per_box);
    }
    let boxes_needed = sample_size
        .div_ceil(per_box)
        .max(config.min_boxes)
        .min(num_boxes);
    let boxes = match cluster_selection {
        ClusterSelection::Random => {
            let mut boxes = rng.sample_without_replacement(num_boxes, boxes_needed);
            boxes.sort_unstable();
            boxes
        }
        ClusterSelection::Interval => interval_boxes(num_boxes, boxes_needed, interval),
    };
    expand_boxes(consignment, &boxes, per_box, sample_size)
}

/// Boxes at indices 0, interval, 2*interval, ... (wrapping around) until
/// `count` distinct boxes are collected. When the interval cannot yield
/// enough distinct boxes it is reduced.
fn interval_boxes(num_boxes: usize, count: usize, interval: usize) -> Vec<usize> {
    let mut step = interval.max(1);
    // the walk 0, step, 2*step, ... visits num_boxes / gcd distinct boxes
    if num_boxes / gcd(num_boxes, step) < count {
        step = (num_boxes / count).max(1);
    }
    let mut seen = vec![false; num_boxes];
    let mut boxes = Vec::with_capacity(count);
    let mut position = 0;
    while boxes.len() < count {
        let index = position % num_boxes;
        if !seen[index] {
            seen[index] = true;
            boxes.push(index);
        }
        position += step;
    }
    boxes.sort_unstable();
    boxes
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// First `per_box` items of each box, stopping once `item_budget` items are
/// listed; every opened box contributes at least one item.
fn expand_boxes(
    consignment: &Consignment,
    boxes: &[usize],
    per_box: usize,
    item_budget: usize,
) -> Vec<usize> {
    let mut items = Vec::new();
    let mut remaining = item_budget;
    for &box_index in boxes {
        let take = per_box.min(remaining).max(1);
        items.extend(consignment.items_of_box(box_index).take(take));
        remaining = remaining.saturating_sub(take);
    }
    items
}

/// Ensure at least `min_boxes` boxes are opened by adding one random
/// not-yet-selected item from additional, untouched boxes.
fn top_up_boxes_random(
    config: &InspectionConfig,
    consignment: &Consignment,
    mut items: Vec<usize>,
    rng: &mut SimRng,
) -> Vec<usize> {
    let needed = config.min_boxes.min(consignment.num_boxes());
    let mut opened = vec![false; consignment.num_boxes()];
    for &item in &items {
        opened[consignment.box_of_item(item)] = true;
    }
    let opened_count = opened.iter().filter(|&&flag| flag).count();
    if opened_count >= needed {
        return items;
    }
    let untouched: Vec<usize> = (0..consignment.num_boxes())
        .filter(|&box_index| !opened[box_index])
        .collect();
    let extra = needed - opened_count;
    for picked in rng.sample_without_replacement(untouched.len(), extra) {
        let box_index = untouched[picked];
        let offset = rng.uniform_int(0, consignment.items_per_box() - 1);
        items.push(box_index * consignment.items_per_box() + offset);
    }
    items
}

/// Ensure at least `min_boxes` boxes are opened by taking the first item of
/// each subsequent box in index order.
fn top_up_boxes_in_order(
    config: &InspectionConfig,
    consignment: &Consignment,
    mut items: Vec<usize>,
) -> Vec<usize> {
    let needed = config.min_boxes.min(consignment.num_boxes());
    let mut opened: Vec<bool> = vec![false; consignment.num_boxes()];
    for &item in &items {
        opened[consignment.box_of_item(item)] = true;
    }
    let mut opened_count = opened.iter().filter(|&&flag| flag).count();
    for box_index in 0..consignment.num_boxes() {
        if opened_count >= needed {
            break;
        }
        if !opened[box_index] {
            opened[box_index] = true;
            opened_count += 1;
            items.push(consignment.items_of_box(box_index).start);
        }
    }
    items
}
