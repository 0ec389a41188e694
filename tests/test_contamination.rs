//! Contamination engine tests
//!
//! Statistical properties of the rate distributions and the exact item
//! counts of each arrangement.

use chrono::NaiveDate;

use inspection_sim::contamination::{
    contaminate, Arrangement, ClusterDistribution, ContaminationConfig, ContaminationUnit,
    InBoxArrangement, RateDistribution,
};
use inspection_sim::models::Consignment;
use inspection_sim::rng::SimRng;

// ============================================================================
// Test Helpers
// ============================================================================

fn create_consignment(num_boxes: usize, items_per_box: usize) -> Consignment {
    Consignment::new(
        "Rosa",
        "Netherlands",
        "NY JFK CBP",
        NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
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

// ============================================================================
// Rate properties
// ============================================================================

#[test]
fn test_fixed_rate_mean_converges() {
    // with a fixed rate every consignment hits round(r * N) items exactly
    let config = item_config(RateDistribution::Fixed { value: 0.1 }, Arrangement::Random);
    let mut rng = SimRng::from_seed(42);
    let mut rate_sum = 0.0;
    for _ in 0..500 {
        let mut consignment = create_consignment(3, 10);
        contaminate(&mut consignment, &config, &mut rng).unwrap();
        assert_eq!(consignment.count_contaminated(), 3);
        rate_sum += consignment.contamination_rate();
    }
    assert!((rate_sum / 500.0 - 0.1).abs() < 1e-9);
}

#[test]
fn test_beta_rate_mean_converges() {
    // Beta(4, 16) has mean 0.2; the sample mean over many consignments
    // must land close to it
    let config = item_config(
        RateDistribution::Beta {
            alpha: 4.0,
            beta: 16.0,
        },
        Arrangement::Random,
    );
    let mut rng = SimRng::from_seed(42);
    let runs = 2000;
    let mut rate_sum = 0.0;
    for _ in 0..runs {
        let mut consignment = create_consignment(10, 10);
        contaminate(&mut consignment, &config, &mut rng).unwrap();
        rate_sum += consignment.contamination_rate();
    }
    let mean = rate_sum / runs as f64;
    assert!(
        (mean - 0.2).abs() < 0.02,
        "beta sample mean {mean} too far from 0.2"
    );
}

#[test]
fn test_beta_rates_vary_between_consignments() {
    let config = item_config(
        RateDistribution::Beta {
            alpha: 2.0,
            beta: 8.0,
        },
        Arrangement::Random,
    );
    let mut rng = SimRng::from_seed(42);
    let mut counts = std::collections::BTreeSet::new();
    for _ in 0..50 {
        let mut consignment = create_consignment(10, 100);
        contaminate(&mut consignment, &config, &mut rng).unwrap();
        counts.insert(consignment.count_contaminated());
    }
    assert!(counts.len() > 5, "beta draws should differ across consignments");
}

// ============================================================================
// Arrangements
// ============================================================================

#[test]
fn test_random_box_scenario() {
    // 5 boxes x 10 items, probability 1, ratio 0.4, all items in box:
    // 2 contaminated boxes, 20 contaminated items
    let config = item_config(
        RateDistribution::Fixed { value: 0.3 },
        Arrangement::RandomBox {
            probability: 1.0,
            ratio: 0.4,
            in_box_arrangement: InBoxArrangement::All,
        },
    );
    let mut rng = SimRng::from_seed(42);
    let mut consignment = create_consignment(5, 10);
    contaminate(&mut consignment, &config, &mut rng).unwrap();
    assert_eq!(consignment.count_contaminated_boxes(), 2);
    assert_eq!(consignment.count_contaminated(), 20);
}

#[test]
fn test_box_unit_residual_scenario() {
    // 10 boxes x 100 items, rate 0.01 with box unit: 0 full boxes and a
    // residual of 10 items starting at item 0
    let config = ContaminationConfig {
        contamination_unit: ContaminationUnit::Box,
        contamination_rate: RateDistribution::Fixed { value: 0.01 },
        arrangement: Arrangement::Random,
        consignments: None,
    };
    let mut rng = SimRng::from_seed(42);
    let mut consignment = create_consignment(10, 100);
    contaminate(&mut consignment, &config, &mut rng).unwrap();
    assert_eq!(consignment.count_contaminated(), 10);
    assert!((0..10).all(|item| consignment.is_item_contaminated(item)));
    assert!(!consignment.is_item_contaminated(10));
}

#[test]
fn test_clustered_multi_continuous_counts() {
    for seed in 0..20 {
        let config = item_config(
            RateDistribution::Fixed { value: 0.15 },
            Arrangement::ClusteredMulti {
                contaminated_units_per_cluster: 8,
                distribution: ClusterDistribution::Continuous,
            },
        );
        let mut rng = SimRng::from_seed(seed);
        let mut consignment = create_consignment(20, 10);
        contaminate(&mut consignment, &config, &mut rng).unwrap();
        assert_eq!(consignment.count_contaminated(), 30, "seed {seed}");
    }
}

#[test]
fn test_clustered_multi_random_counts_and_bounds() {
    for seed in 0..20 {
        let config = item_config(
            RateDistribution::Fixed { value: 0.1 },
            Arrangement::ClusteredMulti {
                contaminated_units_per_cluster: 10,
                distribution: ClusterDistribution::Random {
                    cluster_item_width: 25,
                },
            },
        );
        let mut rng = SimRng::from_seed(seed);
        let mut consignment = create_consignment(20, 10);
        contaminate(&mut consignment, &config, &mut rng).unwrap();
        assert_eq!(consignment.count_contaminated(), 20, "seed {seed}");
    }
}

#[test]
fn test_clustered_single_window_shrinks() {
    // value 4 over 200 items puts all contamination in a window of 40
    let config = item_config(
        RateDistribution::Fixed { value: 0.1 },
        Arrangement::ClusteredSingle { value: 4.0 },
    );
    for seed in 0..20 {
        let mut rng = SimRng::from_seed(seed);
        let mut consignment = create_consignment(20, 10);
        contaminate(&mut consignment, &config, &mut rng).unwrap();
        assert_eq!(consignment.count_contaminated(), 20);
        let ones: Vec<usize> = (0..200)
            .filter(|&i| consignment.is_item_contaminated(i))
            .collect();
        let in_some_window = (0..200).any(|start| {
            ones.iter().all(|&i| (i + 200 - start) % 200 < 40)
        });
        assert!(in_some_window, "seed {seed}: not confined to one window");
    }
}

#[test]
fn test_full_contamination_all_arrangements() {
    let arrangements = [
        Arrangement::Random,
        Arrangement::ClusteredSingle { value: 2.0 },
        Arrangement::ClusteredMulti {
            contaminated_units_per_cluster: 10,
            distribution: ClusterDistribution::Continuous,
        },
    ];
    for arrangement in arrangements {
        let config = item_config(RateDistribution::Fixed { value: 1.0 }, arrangement.clone());
        let mut rng = SimRng::from_seed(42);
        let mut consignment = create_consignment(5, 10);
        contaminate(&mut consignment, &config, &mut rng).unwrap();
        assert_eq!(
            consignment.count_contaminated(),
            50,
            "arrangement {arrangement:?} must contaminate every item"
        );
    }
}
