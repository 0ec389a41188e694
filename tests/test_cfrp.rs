//! Cut Flower Release Program tests

use chrono::NaiveDate;

use inspection_sim::models::Consignment;
use inspection_sim::orchestrator::{simulation, RunOptions};
use inspection_sim::programs::{
    CfrpConfig, NaiveCfrp, NaiveCfrpConfig, ReleaseProgram, ScheduledCfrp,
};
use inspection_sim::inputs::CfrpScheduleRow;
use inspection_sim::rng::SimRng;
use inspection_sim::SimulationConfig;

// ============================================================================
// Test Helpers
// ============================================================================

fn simple_consignment(
    commodity: &str,
    origin: &str,
    date: NaiveDate,
    num_boxes: usize,
) -> Consignment {
    Consignment::new(
        commodity,
        origin,
        "FL Miami Air CBP",
        date,
        "airport",
        num_boxes,
        10,
    )
}

// ============================================================================
// Naive CFRP
// ============================================================================

#[test]
fn test_exactly_one_flower_inspected_per_day() {
    // with an unbounded size limit, each day inspects exactly one of the
    // configured flowers and releases all the others
    let flowers = ["Hyacinthus", "Rosa", "Gerbera", "Liatris"];
    let config = NaiveCfrpConfig {
        name: "naive_cfrp".into(),
        flowers: flowers.iter().map(|f| f.to_string()).collect(),
        max_boxes: usize::MAX,
    };
    let mut program = NaiveCfrp::new(&config);
    let mut rng = SimRng::from_seed(1);
    for day in 1..=28 {
        let date = NaiveDate::from_ymd_opt(2020, 2, day).unwrap();
        let inspected: Vec<&str> = flowers
            .iter()
            .copied()
            .filter(|flower| {
                program
                    .evaluate(&simple_consignment(flower, "Colombia", date, 500), &mut rng)
                    .inspect
            })
            .collect();
        assert_eq!(inspected.len(), 1, "day {day}: {inspected:?}");
    }
}

#[test]
fn test_flower_of_the_day_rotates_with_date() {
    let config = NaiveCfrpConfig {
        name: "naive_cfrp".into(),
        flowers: vec!["Hyacinthus".into(), "Rosa".into(), "Gerbera".into()],
        max_boxes: 100,
    };
    let program = NaiveCfrp::new(&config);
    // day % 3 picks the index
    let date = |day| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
    assert!(program.is_flower_of_the_day("Hyacinthus", date(3)));
    assert!(program.is_flower_of_the_day("Rosa", date(4)));
    assert!(program.is_flower_of_the_day("Gerbera", date(5)));
    assert!(program.is_flower_of_the_day("Hyacinthus", date(6)));
}

#[test]
fn test_large_consignments_bypass_the_program() {
    let config = NaiveCfrpConfig {
        name: "naive_cfrp".into(),
        flowers: vec!["Rosa".into(), "Gerbera".into()],
        max_boxes: 10,
    };
    let mut program = NaiveCfrp::new(&config);
    let mut rng = SimRng::from_seed(1);
    let date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    // at the size limit the consignment is no longer in the program
    let decision = program.evaluate(&simple_consignment("Rosa", "Colombia", date, 10), &mut rng);
    assert!(decision.inspect);
    assert!(decision.program.is_none());
    // below the limit the program applies
    let decision = program.evaluate(&simple_consignment("Rosa", "Colombia", date, 9), &mut rng);
    assert_eq!(decision.program.as_deref(), Some("naive_cfrp"));
}

// ============================================================================
// Scheduled CFRP
// ============================================================================

fn schedule_config() -> CfrpConfig {
    CfrpConfig {
        name: "cfrp".into(),
        schedule: vec![
            CfrpScheduleRow {
                date: "2014_10_01".into(),
                commodity: "Liatris".into(),
                origin: "Ecuador".into(),
            },
            CfrpScheduleRow {
                date: "2014_10_15".into(),
                commodity: "Liatris".into(),
                origin: "Ecuador".into(),
            },
            CfrpScheduleRow {
                date: "2014_10_01".into(),
                commodity: "Sedum".into(),
                origin: "Netherlands".into(),
            },
        ],
        date_format: Some("%Y_%m_%d".into()),
        ports: None,
    }
}

#[test]
fn test_schedule_drives_inspection_days() {
    let mut program = ScheduledCfrp::new(&schedule_config()).unwrap();
    let mut rng = SimRng::from_seed(1);
    let on_schedule = NaiveDate::from_ymd_opt(2014, 10, 1).unwrap();
    let off_schedule = NaiveDate::from_ymd_opt(2014, 10, 2).unwrap();

    let decision =
        program.evaluate(&simple_consignment("Liatris", "Ecuador", on_schedule, 3), &mut rng);
    assert!(decision.inspect);
    assert_eq!(decision.program.as_deref(), Some("cfrp"));

    let decision =
        program.evaluate(&simple_consignment("Liatris", "Ecuador", off_schedule, 3), &mut rng);
    assert!(!decision.inspect);
    assert_eq!(decision.program.as_deref(), Some("cfrp"));

    // same commodity from an origin outside the schedule: ordinary
    // inspection without program attribution
    let decision =
        program.evaluate(&simple_consignment("Liatris", "Colombia", on_schedule, 3), &mut rng);
    assert!(decision.inspect);
    assert!(decision.program.is_none());
}

// ============================================================================
// CFRP inside the simulation loop
// ============================================================================

#[test]
fn test_naive_cfrp_reduces_inspections_in_run() {
    let config_text = "\
consignment:
  items_per_box:
    default: 10
  start_date: 2020-03-01
  parameter_based:
    boxes:
      min: 1
      max: 5
    commodities: [Hyacinthus, Rosa, Gerbera]
    origins: [Netherlands]
    ports: [NY JFK CBP]
contamination:
  contamination_unit: item
  contamination_rate:
    fixed: {value: 0.0}
  arrangement: random
inspection:
  unit: item
  within_box_proportion: 1.0
  tolerance_level: 0.0
  sample_strategy: all
  selection_strategy: random
  min_boxes: 0
  effectiveness: 1.0
release_programs:
  naive_cfrp:
    flowers: [Hyacinthus, Rosa, Gerbera]
    max_boxes: 100
";
    let config = SimulationConfig::from_text(config_text).unwrap();
    let summary = simulation(&config, 60, 42, &RunOptions::default()).unwrap();
    assert_eq!(summary.num_consignments, 60);
    assert!(
        summary.num_inspections < 60,
        "some consignments must be released by the program"
    );
    assert!(
        summary.num_inspections > 0,
        "flowers of the day must still be inspected"
    );
}
