//! Configuration loading and validation tests

use std::io::Write;

use inspection_sim::config::{ConfigError, SimulationConfig};

// ============================================================================
// Test Helpers
// ============================================================================

const VALID_YAML: &str = "\
consignment:
  items_per_box:
    default: 200
    air:
      default: 100
  parameter_based:
    boxes:
      min: 1
      max: 100
    commodities: [Hyacinthus, Rosa, Gerbera]
    origins: [Netherlands, Mexico, Israel]
    ports: [NY JFK CBP, FL Miami Air CBP, HI Honolulu CBP]
contamination:
  contamination_unit: item
  contamination_rate:
    beta: {alpha: 4.0, beta: 60.0}
  arrangement:
    clustered_multi:
      contaminated_units_per_cluster: 200
      distribution:
        random:
          cluster_item_width: 600
inspection:
  unit: box
  within_box_proportion: 0.25
  tolerance_level: 0.01
  sample_strategy:
    proportion: {value: 0.02}
  selection_strategy: random
  min_boxes: 1
  effectiveness: 0.95
";

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_valid_yaml_loads() {
    let config = SimulationConfig::from_text(VALID_YAML).unwrap();
    assert_eq!(config.consignment.items_per_box.for_pathway("Airport"), 100);
    assert_eq!(config.consignment.items_per_box.for_pathway("none"), 200);
    assert_eq!(config.inspection.min_boxes, 1);
}

#[test]
fn test_json_loads() {
    let config = SimulationConfig::from_text(VALID_YAML).unwrap();
    let json = serde_json::to_string_pretty(&config).unwrap();
    SimulationConfig::from_text(&json).unwrap();
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(VALID_YAML.as_bytes()).unwrap();
    drop(file);
    SimulationConfig::from_file(&path).unwrap();
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SimulationConfig::from_file(std::path::Path::new("/nonexistent/config.yml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_unknown_enumerated_value_rejected() {
    let text = VALID_YAML.replace("contamination_unit: item", "contamination_unit: crate");
    let err = SimulationConfig::from_text(&text).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_cluster_width_below_cluster_size_rejected() {
    let text = VALID_YAML.replace("cluster_item_width: 600", "cluster_item_width: 100");
    let err = SimulationConfig::from_text(&text).unwrap_err();
    match err {
        ConfigError::Invalid(diagnostic) => {
            assert!(diagnostic.path.contains("cluster_item_width"));
        }
        other => panic!("expected validation diagnostic, got {other:?}"),
    }
}

#[test]
fn test_cluster_selection_with_box_unit_rejected() {
    let text = VALID_YAML.replace(
        "selection_strategy: random",
        "selection_strategy:\n    cluster:\n      cluster_selection: random\n      interval: 2",
    );
    let err = SimulationConfig::from_text(&text).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_out_of_range_effectiveness_rejected() {
    let text = VALID_YAML.replace("effectiveness: 0.95", "effectiveness: 1.95");
    assert!(SimulationConfig::from_text(&text).is_err());
}

#[test]
fn test_zero_within_box_proportion_rejected() {
    let text = VALID_YAML.replace("within_box_proportion: 0.25", "within_box_proportion: 0.0");
    assert!(SimulationConfig::from_text(&text).is_err());
}

#[test]
fn test_empty_commodities_rejected() {
    let text = VALID_YAML.replace("commodities: [Hyacinthus, Rosa, Gerbera]", "commodities: []");
    assert!(SimulationConfig::from_text(&text).is_err());
}

#[test]
fn test_beta_with_nonpositive_parameter_rejected() {
    let text = VALID_YAML.replace("alpha: 4.0", "alpha: -1.0");
    assert!(SimulationConfig::from_text(&text).is_err());
}
