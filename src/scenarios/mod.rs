//! Scenario sweeps over a table of configuration overrides
//!
//! Each scenario row is a flat record whose keys are slash-joined paths
//! into the configuration tree (e.g. `contamination/contamination_rate`)
//! and whose values override or insert at that path. A `name` column, when
//! present, labels the scenario in the results.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::{ConfigError, SimulationConfig};
use crate::orchestrator::{run_simulation, RunOptions, SimulationError, SimulationTotals};

/// One scenario row: override values keyed by slash-joined paths.
pub type ScenarioRow = HashMap<String, Value>;

/// Result of running one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub config: SimulationConfig,
    pub totals: SimulationTotals,
}

/// Errors produced while sweeping scenarios.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario {name:?}: {source}")]
    Config {
        name: String,
        #[source]
        source: ConfigError,
    },

    #[error("scenario {name:?}: {source}")]
    Run {
        name: String,
        #[source]
        source: SimulationError,
    },
}

/// Parse one table cell: integers, floats, booleans, and JSON-encoded
/// nested literals are recognized; everything else stays a string
/// (ISO dates deserialize from strings downstream).
pub fn text_to_value(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(number) = trimmed.parse::<i64>() {
        return Value::from(number);
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return Value::from(number);
    }
    match trimmed {
        "true" | "True" => return Value::from(true),
        "false" | "False" => return Value::from(false),
        _ => {}
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value;
    }
    Value::from(trimmed)
}

/// Turn a flat record with slash-joined keys into a nested JSON object.
pub fn record_to_nested_value(record: &ScenarioRow) -> Value {
    let mut root = Value::Object(serde_json::Map::new());
    for (path, value) in record {
        insert_at_path(&mut root, path, value.clone());
    }
    root
}

fn insert_at_path(tree: &mut Value, path: &str, value: Value) {
    let mut node = tree;
    let mut segments = path.split('/').peekable();
    while let Some(segment) = segments.next() {
        let object = node
            .as_object_mut()
            .expect("override paths traverse objects");
        if segments.peek().is_none() {
            object.insert(segment.to_string(), value);
            return;
        }
        node = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !node.is_object() {
            // overriding a scalar with a nested path replaces it
            *node = Value::Object(serde_json::Map::new());
        }
    }
}

/// Apply one scenario row onto a base configuration.
///
/// The base is serialized to a JSON tree, the overrides are inserted at
/// their paths, and the result is deserialized and validated again.
pub fn apply_overrides(
    base: &SimulationConfig,
    row: &ScenarioRow,
) -> Result<SimulationConfig, ConfigError> {
    let mut tree =
        serde_json::to_value(base).map_err(|err| ConfigError::Parse(err.to_string()))?;
    for (path, value) in row {
        if path == "name" {
            continue;
        }
        insert_at_path(&mut tree, path, value.clone());
    }
    let config: SimulationConfig =
        serde_json::from_value(tree).map_err(|err| ConfigError::Parse(err.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Run every scenario row against the base configuration.
pub fn run_scenarios(
    base: &SimulationConfig,
    rows: &[ScenarioRow],
    num_simulations: usize,
    num_consignments: usize,
    master_seed: u64,
    options: &RunOptions,
) -> Result<Vec<ScenarioOutcome>, ScenarioError> {
    let mut outcomes = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let name = row
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("scenario {index}"), str::to_string);
        let config = apply_overrides(base, row)
            .map_err(|source| ScenarioError::Config {
                name: name.clone(),
                source,
            })?;
        let totals = run_simulation(
            &config,
            num_simulations,
            num_consignments,
            master_seed,
            options,
        )
        .map_err(|source| ScenarioError::Run {
            name: name.clone(),
            source,
        })?;
        outcomes.push(ScenarioOutcome {
            name,
            config,
            totals,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_value_recognizes_types() {
        assert_eq!(text_to_value("42"), Value::from(42));
        assert_eq!(text_to_value("0.25"), Value::from(0.25));
        assert_eq!(text_to_value("true"), Value::from(true));
        assert_eq!(text_to_value("False"), Value::from(false));
        assert_eq!(text_to_value("Rosa"), Value::from("Rosa"));
        assert_eq!(text_to_value("2020-01-01"), Value::from("2020-01-01"));
        let nested = text_to_value(r#"{"fixed": {"value": 0.1}}"#);
        assert_eq!(nested["fixed"]["value"], Value::from(0.1));
        let list = text_to_value(r#"["Rosa", "Gerbera"]"#);
        assert_eq!(list[1], Value::from("Gerbera"));
    }

    #[test]
    fn test_record_to_nested_value() {
        let mut record = ScenarioRow::new();
        record.insert("a/b/c".into(), Value::from(1));
        record.insert("a/d".into(), Value::from("x"));
        let tree = record_to_nested_value(&record);
        assert_eq!(tree["a"]["b"]["c"], Value::from(1));
        assert_eq!(tree["a"]["d"], Value::from("x"));
    }
}
