//! Skip-lot release programs
//!
//! Consignments are grouped by tracked attributes; each group sits at a
//! compliance level whose sampling fraction decides, per consignment,
//! whether to inspect. The fixed variant reads levels from a preconfigured
//! table; the dynamic variant runs a per-group state machine that promotes
//! groups after enough consecutive passing inspections and demotes them on
//! any failure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Diagnostic;
use crate::inputs::SkipLotRecord;
use crate::models::Consignment;
use crate::rng::SimRng;

use super::{group_key, ProgramDecision, ReleaseProgram, TrackedAttribute};

/// One compliance level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceLevel {
    /// Optional label for reports
    #[serde(default)]
    pub name: Option<String>,

    /// Probability a consignment at this level is inspected
    pub sampling_fraction: f64,
}

fn validate_levels(levels: &[ComplianceLevel], path: &str) -> Result<(), Diagnostic> {
    if levels.is_empty() {
        return Err(Diagnostic::config(
            format!("{path}/levels"),
            "at least one compliance level is required",
        ));
    }
    for (index, level) in levels.iter().enumerate() {
        if !(0.0..=1.0).contains(&level.sampling_fraction) {
            return Err(Diagnostic::config(
                format!("{path}/levels[{index}]/sampling_fraction"),
                format!(
                    "sampling_fraction {} outside [0, 1]",
                    level.sampling_fraction
                ),
            ));
        }
    }
    Ok(())
}

fn validate_track(track: &[TrackedAttribute], path: &str) -> Result<(), Diagnostic> {
    if track.is_empty() {
        return Err(Diagnostic::config(
            format!("{path}/track"),
            "at least one tracked attribute is required",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Fixed skip lot
// ---------------------------------------------------------------------------

/// Fixed skip lot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedSkipLotConfig {
    #[serde(default = "default_fixed_name")]
    pub name: String,

    /// Attributes forming the group key, in order
    pub track: Vec<TrackedAttribute>,

    /// Compliance levels, 1-based in configuration references
    pub levels: Vec<ComplianceLevel>,

    /// Level for groups without a record
    pub default_level: usize,

    /// Preassigned levels per group
    #[serde(default)]
    pub consignment_records: Vec<SkipLotRecord>,
}

fn default_fixed_name() -> String {
    "fixed_skip_lot".to_string()
}

impl FixedSkipLotConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        let path = "release_programs/fixed_skip_lot";
        validate_track(&self.track, path)?;
        validate_levels(&self.levels, path)?;
        if self.default_level == 0 || self.default_level > self.levels.len() {
            return Err(Diagnostic::config(
                format!("{path}/default_level"),
                format!(
                    "default_level {} outside 1..={}",
                    self.default_level,
                    self.levels.len()
                ),
            ));
        }
        for (index, record) in self.consignment_records.iter().enumerate() {
            if record.compliance_level == 0 || record.compliance_level > self.levels.len() {
                return Err(Diagnostic::config(
                    format!("{path}/consignment_records[{index}]/compliance_level"),
                    format!(
                        "compliance_level {} outside 1..={}",
                        record.compliance_level,
                        self.levels.len()
                    ),
                ));
            }
            for attribute in &self.track {
                if !record.attributes.contains_key(attribute.key()) {
                    return Err(Diagnostic::config(
                        format!("{path}/consignment_records[{index}]"),
                        format!("record is missing tracked attribute {:?}", attribute.key()),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Fixed skip lot: compliance levels come from a preconfigured table and
/// never change.
#[derive(Debug, Clone)]
pub struct FixedSkipLot {
    name: String,
    track: Vec<TrackedAttribute>,
    levels: Vec<ComplianceLevel>,
    default_level: usize,
    records: HashMap<Vec<String>, usize>,
}

impl FixedSkipLot {
    pub fn new(config: &FixedSkipLotConfig) -> Self {
        let records = config
            .consignment_records
            .iter()
            .map(|record| {
                let key = config
                    .track
                    .iter()
                    .map(|attribute| {
                        record
                            .attributes
                            .get(attribute.key())
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect();
                (key, record.compliance_level)
            })
            .collect();
        Self {
            name: config.name.clone(),
            track: config.track.clone(),
            levels: config.levels.clone(),
            default_level: config.default_level,
            records,
        }
    }

    /// Compliance level (1-based) for a consignment's group.
    pub fn compliance_level_for(&self, consignment: &Consignment) -> usize {
        let key = group_key(&self.track, consignment);
        self.records.get(&key).copied().unwrap_or(self.default_level)
    }
}

impl ReleaseProgram for FixedSkipLot {
    fn evaluate(&mut self, consignment: &Consignment, rng: &mut SimRng) -> ProgramDecision {
        let level = self.compliance_level_for(consignment);
        let fraction = self.levels[level - 1].sampling_fraction;
        ProgramDecision {
            inspect: rng.bernoulli(fraction),
            program: Some(self.name.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dynamic skip lot
// ---------------------------------------------------------------------------

/// Dynamic skip lot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicSkipLotConfig {
    #[serde(default = "default_dynamic_name")]
    pub name: String,

    /// Attributes forming the group key, in order
    pub track: Vec<TrackedAttribute>,

    /// Compliance levels from most inspected (1) to least inspected (L)
    pub levels: Vec<ComplianceLevel>,

    /// Level every group starts at
    #[serde(default = "default_start_level")]
    pub start_level: usize,

    /// Consecutive passing inspections required for promotion
    pub clearance_number: u32,

    /// Enable the shortcut back for groups that ever reached the top level
    #[serde(default)]
    pub quick_restating: bool,

    /// Clearance number used once a group has ever reached the top level
    /// (implies quick restating)
    #[serde(default)]
    pub quick_restate_clearance_number: Option<u32>,

    /// Level a quick-restated group falls back to (default: one below the
    /// top)
    #[serde(default)]
    pub restate_level: Option<usize>,
}

fn default_dynamic_name() -> String {
    "dynamic_skip_lot".to_string()
}

fn default_start_level() -> usize {
    1
}

impl DynamicSkipLotConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        let path = "release_programs/dynamic_skip_lot";
        validate_track(&self.track, path)?;
        validate_levels(&self.levels, path)?;
        if self.start_level == 0 || self.start_level > self.levels.len() {
            return Err(Diagnostic::config(
                format!("{path}/start_level"),
                format!(
                    "start_level {} outside 1..={}",
                    self.start_level,
                    self.levels.len()
                ),
            ));
        }
        if self.clearance_number == 0 {
            return Err(Diagnostic::config(
                format!("{path}/clearance_number"),
                "clearance_number must be positive",
            ));
        }
        if let Some(level) = self.restate_level {
            if level == 0 || level > self.levels.len() {
                return Err(Diagnostic::config(
                    format!("{path}/restate_level"),
                    format!("restate_level {} outside 1..={}", level, self.levels.len()),
                ));
            }
        }
        Ok(())
    }

    fn quick_restating_enabled(&self) -> bool {
        self.quick_restating
            || self.quick_restate_clearance_number.is_some()
            || self.restate_level.is_some()
    }
}

/// Per-group state of the dynamic skip lot machine.
#[derive(Debug, Clone)]
struct GroupState {
    /// Current compliance level, 1-based
    level: usize,
    consecutive_successes: u32,
    /// Set once the group reaches the top level; enables quick restating
    has_ever_reached_top: bool,
}

/// Dynamic skip lot: per-group compliance levels driven by inspection
/// results.
///
/// Promotion needs `clearance_number` consecutive passing inspections
/// (released consignments do not count). A failing inspection sends the
/// group back to `start_level`, or, under quick restating for groups that
/// have ever reached the top, to one level below the top (or the configured
/// `restate_level`).
#[derive(Debug, Clone)]
pub struct DynamicSkipLot {
    config: DynamicSkipLotConfig,
    states: HashMap<Vec<String>, GroupState>,
}

impl DynamicSkipLot {
    pub fn new(config: &DynamicSkipLotConfig) -> Self {
        Self {
            config: config.clone(),
            states: HashMap::new(),
        }
    }

    fn state_for(&mut self, consignment: &Consignment) -> &mut GroupState {
        let key = group_key(&self.config.track, consignment);
        let start_level = self.config.start_level;
        self.states.entry(key).or_insert_with(|| GroupState {
            level: start_level,
            consecutive_successes: 0,
            has_ever_reached_top: false,
        })
    }

    /// Current compliance level (1-based) for a consignment's group.
    pub fn compliance_level_for(&mut self, consignment: &Consignment) -> usize {
        self.state_for(consignment).level
    }

    /// Sampling fraction of a level (1-based).
    pub fn sampling_fraction_for_level(&self, level: usize) -> f64 {
        self.config.levels[level - 1].sampling_fraction
    }
}

impl ReleaseProgram for DynamicSkipLot {
    fn evaluate(&mut self, consignment: &Consignment, rng: &mut SimRng) -> ProgramDecision {
        let level = self.state_for(consignment).level;
        let fraction = self.config.levels[level - 1].sampling_fraction;
        ProgramDecision {
            inspect: rng.bernoulli(fraction),
            program: Some(self.config.name.clone()),
        }
    }

    fn record_result(&mut self, consignment: &Consignment, inspected: bool, passed: bool) {
        if !inspected {
            // released consignments never advance the success count
            return;
        }
        let top_level = self.config.levels.len();
        let start_level = self.config.start_level;
        let quick_restating = self.config.quick_restating_enabled();
        let clearance = self.config.clearance_number;
        let quick_clearance = self
            .config
            .quick_restate_clearance_number
            .unwrap_or(clearance);
        let restate_level = self.config.restate_level.unwrap_or(top_level.max(2) - 1);

        let state = self.state_for(consignment);
        if passed {
            state.consecutive_successes += 1;
            let required = if quick_restating && state.has_ever_reached_top {
                quick_clearance
            } else {
                clearance
            };
            if state.consecutive_successes >= required && state.level < top_level {
                state.level += 1;
                state.consecutive_successes = 0;
                if state.level == top_level {
                    state.has_ever_reached_top = true;
                }
            }
        } else {
            state.level = if quick_restating && state.has_ever_reached_top {
                restate_level
            } else {
                start_level
            };
            state.consecutive_successes = 0;
        }
    }
}
