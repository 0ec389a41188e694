//! Cut Flower Release Program variants
//!
//! Under a CFRP one commodity is the "flower of the day": consignments
//! carrying it are inspected while the program's other flowers are
//! released. The naive variant derives the flower of the day from the date
//! alone; the scheduled variant works from a preloaded
//! (date, commodity, origin) table.

use serde::{Deserialize, Serialize};

use crate::config::Diagnostic;
use crate::inputs::{build_cfrp_schedule, CfrpSchedule, CfrpScheduleRow, DataError};
use crate::models::Consignment;
use crate::rng::SimRng;

use super::{ProgramDecision, ReleaseProgram};

/// Naive CFRP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveCfrpConfig {
    /// Program name used in reports
    #[serde(default = "default_naive_name")]
    pub name: String,

    /// Flowers participating in the program
    pub flowers: Vec<String>,

    /// Consignments this large or larger are always inspected
    pub max_boxes: usize,
}

fn default_naive_name() -> String {
    "naive_cfrp".to_string()
}

impl NaiveCfrpConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        if self.flowers.is_empty() {
            return Err(Diagnostic::config(
                "release_programs/naive_cfrp/flowers",
                "flower list must not be empty",
            ));
        }
        Ok(())
    }
}

/// Naive CFRP: flower of the day is a pure function of the date.
#[derive(Debug, Clone)]
pub struct NaiveCfrp {
    config: NaiveCfrpConfig,
}

impl NaiveCfrp {
    pub fn new(config: &NaiveCfrpConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// True when `flower` is the flower of the day.
    pub fn is_flower_of_the_day(&self, flower: &str, date: chrono::NaiveDate) -> bool {
        use chrono::Datelike;
        let index = date.day() as usize % self.config.flowers.len();
        self.config.flowers[index] == flower
    }
}

impl ReleaseProgram for NaiveCfrp {
    fn evaluate(&mut self, consignment: &Consignment, _rng: &mut SimRng) -> ProgramDecision {
        let in_program = self.config.flowers.iter().any(|f| f == &consignment.commodity)
            && consignment.num_boxes() < self.config.max_boxes;
        if !in_program {
            // not in CFRP or too large: regular inspection
            return ProgramDecision::inspect_always();
        }
        ProgramDecision {
            inspect: self.is_flower_of_the_day(&consignment.commodity, consignment.date),
            program: Some(self.config.name.clone()),
        }
    }
}

/// Scheduled CFRP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfrpConfig {
    #[serde(default = "default_cfrp_name")]
    pub name: String,

    /// Schedule rows, already split by the external reader
    pub schedule: Vec<CfrpScheduleRow>,

    /// Date format of the schedule rows (ISO by default)
    #[serde(default)]
    pub date_format: Option<String>,

    /// Ports the program operates in; elsewhere every consignment is
    /// inspected. None means all ports participate.
    #[serde(default)]
    pub ports: Option<Vec<String>>,
}

fn default_cfrp_name() -> String {
    "cfrp".to_string()
}

impl CfrpConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        build_cfrp_schedule(&self.schedule, self.date_format.as_deref()).map_err(|err| {
            Diagnostic::config("release_programs/cfrp/schedule", err.to_string())
        })?;
        Ok(())
    }
}

/// Scheduled CFRP: a (commodity, origin) pair in the schedule is inspected
/// on its scheduled dates and released on all other days.
#[derive(Debug, Clone)]
pub struct ScheduledCfrp {
    name: String,
    schedule: CfrpSchedule,
    ports: Option<Vec<String>>,
}

impl ScheduledCfrp {
    pub fn new(config: &CfrpConfig) -> Result<Self, DataError> {
        Ok(Self {
            name: config.name.clone(),
            schedule: build_cfrp_schedule(&config.schedule, config.date_format.as_deref())?,
            ports: config.ports.clone(),
        })
    }
}

impl ReleaseProgram for ScheduledCfrp {
    fn evaluate(&mut self, consignment: &Consignment, _rng: &mut SimRng) -> ProgramDecision {
        if let Some(ports) = &self.ports {
            if !ports.contains(&consignment.port) {
                return ProgramDecision::inspect_always();
            }
        }
        let key = (consignment.commodity.clone(), consignment.origin.clone());
        match self.schedule.get(&key) {
            Some(dates) => ProgramDecision {
                // on its scheduled date the combination is the flower of
                // the day and gets inspected
                inspect: dates.contains(&consignment.date),
                program: Some(self.name.clone()),
            },
            None => ProgramDecision::inspect_always(),
        }
    }
}
