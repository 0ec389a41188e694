//! Release programs: deciding which consignments get inspected at all
//!
//! A release program is evaluated before inspection; on release, no items
//! are inspected and the consignment is reported as released by the named
//! program. Programs that track compliance (skip lot) are fed the
//! inspection result afterwards through [`ReleaseProgram::record_result`].
//!
//! At most one program is active per run. When several are configured, the
//! first in alphabetical order wins (cfrp, dynamic_skip_lot,
//! fixed_skip_lot, naive_cfrp).

mod cfrp;
mod skip_lot;

use serde::{Deserialize, Serialize};

use crate::config::Diagnostic;
use crate::inputs::DataError;
use crate::models::Consignment;
use crate::rng::SimRng;

pub use cfrp::{CfrpConfig, NaiveCfrp, NaiveCfrpConfig, ScheduledCfrp};
pub use skip_lot::{
    ComplianceLevel, DynamicSkipLot, DynamicSkipLotConfig, FixedSkipLot, FixedSkipLotConfig,
};

/// Outcome of evaluating a release program for one consignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDecision {
    /// True: inspect the consignment; false: release it uninspected
    pub inspect: bool,

    /// Name of the program that made the call, None when no program applied
    pub program: Option<String>,
}

impl ProgramDecision {
    /// Decision outside any program: always inspect.
    pub fn inspect_always() -> Self {
        Self {
            inspect: true,
            program: None,
        }
    }
}

/// One release program, stateful across the consignments of one iteration.
pub trait ReleaseProgram {
    /// Decide whether this consignment must be inspected.
    fn evaluate(&mut self, consignment: &Consignment, rng: &mut SimRng) -> ProgramDecision;

    /// Feed back the inspection outcome (`passed` is meaningful only when
    /// `inspected` is true). Programs without compliance tracking ignore
    /// this.
    fn record_result(&mut self, consignment: &Consignment, inspected: bool, passed: bool) {
        let _ = (consignment, inspected, passed);
    }
}

/// Attributes a skip-lot program can group consignments by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedAttribute {
    Commodity,
    Origin,
    Port,
    Pathway,
}

impl TrackedAttribute {
    /// Configuration key naming this attribute.
    pub fn key(&self) -> &'static str {
        match self {
            TrackedAttribute::Commodity => "commodity",
            TrackedAttribute::Origin => "origin",
            TrackedAttribute::Port => "port",
            TrackedAttribute::Pathway => "pathway",
        }
    }

    /// This attribute's value for a consignment.
    pub fn value_of(&self, consignment: &Consignment) -> String {
        match self {
            TrackedAttribute::Commodity => consignment.commodity.clone(),
            TrackedAttribute::Origin => consignment.origin.clone(),
            TrackedAttribute::Port => consignment.port.clone(),
            TrackedAttribute::Pathway => consignment.pathway.clone(),
        }
    }
}

/// Group key over the tracked attributes, in declaration order.
pub fn group_key(track: &[TrackedAttribute], consignment: &Consignment) -> Vec<String> {
    track
        .iter()
        .map(|attribute| attribute.value_of(consignment))
        .collect()
}

/// Release program configuration group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseProgramsConfig {
    #[serde(default)]
    pub cfrp: Option<CfrpConfig>,
    #[serde(default)]
    pub dynamic_skip_lot: Option<DynamicSkipLotConfig>,
    #[serde(default)]
    pub fixed_skip_lot: Option<FixedSkipLotConfig>,
    #[serde(default)]
    pub naive_cfrp: Option<NaiveCfrpConfig>,
}

impl ReleaseProgramsConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        if let Some(config) = &self.cfrp {
            config.validate()?;
        }
        if let Some(config) = &self.dynamic_skip_lot {
            config.validate()?;
        }
        if let Some(config) = &self.fixed_skip_lot {
            config.validate()?;
        }
        if let Some(config) = &self.naive_cfrp {
            config.validate()?;
        }
        Ok(())
    }

    /// Build the active program for one iteration, if any is configured.
    pub fn build(&self) -> Result<Option<Box<dyn ReleaseProgram>>, DataError> {
        if let Some(config) = &self.cfrp {
            return Ok(Some(Box::new(ScheduledCfrp::new(config)?)));
        }
        if let Some(config) = &self.dynamic_skip_lot {
            return Ok(Some(Box::new(DynamicSkipLot::new(config))));
        }
        if let Some(config) = &self.fixed_skip_lot {
            return Ok(Some(Box::new(FixedSkipLot::new(config))));
        }
        if let Some(config) = &self.naive_cfrp {
            return Ok(Some(Box::new(NaiveCfrp::new(config))));
        }
        Ok(None)
    }
}
