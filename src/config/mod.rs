//! Top-level simulation configuration
//!
//! The loader accepts YAML or JSON; the tree has groups `consignment`,
//! `contamination`, `inspection`, optional `release_programs`, optional
//! `pretty`, and a `strict_input` flag. Validation happens once, pre-run,
//! and reports structured diagnostics (category, path, message); the core
//! then runs against a fully validated configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::contamination::ContaminationConfig;
use crate::generators::ConsignmentConfig;
use crate::inspection::InspectionConfig;
use crate::outputs::{DispositionCodes, PrettyConfig};
use crate::programs::ReleaseProgramsConfig;

/// Which class of problem a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    /// Invalid configuration (fatal, pre-run)
    Configuration,
    /// Invalid input record (fatal for that row)
    Data,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Configuration => write!(f, "configuration"),
            DiagnosticCategory::Data => write!(f, "data"),
        }
    }
}

/// Structured description of a configuration or data problem.
#[derive(Debug, Clone, Error)]
#[error("{category} error at {path}: {message}")]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    /// Slash-joined key path into the configuration tree or record set
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Configuration,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(#[from] Diagnostic),

    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Consignment generation
    pub consignment: ConsignmentConfig,

    /// Contaminant injection
    pub contamination: ContaminationConfig,

    /// Sampling and inspection
    pub inspection: InspectionConfig,

    /// Optional release programs (at most one is applied per run)
    #[serde(default)]
    pub release_programs: Option<ReleaseProgramsConfig>,

    /// Pretty-printing glyphs and lines
    #[serde(default)]
    pub pretty: Option<PrettyConfig>,

    /// Custom disposition strings for F280 records
    #[serde(default)]
    pub disposition_codes: Option<DispositionCodes>,

    /// Abort on malformed input records instead of skipping them
    #[serde(default)]
    pub strict_input: bool,
}

impl SimulationConfig {
    /// Parse configuration from YAML or JSON text.
    ///
    /// YAML is a superset of JSON for our purposes, so a single parser
    /// covers both formats. The parsed tree is validated before being
    /// returned.
    pub fn from_text(text: &str) -> Result<Self, ConfigError> {
        let deserializer = serde_yaml::Deserializer::from_str(text);
        let config: SimulationConfig = serde_yaml::with::singleton_map_recursive::deserialize(
            deserializer,
        )
        .map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a YAML or JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    /// Validate every enumerated value and numeric range, pre-run.
    pub fn validate(&self) -> Result<(), Diagnostic> {
        self.consignment.validate()?;
        self.contamination.validate()?;
        self.inspection.validate()?;
        if let Some(programs) = &self.release_programs {
            programs.validate()?;
        }
        Ok(())
    }
}
