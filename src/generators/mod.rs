//! Consignment generation
//!
//! Creates the consignment population for one stochastic iteration, either
//! synthetically from configured parameters or by translating F280 / AQIM
//! inspection records into consignments. All generation is deterministic
//! given the RNG seed.
//!
//! # Key Principles
//!
//! 1. **Determinism**: same seed + same config → same consignments
//! 2. **Equal boxes**: every consignment holds `num_boxes * items_per_box`
//!    items; record quantities are rounded up to whole boxes
//! 3. **Strict ordering**: consignments come out in generation order, which
//!    release-program state depends on

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Diagnostic;
use crate::inputs::{parse_record_date, AqimRecord, DataError, F280Record, DEFAULT_DATE_FORMAT};
use crate::models::Consignment;
use crate::rng::SimRng;

/// Items-per-box configuration with per-pathway specialization.
///
/// The `air` and `maritime` pathways may override the default; pathway
/// comparison is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsPerBoxConfig {
    pub default: usize,
    #[serde(default)]
    pub air: Option<PathwayDefault>,
    #[serde(default)]
    pub maritime: Option<PathwayDefault>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayDefault {
    pub default: usize,
}

impl ItemsPerBoxConfig {
    /// Items per box for the given pathway.
    pub fn for_pathway(&self, pathway: &str) -> usize {
        match pathway.to_lowercase().as_str() {
            "airport" | "air" => self.air.as_ref().map_or(self.default, |p| p.default),
            "maritime" => self.maritime.as_ref().map_or(self.default, |p| p.default),
            _ => self.default,
        }
    }
}

/// Box count range for parameter-based generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxCountRange {
    #[serde(default)]
    pub min: usize,
    pub max: usize,
}

/// Parameters for synthesizing consignments without input records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterBasedConfig {
    pub boxes: BoxCountRange,
    /// Commodities to draw from (cut-flower species in the original data)
    #[serde(alias = "flowers")]
    pub commodities: Vec<String>,
    pub origins: Vec<String>,
    pub ports: Vec<String>,
}

/// How consignments are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    #[default]
    ParameterBased,
    F280,
    Aqim,
}

/// Consignment generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsignmentConfig {
    #[serde(default)]
    pub generation_method: GenerationMethod,

    pub items_per_box: ItemsPerBoxConfig,

    /// First consignment date for parameter-based generation
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    #[serde(default)]
    pub parameter_based: Option<ParameterBasedConfig>,

    /// F280 records, already split by the external reader
    #[serde(default)]
    pub f280: Option<Vec<F280Record>>,

    /// AQIM records, already split by the external reader
    #[serde(default)]
    pub aqim: Option<Vec<AqimRecord>>,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid constant date")
}

impl ConsignmentConfig {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        if self.items_per_box.default == 0 {
            return Err(Diagnostic::config(
                "consignment/items_per_box/default",
                "items per box must be positive",
            ));
        }
        match self.generation_method {
            GenerationMethod::ParameterBased => {
                let params = self.parameter_based.as_ref().ok_or_else(|| {
                    Diagnostic::config(
                        "consignment/parameter_based",
                        "parameter_based section required for parameter-based generation",
                    )
                })?;
                if params.boxes.max < params.boxes.min {
                    return Err(Diagnostic::config(
                        "consignment/parameter_based/boxes",
                        "max must not be less than min",
                    ));
                }
                for (path, values) in [
                    ("commodities", &params.commodities),
                    ("origins", &params.origins),
                    ("ports", &params.ports),
                ] {
                    if values.is_empty() {
                        return Err(Diagnostic::config(
                            format!("consignment/parameter_based/{path}"),
                            "list must not be empty",
                        ));
                    }
                }
            }
            GenerationMethod::F280 => {
                if self.f280.is_none() {
                    return Err(Diagnostic::config(
                        "consignment/f280",
                        "f280 records required for f280 generation",
                    ));
                }
            }
            GenerationMethod::Aqim => {
                if self.aqim.is_none() {
                    return Err(Diagnostic::config(
                        "consignment/aqim",
                        "aqim records required for aqim generation",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Build the generator for one iteration.
    pub fn build_generator(&self, strict_input: bool) -> ConsignmentGenerator {
        match self.generation_method {
            GenerationMethod::ParameterBased => {
                let params = self
                    .parameter_based
                    .clone()
                    .expect("validated configuration has parameters");
                ConsignmentGenerator::Parameter(ParameterConsignmentGenerator {
                    params,
                    items_per_box: self.items_per_box.clone(),
                    date: self.start_date,
                    num_generated: 0,
                })
            }
            GenerationMethod::F280 => ConsignmentGenerator::F280(F280ConsignmentGenerator {
                records: self.f280.clone().expect("validated configuration has records"),
                cursor: 0,
                items_per_box: self.items_per_box.clone(),
                strict_input,
            }),
            GenerationMethod::Aqim => ConsignmentGenerator::Aqim(AqimConsignmentGenerator {
                records: self.aqim.clone().expect("validated configuration has records"),
                cursor: 0,
                items_per_box: self.items_per_box.clone(),
                strict_input,
            }),
        }
    }
}

/// Generator for the consignment stream of one iteration.
#[derive(Debug, Clone)]
pub enum ConsignmentGenerator {
    Parameter(ParameterConsignmentGenerator),
    F280(F280ConsignmentGenerator),
    Aqim(AqimConsignmentGenerator),
}

impl ConsignmentGenerator {
    /// Produce the next consignment.
    pub fn generate(&mut self, rng: &mut SimRng) -> Result<Consignment, DataError> {
        match self {
            ConsignmentGenerator::Parameter(generator) => Ok(generator.generate(rng)),
            ConsignmentGenerator::F280(generator) => generator.generate(),
            ConsignmentGenerator::Aqim(generator) => generator.generate(),
        }
    }
}

/// Generate consignments from configured parameters.
#[derive(Debug, Clone)]
pub struct ParameterConsignmentGenerator {
    params: ParameterBasedConfig,
    items_per_box: ItemsPerBoxConfig,
    date: NaiveDate,
    num_generated: usize,
}

impl ParameterConsignmentGenerator {
    fn generate(&mut self, rng: &mut SimRng) -> Consignment {
        let port = rng.choose(&self.params.ports).clone();
        let commodity = rng.choose(&self.params.commodities).clone();
        let origin = rng.choose(&self.params.origins).clone();
        let num_boxes = rng.uniform_int(self.params.boxes.min, self.params.boxes.max);
        let pathway = "none";
        let items_per_box = self.items_per_box.for_pathway(pathway);

        self.num_generated += 1;
        // two consignments arrive every third day
        if self.num_generated % 3 != 0 {
            self.date = self.date + Duration::days(1);
        }

        Consignment::new(
            commodity,
            origin,
            port,
            self.date,
            pathway,
            num_boxes,
            items_per_box,
        )
    }
}

/// Translate F280 records into consignments.
#[derive(Debug, Clone)]
pub struct F280ConsignmentGenerator {
    records: Vec<F280Record>,
    cursor: usize,
    items_per_box: ItemsPerBoxConfig,
    strict_input: bool,
}

impl F280ConsignmentGenerator {
    fn generate(&mut self) -> Result<Consignment, DataError> {
        loop {
            let index = self.cursor;
            let record = self
                .records
                .get(index)
                .ok_or(DataError::Exhausted {
                    available: self.records.len(),
                })?
                .clone();
            self.cursor += 1;
            match self.translate(&record, index) {
                Ok(consignment) => return Ok(consignment),
                Err(err) if self.strict_input => return Err(err),
                Err(err) => {
                    warn!(row = index, error = %err, "skipping malformed F280 record");
                }
            }
        }
    }

    fn translate(&self, record: &F280Record, index: usize) -> Result<Consignment, DataError> {
        let date = parse_record_date(
            &record.report_dt,
            DEFAULT_DATE_FORMAT,
            &format!("f280[{index}]/REPORT_DT"),
        )?;
        let items_per_box = self.items_per_box.for_pathway(&record.pathway);
        // round up so all items fit and every box holds the same count
        let num_boxes = record.quantity.div_ceil(items_per_box).max(1);
        Ok(Consignment::new(
            record.commodity.clone(),
            record.origin_nm.clone(),
            record.location.clone(),
            date,
            record.pathway.clone(),
            num_boxes,
            items_per_box,
        ))
    }
}

/// Translate AQIM records into consignments.
#[derive(Debug, Clone)]
pub struct AqimConsignmentGenerator {
    records: Vec<AqimRecord>,
    cursor: usize,
    items_per_box: ItemsPerBoxConfig,
    strict_input: bool,
}

impl AqimConsignmentGenerator {
    fn generate(&mut self) -> Result<Consignment, DataError> {
        loop {
            let index = self.cursor;
            let record = self
                .records
                .get(index)
                .ok_or(DataError::Exhausted {
                    available: self.records.len(),
                })?
                .clone();
            self.cursor += 1;
            match self.translate(&record, index) {
                Ok(consignment) => return Ok(consignment),
                Err(err) if self.strict_input => return Err(err),
                Err(err) => {
                    warn!(row = index, error = %err, "skipping malformed AQIM record");
                }
            }
        }
    }

    fn translate(&self, record: &AqimRecord, index: usize) -> Result<Consignment, DataError> {
        let items_per_box = self.items_per_box.for_pathway(&record.cargo_form);
        let num_items = match record.unit.as_str() {
            "Box/Carton" => record.quantity * items_per_box,
            "Stems" => record.quantity,
            other => {
                return Err(DataError::bad_row(
                    format!("aqim[{index}]/UNIT"),
                    format!("unsupported quantity unit {other:?}"),
                ))
            }
        };
        let year: i32 = record.calendar_yr.trim().parse().map_err(|_| {
            DataError::bad_row(
                format!("aqim[{index}]/CALENDAR_YR"),
                format!("invalid calendar year {:?}", record.calendar_yr),
            )
        })?;
        let date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
            DataError::bad_row(
                format!("aqim[{index}]/CALENDAR_YR"),
                format!("calendar year {year} out of range"),
            )
        })?;
        let num_boxes = num_items.div_ceil(items_per_box).max(1);
        Ok(Consignment::new(
            record.commodity_list.clone(),
            record.origin.clone(),
            record.location.clone(),
            date,
            record.cargo_form.clone(),
            num_boxes,
            items_per_box,
        ))
    }
}
