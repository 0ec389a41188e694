//! Simulation outputs: F280 records, pretty printing, success rates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::Consignment;

/// Action recorded on an emitted F280 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum F280Action {
    Release,
    Prohibit,
}

impl fmt::Display for F280Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            F280Action::Release => write!(f, "RELEASE"),
            F280Action::Prohibit => write!(f, "PROHIBIT"),
        }
    }
}

/// Custom disposition strings for F280 records.
///
/// Missing entries fall back to the standard texts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispositionCodes {
    #[serde(default)]
    pub inspected_ok: Option<String>,
    #[serde(default)]
    pub inspected_pest: Option<String>,
    #[serde(default)]
    pub cfrp_inspected_ok: Option<String>,
    #[serde(default)]
    pub cfrp_inspected_pest: Option<String>,
    #[serde(default)]
    pub cfrp_not_inspected: Option<String>,
}

/// One emitted F280 record.
///
/// Displays as space-separated `DATE PORT ORIGIN COMMODITY ACTION`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct F280OutputRecord {
    pub date: NaiveDate,
    pub port: String,
    pub origin: String,
    pub commodity: String,
    pub action: F280Action,
    pub disposition: String,
}

impl F280OutputRecord {
    /// Build the record for one processed consignment.
    pub fn fill(
        consignment: &Consignment,
        checked_ok: bool,
        must_inspect: bool,
        applied_program: Option<&str>,
        codes: Option<&DispositionCodes>,
    ) -> Self {
        let action = if must_inspect && !checked_ok {
            F280Action::Prohibit
        } else {
            F280Action::Release
        };
        Self {
            date: consignment.date,
            port: consignment.port.clone(),
            origin: consignment.origin.clone(),
            commodity: consignment.commodity.clone(),
            action,
            disposition: disposition(checked_ok, must_inspect, applied_program, codes),
        }
    }
}

impl fmt::Display for F280OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.port,
            self.origin,
            self.commodity,
            self.action
        )
    }
}

/// Disposition text for the given outcome, with defaults when no custom
/// code table is configured.
fn disposition(
    checked_ok: bool,
    must_inspect: bool,
    applied_program: Option<&str>,
    codes: Option<&DispositionCodes>,
) -> String {
    let pick = |custom: Option<&String>, standard: &str| {
        custom.cloned().unwrap_or_else(|| standard.to_string())
    };
    match applied_program {
        Some(_) => {
            if must_inspect {
                if checked_ok {
                    pick(
                        codes.and_then(|c| c.cfrp_inspected_ok.as_ref()),
                        "OK CFRP Inspected",
                    )
                } else {
                    pick(
                        codes.and_then(|c| c.cfrp_inspected_pest.as_ref()),
                        "Pest Found CFRP Inspected",
                    )
                }
            } else {
                pick(
                    codes.and_then(|c| c.cfrp_not_inspected.as_ref()),
                    "CFRP Not Inspected",
                )
            }
        }
        None => {
            if checked_ok {
                pick(codes.and_then(|c| c.inspected_ok.as_ref()), "OK Inspected")
            } else {
                pick(codes.and_then(|c| c.inspected_pest.as_ref()), "Pest Found")
            }
        }
    }
}

/// Per-run confusion counts for inspection outcomes.
#[derive(Debug, Clone, Default)]
pub struct SuccessRates {
    /// Consignments that were clean and passed
    pub ok: usize,
    pub true_negative: usize,
    pub true_positive: usize,
    pub false_negative: usize,
}

impl SuccessRates {
    /// Record the outcome for one consignment.
    ///
    /// # Panics
    /// Panics when the inspection claims contamination in a clean
    /// consignment; that combination is a programmer error.
    pub fn record(&mut self, checked_ok: bool, actually_ok: bool, consignment: &Consignment) {
        match (checked_ok, actually_ok) {
            (true, true) => {
                self.true_negative += 1;
                self.ok += 1;
                debug!("inspection worked, didn't miss anything (no contaminants) [TN]");
            }
            (false, false) => {
                self.true_positive += 1;
                debug!("inspection worked, found contaminant [TP]");
            }
            (true, false) => {
                self.false_negative += 1;
                debug!(
                    contaminated_boxes = consignment.count_contaminated_boxes(),
                    "inspection failed, missed boxes with contaminants [FN]"
                );
            }
            (false, true) => panic!(
                "inspection result is contaminated, but the consignment is not \
                 (programmer error)"
            ),
        }
    }
}

pub use pretty::{pretty_consignment, PrettyConfig, PrettyStyle};

mod pretty {
    use serde::{Deserialize, Serialize};

    use crate::models::Consignment;

    const FALLBACK_WIDTH: usize = 80;

    /// Pretty-printing style.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PrettyStyle {
        /// Individual items grouped into boxes
        Boxes,
        /// Individual items in one row
        Items,
        /// One glyph per box
        BoxesOnly,
    }

    /// Glyph and line configuration.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct PrettyConfig {
        /// Glyph for a clean unit (default: black florette)
        #[serde(default)]
        pub flower: Option<String>,
        /// Glyph for a contaminated unit (default: bug)
        #[serde(default)]
        pub bug: Option<String>,
        /// Header line style: "heavy", "light", "space", or a custom string
        #[serde(default)]
        pub horizontal_line: Option<String>,
        /// Box separator for the boxes style ("pipe" or a custom string)
        #[serde(default)]
        pub box_line: Option<String>,
        /// Separate glyphs with spaces
        #[serde(default)]
        pub spaces: Option<bool>,
    }

    impl PrettyConfig {
        fn flower(&self) -> &str {
            self.flower.as_deref().unwrap_or("\u{273F}")
        }

        fn bug(&self) -> &str {
            self.bug.as_deref().unwrap_or("\u{1F41B}")
        }

        fn spaces(&self) -> bool {
            self.spaces.unwrap_or(true)
        }

        fn horizontal(&self, style_override: Option<&str>) -> String {
            let line = style_override
                .or(self.horizontal_line.as_deref())
                .unwrap_or("heavy");
            match line.to_lowercase().as_str() {
                "heavy" => "\u{2501}".to_string(),
                "light" => "\u{2500}".to_string(),
                "space" => " ".to_string(),
                _ => line.to_string(),
            }
        }

        fn box_separator(&self) -> String {
            let line = match self.box_line.as_deref() {
                None | Some("pipe") => "|",
                Some(custom) => custom,
            };
            if self.spaces() {
                format!(" {line} ")
            } else {
                line.to_string()
            }
        }
    }

    fn glyphs(flags: impl Iterator<Item = bool>, config: &PrettyConfig) -> String {
        let rendered: Vec<&str> = flags
            .map(|contaminated| {
                if contaminated {
                    config.bug()
                } else {
                    config.flower()
                }
            })
            .collect();
        let separator = if config.spaces() { " " } else { "" };
        rendered.join(separator)
    }

    fn header(consignment: &Consignment, line: Option<&str>, config: &PrettyConfig) -> String {
        let horizontal = config.horizontal(line);
        let header = format!(
            "{horizontal}{horizontal} Consignment {horizontal}{horizontal} \
             Boxes: {} {horizontal}{horizontal} Items: {} ",
            consignment.num_boxes(),
            consignment.num_items(),
        );
        let fill = FALLBACK_WIDTH.saturating_sub(header.chars().count());
        format!("{header}{}", horizontal.repeat(fill))
    }

    /// Render one consignment as a line of glyphs under a header.
    pub fn pretty_consignment(
        consignment: &Consignment,
        style: PrettyStyle,
        config: &PrettyConfig,
    ) -> String {
        match style {
            PrettyStyle::Items => {
                let body = glyphs(
                    (0..consignment.num_items()).map(|i| consignment.is_item_contaminated(i)),
                    config,
                );
                format!("{}\n{body}", header(consignment, None, config))
            }
            PrettyStyle::Boxes => {
                let boxes: Vec<String> = (0..consignment.num_boxes())
                    .map(|b| {
                        glyphs(
                            consignment
                                .items_of_box(b)
                                .map(|i| consignment.is_item_contaminated(i)),
                            config,
                        )
                    })
                    .collect();
                let body = boxes.join(&config.box_separator());
                format!("{}\n{body}", header(consignment, None, config))
            }
            PrettyStyle::BoxesOnly => {
                let body = glyphs(
                    (0..consignment.num_boxes()).map(|b| consignment.is_box_contaminated(b)),
                    config,
                );
                format!("{}\n{body}", header(consignment, Some("light"), config))
            }
        }
    }
}
