//! Consignment model
//!
//! Represents one shipment: an ordered sequence of boxes, each holding the
//! same number of items, plus the categorical attributes inspectors key on
//! (commodity, origin, port, date, pathway).
//!
//! Per-item contamination and inspection state is stored as compact
//! bitmaps. A box is contaminated exactly when any of its items is.
//!
//! Lifecycle: created by a generator, mutated by the contamination engine
//! (contaminated bits) and then by the inspection engine (inspected bits),
//! otherwise read-only. Dropped at the end of its simulation iteration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Bitmap;

/// A consignment with all its properties and what it contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consignment {
    /// Commodity carried (e.g., a cut-flower species)
    pub commodity: String,

    /// Country or region of origin
    pub origin: String,

    /// Port of entry
    pub port: String,

    /// Arrival date
    pub date: NaiveDate,

    /// Transport pathway (e.g., "airport", "maritime")
    pub pathway: String,

    num_boxes: usize,
    items_per_box: usize,
    item_contaminated: Bitmap,
    item_inspected: Bitmap,
}

impl Consignment {
    /// Create a clean consignment of `num_boxes` boxes with `items_per_box`
    /// items each.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        commodity: impl Into<String>,
        origin: impl Into<String>,
        port: impl Into<String>,
        date: NaiveDate,
        pathway: impl Into<String>,
        num_boxes: usize,
        items_per_box: usize,
    ) -> Self {
        let num_items = num_boxes * items_per_box;
        Self {
            commodity: commodity.into(),
            origin: origin.into(),
            port: port.into(),
            date,
            pathway: pathway.into(),
            num_boxes,
            items_per_box,
            item_contaminated: Bitmap::new(num_items),
            item_inspected: Bitmap::new(num_items),
        }
    }

    pub fn num_boxes(&self) -> usize {
        self.num_boxes
    }

    pub fn items_per_box(&self) -> usize {
        self.items_per_box
    }

    /// Total number of items (boxes x items per box).
    pub fn num_items(&self) -> usize {
        self.num_boxes * self.items_per_box
    }

    /// Box index holding item `item_index`.
    pub fn box_of_item(&self, item_index: usize) -> usize {
        item_index / self.items_per_box
    }

    /// Item index range [start, end) of box `box_index`.
    pub fn items_of_box(&self, box_index: usize) -> std::ops::Range<usize> {
        let start = box_index * self.items_per_box;
        start..start + self.items_per_box
    }

    // ------------------------------------------------------------------
    // Contamination state (mutated by the contamination engine only)
    // ------------------------------------------------------------------

    /// Mark one item as contaminated.
    pub fn contaminate_item(&mut self, item_index: usize) {
        self.item_contaminated.set(item_index);
    }

    pub fn is_item_contaminated(&self, item_index: usize) -> bool {
        self.item_contaminated.get(item_index)
    }

    /// Number of contaminated items.
    pub fn count_contaminated(&self) -> usize {
        self.item_contaminated.count_ones()
    }

    /// True if at least one item anywhere is contaminated.
    pub fn is_contaminated(&self) -> bool {
        self.item_contaminated.any()
    }

    /// True if any item in box `box_index` is contaminated.
    pub fn is_box_contaminated(&self, box_index: usize) -> bool {
        let range = self.items_of_box(box_index);
        self.item_contaminated.any_in_range(range.start, range.end)
    }

    /// Number of boxes containing at least one contaminated item.
    pub fn count_contaminated_boxes(&self) -> usize {
        (0..self.num_boxes)
            .filter(|&b| self.is_box_contaminated(b))
            .count()
    }

    /// True contamination rate: contaminated items / total items
    /// (0 for an empty consignment).
    pub fn contamination_rate(&self) -> f64 {
        if self.num_items() == 0 {
            return 0.0;
        }
        self.count_contaminated() as f64 / self.num_items() as f64
    }

    // ------------------------------------------------------------------
    // Inspection state (mutated by the inspection engine only)
    // ------------------------------------------------------------------

    /// Mark one item as inspected.
    pub fn mark_item_inspected(&mut self, item_index: usize) {
        self.item_inspected.set(item_index);
    }

    pub fn is_item_inspected(&self, item_index: usize) -> bool {
        self.item_inspected.get(item_index)
    }

    /// Number of items marked inspected.
    pub fn count_inspected(&self) -> usize {
        self.item_inspected.count_ones()
    }

    /// Indices of all inspected items, ascending.
    pub fn inspected_items(&self) -> Vec<usize> {
        self.item_inspected.ones().collect()
    }

    /// Per-item contamination flags (read-only view).
    pub fn contaminated_bits(&self) -> &Bitmap {
        &self.item_contaminated
    }
}
