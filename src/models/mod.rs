//! Domain types for the simulator
//!
//! - [`Bitmap`]: compact per-item flag storage (~1 bit per item)
//! - [`Consignment`]: one shipment of boxes of items with its contamination
//!   and inspection state

pub mod bitmap;
pub mod consignment;

pub use bitmap::Bitmap;
pub use consignment::Consignment;
