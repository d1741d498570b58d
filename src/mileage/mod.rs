//! Per-state mileage calculation.
//!
//! Segment attribution walks the route through the point classifier; the
//! result is then reconciled against the reference total.

mod attribution;
mod calculator;
pub mod geodesy;
mod reconcile;

pub use attribution::{Attribution, SegmentAttributor};
pub use calculator::MileageCalculator;
pub use reconcile::reconcile;
