//! Core data models for route mileage calculation.

pub mod result;
pub mod route;
pub mod states;

pub use result::{CalculationResult, Region, StateDistanceMap, UNRESOLVED_KEY};
pub use route::{GeoPoint, RouteRequest};
pub use states::{state_code, state_name};
