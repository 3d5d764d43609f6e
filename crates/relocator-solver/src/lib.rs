//! Relocator Solver - Sub-unit relocation search engine
//!
//! This crate provides the search that finds a free sub-unit for a room
//! booking, moving neighbours when needed:
//! - Mixed-radix enumeration of unit assignments
//! - Wall-clock deadline checked at fixed iteration checkpoints
//! - Day-by-day occupancy and the overbooking pre-check
//! - The sub-unit matrix and the relocator that populates it from storage

pub mod combination;
pub mod deadline;
pub mod matrix;
pub mod occupancy;
pub mod relocator;

pub use combination::{MixedRadix, Odometer};
pub use deadline::{Deadline, DEFAULT_CHECK_INTERVAL};
pub use matrix::SubunitMatrix;
pub use occupancy::{DayLoad, DayOccupancy};
pub use relocator::{RelocationRequest, Relocator};
