//! Relocator Core - Core types and traits for sub-unit relocation
//!
//! This crate provides the fundamental abstractions of the relocation engine:
//! - Occupancy records with initial/current unit tracking
//! - Movesets describing one accepted reassignment
//! - The booking registry and the collaborator traits that feed it
//! - Calendar helpers shared by the search and the storage layer

pub mod calendar;
pub mod error;
pub mod moveset;
pub mod record;
pub mod registry;
pub mod store;

#[cfg(test)]
mod record_tests;

pub use error::{RelocationError, Result};
pub use moveset::{Moveset, UnitMove};
pub use record::{SubunitRecord, SubunitRow};
pub use registry::{BookingProvider, BookingRegistry, RoomLine};
pub use store::{BusyRow, OccupancyStore, RoomBookingRow, UnitAssignmentWriter};
