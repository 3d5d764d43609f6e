//! Occupancy storage contracts.
//!
//! The relocation engine never talks to a database directly. It consumes
//! these traits, which are implemented by the storage crate.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A "busy" occupancy entry of one listing, joined with its booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyRow {
    pub id: u64,
    pub booking_id: u64,
    pub checkin: i64,
    pub checkout: i64,
    pub realback: Option<i64>,
    pub closure: bool,
}

impl BusyRow {
    /// Effective departure: `realback` when set and nonzero.
    pub fn departure(&self) -> i64 {
        match self.realback {
            Some(realback) if realback != 0 => realback,
            _ => self.checkout,
        }
    }

    /// Returns true if the row intersects `[from, to]`.
    pub fn intersects(&self, from: i64, to: i64) -> bool {
        self.checkin <= to && self.departure() >= from
    }
}

/// A room-booking line item of one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBookingRow {
    pub id: u64,
    pub booking_id: u64,
    pub unit_index: Option<u32>,
    pub closure: bool,
}

/// Read access to occupancy data.
pub trait OccupancyStore {
    /// Busy rows of `listing_id` intersecting `[from, to]`, ordered by
    /// booking id then busy id.
    fn busy_records(&self, listing_id: u64, from: i64, to: i64) -> Result<Vec<BusyRow>>;

    /// Room-booking rows of `listing_id` for the given bookings, ordered by
    /// booking id then line-item id.
    fn room_bookings(&self, listing_id: u64, booking_ids: &[u64]) -> Result<Vec<RoomBookingRow>>;
}

impl<S: OccupancyStore + ?Sized> OccupancyStore for &S {
    fn busy_records(&self, listing_id: u64, from: i64, to: i64) -> Result<Vec<BusyRow>> {
        (**self).busy_records(listing_id, from, to)
    }

    fn room_bookings(&self, listing_id: u64, booking_ids: &[u64]) -> Result<Vec<RoomBookingRow>> {
        (**self).room_bookings(listing_id, booking_ids)
    }
}

/// Write access used to apply an accepted moveset.
pub trait UnitAssignmentWriter {
    fn assign_unit_index(&mut self, room_booking_id: u64, unit_index: u32) -> Result<()>;
}
