//! Booking and occupancy storage.
//!
//! Implementations of the collaborator traits consumed by the relocation
//! engine:
//! - [`MemoryStore`] - in-process store for embedding and tests
//! - [`SqliteStore`] - `rusqlite` store over the booking schema
//!
//! Both accept bookings as [`StoredBooking`] values and apply accepted
//! movesets through [`apply_moveset`].

mod apply;
mod memory;
mod sqlite;

use relocator_core::RoomLine;
use serde::{Deserialize, Serialize};

pub use apply::apply_moveset;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A booking as written to a store: one busy entry per room line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBooking {
    pub id: u64,
    pub checkin: i64,
    pub checkout: i64,
    /// Effective departure of the busy entries, when split-stay adjusted.
    pub realback: Option<i64>,
    pub closure: bool,
    pub rooms: Vec<RoomLine>,
}

impl StoredBooking {
    pub fn new(id: u64, checkin: i64, checkout: i64) -> Self {
        Self {
            id,
            checkin,
            checkout,
            realback: None,
            closure: false,
            rooms: Vec::new(),
        }
    }

    /// Adds a room line for `listing_id` with an optional unit.
    pub fn room(mut self, room_booking_id: u64, listing_id: u64, unit_index: Option<u32>) -> Self {
        self.rooms.push(RoomLine {
            id: room_booking_id,
            listing_id,
            unit_index,
            adults: 2,
            children: 0,
        });
        self
    }

    pub fn closure(mut self) -> Self {
        self.closure = true;
        self
    }

    pub fn realback(mut self, realback: i64) -> Self {
        self.realback = Some(realback);
        self
    }
}
