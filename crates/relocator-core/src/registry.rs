//! Booking registry.
//!
//! A registry is the loaded view of one booking: its stay dates, the room
//! lines it reserved and the unit inventory of each booked listing. It also
//! carries a "current room" context that scopes inventory lookups to a
//! single room line.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RelocationError, Result};

/// One reserved room (line item) of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLine {
    /// Room-booking (line item) id.
    pub id: u64,
    pub listing_id: u64,
    /// Assigned sub-unit, `None` when unassigned.
    pub unit_index: Option<u32>,
    pub adults: u32,
    pub children: u32,
}

impl RoomLine {
    pub fn is_unassigned(&self) -> bool {
        self.unit_index.unwrap_or(0) == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRegistry {
    booking_id: u64,
    checkin: i64,
    checkout: i64,
    closure: bool,
    rooms: Vec<RoomLine>,
    inventory: BTreeMap<u64, u32>,
    current_room: Option<usize>,
}

impl BookingRegistry {
    /// Creates a registry for a booking without room lines.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidArgument`] if the booking id is
    /// zero or the check-in is not earlier than the check-out.
    pub fn new(booking_id: u64, checkin: i64, checkout: i64) -> Result<Self> {
        if booking_id == 0 {
            return Err(RelocationError::invalid("missing booking id"));
        }
        if checkin <= 0 || checkin >= checkout {
            return Err(RelocationError::invalid(format!(
                "invalid stay dates for booking #{booking_id}"
            )));
        }
        Ok(Self {
            booking_id,
            checkin,
            checkout,
            closure: false,
            rooms: Vec::new(),
            inventory: BTreeMap::new(),
            current_room: None,
        })
    }

    pub fn with_room(mut self, room: RoomLine) -> Self {
        self.rooms.push(room);
        self
    }

    /// Sets the number of sellable sub-units of a listing.
    pub fn with_inventory(mut self, listing_id: u64, units: u32) -> Self {
        self.inventory.insert(listing_id, units);
        self
    }

    pub fn with_closure(mut self, closure: bool) -> Self {
        self.closure = closure;
        self
    }

    pub fn booking_id(&self) -> u64 {
        self.booking_id
    }

    pub fn checkin(&self) -> i64 {
        self.checkin
    }

    pub fn checkout(&self) -> i64 {
        self.checkout
    }

    pub fn is_closure(&self) -> bool {
        self.closure
    }

    pub fn room_lines(&self) -> &[RoomLine] {
        &self.rooms
    }

    /// Returns true if any room line books the given listing.
    pub fn has_listing(&self, listing_id: u64) -> bool {
        self.rooms.iter().any(|room| room.listing_id == listing_id)
    }

    /// Listing booked by the first room line.
    pub fn first_listing(&self) -> Option<u64> {
        self.rooms.first().map(|room| room.listing_id)
    }

    /// Scopes later inventory lookups to the room line at `index`.
    pub fn set_current_room(&mut self, index: usize) -> Result<()> {
        if index >= self.rooms.len() {
            return Err(RelocationError::invalid(format!(
                "room index {index} is out of range for booking #{}",
                self.booking_id
            )));
        }
        self.current_room = Some(index);
        Ok(())
    }

    pub fn current_room_index(&self) -> Option<usize> {
        self.current_room
    }

    pub fn current_room(&self) -> Option<&RoomLine> {
        self.current_room.and_then(|index| self.rooms.get(index))
    }

    /// Sub-units of the given listing, `0` when unknown.
    pub fn units_of(&self, listing_id: u64) -> u32 {
        self.inventory.get(&listing_id).copied().unwrap_or(0)
    }

    /// Sub-units of the current room's listing, `0` without a current room.
    pub fn total_units(&self) -> u32 {
        self.current_room()
            .map(|room| self.units_of(room.listing_id))
            .unwrap_or(0)
    }
}

/// Source of booking registries.
pub trait BookingProvider {
    /// Loads the registry of a booking.
    ///
    /// Implementations return [`RelocationError::NotFound`] when the booking
    /// or its room lines cannot be loaded.
    fn load_booking(&self, booking_id: u64) -> Result<BookingRegistry>;
}

impl<P: BookingProvider + ?Sized> BookingProvider for &P {
    fn load_booking(&self, booking_id: u64) -> Result<BookingRegistry> {
        (**self).load_booking(booking_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BookingRegistry {
        BookingRegistry::new(7, 1_000, 200_000)
            .unwrap()
            .with_inventory(3, 4)
            .with_inventory(9, 1)
            .with_room(RoomLine {
                id: 70,
                listing_id: 9,
                unit_index: Some(1),
                adults: 2,
                children: 0,
            })
            .with_room(RoomLine {
                id: 71,
                listing_id: 3,
                unit_index: None,
                adults: 1,
                children: 1,
            })
    }

    #[test]
    fn test_total_units_follows_current_room() {
        let mut reg = registry();
        assert_eq!(reg.total_units(), 0);

        reg.set_current_room(1).unwrap();
        assert_eq!(reg.total_units(), 4);

        reg.set_current_room(0).unwrap();
        assert_eq!(reg.total_units(), 1);
    }

    #[test]
    fn test_set_current_room_out_of_range() {
        let mut reg = registry();
        let err = reg.set_current_room(2).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(reg.current_room_index(), None);
    }

    #[test]
    fn test_listing_lookup() {
        let reg = registry();
        assert_eq!(reg.first_listing(), Some(9));
        assert!(reg.has_listing(3));
        assert!(!reg.has_listing(4));
        assert!(reg.room_lines()[1].is_unassigned());
    }

    #[test]
    fn test_invalid_dates_rejected() {
        assert!(BookingRegistry::new(1, 500, 500).is_err());
        assert!(BookingRegistry::new(0, 1, 500).is_err());
    }
}
