//! In-process booking store.

use std::collections::BTreeMap;

use relocator_core::{
    BookingProvider, BookingRegistry, BusyRow, OccupancyStore, RelocationError, Result,
    RoomBookingRow, UnitAssignmentWriter,
};

use crate::StoredBooking;

#[derive(Debug, Clone)]
struct BusyEntry {
    listing_id: u64,
    row: BusyRow,
}

/// Booking store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    listings: BTreeMap<u64, u32>,
    bookings: BTreeMap<u64, StoredBooking>,
    busy: Vec<BusyEntry>,
    next_busy_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listing with `units` sub-units.
    pub fn add_listing(&mut self, listing_id: u64, units: u32) -> &mut Self {
        self.listings.insert(listing_id, units);
        self
    }

    /// Stores a booking and one busy entry per room line.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidArgument`] for duplicate booking or
    /// room-booking ids and for unknown listings.
    pub fn add_booking(&mut self, booking: StoredBooking) -> Result<&mut Self> {
        if self.bookings.contains_key(&booking.id) {
            return Err(RelocationError::invalid(format!(
                "booking #{} already exists",
                booking.id
            )));
        }
        for room in &booking.rooms {
            if !self.listings.contains_key(&room.listing_id) {
                return Err(RelocationError::invalid(format!(
                    "unknown listing #{}",
                    room.listing_id
                )));
            }
            if self.find_line(room.id).is_some() {
                return Err(RelocationError::invalid(format!(
                    "room booking #{} already exists",
                    room.id
                )));
            }
        }

        for room in &booking.rooms {
            self.next_busy_id += 1;
            self.busy.push(BusyEntry {
                listing_id: room.listing_id,
                row: BusyRow {
                    id: self.next_busy_id,
                    booking_id: booking.id,
                    checkin: booking.checkin,
                    checkout: booking.checkout,
                    realback: booking.realback,
                    closure: booking.closure,
                },
            });
        }
        self.bookings.insert(booking.id, booking);
        Ok(self)
    }

    fn find_line(&self, room_booking_id: u64) -> Option<(u64, usize)> {
        self.bookings.values().find_map(|booking| {
            booking
                .rooms
                .iter()
                .position(|room| room.id == room_booking_id)
                .map(|pos| (booking.id, pos))
        })
    }

    /// Current unit of a room booking, `None` when unassigned or unknown.
    pub fn unit_index(&self, room_booking_id: u64) -> Option<u32> {
        let (booking_id, pos) = self.find_line(room_booking_id)?;
        self.bookings[&booking_id].rooms[pos]
            .unit_index
            .filter(|index| *index != 0)
    }
}

impl BookingProvider for MemoryStore {
    fn load_booking(&self, booking_id: u64) -> Result<BookingRegistry> {
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or_else(|| RelocationError::not_found(format!("booking #{booking_id}")))?;
        if booking.rooms.is_empty() {
            return Err(RelocationError::not_found(format!(
                "room lines of booking #{booking_id}"
            )));
        }

        let mut registry = BookingRegistry::new(booking.id, booking.checkin, booking.checkout)?
            .with_closure(booking.closure);
        for room in &booking.rooms {
            let units = self.listings.get(&room.listing_id).copied().unwrap_or(0);
            registry = registry
                .with_inventory(room.listing_id, units)
                .with_room(room.clone());
        }
        Ok(registry)
    }
}

impl OccupancyStore for MemoryStore {
    fn busy_records(&self, listing_id: u64, from: i64, to: i64) -> Result<Vec<BusyRow>> {
        let mut rows: Vec<BusyRow> = self
            .busy
            .iter()
            .filter(|entry| entry.listing_id == listing_id && entry.row.intersects(from, to))
            .map(|entry| entry.row.clone())
            .collect();
        rows.sort_by_key(|row| (row.booking_id, row.id));
        Ok(rows)
    }

    fn room_bookings(&self, listing_id: u64, booking_ids: &[u64]) -> Result<Vec<RoomBookingRow>> {
        let mut rows: Vec<RoomBookingRow> = booking_ids
            .iter()
            .filter_map(|id| self.bookings.get(id))
            .flat_map(|booking| {
                booking
                    .rooms
                    .iter()
                    .filter(|room| room.listing_id == listing_id)
                    .map(|room| RoomBookingRow {
                        id: room.id,
                        booking_id: booking.id,
                        unit_index: room.unit_index,
                        closure: booking.closure,
                    })
            })
            .collect();
        rows.sort_by_key(|row| (row.booking_id, row.id));
        rows.dedup_by_key(|row| row.id);
        Ok(rows)
    }
}

impl UnitAssignmentWriter for MemoryStore {
    fn assign_unit_index(&mut self, room_booking_id: u64, unit_index: u32) -> Result<()> {
        let (booking_id, pos) = self
            .find_line(room_booking_id)
            .ok_or_else(|| RelocationError::not_found(format!("room booking #{room_booking_id}")))?;
        if let Some(booking) = self.bookings.get_mut(&booking_id) {
            booking.rooms[pos].unit_index = Some(unit_index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_listing(1, 2).add_listing(2, 3);
        store
            .add_booking(StoredBooking::new(10, 10 * DAY, 12 * DAY).room(100, 1, None))
            .unwrap();
        store
            .add_booking(
                StoredBooking::new(5, 11 * DAY, 13 * DAY)
                    .room(51, 1, Some(1))
                    .room(50, 2, Some(2)),
            )
            .unwrap();
        store
            .add_booking(StoredBooking::new(7, 20 * DAY, 22 * DAY).room(70, 1, Some(2)))
            .unwrap();
        store
    }

    #[test]
    fn test_load_booking_carries_inventory() {
        let registry = store().load_booking(5).unwrap();
        assert_eq!(registry.room_lines().len(), 2);
        assert_eq!(registry.units_of(1), 2);
        assert_eq!(registry.units_of(2), 3);
    }

    #[test]
    fn test_load_missing_booking() {
        let err = store().load_booking(99).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_busy_records_filtered_and_ordered() {
        let rows = store().busy_records(1, 9 * DAY, 14 * DAY).unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.booking_id).collect();
        assert_eq!(ids, vec![5, 10]);
    }

    #[test]
    fn test_room_bookings_per_listing() {
        let rows = store().room_bookings(1, &[10, 5, 7]).unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![51, 70, 100]);
    }

    #[test]
    fn test_duplicate_booking_rejected() {
        let mut store = store();
        let result = store.add_booking(StoredBooking::new(10, DAY, 2 * DAY));
        assert!(result.is_err());
        let result = store.add_booking(StoredBooking::new(11, DAY, 2 * DAY).room(100, 1, None));
        assert!(result.is_err());
    }

    #[test]
    fn test_assign_unit_index() {
        let mut store = store();
        store.assign_unit_index(100, 2).unwrap();
        assert_eq!(store.unit_index(100), Some(2));
        assert!(store.assign_unit_index(999, 1).is_err());
    }
}
