//! Pre-populated stores.
//!
//! Listing `1` is the multi-unit listing under test. The booking to
//! relocate is always booking `1` with room booking `10`.

use relocator_store::{MemoryStore, StoredBooking};

use crate::time::{checkin, checkout};

pub const LISTING: u64 = 1;
pub const TARGET_BOOKING: u64 = 1;
pub const TARGET_ROOM_BOOKING: u64 = 10;

/// Booking stored on the test listing with room booking `id * 10`.
pub fn booking(id: u64, from: u32, to: u32, unit: Option<u32>) -> StoredBooking {
    StoredBooking::new(id, checkin(from), checkout(to)).room(id * 10, LISTING, unit)
}

fn store_with(units: u32, bookings: Vec<StoredBooking>) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_listing(LISTING, units);
    for b in bookings {
        store.add_booking(b).expect("valid scenario booking");
    }
    store
}

/// Two units; the target stays Jan 10-12, a neighbour on unit 1 stays
/// Jan 11-13. Only unit 2 fits without moving anyone.
pub fn single_free_unit() -> MemoryStore {
    store_with(
        2,
        vec![
            booking(TARGET_BOOKING, 10, 12, None),
            booking(2, 11, 13, Some(1)),
        ],
    )
}

/// Two units, both taken over the whole target stay.
pub fn fully_booked() -> MemoryStore {
    store_with(
        2,
        vec![
            booking(TARGET_BOOKING, 10, 12, None),
            booking(2, 9, 14, Some(1)),
            booking(3, 9, 14, Some(2)),
        ],
    )
}

/// Two units; the target stays Jan 10-12. Booking 2 holds unit 1 from
/// Jan 11, booking 3 holds unit 2 until Jan 11. Either neighbour can be
/// moved to free a unit.
pub fn one_move_required() -> MemoryStore {
    store_with(
        2,
        vec![
            booking(TARGET_BOOKING, 10, 12, None),
            booking(2, 11, 13, Some(1)),
            booking(3, 9, 11, Some(2)),
        ],
    )
}

/// Two units overbooked on Jan 11 before any relocation.
pub fn overbooked() -> MemoryStore {
    store_with(
        2,
        vec![
            booking(TARGET_BOOKING, 10, 12, None),
            booking(2, 10, 13, Some(1)),
            booking(3, 11, 12, Some(2)),
            booking(4, 11, 12, Some(2)),
        ],
    )
}
