//! Writing accepted movesets back to storage.

use relocator_core::{Moveset, Result, UnitAssignmentWriter};
use tracing::info;

/// Applies every unit move of `moveset`, relocating record first.
///
/// Moves are written one by one without a surrounding transaction; a
/// failure leaves the moves written so far in place.
///
/// Returns the number of moves written.
pub fn apply_moveset<W>(writer: &mut W, moveset: &Moveset) -> Result<usize>
where
    W: UnitAssignmentWriter + ?Sized,
{
    let moves = moveset.moves();
    for unit_move in &moves {
        writer.assign_unit_index(unit_move.room_booking_id, unit_move.to)?;
        info!(
            event = "unit_assigned",
            booking = unit_move.booking_id,
            room_booking = unit_move.room_booking_id,
            from = unit_move.from,
            to = unit_move.to,
        );
    }
    Ok(moves.len())
}

#[cfg(test)]
mod tests {
    use relocator_core::{SubunitRecord, SubunitRow};

    use super::*;
    use crate::{MemoryStore, StoredBooking};

    const DAY: i64 = 86_400;

    fn record(booking: u64, room_booking: u64, unit: u32, relocate: bool) -> SubunitRecord {
        SubunitRecord::from_row(
            &SubunitRow {
                booking_id: Some(booking),
                room_booking_id: Some(room_booking),
                checkin: Some(10 * DAY),
                checkout: Some(12 * DAY),
                unit_index: Some(unit),
                relocate,
                ..Default::default()
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_apply_writes_moves() {
        let mut store = MemoryStore::new();
        store.add_listing(1, 2);
        store
            .add_booking(StoredBooking::new(1, 10 * DAY, 12 * DAY).room(11, 1, None))
            .unwrap();
        store
            .add_booking(StoredBooking::new(2, 10 * DAY, 12 * DAY).room(21, 1, Some(1)))
            .unwrap();

        let mut target = record(1, 11, 0, true);
        target.set_room_unit_index(1);
        let mut neighbour = record(2, 21, 1, false);
        neighbour.set_room_unit_index(2);
        let moveset = Moveset::new(vec![target, neighbour], 2).unwrap();

        assert_eq!(apply_moveset(&mut store, &moveset).unwrap(), 2);
        assert_eq!(store.unit_index(11), Some(1));
        assert_eq!(store.unit_index(21), Some(2));
    }
}
