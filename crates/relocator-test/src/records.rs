//! Sub-unit record builders.
//!
//! Room-booking ids default to `booking * 10`.

use relocator_core::{SubunitRecord, SubunitRow};

use crate::time::{checkin, checkout};

fn build(booking: u64, from: u32, to: u32, unit: u32, relocate: bool, closure: bool) -> SubunitRecord {
    SubunitRecord::from_row(
        &SubunitRow {
            booking_id: Some(booking),
            room_booking_id: Some(booking * 10),
            checkin: Some(checkin(from)),
            checkout: Some(checkout(to)),
            realback: None,
            unit_index: Some(unit),
            closure,
            relocate,
        },
        None,
    )
    .expect("valid fixture record")
}

/// Record to relocate, staying from day `from` to day `to`.
pub fn relocating(booking: u64, from: u32, to: u32) -> SubunitRecord {
    build(booking, from, to, 0, true, false)
}

/// Neighbour holding `unit`.
pub fn neighbour(booking: u64, from: u32, to: u32, unit: u32) -> SubunitRecord {
    build(booking, from, to, unit, false, false)
}

/// Closure holding `unit`.
pub fn closure(booking: u64, from: u32, to: u32, unit: u32) -> SubunitRecord {
    build(booking, from, to, unit, false, true)
}

/// Neighbour holding inventory without a unit.
pub fn unassigned(booking: u64, from: u32, to: u32) -> SubunitRecord {
    build(booking, from, to, 0, false, false)
}
