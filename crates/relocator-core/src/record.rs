//! Sub-unit occupancy records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{day_of, days_in, last_night_of};
use crate::error::{RelocationError, Result};

/// Raw occupancy row as fetched from storage.
///
/// All fields are optional at this level; [`SubunitRecord::from_row`]
/// enforces which combinations are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubunitRow {
    pub booking_id: Option<u64>,
    pub room_booking_id: Option<u64>,
    pub checkin: Option<i64>,
    pub checkout: Option<i64>,
    /// Effective departure after split-stay adjustments. Zero means unset.
    pub realback: Option<i64>,
    pub unit_index: Option<u32>,
    pub closure: bool,
    pub relocate: bool,
}

/// Occupancy window of one room booking on a multi-unit listing.
///
/// A unit index of `0` means "unassigned". The unit index is the only
/// mutable field; its value before the first overwrite is kept as the
/// initial index so that a candidate solution can be diffed against the
/// state it started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubunitRecord {
    booking_id: u64,
    room_booking_id: u64,
    checkin: i64,
    checkout: i64,
    last_night: i64,
    first_day: NaiveDate,
    last_day: NaiveDate,
    unit_index: u32,
    initial_unit_index: Option<u32>,
    closure: bool,
    relocating: bool,
    sequence: Option<usize>,
}

impl SubunitRecord {
    /// Builds a record from a raw row.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidArgument`] when the check-in or the
    /// departure is missing, when the check-in is not earlier than the
    /// departure, or when neither a booking id nor a room-booking id is set.
    pub fn from_row(row: &SubunitRow, sequence: Option<usize>) -> Result<Self> {
        let checkin = row
            .checkin
            .filter(|ts| *ts > 0)
            .ok_or_else(|| RelocationError::invalid("missing check-in date"))?;

        let checkout = match (row.realback, row.checkout) {
            (Some(realback), _) if realback != 0 => realback,
            (_, Some(checkout)) if checkout > 0 => checkout,
            _ => return Err(RelocationError::invalid("missing check-out date")),
        };

        if checkin >= checkout {
            return Err(RelocationError::invalid(format!(
                "check-in {checkin} must be earlier than check-out {checkout}"
            )));
        }

        let booking_id = row.booking_id.unwrap_or(0);
        let room_booking_id = row.room_booking_id.unwrap_or(0);
        if booking_id == 0 && room_booking_id == 0 {
            return Err(RelocationError::invalid(
                "missing booking id and room booking id",
            ));
        }

        let last_night = last_night_of(checkout)?;

        Ok(Self {
            booking_id,
            room_booking_id,
            checkin,
            checkout,
            last_night,
            first_day: day_of(checkin)?,
            last_day: day_of(last_night)?,
            unit_index: row.unit_index.unwrap_or(0),
            initial_unit_index: None,
            closure: row.closure,
            relocating: row.relocate,
            sequence,
        })
    }

    pub fn booking_id(&self) -> u64 {
        self.booking_id
    }

    pub fn room_booking_id(&self) -> u64 {
        self.room_booking_id
    }

    pub fn checkin(&self) -> i64 {
        self.checkin
    }

    /// Effective departure: the realback timestamp when set, else the raw check-out.
    pub fn checkout(&self) -> i64 {
        self.checkout
    }

    /// Timestamp of the last night spent (day before departure, 23:59:59).
    pub fn last_night(&self) -> i64 {
        self.last_night
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Iterates the calendar days this record occupies a unit.
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> {
        days_in(self.first_day, self.last_day)
    }

    /// Returns true if both records share at least one night.
    pub fn overlaps(&self, other: &SubunitRecord) -> bool {
        self.first_day <= other.last_day && other.first_day <= self.last_day
    }

    /// Distance in seconds between the stay windows of two records.
    pub fn temporal_distance(&self, other: &SubunitRecord) -> i64 {
        (self.checkin - other.checkin).abs() + (self.checkout - other.checkout).abs()
    }

    pub fn room_unit_index(&self) -> u32 {
        self.unit_index
    }

    /// Assigns a unit index.
    ///
    /// `0` keeps the current index. The first effective overwrite records
    /// the previous value as the initial index; later overwrites keep it.
    pub fn set_room_unit_index(&mut self, index: u32) {
        if index == 0 {
            return;
        }
        if self.initial_unit_index.is_none() {
            self.initial_unit_index = Some(self.unit_index);
        }
        self.unit_index = index;
    }

    /// Returns the index held before the first overwrite, or the current one.
    pub fn initial_room_unit_index(&self) -> u32 {
        self.initial_unit_index.unwrap_or(self.unit_index)
    }

    pub fn has_moved(&self) -> bool {
        self.initial_room_unit_index() != self.unit_index
    }

    pub fn is_assigned(&self) -> bool {
        self.unit_index != 0
    }

    pub fn is_closure(&self) -> bool {
        self.closure
    }

    pub fn is_relocating(&self) -> bool {
        self.relocating
    }

    pub fn set_relocating(&mut self, relocating: bool) {
        self.relocating = relocating;
    }

    /// Position of the row this record was built from, when known.
    pub fn sequence(&self) -> Option<usize> {
        self.sequence
    }
}
