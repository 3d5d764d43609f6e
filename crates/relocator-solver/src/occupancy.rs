//! Day-by-day occupancy of a listing.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use relocator_core::calendar::days_in;
use relocator_core::{RelocationError, Result, SubunitRecord};

/// Units booked on one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayLoad {
    /// Room bookings holding a unit that day, assigned or not.
    pub units_booked: u32,
    /// Owners of the booked units.
    pub room_bookings: Vec<u64>,
    /// Room bookings holding inventory without a unit index.
    pub unassigned: u32,
}

/// Calendar day to occupancy map.
///
/// The relocating record is never counted: the map describes what the rest
/// of the listing already consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayOccupancy {
    days: BTreeMap<NaiveDate, DayLoad>,
}

impl DayOccupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map over `[from, to]` from the given records.
    pub fn build<'a, I>(records: I, from: NaiveDate, to: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a SubunitRecord>,
    {
        let mut occupancy = Self::new();
        for day in days_in(from, to) {
            occupancy.days.insert(day, DayLoad::default());
        }
        for record in records {
            occupancy.add(record, from, to);
        }
        occupancy
    }

    /// Counts one record on every night it spends within `[from, to]`.
    pub fn add(&mut self, record: &SubunitRecord, from: NaiveDate, to: NaiveDate) {
        if record.is_relocating() {
            return;
        }
        for day in record.nights().filter(|day| (from..=to).contains(day)) {
            let load = self.days.entry(day).or_default();
            load.units_booked += 1;
            load.room_bookings.push(record.room_booking_id());
            if !record.is_assigned() {
                load.unassigned += 1;
            }
        }
    }

    pub fn get(&self, day: NaiveDate) -> Option<&DayLoad> {
        self.days.get(&day)
    }

    pub fn units_booked(&self, day: NaiveDate) -> u32 {
        self.days.get(&day).map_or(0, |load| load.units_booked)
    }

    pub fn unassigned_load(&self, day: NaiveDate) -> u32 {
        self.days.get(&day).map_or(0, |load| load.unassigned)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayLoad)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Fails if any day of `[from, to]` already books more than `units`.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::Overbooked`] naming the first such day.
    pub fn ensure_not_overbooked(&self, from: NaiveDate, to: NaiveDate, units: u32) -> Result<()> {
        for day in days_in(from, to) {
            let booked = self.units_booked(day);
            if booked > units {
                return Err(RelocationError::Overbooked(format!(
                    "{booked} units booked on {day} out of {units} available"
                )));
            }
        }
        Ok(())
    }
}
