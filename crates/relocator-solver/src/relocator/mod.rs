//! Relocation orchestration.
//!
//! The relocator turns a request ("find a unit for this booking's room")
//! into a populated [`SubunitMatrix`]: it resolves the listing and room line,
//! reads busy and room-booking rows around the stay, merges them into
//! records, checks the listing is not already overbooked and hands every
//! record to the matrix.

use std::collections::BTreeMap;
use std::time::Duration;

use relocator_config::RelocationConfig;
use relocator_core::{
    BookingProvider, BookingRegistry, BusyRow, Moveset, OccupancyStore, RelocationError, Result,
    RoomBookingRow, SubunitRecord, SubunitRow,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::matrix::SubunitMatrix;
use crate::occupancy::DayOccupancy;

/// What to relocate and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocationRequest {
    #[serde(alias = "bid")]
    pub booking_id: u64,

    /// Listing to relocate within; the first booked listing when unset.
    #[serde(alias = "room_id")]
    pub listing_id: Option<u64>,

    /// Position of the room line to relocate within the booking.
    pub room_index: Option<usize>,

    pub options: RelocationConfig,
}

impl RelocationRequest {
    pub fn new(booking_id: u64) -> Self {
        Self {
            booking_id,
            ..Self::default()
        }
    }

    pub fn with_listing(mut self, listing_id: u64) -> Self {
        self.listing_id = Some(listing_id);
        self
    }

    pub fn with_room_index(mut self, room_index: usize) -> Self {
        self.room_index = Some(room_index);
        self
    }

    pub fn with_options(mut self, options: RelocationConfig) -> Self {
        self.options = options;
        self
    }
}

/// Finds a sub-unit for one room line of a booking.
#[derive(Debug)]
pub struct Relocator<S> {
    registry: BookingRegistry,
    store: S,
    request: RelocationRequest,
    time_limit: Option<Duration>,
}

impl<S: OccupancyStore> Relocator<S> {
    /// Loads the booking registry for the request.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidArgument`] without a booking id or
    /// with inconsistent options, and [`RelocationError::NotFound`] when the
    /// booking or its room lines cannot be loaded.
    pub fn new<P>(provider: &P, store: S, request: RelocationRequest) -> Result<Self>
    where
        P: BookingProvider + ?Sized,
    {
        if request.booking_id == 0 {
            return Err(RelocationError::invalid("missing booking id"));
        }
        request
            .options
            .validate()
            .map_err(|e| RelocationError::invalid(e.to_string()))?;
        let registry = provider.load_booking(request.booking_id)?;
        if registry.room_lines().is_empty() {
            return Err(RelocationError::not_found(format!(
                "room lines of booking #{}",
                request.booking_id
            )));
        }
        Ok(Self {
            registry,
            store,
            request,
            time_limit: None,
        })
    }

    /// Overrides the search budget derived from the options.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn registry(&self) -> &BookingRegistry {
        &self.registry
    }

    pub fn request(&self) -> &RelocationRequest {
        &self.request
    }

    /// Runs the relocation search.
    ///
    /// Closure bookings are refused with [`RelocationError::Forbidden`].
    pub fn find_relocation(&mut self) -> Result<Moveset> {
        if self.registry.is_closure() {
            return Err(RelocationError::Forbidden(format!(
                "booking #{} is a closure and cannot be relocated",
                self.registry.booking_id()
            )));
        }
        let listing_id = self.resolve_listing()?;
        let room_index = self.resolve_room_line(listing_id)?;
        self.registry.set_current_room(room_index)?;

        let mut matrix = self.build_subunit_matrix(listing_id, room_index)?;
        matrix.relocate_room_records()
    }

    fn resolve_listing(&self) -> Result<u64> {
        let listing_id = match self.request.listing_id {
            Some(id) if id != 0 => id,
            _ => self
                .registry
                .first_listing()
                .ok_or_else(|| RelocationError::invalid("the booking has no listing"))?,
        };
        if !self.registry.has_listing(listing_id) {
            return Err(RelocationError::invalid(format!(
                "listing #{listing_id} is not part of booking #{}",
                self.registry.booking_id()
            )));
        }
        Ok(listing_id)
    }

    /// Position of the unassigned room line to relocate.
    fn resolve_room_line(&self, listing_id: u64) -> Result<usize> {
        let candidates: Vec<usize> = self
            .registry
            .room_lines()
            .iter()
            .enumerate()
            .filter(|(_, room)| room.listing_id == listing_id && room.is_unassigned())
            .map(|(pos, _)| pos)
            .collect();

        if let Some(wanted) = self.request.room_index {
            if candidates.contains(&wanted) {
                return Ok(wanted);
            }
        }
        candidates.first().copied().ok_or_else(|| {
            RelocationError::not_found(format!(
                "no room of booking #{} on listing #{listing_id} needs a sub-unit",
                self.registry.booking_id()
            ))
        })
    }

    /// Builds the populated matrix for the room line at `room_index`.
    pub fn build_subunit_matrix(&self, listing_id: u64, room_index: usize) -> Result<SubunitMatrix> {
        let options = &self.request.options;
        let units = self.registry.units_of(listing_id);
        let target_line = self
            .registry
            .room_lines()
            .get(room_index)
            .map(|room| room.id)
            .ok_or_else(|| RelocationError::not_found(format!("room line {room_index}")))?;

        let bound = options.bound_seconds();
        let from = self.registry.checkin() - bound;
        let to = self.registry.checkout() + bound;

        let busy = self.store.busy_records(listing_id, from, to)?;
        if busy.is_empty() {
            return Err(RelocationError::not_found(format!(
                "no busy records for listing #{listing_id}"
            )));
        }

        let busy_by_booking = group_by_booking(busy, |row: &BusyRow| row.booking_id);
        let booking_ids: Vec<u64> = busy_by_booking.keys().copied().collect();
        let lines = self.store.room_bookings(listing_id, &booking_ids)?;
        let lines_by_booking = group_by_booking(lines, |row: &RoomBookingRow| row.booking_id);

        let mut records = merge_records(&busy_by_booking, &lines_by_booking);

        let target_pos = self.find_target(&records, target_line).ok_or_else(|| {
            RelocationError::not_found(format!(
                "no unassigned busy record of booking #{} to relocate",
                self.registry.booking_id()
            ))
        })?;
        records[target_pos].set_relocating(true);

        let target = &records[target_pos];
        let occupancy = DayOccupancy::build(&records, target.first_day(), target.last_day());
        occupancy.ensure_not_overbooked(target.first_day(), target.last_day(), units)?;

        let mut registry = self.registry.clone();
        registry.set_current_room(room_index)?;
        let mut matrix = SubunitMatrix::new(&registry).with_config(options.clone());
        if let Some(limit) = self.time_limit {
            matrix = matrix.with_time_limit(limit);
        }

        info!(
            event = "relocation_matrix",
            booking = self.registry.booking_id(),
            listing = listing_id,
            units = units,
            records = records.len() as u64,
            room_booking = target.room_booking_id(),
        );

        for record in records {
            matrix.push_record(record)?;
        }
        Ok(matrix)
    }

    /// Unassigned record of this booking matching the room line, or the
    /// first unassigned one of this booking.
    fn find_target(&self, records: &[SubunitRecord], room_booking_id: u64) -> Option<usize> {
        let booking_id = self.registry.booking_id();
        let mut unassigned = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.booking_id() == booking_id && !r.is_assigned());

        let first = unassigned.clone().next().map(|(pos, _)| pos);
        unassigned
            .find(|(_, r)| r.room_booking_id() == room_booking_id)
            .map(|(pos, _)| pos)
            .or(first)
    }
}

fn group_by_booking<T>(rows: Vec<T>, key: impl Fn(&T) -> u64) -> BTreeMap<u64, Vec<T>> {
    let mut grouped: BTreeMap<u64, Vec<T>> = BTreeMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

/// Pairs busy rows with room-booking rows by position within each booking.
///
/// Both queries order by booking then id, so the k-th busy row of a booking
/// belongs to its k-th room line. Busy rows without a counterpart keep only
/// their booking id. Rows that do not form a valid record are skipped.
fn merge_records(
    busy: &BTreeMap<u64, Vec<BusyRow>>,
    lines: &BTreeMap<u64, Vec<RoomBookingRow>>,
) -> Vec<SubunitRecord> {
    let mut records = Vec::new();
    for (booking_id, rows) in busy {
        let booking_lines = lines.get(booking_id);
        for (k, busy_row) in rows.iter().enumerate() {
            let line = booking_lines.and_then(|l| l.get(k));
            let row = SubunitRow {
                booking_id: Some(*booking_id),
                room_booking_id: line.map(|l| l.id),
                checkin: Some(busy_row.checkin),
                checkout: Some(busy_row.checkout),
                realback: busy_row.realback,
                unit_index: line.and_then(|l| l.unit_index),
                closure: busy_row.closure || line.is_some_and(|l| l.closure),
                relocate: false,
            };
            match SubunitRecord::from_row(&row, Some(records.len())) {
                Ok(record) => records.push(record),
                Err(err) => warn!(
                    event = "busy_record_skipped",
                    busy = busy_row.id,
                    booking = *booking_id,
                    error = %err,
                ),
            }
        }
    }
    records
}
