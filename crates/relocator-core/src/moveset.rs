//! Accepted relocation candidates.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::{RelocationError, Result};
use crate::record::SubunitRecord;

/// A single unit reassignment to be written back to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitMove {
    pub booking_id: u64,
    pub room_booking_id: u64,
    pub from: u32,
    pub to: u32,
}

/// One fitting solution found by the sub-unit matrix.
///
/// Holds the trial records (the relocating one plus every neighbour that
/// took part in the search) along with the search metadata needed to
/// explain how the solution was reached.
#[derive(Debug, Clone)]
pub struct Moveset {
    records: Vec<SubunitRecord>,
    units: u32,
    iteration: u128,
    combinations: u128,
    solutions: u64,
}

impl Moveset {
    /// Creates a moveset for a listing with `units` sub-units.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::Internal`] if `records` is empty.
    pub fn new(records: Vec<SubunitRecord>, units: u32) -> Result<Self> {
        if records.is_empty() {
            return Err(RelocationError::internal(
                "a moveset requires at least one record",
            ));
        }
        Ok(Self {
            records,
            units,
            iteration: 0,
            combinations: 0,
            solutions: 0,
        })
    }

    /// Attaches the search metadata.
    pub fn with_search_info(mut self, iteration: u128, combinations: u128, solutions: u64) -> Self {
        self.iteration = iteration;
        self.combinations = combinations;
        self.solutions = solutions;
        self
    }

    pub fn records(&self) -> &[SubunitRecord] {
        &self.records
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    /// 1-based iteration at which this moveset was found.
    pub fn iteration(&self) -> u128 {
        self.iteration
    }

    /// Size of the combinatorial space that was searched.
    pub fn combinations(&self) -> u128 {
        self.combinations
    }

    /// Number of fitting solutions seen while searching.
    ///
    /// Counts distinct reassignments: a neighbour kept on its current unit
    /// is one solution however the search encodes it.
    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    fn moved(&self) -> impl Iterator<Item = &SubunitRecord> {
        self.records.iter().filter(|record| record.has_moved())
    }

    /// Deterministic encoding of every actual move.
    ///
    /// Each moved record contributes `{booking}.{room_booking}.{initial}.{current}`.
    /// Records that kept their initial index are skipped.
    pub fn signature(&self) -> String {
        self.moved()
            .map(|r| {
                format!(
                    "{}.{}.{}.{}",
                    r.booking_id(),
                    r.room_booking_id(),
                    r.initial_room_unit_index(),
                    r.room_unit_index()
                )
            })
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Booking ids of the records that actually moved.
    pub fn booking_ids(&self, unique: bool) -> Vec<u64> {
        let mut ids: Vec<u64> = self.moved().map(SubunitRecord::booking_id).collect();
        if unique {
            let mut seen = std::collections::HashSet::new();
            ids.retain(|id| seen.insert(*id));
        }
        ids
    }

    /// Returns the record flagged for relocation.
    pub fn relocating_record(&self) -> Result<&SubunitRecord> {
        self.records
            .iter()
            .find(|record| record.is_relocating())
            .ok_or_else(|| RelocationError::not_found("no relocating record in moveset"))
    }

    /// Unit reassignments to apply, relocating record first.
    pub fn moves(&self) -> Vec<UnitMove> {
        let mut moves: Vec<UnitMove> = self
            .moved()
            .map(|r| UnitMove {
                booking_id: r.booking_id(),
                room_booking_id: r.room_booking_id(),
                from: r.initial_room_unit_index(),
                to: r.room_unit_index(),
            })
            .collect();
        moves.sort_by_key(|m| {
            !self
                .records
                .iter()
                .any(|r| r.is_relocating() && r.room_booking_id() == m.room_booking_id)
        });
        moves
    }

    /// Human-readable trace of the moveset.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "Moveset found at iteration {} of {} possible combinations on {} sub-units.",
            self.iteration, self.combinations, self.units
        );
        if self.solutions > 1 {
            let _ = write!(out, " Fitting solutions counted: {}.", self.solutions);
        }

        for record in self.records.iter().filter(|r| r.is_relocating()) {
            let _ = write!(
                out,
                "\nBooking #{} (room booking #{}) assigned to index {}.",
                record.booking_id(),
                record.room_booking_id(),
                record.room_unit_index()
            );
        }

        for record in self.moved().filter(|r| !r.is_relocating()) {
            let _ = write!(
                out,
                "\nBooking #{} (room booking #{}) moved from index {} to index {}.",
                record.booking_id(),
                record.room_booking_id(),
                record.initial_room_unit_index(),
                record.room_unit_index()
            );
        }

        out
    }
}
