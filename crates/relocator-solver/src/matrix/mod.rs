//! Sub-unit matrix: exhaustive search over unit reassignments.
//!
//! The matrix holds one relocating record (a room booking without a unit)
//! and the neighbour records that could be shuffled to make room for it.
//! Every assignment of unit digits `0..=units` to the ordered objects is
//! enumerated through a mixed-radix odometer; digit `0` keeps a record's
//! current unit, which for an unassigned neighbour means it holds none. The
//! first assignment in which no two records share a unit on the same night
//! wins.
//!
//! Objects are ordered with the relocating record first (fastest digit) and
//! neighbours by temporal distance to it, so solutions that displace fewer,
//! closer neighbours are found first.

mod space;

use std::time::Duration;

use relocator_config::RelocationConfig;
use relocator_core::{BookingRegistry, Moveset, RelocationError, Result, SubunitRecord};
use tracing::{debug, info, warn};

use crate::combination::MixedRadix;
use crate::deadline::{Deadline, DEFAULT_CHECK_INTERVAL};

use space::SearchSpace;

/// Outcome of a search that ran to completion or to its deadline.
#[derive(Debug)]
struct SearchState {
    found: Option<Moveset>,
    solutions: u64,
    iterations: u128,
}

/// Search session for one relocation request.
///
/// # Example
///
/// ```
/// use relocator_core::{SubunitRecord, SubunitRow};
/// use relocator_solver::SubunitMatrix;
///
/// let day = 86_400;
/// let row = |booking: u64, unit: u32, relocate: bool| SubunitRow {
///     booking_id: Some(booking),
///     room_booking_id: Some(booking * 10),
///     checkin: Some(1_704_888_000),
///     checkout: Some(1_704_888_000 + 2 * day),
///     unit_index: Some(unit),
///     relocate,
///     ..Default::default()
/// };
///
/// let mut matrix = SubunitMatrix::with_units(2);
/// matrix.push_record(SubunitRecord::from_row(&row(1, 0, true), None).unwrap()).unwrap();
/// matrix.push_record(SubunitRecord::from_row(&row(2, 1, false), None).unwrap()).unwrap();
///
/// let moveset = matrix.relocate_room_records().unwrap();
/// assert_eq!(moveset.relocating_record().unwrap().room_unit_index(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SubunitMatrix {
    units: u32,
    relocating: Option<SubunitRecord>,
    neighbours: Vec<SubunitRecord>,
    config: RelocationConfig,
    time_limit: Option<Duration>,
    check_interval: u128,
    solutions: u64,
}

impl SubunitMatrix {
    /// Creates a matrix for the current room of the registry.
    pub fn new(registry: &BookingRegistry) -> Self {
        Self::with_units(registry.total_units())
    }

    /// Creates a matrix for a listing with `units` sub-units.
    pub fn with_units(units: u32) -> Self {
        Self {
            units,
            relocating: None,
            neighbours: Vec::new(),
            config: RelocationConfig::default(),
            time_limit: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
            solutions: 0,
        }
    }

    /// Injects the relocation options.
    pub fn with_config(mut self, config: RelocationConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the budget derived from the configuration.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_check_interval(mut self, interval: u128) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    /// Budget the next search will run under.
    pub fn time_limit(&self) -> Duration {
        self.time_limit.unwrap_or_else(|| self.config.execution_budget())
    }

    /// Adds a record to the matrix.
    ///
    /// Records flagged as relocating become the relocation target, every
    /// other record is a neighbour.
    pub fn push_record(&mut self, record: SubunitRecord) -> Result<()> {
        if record.is_relocating() {
            return self.set_relocating_record(record);
        }
        self.neighbours.push(record);
        Ok(())
    }

    /// Sets the record to relocate.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::Internal`] if a relocating record is
    /// already set, and [`RelocationError::Forbidden`] for closures.
    pub fn set_relocating_record(&mut self, mut record: SubunitRecord) -> Result<()> {
        if self.relocating.is_some() {
            return Err(RelocationError::internal(
                "the matrix already holds a record to relocate",
            ));
        }
        if record.is_closure() {
            return Err(RelocationError::Forbidden(format!(
                "room booking #{} is a closure and cannot be relocated",
                record.room_booking_id()
            )));
        }
        record.set_relocating(true);
        self.relocating = Some(record);
        Ok(())
    }

    pub fn relocating_record(&self) -> Option<&SubunitRecord> {
        self.relocating.as_ref()
    }

    /// Neighbour records, in insertion order.
    pub fn neighbours(&self) -> &[SubunitRecord] {
        &self.neighbours
    }

    /// Number of fitting solutions seen by the last search.
    ///
    /// Each distinct reassignment is counted once: a neighbour digit that
    /// restates its current unit is the same solution as digit `0` and is
    /// not enumerated separately.
    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    /// Returns true if the record must keep its current unit.
    fn is_pinned(&self, record: &SubunitRecord) -> bool {
        record.is_closure() || self.config.skips_booking(record.booking_id())
    }

    /// Objects in enumeration order: relocating record first, then
    /// neighbours by ascending temporal distance, pinned ones last. Ties go
    /// to the lower room-booking id, then to the earlier fetched row.
    fn ordered_objects(&self, target: &SubunitRecord) -> Vec<SubunitRecord> {
        let mut neighbours: Vec<(i64, &SubunitRecord)> = self
            .neighbours
            .iter()
            .map(|record| {
                let distance = if self.is_pinned(record) {
                    i64::MAX
                } else {
                    record.temporal_distance(target)
                };
                (distance, record)
            })
            .collect();
        neighbours.sort_by_key(|(distance, record)| {
            (*distance, record.room_booking_id(), record.sequence())
        });

        std::iter::once(target.clone())
            .chain(neighbours.into_iter().map(|(_, record)| record.clone()))
            .collect()
    }

    /// Searches for a fitting reassignment.
    ///
    /// # Errors
    ///
    /// - [`RelocationError::Internal`] without a relocating record
    /// - [`RelocationError::InvalidArgument`] for listings with fewer than 2
    ///   units or too many units to enumerate
    /// - [`RelocationError::Timeout`] when the budget is exceeded
    /// - [`RelocationError::Exhausted`] when no combination fits
    pub fn relocate_room_records(&mut self) -> Result<Moveset> {
        let target = self
            .relocating
            .clone()
            .ok_or_else(|| RelocationError::internal("no record to relocate was set"))?;

        if self.units < 2 {
            return Err(RelocationError::invalid(format!(
                "relocation requires at least 2 sub-units, listing has {}",
                self.units
            )));
        }

        let objects = self.ordered_objects(&target);
        let pinned: Vec<bool> = objects
            .iter()
            .enumerate()
            .map(|(j, record)| j > 0 && self.is_pinned(record))
            .collect();

        let base = self.units.checked_add(1).ok_or_else(|| {
            RelocationError::invalid(format!("{} sub-units cannot be enumerated", self.units))
        })?;
        let radix = MixedRadix::new(base, objects.len())?;
        let combinations = radix.combinations();
        let deadline = Deadline::new(self.time_limit()).with_check_interval(self.check_interval);

        info!(
            event = "relocation_start",
            room_booking = target.room_booking_id(),
            objects = objects.len() as u64,
            base = radix.base() as u64,
            combinations = %combinations,
            budget_secs = deadline.limit().as_secs(),
        );

        let mut space = SearchSpace::new(&objects, &pinned, self.units);
        let state = self.search(&objects, &mut space, radix, &deadline);
        let state = match state {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    event = "relocation_timeout",
                    room_booking = target.room_booking_id(),
                    duration_ms = deadline.elapsed().as_millis() as u64,
                    solutions = self.solutions,
                );
                return Err(err);
            }
        };

        let duration_ms = deadline.elapsed().as_millis() as u64;
        match state.found {
            Some(moveset) => {
                let iteration = moveset.iteration();
                let moveset = moveset.with_search_info(iteration, combinations, state.solutions);
                info!(
                    event = "relocation_end",
                    room_booking = target.room_booking_id(),
                    iteration = %moveset.iteration(),
                    solutions = state.solutions,
                    duration_ms = duration_ms,
                    signature = %moveset.signature(),
                );
                Ok(moveset)
            }
            None => {
                info!(
                    event = "relocation_exhausted",
                    room_booking = target.room_booking_id(),
                    iterations = %state.iterations,
                    duration_ms = duration_ms,
                );
                Err(RelocationError::Exhausted {
                    combinations,
                    solutions: state.solutions,
                })
            }
        }
    }

    fn search(
        &mut self,
        objects: &[SubunitRecord],
        space: &mut SearchSpace,
        radix: MixedRadix,
        deadline: &Deadline,
    ) -> Result<SearchState> {
        let mut state = SearchState {
            found: None,
            solutions: 0,
            iterations: 0,
        };
        self.solutions = 0;

        let mut odometer = radix.odometer();
        while let Some((index, digits)) = odometer.advance() {
            state.iterations = index + 1;

            if deadline.is_checkpoint(index) {
                debug!(
                    event = "relocation_progress",
                    iteration = %index,
                    solutions = state.solutions,
                    elapsed_ms = deadline.elapsed().as_millis() as u64,
                );
                deadline.check(index)?;
            }

            if !space.fits(digits) {
                continue;
            }

            let moveset = self.build_moveset(objects, digits, index + 1)?;
            if self.config.skips_signature(&moveset.signature()) {
                continue;
            }

            state.solutions += 1;
            self.solutions = state.solutions;
            if state.found.is_none() {
                state.found = Some(moveset);
            }
            if !self.config.count_all {
                break;
            }
        }

        Ok(state)
    }

    /// Clones the objects and applies the digits of one combination.
    fn build_moveset(
        &self,
        objects: &[SubunitRecord],
        digits: &[u32],
        iteration: u128,
    ) -> Result<Moveset> {
        let records = objects
            .iter()
            .zip(digits)
            .map(|(record, digit)| {
                let mut trial = record.clone();
                trial.set_room_unit_index(*digit);
                trial
            })
            .collect();
        Ok(Moveset::new(records, self.units)?.with_search_info(iteration, 0, 0))
    }
}

#[cfg(test)]
mod tests;
