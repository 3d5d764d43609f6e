//! Fitness evaluation of one combination.
//!
//! Records are never mutated during the search. A combination is evaluated
//! as a digit overlay over the immutable objects, against day-indexed
//! scratch sets that are reused between trials.

use chrono::NaiveDate;
use relocator_core::SubunitRecord;
use smallvec::SmallVec;

#[derive(Debug)]
pub(super) struct SearchSpace {
    units: u32,
    current: Vec<u32>,
    pinned: Vec<bool>,
    /// Inclusive day offsets of each object's nights.
    spans: Vec<Option<(usize, usize)>>,
    scratch: Vec<SmallVec<[u32; 8]>>,
}

impl SearchSpace {
    pub(super) fn new(objects: &[SubunitRecord], pinned: &[bool], units: u32) -> Self {
        let origin = objects.iter().map(SubunitRecord::first_day).min();
        let end = objects.iter().map(SubunitRecord::last_day).max();

        let (origin, days) = match (origin, end) {
            (Some(origin), Some(end)) if end >= origin => {
                (origin, (end - origin).num_days() as usize + 1)
            }
            (Some(origin), _) => (origin, 0),
            _ => (NaiveDate::MIN, 0),
        };

        let span_of = |record: &SubunitRecord| {
            if days == 0 || record.last_day() < record.first_day() {
                return None;
            }
            let first = (record.first_day() - origin).num_days() as usize;
            let last = (record.last_day() - origin).num_days() as usize;
            Some((first, last))
        };

        Self {
            units,
            current: objects.iter().map(SubunitRecord::room_unit_index).collect(),
            pinned: pinned.to_vec(),
            spans: objects.iter().map(span_of).collect(),
            scratch: vec![SmallVec::new(); days],
        }
    }

    /// Unit held by object `j` under `digit`.
    fn effective(&self, j: usize, digit: u32) -> u32 {
        if digit == 0 {
            self.current[j]
        } else {
            digit
        }
    }

    /// Tests one combination.
    ///
    /// Rejects it when the relocating object (digit 0) keeps no unit, when
    /// a pinned neighbour would move, when a neighbour digit restates its
    /// current unit (digit 0 already covers that assignment), or when any
    /// night sees a duplicated unit or more units than the listing sells.
    /// Objects left without a unit occupy nothing.
    pub(super) fn fits(&mut self, digits: &[u32]) -> bool {
        if digits.first().copied().unwrap_or(0) == 0 {
            return false;
        }
        for (j, digit) in digits.iter().enumerate().skip(1) {
            if *digit != 0 && (self.pinned[j] || *digit == self.current[j]) {
                return false;
            }
        }

        for slot in self.scratch.iter_mut() {
            slot.clear();
        }

        for (j, digit) in digits.iter().enumerate() {
            let unit = self.effective(j, *digit);
            if unit == 0 {
                continue;
            }
            let Some((first, last)) = self.spans[j] else {
                continue;
            };
            for day in first..=last {
                let slot = &mut self.scratch[day];
                if slot.contains(&unit) {
                    return false;
                }
                slot.push(unit);
                if slot.len() as u32 > self.units {
                    return false;
                }
            }
        }

        true
    }
}
