use std::time::{Duration, Instant};

use relocator_config::RelocationConfig;
use relocator_core::{BookingRegistry, RelocationError, RoomLine, SubunitRow};
use relocator_test::{checkin, checkout, closure, neighbour, relocating, unassigned};

use super::*;

fn matrix(units: u32, records: Vec<SubunitRecord>) -> SubunitMatrix {
    let mut matrix = SubunitMatrix::with_units(units);
    for record in records {
        matrix.push_record(record).unwrap();
    }
    matrix
}

/// Two units; booking 2 holds unit 1 from Jan 11, booking 3 holds unit 2
/// until Jan 11.
fn one_move_required() -> Vec<SubunitRecord> {
    vec![
        relocating(1, 10, 12),
        neighbour(2, 11, 13, 1),
        neighbour(3, 9, 11, 2),
    ]
}

/// Checks a moveset against the occupancy rules without the search code.
fn assert_sound(moveset: &Moveset) {
    let records = moveset.records();
    for (i, a) in records.iter().enumerate() {
        if a.is_relocating() {
            assert_ne!(a.room_unit_index(), 0, "record {} has no unit", a.room_booking_id());
        }
        if a.room_unit_index() == 0 {
            continue;
        }
        assert!(a.room_unit_index() <= moveset.units());
        for b in &records[i + 1..] {
            if b.room_unit_index() != 0 && a.overlaps(b) {
                assert_ne!(
                    a.room_unit_index(),
                    b.room_unit_index(),
                    "room bookings {} and {} share a unit",
                    a.room_booking_id(),
                    b.room_booking_id()
                );
            }
        }
    }
}

#[test]
fn test_single_free_unit() {
    let mut matrix = matrix(2, vec![relocating(1, 10, 12), neighbour(2, 11, 13, 1)]);

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.relocating_record().unwrap().room_unit_index(), 2);
    assert_eq!(moveset.iteration(), 3);
    assert_eq!(moveset.combinations(), 9);
    assert_eq!(moveset.signature(), "1.10.0.2");
    assert_eq!(moveset.booking_ids(true), vec![1]);
    assert_sound(&moveset);
}

#[test]
fn test_fully_booked_is_exhausted() {
    let mut matrix = matrix(
        2,
        vec![
            relocating(1, 10, 12),
            neighbour(2, 9, 14, 1),
            neighbour(3, 9, 14, 2),
        ],
    );

    let err = matrix.relocate_room_records().unwrap_err();

    assert!(matches!(
        err,
        RelocationError::Exhausted {
            combinations: 27,
            solutions: 0
        }
    ));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_one_move_prefers_closest_neighbour() {
    let mut matrix = matrix(2, one_move_required());

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.iteration(), 8);
    assert_eq!(moveset.signature(), "1.10.0.1-2.20.1.2");
    assert_eq!(moveset.booking_ids(true), vec![1, 2]);
    assert_eq!(moveset.solutions(), 1);
    assert_sound(&moveset);

    let moves = moveset.moves();
    assert_eq!(moves[0].room_booking_id, 10);
    assert_eq!((moves[1].from, moves[1].to), (1, 2));
}

#[test]
fn test_skipped_booking_is_not_moved() {
    let config = RelocationConfig::default().with_skipped_booking(2);
    let mut matrix = matrix(2, one_move_required()).with_config(config);

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.signature(), "1.10.0.2-3.30.2.1");
    assert_eq!(moveset.booking_ids(true), vec![1, 3]);
    assert_sound(&moveset);
}

#[test]
fn test_count_all_solutions() {
    let config = RelocationConfig::default().with_count_all(true);
    let mut matrix = matrix(2, one_move_required()).with_config(config);

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.solutions(), 2);
    assert_eq!(matrix.solutions(), 2);
    assert_eq!(moveset.signature(), "1.10.0.1-2.20.1.2");
    assert!(moveset.describe().contains("Fitting solutions counted: 2."));
}

#[test]
fn test_skipped_signature_yields_next_solution() {
    let config = RelocationConfig::default().with_skipped_signature("1.10.0.1-2.20.1.2");
    let mut matrix = matrix(2, one_move_required()).with_config(config);

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.signature(), "1.10.0.2-3.30.2.1");
    assert_eq!(moveset.iteration(), 12);
}

#[test]
fn test_relocating_record_always_gets_a_unit() {
    for records in [
        vec![relocating(1, 10, 12), neighbour(2, 11, 13, 1)],
        one_move_required(),
        vec![relocating(1, 10, 12)],
    ] {
        let mut matrix = matrix(3, records);
        let moveset = matrix.relocate_room_records().unwrap();
        assert_ne!(moveset.relocating_record().unwrap().room_unit_index(), 0);
        assert_sound(&moveset);
    }
}

#[test]
fn test_search_is_deterministic() {
    let mut reversed = one_move_required();
    reversed.reverse();

    let first = matrix(2, one_move_required())
        .relocate_room_records()
        .unwrap();
    let second = matrix(2, one_move_required())
        .relocate_room_records()
        .unwrap();
    let third = matrix(2, reversed).relocate_room_records().unwrap();

    assert_eq!(first.signature(), second.signature());
    assert_eq!(first.signature(), third.signature());
    assert_eq!(first.iteration(), third.iteration());
}

#[test]
fn test_closure_neighbour_is_pinned() {
    let config = RelocationConfig::default().with_count_all(true);
    let mut matrix = matrix(
        2,
        vec![
            relocating(1, 10, 12),
            closure(2, 9, 11, 1),
            neighbour(3, 11, 13, 2),
        ],
    )
    .with_config(config);

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.solutions(), 1);
    assert_eq!(moveset.signature(), "1.10.0.2-3.30.2.1");
}

#[test]
fn test_unassigned_neighbour_holds_no_unit() {
    let mut matrix = matrix(
        2,
        vec![
            relocating(1, 10, 12),
            unassigned(2, 10, 12),
            neighbour(3, 10, 12, 1),
        ],
    );
    assert_eq!(matrix.neighbours().len(), 2);

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.signature(), "1.10.0.2");
    assert_eq!(moveset.combinations(), 27);
    assert_eq!(moveset.iteration(), 3);
    assert_sound(&moveset);
}

#[test]
fn test_unassigned_neighbour_may_receive_a_unit() {
    let config = RelocationConfig::default().with_count_all(true);
    let mut matrix = matrix(3, vec![relocating(1, 10, 12), unassigned(2, 10, 12)])
        .with_config(config);

    let moveset = matrix.relocate_room_records().unwrap();

    // Target alone on 1, 2 or 3, or together with the neighbour on any
    // two distinct units.
    assert_eq!(moveset.solutions(), 9);
    assert_eq!(moveset.signature(), "1.10.0.1");
}

#[test]
fn test_missing_relocating_record() {
    let mut matrix = matrix(2, vec![neighbour(2, 11, 13, 1)]);
    let err = matrix.relocate_room_records().unwrap_err();
    assert!(matches!(err, RelocationError::Internal(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_second_relocating_record_rejected() {
    let mut matrix = matrix(2, vec![relocating(1, 10, 12)]);
    let err = matrix.push_record(relocating(2, 10, 12)).unwrap_err();
    assert!(matches!(err, RelocationError::Internal(_)));
}

#[test]
fn test_closure_cannot_be_relocated() {
    let mut matrix = SubunitMatrix::with_units(2);
    let err = matrix
        .set_relocating_record(closure(1, 10, 12, 0))
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(matrix.relocating_record().is_none());
}

#[test]
fn test_single_unit_listing_rejected() {
    let mut matrix = matrix(1, vec![relocating(1, 10, 12)]);
    let err = matrix.relocate_room_records().unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_units_follow_registry_room() {
    let mut registry = BookingRegistry::new(1, checkin(10), checkout(12))
        .unwrap()
        .with_inventory(1, 4)
        .with_room(RoomLine {
            id: 10,
            listing_id: 1,
            unit_index: None,
            adults: 2,
            children: 0,
        });
    registry.set_current_room(0).unwrap();

    assert_eq!(SubunitMatrix::new(&registry).units(), 4);
}

#[test]
fn test_time_limit_defaults_to_budget() {
    let matrix = SubunitMatrix::with_units(2)
        .with_config(RelocationConfig::default().with_max_exec_time(60));
    assert_eq!(matrix.time_limit(), Duration::from_secs(40));

    let matrix = matrix.with_time_limit(Duration::from_millis(5));
    assert_eq!(matrix.time_limit(), Duration::from_millis(5));
}

/// Every unit of a 50-unit listing is held over the whole stay, so no
/// combination fits and the space is far too large to exhaust.
fn saturated_listing() -> Vec<SubunitRecord> {
    let mut records = vec![relocating(1, 10, 12)];
    for unit in 1..=50u32 {
        records.push(neighbour(100 + u64::from(unit), 9, 14, unit));
    }
    records
}

#[test]
fn test_large_space_times_out() {
    let limit = Duration::from_millis(200);
    let mut matrix = matrix(50, saturated_listing())
        .with_time_limit(limit)
        .with_check_interval(1_000);

    let started = Instant::now();
    let err = matrix.relocate_room_records().unwrap_err();

    assert!(matches!(err, RelocationError::Timeout { .. }));
    assert_eq!(err.status_code(), 508);
    assert!(started.elapsed() < limit + Duration::from_secs(5));
}

#[test]
fn test_count_all_times_out_after_fits() {
    let mut records = vec![relocating(1, 10, 12)];
    for unit in 1..=10u32 {
        records.push(neighbour(100 + u64::from(unit), 9, 14, unit));
    }
    let mut matrix = matrix(50, records)
        .with_config(RelocationConfig::default().with_count_all(true))
        .with_time_limit(Duration::from_millis(100))
        .with_check_interval(1_000);

    let err = matrix.relocate_room_records().unwrap_err();

    assert!(matches!(err, RelocationError::Timeout { .. }));
    assert_eq!(err.status_code(), 508);
    assert!(matrix.solutions() > 0);
}

#[test]
fn test_unit_count_too_large_to_enumerate() {
    let mut matrix = matrix(u32::MAX, vec![relocating(1, 10, 12)]);
    let err = matrix.relocate_room_records().unwrap_err();
    assert!(matches!(err, RelocationError::InvalidArgument(_)));
}

#[test]
fn test_equal_neighbours_ordered_by_fetch_position() {
    // Busy rows without a room line share room-booking id 0.
    let row = |booking: u64, from: u32, to: u32, unit: u32| SubunitRow {
        booking_id: Some(booking),
        checkin: Some(checkin(from)),
        checkout: Some(checkout(to)),
        unit_index: Some(unit),
        ..Default::default()
    };
    let later = SubunitRecord::from_row(&row(2, 11, 13, 1), Some(1)).unwrap();
    let earlier = SubunitRecord::from_row(&row(3, 9, 11, 2), Some(0)).unwrap();
    let mut matrix = matrix(2, vec![relocating(1, 10, 12), later, earlier]);

    let moveset = matrix.relocate_room_records().unwrap();

    assert_eq!(moveset.iteration(), 6);
    assert_eq!(moveset.signature(), "1.10.0.2-3.0.2.1");
}
