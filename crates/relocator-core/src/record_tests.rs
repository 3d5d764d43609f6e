//! Tests for sub-unit records.

use chrono::NaiveDate;

use crate::record::{SubunitRecord, SubunitRow};

fn ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp()
}

fn row(unit_index: Option<u32>) -> SubunitRow {
    SubunitRow {
        booking_id: Some(10),
        room_booking_id: Some(100),
        checkin: Some(ts(2024, 1, 10, 14)),
        checkout: Some(ts(2024, 1, 12, 10)),
        unit_index,
        ..Default::default()
    }
}

#[test]
fn test_from_row_requires_checkin() {
    let mut r = row(None);
    r.checkin = None;
    let err = SubunitRecord::from_row(&r, None).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_from_row_requires_departure() {
    let mut r = row(None);
    r.checkout = None;
    assert!(SubunitRecord::from_row(&r, None).is_err());

    r.realback = Some(ts(2024, 1, 13, 10));
    assert!(SubunitRecord::from_row(&r, None).is_ok());
}

#[test]
fn test_from_row_requires_an_id() {
    let mut r = row(None);
    r.booking_id = None;
    r.room_booking_id = None;
    assert!(SubunitRecord::from_row(&r, None).is_err());

    r.room_booking_id = Some(5);
    assert!(SubunitRecord::from_row(&r, None).is_ok());
}

#[test]
fn test_from_row_rejects_reversed_window() {
    let mut r = row(None);
    r.checkout = r.checkin;
    assert!(SubunitRecord::from_row(&r, None).is_err());
}

#[test]
fn test_realback_overrides_checkout() {
    let mut r = row(None);
    r.realback = Some(ts(2024, 1, 11, 10));
    let record = SubunitRecord::from_row(&r, Some(3)).unwrap();
    assert_eq!(record.checkout(), ts(2024, 1, 11, 10));
    assert_eq!(record.sequence(), Some(3));

    r.realback = Some(0);
    let record = SubunitRecord::from_row(&r, None).unwrap();
    assert_eq!(record.checkout(), ts(2024, 1, 12, 10));
}

#[test]
fn test_last_night_and_nights() {
    let record = SubunitRecord::from_row(&row(None), None).unwrap();
    assert_eq!(record.last_night(), ts(2024, 1, 11, 23) + 3599);

    let nights: Vec<_> = record.nights().collect();
    assert_eq!(
        nights,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
        ]
    );
}

#[test]
fn test_set_unit_index_zero_is_noop() {
    let mut record = SubunitRecord::from_row(&row(Some(2)), None).unwrap();
    record.set_room_unit_index(0);

    assert_eq!(record.room_unit_index(), 2);
    assert_eq!(record.initial_room_unit_index(), 2);
    assert!(!record.has_moved());
}

#[test]
fn test_initial_captured_on_first_overwrite_only() {
    let mut record = SubunitRecord::from_row(&row(Some(2)), None).unwrap();
    record.set_room_unit_index(3);
    record.set_room_unit_index(1);

    assert_eq!(record.room_unit_index(), 1);
    assert_eq!(record.initial_room_unit_index(), 2);
    assert!(record.has_moved());

    record.set_room_unit_index(2);
    assert!(!record.has_moved());
}

#[test]
fn test_clones_are_independent() {
    let original = SubunitRecord::from_row(&row(None), None).unwrap();
    let mut trial = original.clone();
    trial.set_room_unit_index(1);

    assert_eq!(original.room_unit_index(), 0);
    assert_eq!(trial.room_unit_index(), 1);
    assert_eq!(trial.initial_room_unit_index(), 0);
}

#[test]
fn test_overlap_and_distance() {
    let a = SubunitRecord::from_row(&row(None), None).unwrap();
    let mut r = row(Some(1));
    r.checkin = Some(ts(2024, 1, 11, 14));
    r.checkout = Some(ts(2024, 1, 13, 10));
    let b = SubunitRecord::from_row(&r, None).unwrap();

    assert!(a.overlaps(&b));
    assert_eq!(a.temporal_distance(&b), 2 * 86_400);

    r.checkin = Some(ts(2024, 1, 12, 14));
    r.checkout = Some(ts(2024, 1, 14, 10));
    let c = SubunitRecord::from_row(&r, None).unwrap();
    assert!(!a.overlaps(&c));
}

#[test]
fn test_row_deserializes_with_defaults() {
    let r: SubunitRow =
        serde_json::from_str(r#"{"booking_id": 4, "checkin": 1700000000, "checkout": 1700200000}"#)
            .unwrap();
    assert_eq!(r.booking_id, Some(4));
    assert!(!r.closure);
    assert!(!r.relocate);
    assert_eq!(r.unit_index, None);
}
