//! SQLite booking store.

use std::path::Path;

use relocator_core::{
    BookingProvider, BookingRegistry, BusyRow, OccupancyStore, RelocationError, Result, RoomLine,
    RoomBookingRow, UnitAssignmentWriter,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use crate::StoredBooking;

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

const SQL_BUSY_RECORDS: &str = "\
    SELECT b.id, ob.idorder, b.checkin, b.checkout, b.realback, o.closure \
    FROM busy AS b \
    JOIN busy_bookings AS ob ON ob.idbusy = b.id \
    JOIN bookings AS o ON o.id = ob.idorder \
    WHERE b.idroom = ?1 \
      AND b.checkin <= ?3 \
      AND COALESCE(NULLIF(b.realback, 0), b.checkout) >= ?2 \
    ORDER BY ob.idorder ASC, b.id ASC";

const SQL_BOOKING: &str = "SELECT id, checkin, checkout, closure FROM bookings WHERE id = ?1";

const SQL_BOOKING_ROOMS: &str = "\
    SELECT br.id, br.idroom, br.roomindex, br.adults, br.children, r.units \
    FROM booking_rooms AS br \
    JOIN rooms AS r ON r.id = br.idroom \
    WHERE br.idorder = ?1 \
    ORDER BY br.id ASC";

fn db_err(e: rusqlite::Error) -> RelocationError {
    RelocationError::Storage(e.to_string())
}

fn to_id(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn to_unit(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

/// Booking store backed by a SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteStore {
    /// Opens a database file and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| RelocationError::Storage(format!("Open DB failed: {e}")))?;
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database and applies the schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn)
    }

    /// Wraps an existing connection and applies the schema.
    pub fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(|e| RelocationError::Storage(format!("Failed to apply schema: {e}")))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Inserts or replaces a listing with `units` sub-units.
    pub fn add_listing(&self, listing_id: u64, units: u32) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO rooms (id, units) VALUES (?1, ?2)",
                params![listing_id as i64, units],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// Writes a booking, its room lines and one busy entry per room line
    /// in a single transaction.
    pub fn add_booking(&mut self, booking: &StoredBooking) -> Result<()> {
        let tx = self.conn.transaction().map_err(db_err)?;

        tx.execute(
            "INSERT INTO bookings (id, checkin, checkout, closure) VALUES (?1, ?2, ?3, ?4)",
            params![
                booking.id as i64,
                booking.checkin,
                booking.checkout,
                booking.closure
            ],
        )
        .map_err(db_err)?;

        for room in &booking.rooms {
            tx.execute(
                "INSERT INTO booking_rooms (id, idorder, idroom, roomindex, adults, children) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    room.id as i64,
                    booking.id as i64,
                    room.listing_id as i64,
                    room.unit_index,
                    room.adults,
                    room.children
                ],
            )
            .map_err(db_err)?;

            tx.execute(
                "INSERT INTO busy (idroom, checkin, checkout, realback) VALUES (?1, ?2, ?3, ?4)",
                params![
                    room.listing_id as i64,
                    booking.checkin,
                    booking.checkout,
                    booking.realback
                ],
            )
            .map_err(db_err)?;
            let busy_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO busy_bookings (idorder, idbusy) VALUES (?1, ?2)",
                params![booking.id as i64, busy_id],
            )
            .map_err(db_err)?;
        }

        tx.commit().map_err(db_err)
    }
}

impl BookingProvider for SqliteStore {
    fn load_booking(&self, booking_id: u64) -> Result<BookingRegistry> {
        let header = self
            .conn
            .query_row(SQL_BOOKING, params![booking_id as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, bool>(3)?,
                ))
            })
            .optional()
            .map_err(db_err)?;

        let Some((id, checkin, checkout, closure)) = header else {
            return Err(RelocationError::not_found(format!("booking #{booking_id}")));
        };

        let mut stmt = self.conn.prepare(SQL_BOOKING_ROOMS).map_err(db_err)?;
        let rows = stmt
            .query_map(params![booking_id as i64], |row| {
                Ok((
                    RoomLine {
                        id: to_id(row.get::<_, i64>(0)?),
                        listing_id: to_id(row.get::<_, i64>(1)?),
                        unit_index: to_unit(row.get::<_, Option<i64>>(2)?),
                        adults: row.get(3)?,
                        children: row.get(4)?,
                    },
                    row.get::<_, u32>(5)?,
                ))
            })
            .map_err(db_err)?;

        let mut registry = BookingRegistry::new(to_id(id), checkin, checkout)?.with_closure(closure);
        let mut lines = 0usize;
        for r in rows {
            let (room, units) = r.map_err(db_err)?;
            registry = registry.with_inventory(room.listing_id, units).with_room(room);
            lines += 1;
        }

        if lines == 0 {
            return Err(RelocationError::not_found(format!(
                "room lines of booking #{booking_id}"
            )));
        }
        Ok(registry)
    }
}

impl OccupancyStore for SqliteStore {
    fn busy_records(&self, listing_id: u64, from: i64, to: i64) -> Result<Vec<BusyRow>> {
        let mut stmt = self.conn.prepare(SQL_BUSY_RECORDS).map_err(db_err)?;
        let rows = stmt
            .query_map(params![listing_id as i64, from, to], |row| {
                Ok(BusyRow {
                    id: to_id(row.get::<_, i64>(0)?),
                    booking_id: to_id(row.get::<_, i64>(1)?),
                    checkin: row.get(2)?,
                    checkout: row.get(3)?,
                    realback: row.get(4)?,
                    closure: row.get(5)?,
                })
            })
            .map_err(db_err)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(db_err)?);
        }
        debug!(listing = listing_id, from, to, rows = out.len(), "busy records fetched");
        Ok(out)
    }

    fn room_bookings(&self, listing_id: u64, booking_ids: &[u64]) -> Result<Vec<RoomBookingRow>> {
        if booking_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; booking_ids.len()].join(", ");
        let sql = format!(
            "SELECT br.id, br.idorder, br.roomindex, o.closure \
             FROM booking_rooms AS br \
             JOIN bookings AS o ON o.id = br.idorder \
             WHERE br.idroom = ? AND br.idorder IN ({placeholders}) \
             ORDER BY br.idorder ASC, br.id ASC"
        );

        let values: Vec<i64> = std::iter::once(listing_id)
            .chain(booking_ids.iter().copied())
            .map(|id| id as i64)
            .collect();

        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok(RoomBookingRow {
                    id: to_id(row.get::<_, i64>(0)?),
                    booking_id: to_id(row.get::<_, i64>(1)?),
                    unit_index: to_unit(row.get::<_, Option<i64>>(2)?),
                    closure: row.get(3)?,
                })
            })
            .map_err(db_err)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(db_err)?);
        }
        Ok(out)
    }
}

impl UnitAssignmentWriter for SqliteStore {
    fn assign_unit_index(&mut self, room_booking_id: u64, unit_index: u32) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE booking_rooms SET roomindex = ?1 WHERE id = ?2",
                params![unit_index, room_booking_id as i64],
            )
            .map_err(db_err)?;
        if updated == 0 {
            return Err(RelocationError::not_found(format!(
                "room booking #{room_booking_id}"
            )));
        }
        Ok(())
    }
}
