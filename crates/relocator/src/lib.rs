//! Relocator - sub-unit relocation for multi-unit listings
//!
//! Finds a free sub-unit for a room booking on a listing sold as several
//! identical units, moving neighbouring bookings when that is the only way
//! to make room.
//!
//! # Example
//!
//! ```rust
//! use relocator::prelude::*;
//!
//! let day = 86_400;
//! let mut store = MemoryStore::new();
//! store.add_listing(1, 2);
//! store
//!     .add_booking(StoredBooking::new(1, 10 * day, 12 * day).room(10, 1, None))
//!     .unwrap();
//! store
//!     .add_booking(StoredBooking::new(2, 11 * day, 13 * day).room(20, 1, Some(1)))
//!     .unwrap();
//!
//! let response = relocator::handle_json(&store, &store, r#"{"bid": 1}"#);
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body["signature"], "1.10.0.2");
//! ```

pub use relocator_config::{ConfigError, RelocationConfig};
pub use relocator_core::{
    BookingProvider, BookingRegistry, Moveset, OccupancyStore, RelocationError, RoomLine,
    SubunitRecord, SubunitRow, UnitAssignmentWriter, UnitMove,
};
pub use relocator_solver::{DayOccupancy, RelocationRequest, Relocator, SubunitMatrix};
pub use relocator_store::{apply_moveset, MemoryStore, SqliteStore, StoredBooking};

#[cfg(feature = "console")]
pub mod console;
mod endpoint;

pub use endpoint::{handle, handle_and_apply, handle_json, Response};

pub mod prelude {
    pub use super::{handle, handle_and_apply, handle_json, Response};
    pub use super::{MemoryStore, SqliteStore, StoredBooking};
    pub use super::{Moveset, RelocationConfig, RelocationError, RelocationRequest, Relocator};
}
