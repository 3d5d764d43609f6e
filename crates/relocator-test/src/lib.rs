//! Shared test fixtures for the relocation engine crates.
//!
//! This crate provides data builders only. It does NOT depend on
//! `relocator-solver` so the solver can use it as a dev-dependency.
//!
//! - [`time`] - January 2024 stay timestamps
//! - [`records`] - sub-unit record builders
//! - [`scenario`] - pre-populated stores for the reference scenarios
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! relocator-test = { workspace = true }
//! ```

pub mod records;
pub mod scenario;
pub mod time;

pub use records::{closure, neighbour, relocating, unassigned};
pub use time::{checkin, checkout, day};
