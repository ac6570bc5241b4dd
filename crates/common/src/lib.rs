//! Shared types for the ticket sales backend.
//!
//! Identifier and ticket-code types plus the pricing constants shared by
//! the store and API crates.

mod types;

pub use types::{OrderId, TicketCode};

/// Fixed price per ticket, in currency units.
pub const UNIT_PRICE: i64 = 50_000;

/// Stock level the counter is seeded with and reset to.
pub const INITIAL_STOCK: i64 = 1000;
