//! SQLite persistence layer for the ticket sales backend.
//!
//! Owns the schema and every SQL statement. The purchase workflow runs as a
//! single transaction: the conditional stock decrement, the per-ticket
//! inserts, and the ticket-code patches all commit or roll back together.

mod error;
mod order;
mod sqlite;

pub use error::{Result, StoreError};
pub use order::{IssuedTicket, OrderRow, OrderStatus};
pub use sqlite::TicketStore;
