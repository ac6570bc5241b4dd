use serde::{Deserialize, Serialize};

/// Unique identifier for an order row.
///
/// Wraps the SQLite integer rowid to keep order ids from being mixed up
/// with quantities or other plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Creates an order id from a raw rowid.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Human-facing ticket code, derived deterministically from the order id.
///
/// Format: `TKT-GRF-2025-<id zero-padded to 4 digits>`, e.g. id 7 →
/// `TKT-GRF-2025-0007`. Ids beyond 9999 simply use more digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketCode(String);

/// Marker prefix that flags an order as cancelled when the code was edited
/// out-of-band, before the explicit status column existed.
const CANCELLED_PREFIX: &str = "CANCELLED";

impl TicketCode {
    /// Derives the ticket code for an order id.
    pub fn for_order(id: OrderId) -> Self {
        Self(format!("TKT-GRF-2025-{:04}", id.as_i64()))
    }

    /// Wraps a code already stored in the database.
    pub fn from_stored(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// True when the stored code carries the legacy cancellation marker.
    pub fn is_cancelled_marker(&self) -> bool {
        self.0.starts_with(CANCELLED_PREFIX)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TicketCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_code_is_zero_padded() {
        assert_eq!(
            TicketCode::for_order(OrderId::new(7)).as_str(),
            "TKT-GRF-2025-0007"
        );
        assert_eq!(
            TicketCode::for_order(OrderId::new(42)).as_str(),
            "TKT-GRF-2025-0042"
        );
        assert_eq!(
            TicketCode::for_order(OrderId::new(1000)).as_str(),
            "TKT-GRF-2025-1000"
        );
    }

    #[test]
    fn ticket_code_widens_past_four_digits() {
        assert_eq!(
            TicketCode::for_order(OrderId::new(12345)).as_str(),
            "TKT-GRF-2025-12345"
        );
    }

    #[test]
    fn cancelled_marker_is_prefix_only() {
        assert!(TicketCode::from_stored("CANCELLED-TKT-GRF-2025-0001").is_cancelled_marker());
        assert!(TicketCode::from_stored("CANCELLED").is_cancelled_marker());
        assert!(!TicketCode::for_order(OrderId::new(1)).is_cancelled_marker());
    }

    #[test]
    fn order_id_serializes_as_plain_integer() {
        let id = OrderId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }
}
