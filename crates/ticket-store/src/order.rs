use chrono::{DateTime, Utc};
use common::{OrderId, TicketCode};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle state of an order row.
///
/// Stored as lowercase text. Replaces the old convention of prefixing the
/// ticket code with `CANCELLED`, though reads still honor that marker for
/// rows edited out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Cancelled,
}

/// A persisted order row, one per individual ticket.
///
/// Serializes with the original wire field names (`nama`, `email`, ...);
/// the `GET /api/pesanan` response is a list of these rows verbatim.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderRow {
    pub id: i64,
    #[serde(rename = "nama")]
    pub buyer_name: String,
    #[serde(rename = "email")]
    pub buyer_email: String,
    #[serde(rename = "jumlah")]
    pub quantity: i64,
    pub total: i64,
    #[serde(rename = "tiket_code")]
    pub ticket_code: Option<String>,
    pub status: OrderStatus,
    #[serde(rename = "tanggal")]
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    /// True when the order has been cancelled, either via the status column
    /// or the legacy `CANCELLED` code-prefix convention.
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
            || self
                .ticket_code
                .as_deref()
                .is_some_and(|code| TicketCode::from_stored(code).is_cancelled_marker())
    }
}

/// Summary of a single ticket issued by a purchase, echoed back to the
/// buyer in the purchase response.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedTicket {
    pub id: OrderId,
    #[serde(rename = "nama")]
    pub buyer_name: String,
    #[serde(rename = "email")]
    pub buyer_email: String,
    #[serde(rename = "tiket_code")]
    pub ticket_code: TicketCode,
    #[serde(rename = "harga")]
    pub unit_price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: OrderStatus, code: Option<&str>) -> OrderRow {
        OrderRow {
            id: 1,
            buyer_name: "Ayu".to_string(),
            buyer_email: "ayu@example.com".to_string(),
            quantity: 1,
            total: common::UNIT_PRICE,
            ticket_code: code.map(String::from),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn cancelled_status_hides_order() {
        assert!(row(OrderStatus::Cancelled, Some("TKT-GRF-2025-0001")).is_cancelled());
    }

    #[test]
    fn legacy_code_prefix_hides_order() {
        assert!(row(OrderStatus::Active, Some("CANCELLED-TKT-GRF-2025-0001")).is_cancelled());
    }

    #[test]
    fn active_order_is_visible() {
        assert!(!row(OrderStatus::Active, Some("TKT-GRF-2025-0001")).is_cancelled());
        assert!(!row(OrderStatus::Active, None).is_cancelled());
    }

    #[test]
    fn row_serializes_with_wire_field_names() {
        let json = serde_json::to_value(row(OrderStatus::Active, Some("TKT-GRF-2025-0001")))
            .expect("serialize");
        assert_eq!(json["nama"], "Ayu");
        assert_eq!(json["jumlah"], 1);
        assert_eq!(json["tiket_code"], "TKT-GRF-2025-0001");
        assert_eq!(json["status"], "active");
        assert!(json["tanggal"].is_string());
    }
}
