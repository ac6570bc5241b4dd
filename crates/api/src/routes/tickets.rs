//! Ticket purchase, read, cancel, and reset endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use common::{OrderId, UNIT_PRICE};
use serde::{Deserialize, Serialize};
use ticket_store::{IssuedTicket, OrderRow, StoreError, TicketStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub store: TicketStore,
    /// When set, reset and cancel require a matching `x-admin-token` header.
    pub admin_token: Option<String>,
}

/// Fixed event metadata echoed with every ticket read.
#[derive(Serialize)]
pub struct EventInfo {
    #[serde(rename = "namaEvent")]
    pub name: &'static str,
    #[serde(rename = "tanggal")]
    pub date: &'static str,
    #[serde(rename = "lokasi")]
    pub location: &'static str,
    #[serde(rename = "deskripsi")]
    pub description: &'static str,
}

const EVENT_INFO: EventInfo = EventInfo {
    name: "GRF UKM Musik Undiksha 2025",
    date: "20 Desember 2025",
    location: "Lap. Basket Kampus Tengah Undiksha",
    description: "Konser musik Hardcore!",
};

// -- Request types --

/// Purchase request body. All fields optional so presence can be validated
/// with a single uniform error; `jumlah` arrives as either a JSON number or
/// a numeric string.
#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub nama: Option<String>,
    pub email: Option<String>,
    pub jumlah: Option<serde_json::Value>,
}

// -- Response types --

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub success: bool,
    pub message: String,
    pub total: i64,
    #[serde(rename = "tiketList")]
    pub tiket_list: Vec<IssuedTicket>,
}

#[derive(Serialize)]
pub struct StockResponse {
    #[serde(rename = "tersedia")]
    pub available: i64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// -- Handlers --

/// POST /api/pesan-tiket — buy one or more tickets in a single transaction.
#[tracing::instrument(skip(state, req))]
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let name = req.nama.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (Some(name), Some(email), Some(jumlah)) = (name, email, req.jumlah.as_ref()) else {
        return Err(ApiError::BadRequest("incomplete data".to_string()));
    };

    let quantity = coerce_quantity(jumlah)
        .filter(|q| *q > 0)
        .ok_or_else(|| ApiError::BadRequest("invalid quantity".to_string()))?;

    let tickets = match state.store.purchase(name, email, quantity).await {
        Ok(tickets) => tickets,
        Err(err @ StoreError::InsufficientStock { .. }) => {
            metrics::counter!("purchases_rejected_total").increment(1);
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    metrics::counter!("purchases_total").increment(1);

    Ok(Json(PurchaseResponse {
        success: true,
        message: format!("purchased {quantity} ticket(s) for {name}"),
        total: quantity * UNIT_PRICE,
        tiket_list: tickets,
    }))
}

/// GET /api/pesanan — all order rows, newest first.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<OrderRow>>, ApiError> {
    let rows = state.store.list_orders().await?;
    Ok(Json(rows))
}

/// GET /api/stok — remaining stock.
#[tracing::instrument(skip(state))]
pub async fn stock(State(state): State<Arc<AppState>>) -> Result<Json<StockResponse>, ApiError> {
    let available = state.store.available().await?;
    Ok(Json(StockResponse { available }))
}

/// GET /api/tiket/{id} — one order plus the fixed event info block.
///
/// A cancelled order (status column or legacy `CANCELLED` code prefix)
/// reads as a logical failure; the row data is never returned.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_order_id(&id)?;
    let row = state.store.get_order(id).await?;

    if row.is_cancelled() {
        let body = serde_json::json!({
            "success": false,
            "error": "this ticket was cancelled by an administrator",
        });
        return Ok(Json(body).into_response());
    }

    let body = serde_json::json!({
        "success": true,
        "data": row,
        "eventInfo": EVENT_INFO,
    });
    Ok(Json(body).into_response())
}

/// POST /api/tiket/{id}/cancel — mark an order cancelled (admin).
#[tracing::instrument(skip(state, headers))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let id = parse_order_id(&id)?;
    state.store.cancel_order(id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("order {id} cancelled"),
    }))
}

/// POST /api/reset — wipe orders, restart ids at 1, restore stock (admin).
#[tracing::instrument(skip(state, headers))]
pub async fn reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&state, &headers)?;

    state.store.reset().await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "all data reset: ticket ids restart at 1 and stock is back to 1000".to_string(),
    }))
}

// -- Helpers --

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(());
    };
    let provided = headers.get("x-admin-token").and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse::<i64>()
        .map(OrderId::new)
        .map_err(|_| ApiError::BadRequest("invalid id".to_string()))
}

/// Accepts a JSON integer or a numeric string, the shapes the original
/// clients send.
fn coerce_quantity(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantity_coercion_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_quantity(&json!(3)), Some(3));
        assert_eq!(coerce_quantity(&json!("3")), Some(3));
        assert_eq!(coerce_quantity(&json!(" 12 ")), Some(12));
        assert_eq!(coerce_quantity(&json!(-1)), Some(-1));
    }

    #[test]
    fn quantity_coercion_rejects_non_numeric_shapes() {
        assert_eq!(coerce_quantity(&json!("abc")), None);
        assert_eq!(coerce_quantity(&json!(2.5)), None);
        assert_eq!(coerce_quantity(&json!(null)), None);
        assert_eq!(coerce_quantity(&json!([1])), None);
    }

    #[test]
    fn parse_order_id_rejects_garbage() {
        assert!(parse_order_id("7").is_ok());
        assert!(parse_order_id("abc").is_err());
        assert!(parse_order_id("").is_err());
    }
}
