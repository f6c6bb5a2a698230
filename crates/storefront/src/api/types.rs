//! Wire records for the REST API.
//!
//! These mirror the JSON the backend produces and accepts. Anything coming in
//! is checked here before it becomes a domain type, so the rest of the crate
//! never sees a loosely-typed payload.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use heavyline_core::{
    DeliveryType, OrderId, PaymentMethod, Price, ProductId, RequestStatus, UserId,
};

use crate::models::AuthSession;
use crate::services::checkout::OrderDraft;

/// Format the backend expects for `request_date` (no timezone).
pub const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Auth
// =============================================================================

/// Response from `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Response from `GET /auth/me`.
///
/// Some deployments answer with `id` instead of `user_id`; both are accepted.
#[derive(Debug, Deserialize)]
pub struct CurrentUserRecord {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl From<CurrentUserRecord> for AuthSession {
    fn from(record: CurrentUserRecord) -> Self {
        Self {
            user_id: record.user_id,
            email: record.email,
            name: record.name.filter(|n| !n.trim().is_empty()),
            is_admin: record.is_admin,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A vehicle from `GET /vehicles/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRecord {
    pub vehicle_id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl VehicleRecord {
    /// The image to show for this vehicle, preferring the public URL.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or(self.image_path.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// A price list entry from `GET /price-list/vehicle/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceListRecord {
    #[serde(default)]
    pub price_id: Option<i32>,
    pub vehicle_id: ProductId,
    /// Raw amount; validated into a [`Price`] by the catalog service.
    pub price: Decimal,
}

// =============================================================================
// Orders
// =============================================================================

/// One line of `tovary_v_zayavke` in the create-order payload.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemPayload {
    pub vehicle_id: ProductId,
    pub quantity: u32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Body of `POST /requests/create-order`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub session_id: u32,
    pub company_name: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub message: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_type: DeliveryType,
    pub status: RequestStatus,
    pub request_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub tovary_v_zayavke: Vec<OrderItemPayload>,
}

impl From<&OrderDraft> for OrderPayload {
    fn from(draft: &OrderDraft) -> Self {
        Self {
            session_id: draft.correlation_id,
            company_name: draft.contact.company_name.clone(),
            full_name: draft.contact.full_name.clone(),
            email: draft.contact.email.to_string(),
            phone: draft.contact.phone.clone(),
            city: draft.contact.city.clone(),
            message: draft.contact.message.clone(),
            payment_method: draft.payment_method,
            delivery_type: draft.delivery_type,
            status: RequestStatus::Created,
            request_date: format_request_date(draft.requested_at),
            total_price: draft.total_price.amount(),
            tovary_v_zayavke: draft
                .lines
                .iter()
                .map(|line| OrderItemPayload {
                    vehicle_id: line.product_id,
                    quantity: line.quantity.get(),
                    name: line.name.clone(),
                    price: line.price.amount(),
                })
                .collect(),
        }
    }
}

fn format_request_date(at: NaiveDateTime) -> String {
    at.format(REQUEST_DATE_FORMAT).to_string()
}

/// An order request as returned by the API (create-order and `/requests/my/`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRecord {
    pub request_id: OrderId,
    #[serde(default)]
    pub status: RequestStatus,
    /// Kept as the raw string; the backend's datetime format is not contractual.
    #[serde(default)]
    pub request_date: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// FastAPI error body: `detail` is a string, or a list of validation errors.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// A human-readable rendering of `detail`.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| item.to_string(), str::to_owned)
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

/// Validate a raw price list amount.
///
/// # Errors
///
/// Returns the rejected amount if it is negative.
pub fn validate_price(raw: Decimal) -> Result<Price, Decimal> {
    Price::new(raw).map_err(|_| raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_accepts_id_alias() {
        let record: CurrentUserRecord = serde_json::from_str(
            r#"{"id": 4, "email": "buyer@example.ru", "name": "", "is_admin": false}"#,
        )
        .unwrap();
        let session = AuthSession::from(record);
        assert_eq!(session.user_id, UserId::new(4));
        assert_eq!(session.name, None);
    }

    #[test]
    fn test_vehicle_image_ref_prefers_url() {
        let vehicle: VehicleRecord = serde_json::from_str(
            r#"{"vehicle_id": 1, "title": "МАЗ-6312", "image_url": "/static/maz.jpg", "image_path": "uploads/maz.jpg"}"#,
        )
        .unwrap();
        assert_eq!(vehicle.image_ref(), Some("/static/maz.jpg"));
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Vehicle not found"}"#).unwrap();
        assert_eq!(body.message(), "Vehicle not found");

        let body: ErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}]}"#,
        )
        .unwrap();
        assert_eq!(body.message(), "value is not a valid email address");
    }

    #[test]
    fn test_order_record_defaults() {
        let record: OrderRecord = serde_json::from_str(r#"{"request_id": 17}"#).unwrap();
        assert_eq!(record.request_id, OrderId::new(17));
        assert_eq!(record.status, RequestStatus::Created);
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::from(1500)).is_ok());
        assert_eq!(validate_price(Decimal::from(-5)), Err(Decimal::from(-5)));
    }
}
