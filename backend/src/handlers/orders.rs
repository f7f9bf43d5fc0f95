//! HTTP handlers for online order intake

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::validate_indian_phone;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::services::orders::{PendingOrder, PendingOrderItem};
use crate::AppState;

/// Longest a client may hold a pending-orders request open
const MAX_WAIT: Duration = Duration::from_secs(30);

fn phone(value: &str) -> Result<(), ValidationError> {
    validate_indian_phone(value).map_err(|msg| {
        let mut err = ValidationError::new("phone");
        err.message = Some(msg.into());
        err
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct OnlineOrderRequest {
    #[validate(length(min = 1, max = 100, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(custom = "phone")]
    pub customer_phone: Option<String>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

impl OnlineOrderRequest {
    /// Validate the order and each of its items
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.items.iter().try_for_each(|item| item.validate())
    }
}

/// Accept an order from the online store
pub async fn submit_online_order(
    State(state): State<AppState>,
    Json(request): Json<OnlineOrderRequest>,
) -> AppResult<(StatusCode, Json<PendingOrder>)> {
    request.check()?;

    let order = PendingOrder {
        id: Uuid::new_v4(),
        customer_name: request.customer_name.trim().to_string(),
        customer_phone: request.customer_phone,
        items: request
            .items
            .into_iter()
            .map(|item| PendingOrderItem {
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
            })
            .collect(),
        received_at: Utc::now(),
    };
    state.orders.push(order.clone());

    Ok((StatusCode::ACCEPTED, Json(order)))
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    /// Milliseconds to wait for an order when none is queued
    #[serde(default)]
    pub wait_ms: u64,
}

/// Take the queued orders, optionally waiting for the first one
pub async fn take_pending_orders(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Json<Vec<PendingOrder>> {
    let wait = Duration::from_millis(query.wait_ms).min(MAX_WAIT);
    if !wait.is_zero() {
        state.orders.wait_for_order(wait).await;
    }
    Json(state.orders.drain())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32) -> OrderItemRequest {
        OrderItemRequest {
            product_id: Uuid::new_v4(),
            product_name: "Cetirizine 10mg".to_string(),
            quantity,
        }
    }

    fn order(items: Vec<OrderItemRequest>) -> OnlineOrderRequest {
        OnlineOrderRequest {
            customer_name: "Asha".to_string(),
            customer_phone: Some("9876543210".to_string()),
            items,
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(order(vec![item(2)]).check().is_ok());
    }

    #[test]
    fn test_zero_quantity_items_are_rejected() {
        assert!(order(vec![item(0)]).check().is_err());
        assert!(order(vec![item(1), item(0)]).check().is_err());
    }

    #[test]
    fn test_order_needs_items_and_valid_phone() {
        assert!(order(Vec::new()).check().is_err());

        let mut bad_phone = order(vec![item(1)]);
        bad_phone.customer_phone = Some("12345".to_string());
        assert!(bad_phone.check().is_err());
    }
}
