// ABOUTME: Wire types exchanged with the storefront REST API
// Field names follow the backend's camelCase JSON conventions

use serde::{Deserialize, Serialize};

/// A physical business location eligible for order pickup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub street_address: String,
    pub city: String,
    #[serde(default)]
    pub phone_number: String,
}

/// One product line of an order request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price_per_unit: f64,
}

/// Body for placing a draft order or creating a public storefront order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub customer_street_address: String,
    pub customer_city: String,
    pub pickup_location_id: String,
    pub products: Vec<ProductLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body for updating an already placed order. Customer identity is immutable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub pickup_location_id: String,
    pub products: Vec<ProductLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Error payload returned by the backend on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// The most specific user-facing text in the payload
    pub fn best_message(self) -> Option<String> {
        [self.user_message, self.message]
            .into_iter()
            .flatten()
            .map(|m| m.trim().to_string())
            .find(|m| !m.is_empty())
    }
}
