// ABOUTME: Storefront REST API integration used by the checkout wizard
// Defines the collaborator trait the wizard talks to and its HTTP implementation

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::{ApiError, HttpCheckoutApi};
pub use types::{Location, OrderRequest, ProductLine, UpdateOrderRequest};

/// Backend operations consumed by the checkout wizard
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// All pickup locations belonging to a business
    async fn locations_for_business(&self, business_id: &str) -> Result<Vec<Location>, ApiError>;

    /// Place an existing draft order
    async fn place_order(&self, order_id: &str, request: &OrderRequest) -> Result<(), ApiError>;

    /// Create and place an order from the public storefront
    async fn create_and_place_public_order(
        &self,
        business_id: &str,
        request: &OrderRequest,
    ) -> Result<(), ApiError>;

    /// Update a placed order as a manager
    async fn update_order(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<(), ApiError>;

    /// Update a placed order as an agent
    async fn update_order_for_agent(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<(), ApiError>;
}
