// ABOUTME: Recording in-memory CheckoutApi for integration tests
//
// Provides:
// - FakeApi: serves canned locations and records every submission call
// - ApiCall: one recorded backend call with its arguments

use async_trait::async_trait;
use std::sync::Mutex;
use storefront_checkout::api::{
    ApiError, CheckoutApi, Location, OrderRequest, UpdateOrderRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Locations(String),
    PlaceOrder(String, OrderRequest),
    CreateAndPlace(String, OrderRequest),
    UpdateOrder(String, UpdateOrderRequest),
    UpdateOrderForAgent(String, UpdateOrderRequest),
}

#[derive(Debug, Default)]
pub struct FakeApi {
    locations: Vec<Location>,
    fail_locations: bool,
    /// Status and optional user message returned by every submission
    submit_failure: Option<(u16, Option<String>)>,
    calls: Mutex<Vec<ApiCall>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn with_locations(locations: Vec<Location>) -> Self {
        Self {
            locations,
            ..Self::default()
        }
    }

    pub fn failing_locations() -> Self {
        Self {
            fail_locations: true,
            ..Self::default()
        }
    }

    pub fn failing_submit(mut self, status: u16, user_message: Option<&str>) -> Self {
        self.submit_failure = Some((status, user_message.map(str::to_string)));
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submission_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, ApiCall::Locations(_)))
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn submit_result(&self) -> Result<(), ApiError> {
        match &self.submit_failure {
            Some((status, user_message)) => Err(ApiError::Status {
                status: *status,
                user_message: user_message.clone(),
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CheckoutApi for FakeApi {
    async fn locations_for_business(&self, business_id: &str) -> Result<Vec<Location>, ApiError> {
        self.record(ApiCall::Locations(business_id.to_string()));
        if self.fail_locations {
            return Err(ApiError::Status {
                status: 503,
                user_message: None,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.locations.clone())
    }

    async fn place_order(&self, order_id: &str, request: &OrderRequest) -> Result<(), ApiError> {
        self.record(ApiCall::PlaceOrder(order_id.to_string(), request.clone()));
        self.submit_result()
    }

    async fn create_and_place_public_order(
        &self,
        business_id: &str,
        request: &OrderRequest,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::CreateAndPlace(business_id.to_string(), request.clone()));
        self.submit_result()
    }

    async fn update_order(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::UpdateOrder(order_id.to_string(), request.clone()));
        self.submit_result()
    }

    async fn update_order_for_agent(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::UpdateOrderForAgent(order_id.to_string(), request.clone()));
        self.submit_result()
    }
}

pub fn location(id: &str, street: &str, city: &str) -> Location {
    Location {
        id: id.to_string(),
        name: format!("Store {id}"),
        street_address: street.to_string(),
        city: city.to_string(),
        phone_number: String::new(),
    }
}
