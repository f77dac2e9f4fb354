// ABOUTME: HTTP client for the storefront REST API
// Thin reqwest wrapper implementing the CheckoutApi collaborator

use crate::api::types::{ApiErrorBody, Location, OrderRequest, UpdateOrderRequest};
use crate::api::CheckoutApi;
use crate::config::ApiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned by the storefront API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or protocol failure before a response was received
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status {
        status: u16,
        user_message: Option<String>,
        body: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided text meant for end users, if any
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Status { user_message, .. } => user_message.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpCheckoutApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCheckoutApi {
    /// Create a client from the API section of the app config
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token taken from the session
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        debug!("{} {}", method, path);
        let response = self.request(method, path).json(body).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let user_message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(ApiErrorBody::best_message);
        warn!("Storefront API error {}: {}", status, body);

        Err(ApiError::Status {
            status: status.as_u16(),
            user_message,
            body,
        })
    }
}

#[async_trait]
impl CheckoutApi for HttpCheckoutApi {
    async fn locations_for_business(&self, business_id: &str) -> Result<Vec<Location>, ApiError> {
        let path = format!("/locations/business/{business_id}");
        debug!("GET {}", path);

        let response = self.request(Method::GET, &path).send().await?;
        let response = Self::check_status(response).await?;
        let text = response.text().await?;

        let locations: Vec<Location> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        debug!("Loaded {} locations for business {}", locations.len(), business_id);
        Ok(locations)
    }

    async fn place_order(&self, order_id: &str, request: &OrderRequest) -> Result<(), ApiError> {
        self.send_json(Method::POST, &format!("/orders/{order_id}/place"), request)
            .await
    }

    async fn create_and_place_public_order(
        &self,
        business_id: &str,
        request: &OrderRequest,
    ) -> Result<(), ApiError> {
        self.send_json(
            Method::POST,
            &format!("/public/businesses/{business_id}/orders"),
            request,
        )
        .await
    }

    async fn update_order(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/orders/{order_id}"), request)
            .await
    }

    async fn update_order_for_agent(
        &self,
        order_id: &str,
        request: &UpdateOrderRequest,
    ) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/agent/orders/{order_id}"), request)
            .await
    }
}
