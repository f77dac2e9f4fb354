// ABOUTME: Shared CLI utilities for loading input files and building API clients

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::api::HttpCheckoutApi;
use crate::config::AppConfig;
use crate::session::SessionStore;

/// Read and parse a JSON input file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// HTTP client configured from the app config, authenticated with the session token
pub fn api_client(config: &AppConfig, session: &SessionStore) -> Result<HttpCheckoutApi> {
    Ok(HttpCheckoutApi::new(&config.api)?.with_token(session.token()))
}

/// Truncate a string to fit in the given width (character-aware for UTF-8)
pub fn truncate(s: &str, max_len: usize) -> String {
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
