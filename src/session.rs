// ABOUTME: Session role lookup for the checkout wizard
// Reads the signed-in role from the session file and exposes it as an injectable capability

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Role of the signed-in dashboard user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Agent,
    Manager,
    Customer,
    #[default]
    Anonymous,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Manager => "manager",
            Self::Customer => "customer",
            Self::Anonymous => "anonymous",
        }
    }

    /// Lenient parse used for stored sessions: anything unrecognised is anonymous
    pub fn from_session_value(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agent" => Ok(Self::Agent),
            "manager" => Ok(Self::Manager),
            "customer" => Ok(Self::Customer),
            "anonymous" | "" => Ok(Self::Anonymous),
            other => Err(anyhow::anyhow!("Unknown role: {other}")),
        }
    }
}

/// Capability for reading the current user's role
pub trait RoleProvider: Send + Sync {
    fn current_role(&self) -> Role;
}

/// Fixed role, used for CLI overrides and tests
#[derive(Debug, Clone, Copy)]
pub struct StaticRole(pub Role);

impl RoleProvider for StaticRole {
    fn current_role(&self) -> Role {
        self.0
    }
}

/// On-disk session file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Session store backed by a TOML file written by the dashboard login flow
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: ~/.storefront/session.toml
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".storefront").join("session.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session file. A missing file means nobody is signed in.
    pub fn load(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))
    }

    pub fn save(&self, session: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.load().ok().and_then(|s| s.token)
    }
}

impl RoleProvider for SessionStore {
    fn current_role(&self) -> Role {
        match self.load() {
            Ok(session) => Role::from_session_value(&session.role),
            Err(e) => {
                tracing::warn!("Failed to read session role: {:#}", e);
                Role::Anonymous
            }
        }
    }
}
