//! Dashboard session configuration.
//!
//! # Responsibility
//! - Hold per-session settings: tenant, initial date range, fallback
//!   currency, and whether preferences persist.
//! - Validate settings before a store is built from them.
//!
//! # Invariants
//! - A validated config always has a positive team id, a non-empty currency
//!   code and a parsable initial `date_from` (when set).

use crate::model::currency::DEFAULT_BASE_CURRENCY;
use crate::model::date_filter::DateToken;
use crate::model::preferences::TeamId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Date selector value a fresh dashboard opens with.
pub const INITIAL_DATE_FROM: &str = "yStart";

/// Configuration for one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub team_id: TeamId,
    pub initial_date_from: Option<String>,
    pub initial_date_to: Option<String>,
    /// Used until the settings collaborator reports a base currency.
    pub default_base_currency: String,
    pub persist_preferences: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            team_id: TeamId(1),
            initial_date_from: Some(INITIAL_DATE_FROM.to_string()),
            initial_date_to: None,
            default_base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            persist_preferences: true,
        }
    }
}

impl DashboardConfig {
    pub fn for_team(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Self::default()
        }
    }

    /// Parses a JSON document; absent keys take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.team_id.0 <= 0 {
            return Err(ConfigError::InvalidTeamId(self.team_id.0));
        }
        if self.default_base_currency.trim().is_empty() {
            return Err(ConfigError::EmptyCurrency);
        }
        if let Some(date_from) = self.initial_date_from.as_deref() {
            if DateToken::parse(date_from).is_none() {
                return Err(ConfigError::InvalidDateFrom(date_from.to_string()));
            }
        }
        Ok(())
    }
}

/// Configuration load/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    InvalidTeamId(i64),
    EmptyCurrency,
    InvalidDateFrom(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid dashboard config: {message}"),
            Self::InvalidTeamId(value) => write!(f, "team id must be positive, got {value}"),
            Self::EmptyCurrency => write!(f, "default base currency must not be empty"),
            Self::InvalidDateFrom(value) => {
                write!(f, "initial date_from is not a recognised date token: `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}
