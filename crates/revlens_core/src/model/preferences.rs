//! Per-tenant persisted dashboard preferences.

use crate::model::display::DisplayMode;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Tenant key for persisted preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl Display for TeamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The subset of dashboard state that survives restarts.
///
/// Interval is not stored; it is re-derived from the bounds on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPreferences {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub growth_rate_display_mode: DisplayMode,
    pub top_customers_display_mode: DisplayMode,
}
