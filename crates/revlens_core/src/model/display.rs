//! Display preferences for the growth-rate and top-customers panels.

use serde::{Deserialize, Serialize};

/// Rendering mode for a panel that supports both chart and table output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Line,
    Table,
}

impl DisplayMode {
    /// Stable string used in persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Table => "table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "line" => Some(Self::Line),
            "table" => Some(Self::Table),
            _ => None,
        }
    }
}

/// Selects which panel a display-mode action addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayTarget {
    GrowthRate,
    TopCustomers,
}

/// Grouping for the top-customers query.
///
/// Never set directly: it follows the top-customers display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopCustomersGroupBy {
    /// One row per customer across the whole range.
    All,
    /// One row per customer per month.
    Month,
}

impl From<DisplayMode> for TopCustomersGroupBy {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Table => Self::All,
            DisplayMode::Line => Self::Month,
        }
    }
}
