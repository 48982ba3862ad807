//! UI affordance flags derived from dashboard state.

use serde::Serialize;

/// A boolean that may not be known yet.
///
/// `Loading` is distinct from `Present(false)`: the first means the source
/// has not reported, the second that it reported and the answer is no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Availability {
    Loading,
    Present(bool),
}

impl Availability {
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the answer once known.
    pub fn known(self) -> Option<bool> {
        match self {
            Self::Loading => None,
            Self::Present(value) => Some(value),
        }
    }
}

/// Flags consumed by the dashboard's UI controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordanceFlags {
    pub has_revenue_events: bool,
    pub has_revenue_tables: Availability,
    pub disabled_growth_mode_selection: bool,
    pub disabled_top_customers_mode_selection: bool,
}
