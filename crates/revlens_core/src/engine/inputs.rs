//! Read-only collaborator interfaces injected at mount time.
//!
//! Collaborators report what they have loaded so far; later completions are
//! delivered to the store as actions.

use crate::model::revenue_source::{EventSource, ExternalSource};
use crate::model::schema::SchemaSnapshot;
use chrono::NaiveDate;

/// Source of "today" for relative date resolution.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Revenue settings collaborator.
///
/// `None` means the corresponding loader has not reported yet.
pub trait RevenueSettingsReader {
    fn base_currency(&self) -> Option<String>;
    fn revenue_events(&self) -> Option<Vec<EventSource>>;
    fn data_warehouse_sources(&self) -> Option<Vec<ExternalSource>>;
}

/// Schema-introspection collaborator.
pub trait SchemaReader {
    fn schema(&self) -> Option<SchemaSnapshot>;
}

/// In-memory snapshot of collaborator state.
///
/// Used by the CLI and by tests; also a convenient adapter for hosts
/// that already hold the loaded values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedFeeds {
    pub base_currency: Option<String>,
    pub revenue_events: Option<Vec<EventSource>>,
    pub data_warehouse_sources: Option<Vec<ExternalSource>>,
    pub schema: Option<SchemaSnapshot>,
}

impl RevenueSettingsReader for LoadedFeeds {
    fn base_currency(&self) -> Option<String> {
        self.base_currency.clone()
    }

    fn revenue_events(&self) -> Option<Vec<EventSource>> {
        self.revenue_events.clone()
    }

    fn data_warehouse_sources(&self) -> Option<Vec<ExternalSource>> {
        self.data_warehouse_sources.clone()
    }
}

impl SchemaReader for LoadedFeeds {
    fn schema(&self) -> Option<SchemaSnapshot> {
        self.schema.clone()
    }
}
