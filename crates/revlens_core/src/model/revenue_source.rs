//! Revenue source model.
//!
//! # Responsibility
//! - Describe the two upstream feeds (revenue events, external connections).
//! - Hold the reconciled revenue source value consumed by queries.
//!
//! # Invariants
//! - `RevenueSources` only ever holds connections with
//!   `revenue_analytics_enabled == true`; the filter runs at construction.
//! - Lists are never absent: missing feed data is an empty list.

use crate::model::query::RevenueSourceIds;
use serde::{Deserialize, Serialize};

/// One event definition tracked as revenue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    pub event_name: String,
}

impl EventSource {
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
        }
    }
}

/// One external data-warehouse connection (e.g. a Stripe account).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalSource {
    pub id: String,
    /// Connector family, e.g. `Stripe`.
    pub source_type: String,
    pub revenue_analytics_enabled: bool,
}

/// Reconciled revenue sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSources {
    events: Vec<EventSource>,
    data_warehouse_sources: Vec<ExternalSource>,
}

impl RevenueSources {
    /// Builds the reconciled value: events pass through, connections are
    /// filtered to the enabled ones.
    pub fn from_feeds(events: Vec<EventSource>, connections: Vec<ExternalSource>) -> Self {
        Self {
            events,
            data_warehouse_sources: connections
                .into_iter()
                .filter(|source| source.revenue_analytics_enabled)
                .collect(),
        }
    }

    pub fn events(&self) -> &[EventSource] {
        &self.events
    }

    pub fn data_warehouse_sources(&self) -> &[ExternalSource] {
        &self.data_warehouse_sources
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.data_warehouse_sources.is_empty()
    }

    pub fn has_event(&self, event_name: &str) -> bool {
        self.events.iter().any(|event| event.event_name == event_name)
    }

    pub fn has_source(&self, source_id: &str) -> bool {
        self.data_warehouse_sources
            .iter()
            .any(|source| source.id == source_id)
    }

    /// Wire projection: event names and connection ids only.
    pub fn ids(&self) -> RevenueSourceIds {
        RevenueSourceIds {
            events: self
                .events
                .iter()
                .map(|event| event.event_name.clone())
                .collect(),
            data_warehouse_sources: self
                .data_warehouse_sources
                .iter()
                .map(|source| source.id.clone())
                .collect(),
        }
    }
}
