//! Revenue source reconciliation across two independent loaders.
//!
//! # Responsibility
//! - Remember the latest result of the event-definition feed and of the
//!   external-connection feed.
//! - Rebuild the unified `RevenueSources` value when a trigger fires.
//!
//! # Invariants
//! - `set_revenue_sources` is idempotent: identical input reports no change.
//! - The final value does not depend on which feed completes first.
//! - Disabled connections are dropped when the value is built.

use crate::model::revenue_source::{EventSource, ExternalSource, RevenueSources};
use log::debug;

/// What one feed update changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedUpdate {
    /// The remembered feed result differs from before.
    pub feed_changed: bool,
    /// The reconciled `RevenueSources` value differs from before.
    pub sources_changed: bool,
}

/// Owner of the reconciled revenue sources.
#[derive(Debug, Clone, Default)]
pub struct SourceReconciler {
    events_feed: Option<Vec<EventSource>>,
    connections_feed: Option<Vec<ExternalSource>>,
    sources: RevenueSources,
}

impl SourceReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the reconciled value.
    pub fn sources(&self) -> &RevenueSources {
        &self.sources
    }

    /// Latest event-definition feed result, if it has reported.
    pub fn events_feed(&self) -> Option<&[EventSource]> {
        self.events_feed.as_deref()
    }

    /// Latest external-connection feed result, if it has reported.
    pub fn connections_feed(&self) -> Option<&[ExternalSource]> {
        self.connections_feed.as_deref()
    }

    /// Replaces the reconciled value. Returns whether it changed.
    pub fn set_revenue_sources(
        &mut self,
        events: Vec<EventSource>,
        connections: Vec<ExternalSource>,
    ) -> bool {
        let offered = connections.len();
        let next = RevenueSources::from_feeds(events, connections);
        let dropped = offered - next.data_warehouse_sources().len();
        if dropped > 0 {
            debug!(
                "event=revenue_sources_filter module=reconciler status=ok dropped_disabled={}",
                dropped
            );
        }

        if next == self.sources {
            return false;
        }
        self.sources = next;
        true
    }

    /// Records feeds already loaded when the dashboard mounts.
    ///
    /// Reconciles only when both feeds hold results.
    pub fn mount(
        &mut self,
        events: Option<Vec<EventSource>>,
        connections: Option<Vec<ExternalSource>>,
    ) -> FeedUpdate {
        let mut update = FeedUpdate::default();
        if let Some(events) = events {
            update.feed_changed |= self.remember_events(events);
        }
        if let Some(connections) = connections {
            self.connections_feed = Some(connections);
        }

        if let Some((events, connections)) = self.both_feeds() {
            update.sources_changed = self.set_revenue_sources(events, connections);
        }
        update
    }

    /// Handles a completed event-definition load.
    ///
    /// Reconciles when connections have already reported, so a late event
    /// feed still reaches the unified value.
    pub fn events_loaded(&mut self, events: Vec<EventSource>) -> FeedUpdate {
        let feed_changed = self.remember_events(events);
        let sources_changed = match self.both_feeds() {
            Some((events, connections)) => self.set_revenue_sources(events, connections),
            None => false,
        };
        FeedUpdate {
            feed_changed,
            sources_changed,
        }
    }

    /// Handles a completed external-connection load.
    ///
    /// Always reconciles; events that have not reported count as empty.
    pub fn connections_loaded(&mut self, connections: Vec<ExternalSource>) -> FeedUpdate {
        let feed_changed = self.connections_feed.as_ref() != Some(&connections);
        self.connections_feed = Some(connections.clone());
        let events = self.events_feed.clone().unwrap_or_default();
        FeedUpdate {
            feed_changed,
            sources_changed: self.set_revenue_sources(events, connections),
        }
    }

    fn both_feeds(&self) -> Option<(Vec<EventSource>, Vec<ExternalSource>)> {
        Some((self.events_feed.clone()?, self.connections_feed.clone()?))
    }

    fn remember_events(&mut self, events: Vec<EventSource>) -> bool {
        if self.events_feed.as_ref() == Some(&events) {
            return false;
        }
        self.events_feed = Some(events);
        true
    }
}
