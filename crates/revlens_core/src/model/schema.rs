//! Schema-introspection snapshot: managed views and warehouse tables.

use crate::model::revenue_source::RevenueSources;
use serde::{Deserialize, Serialize};

/// Warehouse source type whose tables count as revenue tables.
pub const REVENUE_TABLE_SOURCE_TYPE: &str = "Stripe";

/// Managed view families produced for revenue analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedViewKind {
    RevenueAnalyticsCharge,
    RevenueAnalyticsCustomer,
    RevenueAnalyticsInvoiceItem,
    RevenueAnalyticsProduct,
    RevenueAnalyticsSubscription,
}

/// A precomputed database view.
///
/// `source_id` is set for views built from a connected warehouse source and
/// absent (or empty) for views built from revenue events, whose `name` is the
/// event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedView {
    pub id: String,
    pub kind: ManagedViewKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl ManagedView {
    /// Whether this view is backed by one of the reconciled revenue sources.
    pub fn belongs_to(&self, sources: &RevenueSources) -> bool {
        match self.source_id.as_deref().filter(|id| !id.is_empty()) {
            Some(source_id) => sources.has_source(source_id),
            None => sources.has_event(&self.name),
        }
    }
}

/// One table synced from a warehouse source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseTable {
    pub name: String,
    pub source_type: String,
}

/// Everything the schema collaborator reports in one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub managed_views: Vec<ManagedView>,
    #[serde(default)]
    pub warehouse_tables: Vec<WarehouseTable>,
}

impl SchemaSnapshot {
    /// Charge views backed by the given sources, in snapshot order.
    pub fn charge_views_for(&self, sources: &RevenueSources) -> Vec<ManagedView> {
        self.managed_views
            .iter()
            .filter(|view| view.kind == ManagedViewKind::RevenueAnalyticsCharge)
            .filter(|view| view.belongs_to(sources))
            .cloned()
            .collect()
    }

    pub fn has_revenue_tables(&self) -> bool {
        self.warehouse_tables
            .iter()
            .any(|table| table.source_type == REVENUE_TABLE_SOURCE_TYPE)
    }
}
