//! Command-line driver for the dashboard engine.
//!
//! Usage: `revlens_cli [date_from] [date_to] [currency]`
//!
//! Mounts a dashboard over fixed sample feeds, applies the date range and
//! prints the compiled queries and affordance flags as JSON.

use revlens_core::model::query::REVENUE_ANALYTICS_DATA_COLLECTION_NODE_ID;
use revlens_core::{
    Action, DashboardConfig, DashboardStore, EventSource, ExternalSource, LoadedFeeds,
    ManagedView, ManagedViewKind, SchemaSnapshot, SystemClock, WarehouseTable,
};
use std::error::Error;

fn sample_feeds() -> LoadedFeeds {
    LoadedFeeds {
        base_currency: Some("USD".to_string()),
        revenue_events: Some(vec![EventSource::new("purchase")]),
        data_warehouse_sources: Some(vec![
            ExternalSource {
                id: "src_stripe_main".to_string(),
                source_type: "Stripe".to_string(),
                revenue_analytics_enabled: true,
            },
            ExternalSource {
                id: "src_stripe_legacy".to_string(),
                source_type: "Stripe".to_string(),
                revenue_analytics_enabled: false,
            },
        ]),
        schema: Some(SchemaSnapshot {
            managed_views: vec![
                ManagedView {
                    id: "view_main_charge".to_string(),
                    kind: ManagedViewKind::RevenueAnalyticsCharge,
                    name: "stripe_main.charge_revenue_view".to_string(),
                    source_id: Some("src_stripe_main".to_string()),
                },
                ManagedView {
                    id: "view_legacy_charge".to_string(),
                    kind: ManagedViewKind::RevenueAnalyticsCharge,
                    name: "stripe_legacy.charge_revenue_view".to_string(),
                    source_id: Some("src_stripe_legacy".to_string()),
                },
                ManagedView {
                    id: "view_purchase_charge".to_string(),
                    kind: ManagedViewKind::RevenueAnalyticsCharge,
                    name: "purchase".to_string(),
                    source_id: None,
                },
            ],
            warehouse_tables: vec![WarehouseTable {
                name: "stripe_main_charge".to_string(),
                source_type: "Stripe".to_string(),
            }],
        }),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let date_from = args.next();
    let date_to = args.next().filter(|value| value != "null" && !value.is_empty());
    let currency = args.next();

    let config = DashboardConfig::default();
    let feeds = sample_feeds();
    let mut store = DashboardStore::mount(&config, Box::new(SystemClock), &feeds, &feeds);
    if let Some(code) = currency {
        store.dispatch(Action::SetBaseCurrency(code));
    }
    if date_from.is_some() || date_to.is_some() {
        store.set_dates(date_from, date_to);
    }

    let queries: Vec<serde_json::Value> = store
        .queries()
        .iter()
        .map(|(panel, query)| {
            serde_json::json!({
                "dashboardItemId": panel.dashboard_item_id(),
                "dataCollectionNodeId": REVENUE_ANALYTICS_DATA_COLLECTION_NODE_ID,
                "query": query,
            })
        })
        .collect();
    let report = serde_json::json!({
        "version": revlens_core::core_version(),
        "dateFilter": store.date_filter(),
        "queries": queries,
        "flags": store.flags(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
