//! Query specifications emitted to the query execution layer.
//!
//! # Responsibility
//! - Define the wire shape of every query node the dashboard emits.
//! - Name the four dashboard queries and their stable item ids.
//!
//! # Invariants
//! - Serialized field names match what the query backend expects; tests pin
//!   them.
//! - Query values are ephemeral and never persisted.

use crate::model::date_filter::Interval;
use crate::model::display::TopCustomersGroupBy;
use serde::{Deserialize, Serialize};

/// Data collection node shared by every dashboard query.
pub const REVENUE_ANALYTICS_DATA_COLLECTION_NODE_ID: &str = "revenue-analytics";

/// Columns of the growth-rate table.
pub const GROWTH_RATE_TABLE_COLUMNS: [&str; 4] =
    ["month", "mrr", "previous_mrr", "mrr_growth_rate"];
/// Columns of the top-customers table.
pub const TOP_CUSTOMERS_TABLE_COLUMNS: [&str; 4] = ["name", "customer_id", "amount", "month"];

/// The four panels of the revenue dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DashboardQuery {
    Overview,
    GrossRevenue,
    GrowthRate,
    TopCustomers,
}

impl DashboardQuery {
    pub const ALL: [Self; 4] = [
        Self::Overview,
        Self::GrossRevenue,
        Self::GrowthRate,
        Self::TopCustomers,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Overview => 0,
            Self::GrossRevenue => 1,
            Self::GrowthRate => 2,
            Self::TopCustomers => 3,
        }
    }

    /// Ad-hoc dashboard item id used to key insight caches.
    pub fn dashboard_item_id(self) -> String {
        format!("new-AdHoc.revenue-analytics.{}", self.ordinal())
    }
}

/// Raw date bounds as picked by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Revenue sources projected to identifiers only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSourceIds {
    pub events: Vec<String>,
    pub data_warehouse_sources: Vec<String>,
}

/// One emitted query node, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum QuerySpec {
    #[serde(rename = "RevenueAnalyticsOverviewQuery")]
    Overview(OverviewQuery),
    #[serde(rename = "InsightVizNode")]
    InsightViz(InsightVizNode),
    #[serde(rename = "RevenueAnalyticsGrowthRateQuery")]
    GrowthRate(GrowthRateQuery),
    #[serde(rename = "RevenueAnalyticsTopCustomersQuery")]
    TopCustomers(TopCustomersQuery),
    #[serde(rename = "DataTableNode")]
    DataTable(DataTableNode),
}

impl QuerySpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Overview(_) => "RevenueAnalyticsOverviewQuery",
            Self::InsightViz(_) => "InsightVizNode",
            Self::GrowthRate(_) => "RevenueAnalyticsGrowthRateQuery",
            Self::TopCustomers(_) => "RevenueAnalyticsTopCustomersQuery",
            Self::DataTable(_) => "DataTableNode",
        }
    }

    /// Returns the tabular envelope when this node is one.
    pub fn as_data_table(&self) -> Option<&DataTableNode> {
        match self {
            Self::DataTable(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the query inside a tabular envelope, or `self` when bare.
    pub fn inner(&self) -> &QuerySpec {
        match self {
            Self::DataTable(node) => node.source.as_ref(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewQuery {
    pub revenue_sources: RevenueSourceIds,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRateQuery {
    pub date_range: DateRange,
    pub revenue_sources: RevenueSourceIds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomersQuery {
    pub date_range: DateRange,
    pub revenue_sources: RevenueSourceIds,
    pub group_by: TopCustomersGroupBy,
}

/// Chart wrapper around a trends query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightVizNode {
    pub embedded: bool,
    pub hide_persons_modal: bool,
    pub hide_tooltip_on_scroll: bool,
    pub source: TrendsQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "TrendsQuery", rename_all = "camelCase")]
pub struct TrendsQuery {
    pub series: Vec<DataWarehouseNode>,
    pub interval: Interval,
    pub date_range: DateRange,
    pub trends_filter: TrendsFilter,
}

/// One trends series read from a warehouse table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "DataWarehouseNode")]
pub struct DataWarehouseNode {
    pub id: String,
    pub name: String,
    pub custom_name: String,
    pub id_field: String,
    pub distinct_id_field: String,
    pub timestamp_field: String,
    pub table_name: String,
    pub math: MathType,
    pub math_property: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathType {
    Sum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartDisplayType {
    ActionsLineGraph,
    ActionsAreaGraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisFormat {
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsFilter {
    pub display: ChartDisplayType,
    pub aggregation_axis_format: AxisFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_axis_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_axis_postfix: Option<String>,
}

/// Tabular envelope requesting a fixed column projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTableNode {
    pub source: Box<QuerySpec>,
    pub full: bool,
    pub embedded: bool,
    pub show_actions: bool,
    pub columns: Vec<String>,
}

/// The full set of dashboard queries for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQueries {
    pub overview: QuerySpec,
    pub gross_revenue: QuerySpec,
    pub growth_rate: QuerySpec,
    pub top_customers: QuerySpec,
}

impl CompiledQueries {
    pub fn get(&self, query: DashboardQuery) -> &QuerySpec {
        match query {
            DashboardQuery::Overview => &self.overview,
            DashboardQuery::GrossRevenue => &self.gross_revenue,
            DashboardQuery::GrowthRate => &self.growth_rate,
            DashboardQuery::TopCustomers => &self.top_customers,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DashboardQuery, &QuerySpec)> + '_ {
        DashboardQuery::ALL
            .into_iter()
            .map(move |query| (query, self.get(query)))
    }
}
