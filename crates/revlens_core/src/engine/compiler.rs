//! Query compiler: dashboard state to the four emitted query specs.
//!
//! # Responsibility
//! - Build the overview, gross revenue, growth rate and top customers
//!   queries from one consistent set of inputs.
//!
//! # Invariants
//! - Pure and infallible: empty inputs compile to valid queries over empty
//!   source sets.
//! - Top-customers grouping is derived from its display mode, and the table
//!   envelope is applied exactly when grouping is all-time.

use crate::model::currency::currency_symbol;
use crate::model::date_filter::DateFilter;
use crate::model::display::{DisplayMode, TopCustomersGroupBy};
use crate::model::query::{
    AxisFormat, ChartDisplayType, CompiledQueries, DataTableNode, DataWarehouseNode,
    GrowthRateQuery, InsightVizNode, MathType, OverviewQuery, QuerySpec, TopCustomersQuery,
    TrendsFilter, TrendsQuery, GROWTH_RATE_TABLE_COLUMNS, TOP_CUSTOMERS_TABLE_COLUMNS,
};
use crate::model::revenue_source::RevenueSources;
use crate::model::schema::ManagedView;

const GROSS_REVENUE_LABEL: &str = "Gross revenue";
const CHARGE_ID_FIELD: &str = "id";
const CHARGE_TIMESTAMP_FIELD: &str = "timestamp";
const CHARGE_AMOUNT_FIELD: &str = "amount";

/// Everything the compiler reads.
#[derive(Debug, Clone, Copy)]
pub struct CompilerInputs<'a> {
    pub date_filter: &'a DateFilter,
    pub revenue_sources: &'a RevenueSources,
    /// Charge views already filtered to the reconciled sources.
    pub charge_views: &'a [ManagedView],
    pub growth_rate_display_mode: DisplayMode,
    pub top_customers_display_mode: DisplayMode,
    pub base_currency: &'a str,
}

/// Compiles the four dashboard queries.
pub fn compile_queries(inputs: &CompilerInputs<'_>) -> CompiledQueries {
    let date_range = inputs.date_filter.date_range();
    let revenue_sources = inputs.revenue_sources.ids();
    let top_customers_group_by = TopCustomersGroupBy::from(inputs.top_customers_display_mode);

    CompiledQueries {
        overview: QuerySpec::Overview(OverviewQuery {
            revenue_sources: revenue_sources.clone(),
            date_range: date_range.clone(),
        }),
        gross_revenue: gross_revenue_query(inputs),
        growth_rate: wrap_in_data_table_if(
            QuerySpec::GrowthRate(GrowthRateQuery {
                date_range: date_range.clone(),
                revenue_sources: revenue_sources.clone(),
            }),
            &GROWTH_RATE_TABLE_COLUMNS,
            inputs.growth_rate_display_mode == DisplayMode::Table,
        ),
        top_customers: wrap_in_data_table_if(
            QuerySpec::TopCustomers(TopCustomersQuery {
                date_range,
                revenue_sources,
                group_by: top_customers_group_by,
            }),
            &TOP_CUSTOMERS_TABLE_COLUMNS,
            top_customers_group_by == TopCustomersGroupBy::All,
        ),
    }
}

fn gross_revenue_query(inputs: &CompilerInputs<'_>) -> QuerySpec {
    let stacked = inputs.charge_views.len() > 1;
    let series = inputs
        .charge_views
        .iter()
        .map(|view| DataWarehouseNode {
            id: view.name.clone(),
            name: view.name.clone(),
            custom_name: if stacked {
                format!("{GROSS_REVENUE_LABEL} for {}", view.name)
            } else {
                GROSS_REVENUE_LABEL.to_string()
            },
            id_field: CHARGE_ID_FIELD.to_string(),
            distinct_id_field: CHARGE_ID_FIELD.to_string(),
            timestamp_field: CHARGE_TIMESTAMP_FIELD.to_string(),
            table_name: view.name.clone(),
            math: MathType::Sum,
            math_property: CHARGE_AMOUNT_FIELD.to_string(),
        })
        .collect();

    let (aggregation_axis_prefix, aggregation_axis_postfix) =
        currency_symbol(inputs.base_currency).axis_affixes();

    QuerySpec::InsightViz(InsightVizNode {
        embedded: false,
        hide_persons_modal: true,
        hide_tooltip_on_scroll: true,
        source: TrendsQuery {
            series,
            interval: inputs.date_filter.interval(),
            date_range: inputs.date_filter.date_range(),
            trends_filter: TrendsFilter {
                display: if stacked {
                    ChartDisplayType::ActionsAreaGraph
                } else {
                    ChartDisplayType::ActionsLineGraph
                },
                aggregation_axis_format: AxisFormat::Numeric,
                aggregation_axis_prefix,
                aggregation_axis_postfix,
            },
        },
    })
}

fn wrap_in_data_table_if(query: QuerySpec, columns: &[&str], needed: bool) -> QuerySpec {
    if !needed {
        return query;
    }

    QuerySpec::DataTable(DataTableNode {
        source: Box::new(query),
        full: true,
        embedded: false,
        show_actions: true,
        columns: columns.iter().map(|column| (*column).to_string()).collect(),
    })
}
