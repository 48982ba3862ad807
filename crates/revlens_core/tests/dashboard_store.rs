use chrono::NaiveDate;
use revlens_core::model::query::{QuerySpec, TOP_CUSTOMERS_TABLE_COLUMNS};
use revlens_core::{
    Action, Availability, DashboardConfig, DashboardStore, DerivedKey, DisplayMode,
    DisplayTarget, EventSource, ExternalSource, FixedClock, Interval, LoadedFeeds, ManagedView,
    ManagedViewKind, PersistedPreferences, SchemaSnapshot, StateField, TopCustomersGroupBy,
    WarehouseTable,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn store() -> DashboardStore {
    DashboardStore::new(&DashboardConfig::default(), Box::new(FixedClock(today())))
}

fn connection(id: &str, enabled: bool) -> ExternalSource {
    ExternalSource {
        id: id.to_string(),
        source_type: "Stripe".to_string(),
        revenue_analytics_enabled: enabled,
    }
}

fn charge_view(name: &str, source_id: &str) -> ManagedView {
    ManagedView {
        id: format!("view_{name}"),
        kind: ManagedViewKind::RevenueAnalyticsCharge,
        name: name.to_string(),
        source_id: Some(source_id.to_string()),
    }
}

fn schema(views: Vec<ManagedView>, stripe_table: bool) -> SchemaSnapshot {
    let warehouse_tables = if stripe_table {
        vec![WarehouseTable {
            name: "stripe_charge".to_string(),
            source_type: "Stripe".to_string(),
        }]
    } else {
        vec![WarehouseTable {
            name: "hubspot_contacts".to_string(),
            source_type: "Hubspot".to_string(),
        }]
    };
    SchemaSnapshot {
        managed_views: views,
        warehouse_tables,
    }
}

#[test]
fn initial_state_is_year_to_date_line_charts() {
    let store = store();

    assert_eq!(store.date_filter().date_from(), Some("yStart"));
    assert_eq!(store.date_filter().date_to(), None);
    assert_eq!(store.date_filter().interval(), Interval::Month);
    assert_eq!(store.display_mode(DisplayTarget::GrowthRate), DisplayMode::Line);
    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Line
    );
    assert!(store.revenue_sources().is_empty());
    assert_eq!(store.base_currency(), "USD");

    let flags = store.flags();
    assert!(!flags.has_revenue_events);
    assert_eq!(flags.has_revenue_tables, Availability::Loading);
    assert!(!flags.disabled_growth_mode_selection);
    assert!(!flags.disabled_top_customers_mode_selection);
}

#[test]
fn short_range_forces_tables_and_all_time_grouping() {
    let mut store = store();
    store.set_dates(Some("-7d".to_string()), None);

    assert_eq!(store.date_filter().interval(), Interval::Day);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Table
    );
    assert_eq!(store.top_customers_group_by(), TopCustomersGroupBy::All);

    let top = store
        .queries()
        .top_customers
        .as_data_table()
        .expect("top customers wrapped in a table");
    assert_eq!(top.columns, TOP_CUSTOMERS_TABLE_COLUMNS.to_vec());
    assert!(store.queries().growth_rate.as_data_table().is_some());

    let flags = store.flags();
    assert!(flags.disabled_growth_mode_selection);
    assert!(flags.disabled_top_customers_mode_selection);
}

#[test]
fn weekly_range_also_forces_tables() {
    let mut store = store();
    store.set_dates(Some("-90d".to_string()), None);

    assert_eq!(store.date_filter().interval(), Interval::Week);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
}

#[test]
fn monthly_range_keeps_previous_modes() {
    let mut store = store();
    store.set_dates(Some("-7d".to_string()), None);
    store.set_dates(Some("yStart".to_string()), None);

    assert_eq!(store.date_filter().interval(), Interval::Month);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Table
    );
    assert!(!store.flags().disabled_growth_mode_selection);

    store.set_display_mode(DisplayTarget::GrowthRate, DisplayMode::Line);
    store.set_dates(Some("-180d".to_string()), None);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Line
    );
    assert!(matches!(
        store.queries().growth_rate,
        QuerySpec::GrowthRate(_)
    ));
}

#[test]
fn user_override_holds_until_next_date_change() {
    let mut store = store();
    store.set_dates(Some("-7d".to_string()), None);
    store.set_display_mode(DisplayTarget::TopCustomers, DisplayMode::Line);

    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Line
    );
    assert_eq!(store.top_customers_group_by(), TopCustomersGroupBy::Month);

    store.set_dates(Some("-14d".to_string()), None);
    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Table
    );
}

#[test]
fn date_change_recomputes_each_dependent_once() {
    let mut store = store();
    let outcome = store.set_dates(Some("-7d".to_string()), None);

    assert_eq!(
        outcome.changed_fields,
        vec![
            StateField::DateFilter,
            StateField::GrowthRateDisplayMode,
            StateField::TopCustomersDisplayMode,
        ]
    );
    assert_eq!(store.recompute_count(DerivedKey::Queries), 1);
    assert_eq!(
        store.recompute_count(DerivedKey::DisabledGrowthModeSelection),
        1
    );
    assert_eq!(
        store.recompute_count(DerivedKey::DisabledTopCustomersModeSelection),
        1
    );
    assert_eq!(store.recompute_count(DerivedKey::ChargeRevenueViews), 0);
    assert_eq!(store.recompute_count(DerivedKey::HasRevenueTables), 0);
    assert_eq!(store.recompute_count(DerivedKey::HasRevenueEvents), 0);
}

#[test]
fn repeating_identical_dates_recomputes_nothing() {
    let mut store = store();
    store.set_dates(Some("-7d".to_string()), None);
    let before = store.recompute_count(DerivedKey::Queries);

    let outcome = store.set_dates(Some("-7d".to_string()), None);

    assert!(outcome.is_noop());
    assert_eq!(store.recompute_count(DerivedKey::Queries), before);
}

#[test]
fn revenue_table_availability_never_reverts_to_loading() {
    let mut store = store();
    assert!(store.has_revenue_tables().is_loading());

    store.dispatch(Action::SchemaLoaded(schema(Vec::new(), false)));
    assert_eq!(store.has_revenue_tables(), Availability::Present(false));

    store.dispatch(Action::SchemaLoaded(schema(Vec::new(), true)));
    assert_eq!(store.has_revenue_tables(), Availability::Present(true));

    store.set_dates(Some("-30d".to_string()), None);
    store.dispatch(Action::SourcesLoaded(Vec::new()));
    assert_eq!(store.has_revenue_tables(), Availability::Present(true));
}

#[test]
fn charge_views_follow_enabled_sources_only() {
    let mut store = store();
    store.dispatch(Action::SchemaLoaded(schema(
        vec![
            charge_view("stripe_a", "src_a"),
            charge_view("stripe_b", "src_b"),
        ],
        true,
    )));
    store.dispatch(Action::SourcesLoaded(vec![
        connection("src_a", true),
        connection("src_b", false),
    ]));

    let names: Vec<&str> = store
        .charge_revenue_views()
        .iter()
        .map(|view| view.name.as_str())
        .collect();
    assert_eq!(names, vec!["stripe_a"]);

    let QuerySpec::InsightViz(gross) = &store.queries().gross_revenue else {
        panic!("gross revenue should be an insight viz node");
    };
    assert_eq!(gross.source.series.len(), 1);
    assert_eq!(gross.source.series[0].custom_name, "Gross revenue");
}

#[test]
fn events_feed_drives_has_revenue_events() {
    let mut store = store();
    store.dispatch(Action::RevenueEventsLoaded(vec![EventSource::new(
        "purchase",
    )]));
    assert!(store.has_revenue_events());

    store.dispatch(Action::RevenueEventsLoaded(Vec::new()));
    assert!(!store.has_revenue_events());
}

#[test]
fn currency_change_recomputes_queries_only() {
    let mut store = store();
    let outcome = store.dispatch(Action::SetBaseCurrency("EUR".to_string()));

    assert_eq!(outcome.changed_fields, vec![StateField::BaseCurrency]);
    assert_eq!(outcome.recomputed, vec![DerivedKey::Queries]);
    assert!(!outcome.touches_persisted());

    let QuerySpec::InsightViz(gross) = &store.queries().gross_revenue else {
        panic!("gross revenue should be an insight viz node");
    };
    assert_eq!(
        gross.source.trends_filter.aggregation_axis_postfix.as_deref(),
        Some("€")
    );

    let blank = store.dispatch(Action::SetBaseCurrency("  ".to_string()));
    assert!(blank.is_noop());
    assert_eq!(store.base_currency(), "EUR");
}

#[test]
fn mount_applies_loaded_collaborator_state() {
    let feeds = LoadedFeeds {
        base_currency: Some("GBP".to_string()),
        revenue_events: Some(vec![EventSource::new("purchase")]),
        data_warehouse_sources: Some(vec![connection("src_a", true)]),
        schema: Some(schema(vec![charge_view("stripe_a", "src_a")], true)),
    };
    let store = DashboardStore::mount(
        &DashboardConfig::default(),
        Box::new(FixedClock(today())),
        &feeds,
        &feeds,
    );

    assert_eq!(store.base_currency(), "GBP");
    assert!(store.revenue_sources().has_event("purchase"));
    assert!(store.revenue_sources().has_source("src_a"));
    assert_eq!(store.charge_revenue_views().len(), 1);
    assert_eq!(store.flags().has_revenue_tables, Availability::Present(true));
    assert!(store.flags().has_revenue_events);
}

#[test]
fn mount_with_one_feed_waits_for_the_other() {
    let feeds = LoadedFeeds {
        revenue_events: Some(vec![EventSource::new("purchase")]),
        ..LoadedFeeds::default()
    };
    let mut store = DashboardStore::mount(
        &DashboardConfig::default(),
        Box::new(FixedClock(today())),
        &feeds,
        &feeds,
    );
    assert!(store.revenue_sources().is_empty());
    assert!(store.has_revenue_events());

    store.dispatch(Action::SourcesLoaded(vec![connection("src_a", true)]));
    assert!(store.revenue_sources().has_event("purchase"));
    assert!(store.revenue_sources().has_source("src_a"));
}

#[test]
fn restore_applies_correction_after_writing_modes() {
    let mut store = store();
    store.dispatch(Action::RestorePreferences(PersistedPreferences {
        date_from: Some("-7d".to_string()),
        date_to: None,
        growth_rate_display_mode: DisplayMode::Line,
        top_customers_display_mode: DisplayMode::Line,
    }));

    assert_eq!(store.date_filter().interval(), Interval::Day);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Table
    );

    let record = store.persisted_record();
    assert_eq!(record.date_from.as_deref(), Some("-7d"));
    assert_eq!(record.growth_rate_display_mode, DisplayMode::Table);
}

#[test]
fn restore_keeps_stored_modes_for_monthly_ranges() {
    let mut store = store();
    store.dispatch(Action::RestorePreferences(PersistedPreferences {
        date_from: Some("all".to_string()),
        date_to: None,
        growth_rate_display_mode: DisplayMode::Table,
        top_customers_display_mode: DisplayMode::Line,
    }));

    assert_eq!(store.date_filter().interval(), Interval::Month);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Line
    );
}

#[test]
fn event_view_with_empty_source_id_matches_by_event_name() {
    let mut store = store();
    store.dispatch(Action::SchemaLoaded(schema(
        vec![ManagedView {
            id: "view_purchase".to_string(),
            kind: ManagedViewKind::RevenueAnalyticsCharge,
            name: "purchase".to_string(),
            source_id: Some(String::new()),
        }],
        false,
    )));
    store.dispatch(Action::RevenueEventsLoaded(vec![EventSource::new(
        "purchase",
    )]));
    store.dispatch(Action::SourcesLoaded(Vec::new()));

    assert_eq!(store.charge_revenue_views().len(), 1);
    assert_eq!(store.charge_revenue_views()[0].name, "purchase");
}

#[test]
fn configured_short_initial_range_opens_in_table_mode() {
    let config = DashboardConfig {
        initial_date_from: Some("-7d".to_string()),
        ..DashboardConfig::default()
    };
    config.validate().unwrap();
    let store = DashboardStore::new(&config, Box::new(FixedClock(today())));

    assert_eq!(store.date_filter().interval(), Interval::Day);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
    assert_eq!(
        store.display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Table
    );
    assert_eq!(store.top_customers_group_by(), TopCustomersGroupBy::All);
    assert!(store.queries().top_customers.as_data_table().is_some());
}
