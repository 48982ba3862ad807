use chrono::NaiveDate;
use proptest::prelude::*;
use revlens_core::{
    DashboardConfig, DashboardStore, DisplayMode, DisplayTarget, FixedClock, Interval,
    TopCustomersGroupBy,
};

fn arb_mode() -> impl Strategy<Value = DisplayMode> {
    prop_oneof![Just(DisplayMode::Line), Just(DisplayMode::Table)]
}

fn arb_date_from() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        prop::sample::select(vec![
            "dStart", "-24h", "-7d", "-14d", "-30d", "-90d", "-180d", "mStart", "yStart", "all",
            "qStart", "-1y", "2025-01-01", "2024-06-30", "not-a-date",
        ])
        .prop_map(|token| Some(token.to_string())),
        (1u32..400, prop::sample::select(vec!["d", "w", "m"]))
            .prop_map(|(amount, unit)| Some(format!("-{amount}{unit}"))),
    ]
}

fn arb_date_to() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => Just(None),
        1 => prop::sample::select(vec!["-1dEnd", "2025-06-01", "-1mEnd"])
            .prop_map(|token| Some(token.to_string())),
    ]
}

fn store_with_modes(growth: DisplayMode, top: DisplayMode) -> DashboardStore {
    let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    let mut store = DashboardStore::new(&DashboardConfig::default(), Box::new(FixedClock(today)));
    store.set_display_mode(DisplayTarget::GrowthRate, growth);
    store.set_display_mode(DisplayTarget::TopCustomers, top);
    store
}

proptest! {
    #[test]
    fn non_monthly_ranges_force_both_tables(
        growth in arb_mode(),
        top in arb_mode(),
        date_from in arb_date_from(),
        date_to in arb_date_to(),
    ) {
        let mut store = store_with_modes(growth, top);
        store.set_dates(date_from, date_to);
        prop_assume!(store.date_filter().interval() != Interval::Month);

        prop_assert_eq!(store.display_mode(DisplayTarget::GrowthRate), DisplayMode::Table);
        prop_assert_eq!(store.display_mode(DisplayTarget::TopCustomers), DisplayMode::Table);
        prop_assert_eq!(store.top_customers_group_by(), TopCustomersGroupBy::All);
        prop_assert!(store.flags().disabled_growth_mode_selection);
        prop_assert!(store.queries().top_customers.as_data_table().is_some());
    }

    #[test]
    fn monthly_ranges_leave_modes_untouched(
        growth in arb_mode(),
        top in arb_mode(),
        date_from in arb_date_from(),
        date_to in arb_date_to(),
    ) {
        let mut store = store_with_modes(growth, top);
        store.set_dates(date_from, date_to);
        prop_assume!(store.date_filter().interval() == Interval::Month);

        prop_assert_eq!(store.display_mode(DisplayTarget::GrowthRate), growth);
        prop_assert_eq!(store.display_mode(DisplayTarget::TopCustomers), top);
        prop_assert!(!store.flags().disabled_top_customers_mode_selection);
        prop_assert_eq!(
            store.queries().top_customers.as_data_table().is_some(),
            top == DisplayMode::Table
        );
    }
}
