//! Dashboard store: filter state, named actions and derived values.
//!
//! # Responsibility
//! - Own the date filter and both display modes; expose reconciled revenue
//!   sources, schema availability and compiled queries read-only.
//! - Serialize every mutation through `dispatch`, then recompute only the
//!   derived values whose inputs changed.
//!
//! # Invariants
//! - `SetDates` is the only writer of the date filter, and every `SetDates`
//!   runs display-mode correction. A fresh store starts corrected too.
//! - Derived values always reflect the current state once `dispatch` returns.
//! - Once a schema snapshot has arrived, revenue table availability is never
//!   `Loading` again.

use crate::config::DashboardConfig;
use crate::engine::compiler::{compile_queries, CompilerInputs};
use crate::engine::corrector::{corrected_display_mode, mode_selection_disabled};
use crate::engine::graph::{Dependency, DependencyGraph, GraphBuilder, GraphError};
use crate::engine::inputs::{Clock, LoadedFeeds, RevenueSettingsReader, SchemaReader};
use crate::engine::reconciler::{FeedUpdate, SourceReconciler};
use crate::model::date_filter::DateFilter;
use crate::model::display::{DisplayMode, DisplayTarget, TopCustomersGroupBy};
use crate::model::flags::{AffordanceFlags, Availability};
use crate::model::preferences::PersistedPreferences;
use crate::model::query::CompiledQueries;
use crate::model::revenue_source::{EventSource, ExternalSource, RevenueSources};
use crate::model::schema::{ManagedView, SchemaSnapshot};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};

static DASHBOARD_GRAPH: Lazy<DependencyGraph<StateField, DerivedKey>> =
    Lazy::new(|| dashboard_graph().expect("dashboard dependency graph is valid"));

/// Store inputs tracked by the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateField {
    DateFilter,
    GrowthRateDisplayMode,
    TopCustomersDisplayMode,
    RevenueSources,
    RevenueEvents,
    Schema,
    BaseCurrency,
}

impl StateField {
    /// Whether this field is part of the persisted preference record.
    pub fn is_persisted(self) -> bool {
        matches!(
            self,
            Self::DateFilter | Self::GrowthRateDisplayMode | Self::TopCustomersDisplayMode
        )
    }

    fn display_mode(target: DisplayTarget) -> Self {
        match target {
            DisplayTarget::GrowthRate => Self::GrowthRateDisplayMode,
            DisplayTarget::TopCustomers => Self::TopCustomersDisplayMode,
        }
    }
}

/// Values derived from store inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DerivedKey {
    DisabledGrowthModeSelection,
    DisabledTopCustomersModeSelection,
    HasRevenueEvents,
    HasRevenueTables,
    ChargeRevenueViews,
    Queries,
}

impl DerivedKey {
    pub const ALL: [Self; 6] = [
        Self::DisabledGrowthModeSelection,
        Self::DisabledTopCustomersModeSelection,
        Self::HasRevenueEvents,
        Self::HasRevenueTables,
        Self::ChargeRevenueViews,
        Self::Queries,
    ];
}

/// Declares which inputs each derived value reads.
pub fn dashboard_graph() -> Result<DependencyGraph<StateField, DerivedKey>, GraphError> {
    use Dependency::{Derived, Field};

    GraphBuilder::new()
        .field(StateField::DateFilter)
        .field(StateField::GrowthRateDisplayMode)
        .field(StateField::TopCustomersDisplayMode)
        .field(StateField::RevenueSources)
        .field(StateField::RevenueEvents)
        .field(StateField::Schema)
        .field(StateField::BaseCurrency)
        .node(
            DerivedKey::DisabledGrowthModeSelection,
            [Field(StateField::DateFilter)],
        )
        .node(
            DerivedKey::DisabledTopCustomersModeSelection,
            [Field(StateField::DateFilter)],
        )
        .node(
            DerivedKey::HasRevenueEvents,
            [Field(StateField::RevenueEvents)],
        )
        .node(DerivedKey::HasRevenueTables, [Field(StateField::Schema)])
        .node(
            DerivedKey::ChargeRevenueViews,
            [Field(StateField::Schema), Field(StateField::RevenueSources)],
        )
        .node(
            DerivedKey::Queries,
            [
                Field(StateField::DateFilter),
                Field(StateField::RevenueSources),
                Derived(DerivedKey::ChargeRevenueViews),
                Field(StateField::TopCustomersDisplayMode),
                Field(StateField::GrowthRateDisplayMode),
                Field(StateField::BaseCurrency),
            ],
        )
        .build()
}

/// Named store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Collaborator state already available when the dashboard opens.
    Mounted(LoadedFeeds),
    SetDates {
        date_from: Option<String>,
        date_to: Option<String>,
    },
    SetDisplayMode {
        target: DisplayTarget,
        mode: DisplayMode,
    },
    SetRevenueSources {
        events: Vec<EventSource>,
        data_warehouse_sources: Vec<ExternalSource>,
    },
    RevenueEventsLoaded(Vec<EventSource>),
    SourcesLoaded(Vec<ExternalSource>),
    SchemaLoaded(SchemaSnapshot),
    SetBaseCurrency(String),
    RestorePreferences(PersistedPreferences),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mounted(_) => "mounted",
            Self::SetDates { .. } => "set_dates",
            Self::SetDisplayMode { .. } => "set_display_mode",
            Self::SetRevenueSources { .. } => "set_revenue_sources",
            Self::RevenueEventsLoaded(_) => "revenue_events_loaded",
            Self::SourcesLoaded(_) => "sources_loaded",
            Self::SchemaLoaded(_) => "schema_loaded",
            Self::SetBaseCurrency(_) => "set_base_currency",
            Self::RestorePreferences(_) => "restore_preferences",
        }
    }
}

/// What one dispatch changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub changed_fields: Vec<StateField>,
    pub recomputed: Vec<DerivedKey>,
}

impl DispatchOutcome {
    pub fn is_noop(&self) -> bool {
        self.changed_fields.is_empty()
    }

    pub fn touches_persisted(&self) -> bool {
        self.changed_fields
            .iter()
            .any(|field| field.is_persisted())
    }
}

#[derive(Debug, Clone)]
struct DashboardState {
    date_filter: DateFilter,
    growth_rate_display_mode: DisplayMode,
    top_customers_display_mode: DisplayMode,
    schema: Option<SchemaSnapshot>,
    base_currency: String,
}

impl DashboardState {
    fn display_mode(&self, target: DisplayTarget) -> DisplayMode {
        match target {
            DisplayTarget::GrowthRate => self.growth_rate_display_mode,
            DisplayTarget::TopCustomers => self.top_customers_display_mode,
        }
    }

    fn set_display_mode(&mut self, target: DisplayTarget, mode: DisplayMode) -> bool {
        let slot = match target {
            DisplayTarget::GrowthRate => &mut self.growth_rate_display_mode,
            DisplayTarget::TopCustomers => &mut self.top_customers_display_mode,
        };
        replace_if_changed(slot, mode)
    }
}

#[derive(Debug, Clone)]
struct DerivedValues {
    disabled_growth_mode_selection: bool,
    disabled_top_customers_mode_selection: bool,
    has_revenue_events: bool,
    has_revenue_tables: Availability,
    charge_revenue_views: Vec<ManagedView>,
    queries: CompiledQueries,
}

impl DerivedValues {
    fn compute_all(state: &DashboardState, reconciler: &SourceReconciler) -> Self {
        let charge_revenue_views = charge_revenue_views(state, reconciler.sources());
        let queries = compile(state, reconciler.sources(), &charge_revenue_views);
        Self {
            disabled_growth_mode_selection: mode_selection_disabled(state.date_filter.interval()),
            disabled_top_customers_mode_selection: mode_selection_disabled(
                state.date_filter.interval(),
            ),
            has_revenue_events: has_revenue_events(reconciler),
            has_revenue_tables: has_revenue_tables(state),
            charge_revenue_views,
            queries,
        }
    }

    /// Recomputes one value. Returns whether it changed.
    fn recompute(
        &mut self,
        key: DerivedKey,
        state: &DashboardState,
        reconciler: &SourceReconciler,
    ) -> bool {
        match key {
            DerivedKey::DisabledGrowthModeSelection => replace_if_changed(
                &mut self.disabled_growth_mode_selection,
                mode_selection_disabled(state.date_filter.interval()),
            ),
            DerivedKey::DisabledTopCustomersModeSelection => replace_if_changed(
                &mut self.disabled_top_customers_mode_selection,
                mode_selection_disabled(state.date_filter.interval()),
            ),
            DerivedKey::HasRevenueEvents => replace_if_changed(
                &mut self.has_revenue_events,
                has_revenue_events(reconciler),
            ),
            DerivedKey::HasRevenueTables => {
                replace_if_changed(&mut self.has_revenue_tables, has_revenue_tables(state))
            }
            DerivedKey::ChargeRevenueViews => replace_if_changed(
                &mut self.charge_revenue_views,
                charge_revenue_views(state, reconciler.sources()),
            ),
            DerivedKey::Queries => {
                let queries = compile(state, reconciler.sources(), &self.charge_revenue_views);
                replace_if_changed(&mut self.queries, queries)
            }
        }
    }
}

fn has_revenue_events(reconciler: &SourceReconciler) -> bool {
    reconciler
        .events_feed()
        .is_some_and(|events| !events.is_empty())
}

fn has_revenue_tables(state: &DashboardState) -> Availability {
    match &state.schema {
        None => Availability::Loading,
        Some(schema) => Availability::Present(schema.has_revenue_tables()),
    }
}

fn charge_revenue_views(state: &DashboardState, sources: &RevenueSources) -> Vec<ManagedView> {
    state
        .schema
        .as_ref()
        .map(|schema| schema.charge_views_for(sources))
        .unwrap_or_default()
}

fn compile(
    state: &DashboardState,
    sources: &RevenueSources,
    charge_views: &[ManagedView],
) -> CompiledQueries {
    compile_queries(&CompilerInputs {
        date_filter: &state.date_filter,
        revenue_sources: sources,
        charge_views,
        growth_rate_display_mode: state.growth_rate_display_mode,
        top_customers_display_mode: state.top_customers_display_mode,
        base_currency: &state.base_currency,
    })
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// One dashboard session's state.
///
/// Create one store per open dashboard and pass it to readers explicitly.
pub struct DashboardStore {
    clock: Box<dyn Clock>,
    state: DashboardState,
    reconciler: SourceReconciler,
    derived: DerivedValues,
    recompute_counts: BTreeMap<DerivedKey, u64>,
}

impl DashboardStore {
    /// Creates a store with initial filter state and nothing loaded.
    ///
    /// Initial modes are line, corrected for the configured range.
    pub fn new(config: &DashboardConfig, clock: Box<dyn Clock>) -> Self {
        let date_filter = DateFilter::new(
            config.initial_date_from.clone(),
            config.initial_date_to.clone(),
            clock.today(),
        );
        let initial_mode = corrected_display_mode(DisplayMode::Line, date_filter.interval());
        let state = DashboardState {
            date_filter,
            growth_rate_display_mode: initial_mode,
            top_customers_display_mode: initial_mode,
            schema: None,
            base_currency: config.default_base_currency.trim().to_string(),
        };
        let reconciler = SourceReconciler::new();
        let derived = DerivedValues::compute_all(&state, &reconciler);

        Self {
            clock,
            state,
            reconciler,
            derived,
            recompute_counts: BTreeMap::new(),
        }
    }

    /// Creates a store and applies whatever collaborators already hold.
    pub fn mount(
        config: &DashboardConfig,
        clock: Box<dyn Clock>,
        settings: &dyn RevenueSettingsReader,
        schema: &dyn SchemaReader,
    ) -> Self {
        let mut store = Self::new(config, clock);
        store.dispatch(Action::Mounted(LoadedFeeds {
            base_currency: settings.base_currency(),
            revenue_events: settings.revenue_events(),
            data_warehouse_sources: settings.data_warehouse_sources(),
            schema: schema.schema(),
        }));
        store
    }

    /// Applies one action and brings derived values up to date.
    pub fn dispatch(&mut self, action: Action) -> DispatchOutcome {
        let action_name = action.name();
        let changed_fields = self.apply(action);

        let Self {
            state,
            reconciler,
            derived,
            recompute_counts,
            ..
        } = self;
        let recomputed = DASHBOARD_GRAPH.propagate(changed_fields.iter().copied(), |key| {
            *recompute_counts.entry(key).or_default() += 1;
            derived.recompute(key, state, reconciler)
        });

        debug!(
            "event=dispatch module=store status=ok action={} changed_fields={} recomputed={}",
            action_name,
            changed_fields.len(),
            recomputed.len()
        );
        DispatchOutcome {
            changed_fields,
            recomputed,
        }
    }

    pub fn set_dates(
        &mut self,
        date_from: Option<String>,
        date_to: Option<String>,
    ) -> DispatchOutcome {
        self.dispatch(Action::SetDates { date_from, date_to })
    }

    pub fn set_display_mode(
        &mut self,
        target: DisplayTarget,
        mode: DisplayMode,
    ) -> DispatchOutcome {
        self.dispatch(Action::SetDisplayMode { target, mode })
    }

    pub fn set_revenue_sources(
        &mut self,
        events: Vec<EventSource>,
        data_warehouse_sources: Vec<ExternalSource>,
    ) -> DispatchOutcome {
        self.dispatch(Action::SetRevenueSources {
            events,
            data_warehouse_sources,
        })
    }

    fn apply(&mut self, action: Action) -> Vec<StateField> {
        let mut changed = BTreeSet::new();
        match action {
            Action::Mounted(feeds) => {
                if let Some(code) = feeds.base_currency {
                    self.apply_base_currency(&code, &mut changed);
                }
                let update = self
                    .reconciler
                    .mount(feeds.revenue_events, feeds.data_warehouse_sources);
                record_feed_update(update, &mut changed);
                if let Some(snapshot) = feeds.schema {
                    self.apply_schema(snapshot, &mut changed);
                }
            }
            Action::SetDates { date_from, date_to } => {
                self.apply_dates(date_from, date_to, &mut changed);
            }
            Action::SetDisplayMode { target, mode } => {
                if self.state.set_display_mode(target, mode) {
                    changed.insert(StateField::display_mode(target));
                }
            }
            Action::SetRevenueSources {
                events,
                data_warehouse_sources,
            } => {
                if self
                    .reconciler
                    .set_revenue_sources(events, data_warehouse_sources)
                {
                    changed.insert(StateField::RevenueSources);
                }
            }
            Action::RevenueEventsLoaded(events) => {
                let update = self.reconciler.events_loaded(events);
                record_feed_update(update, &mut changed);
            }
            Action::SourcesLoaded(connections) => {
                let update = self.reconciler.connections_loaded(connections);
                if update.sources_changed {
                    changed.insert(StateField::RevenueSources);
                }
            }
            Action::SchemaLoaded(snapshot) => self.apply_schema(snapshot, &mut changed),
            Action::SetBaseCurrency(code) => self.apply_base_currency(&code, &mut changed),
            Action::RestorePreferences(record) => {
                for (target, mode) in [
                    (DisplayTarget::GrowthRate, record.growth_rate_display_mode),
                    (DisplayTarget::TopCustomers, record.top_customers_display_mode),
                ] {
                    if self.state.set_display_mode(target, mode) {
                        changed.insert(StateField::display_mode(target));
                    }
                }
                self.apply_dates(record.date_from, record.date_to, &mut changed);
            }
        }
        changed.into_iter().collect()
    }

    fn apply_dates(
        &mut self,
        date_from: Option<String>,
        date_to: Option<String>,
        changed: &mut BTreeSet<StateField>,
    ) {
        let next = DateFilter::new(date_from, date_to, self.clock.today());
        if replace_if_changed(&mut self.state.date_filter, next) {
            changed.insert(StateField::DateFilter);
        }

        let interval = self.state.date_filter.interval();
        for target in [DisplayTarget::GrowthRate, DisplayTarget::TopCustomers] {
            let corrected = corrected_display_mode(self.state.display_mode(target), interval);
            if self.state.set_display_mode(target, corrected) {
                changed.insert(StateField::display_mode(target));
            }
        }
    }

    fn apply_schema(&mut self, snapshot: SchemaSnapshot, changed: &mut BTreeSet<StateField>) {
        if self.state.schema.as_ref() == Some(&snapshot) {
            return;
        }
        self.state.schema = Some(snapshot);
        changed.insert(StateField::Schema);
    }

    fn apply_base_currency(&mut self, code: &str, changed: &mut BTreeSet<StateField>) {
        let code = code.trim();
        if code.is_empty() {
            return;
        }
        if replace_if_changed(&mut self.state.base_currency, code.to_string()) {
            changed.insert(StateField::BaseCurrency);
        }
    }

    pub fn date_filter(&self) -> &DateFilter {
        &self.state.date_filter
    }

    pub fn display_mode(&self, target: DisplayTarget) -> DisplayMode {
        self.state.display_mode(target)
    }

    /// Grouping of the top-customers query, derived from its display mode.
    pub fn top_customers_group_by(&self) -> TopCustomersGroupBy {
        TopCustomersGroupBy::from(self.state.top_customers_display_mode)
    }

    pub fn revenue_sources(&self) -> &RevenueSources {
        self.reconciler.sources()
    }

    pub fn base_currency(&self) -> &str {
        &self.state.base_currency
    }

    pub fn charge_revenue_views(&self) -> &[ManagedView] {
        &self.derived.charge_revenue_views
    }

    pub fn queries(&self) -> &CompiledQueries {
        &self.derived.queries
    }

    pub fn has_revenue_events(&self) -> bool {
        self.derived.has_revenue_events
    }

    pub fn has_revenue_tables(&self) -> Availability {
        self.derived.has_revenue_tables
    }

    pub fn flags(&self) -> AffordanceFlags {
        AffordanceFlags {
            has_revenue_events: self.derived.has_revenue_events,
            has_revenue_tables: self.derived.has_revenue_tables,
            disabled_growth_mode_selection: self.derived.disabled_growth_mode_selection,
            disabled_top_customers_mode_selection: self
                .derived
                .disabled_top_customers_mode_selection,
        }
    }

    /// Projects the current state to the persisted preference record.
    pub fn persisted_record(&self) -> PersistedPreferences {
        PersistedPreferences {
            date_from: self.state.date_filter.date_from().map(str::to_string),
            date_to: self.state.date_filter.date_to().map(str::to_string),
            growth_rate_display_mode: self.state.growth_rate_display_mode,
            top_customers_display_mode: self.state.top_customers_display_mode,
        }
    }

    /// How many times `key` has been recomputed by dispatches.
    ///
    /// The initial computation at construction is not counted.
    pub fn recompute_count(&self, key: DerivedKey) -> u64 {
        self.recompute_counts.get(&key).copied().unwrap_or(0)
    }
}

fn record_feed_update(update: FeedUpdate, changed: &mut BTreeSet<StateField>) {
    if update.feed_changed {
        changed.insert(StateField::RevenueEvents);
    }
    if update.sources_changed {
        changed.insert(StateField::RevenueSources);
    }
}
