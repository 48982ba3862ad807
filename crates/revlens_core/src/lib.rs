//! Derived-state engine for a revenue analytics dashboard.
//!
//! Turns a date filter, two display modes and loosely-coupled upstream feeds
//! into four query specifications and a handful of UI affordance flags, and
//! persists the user-facing preferences per team.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DashboardConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::graph::{Dependency, DependencyGraph, GraphBuilder, GraphError};
pub use engine::inputs::{
    Clock, FixedClock, LoadedFeeds, RevenueSettingsReader, SchemaReader, SystemClock,
};
pub use engine::store::{Action, DashboardStore, DerivedKey, DispatchOutcome, StateField};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::date_filter::{DateFilter, Interval};
pub use model::display::{DisplayMode, DisplayTarget, TopCustomersGroupBy};
pub use model::flags::{AffordanceFlags, Availability};
pub use model::preferences::{PersistedPreferences, TeamId};
pub use model::query::{CompiledQueries, DashboardQuery, QuerySpec};
pub use model::revenue_source::{EventSource, ExternalSource, RevenueSources};
pub use model::schema::{ManagedView, ManagedViewKind, SchemaSnapshot, WarehouseTable};
pub use repo::preference_repo::{
    PreferenceRepoError, PreferenceRepoResult, PreferenceRepository, SqlitePreferenceRepository,
};
pub use service::dashboard_service::{
    DashboardService, DashboardServiceError, DashboardServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
