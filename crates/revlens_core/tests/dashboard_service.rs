use chrono::NaiveDate;
use revlens_core::db::open_db_in_memory;
use revlens_core::{
    Action, DashboardConfig, DashboardService, DashboardServiceError, DisplayMode,
    DisplayTarget, FixedClock, Interval, LoadedFeeds, PersistedPreferences, PreferenceRepoError,
    PreferenceRepoResult, PreferenceRepository, SqlitePreferenceRepository, TeamId,
};
use std::cell::Cell;

fn clock() -> Box<FixedClock> {
    Box::new(FixedClock(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()))
}

fn open<R: PreferenceRepository>(team: i64, repo: R) -> DashboardService<R> {
    let feeds = LoadedFeeds::default();
    DashboardService::open(
        DashboardConfig::for_team(TeamId(team)),
        clock(),
        &feeds,
        &feeds,
        repo,
    )
    .unwrap()
}

#[test]
fn preferences_persist_across_sessions() {
    let conn = open_db_in_memory().unwrap();

    let mut first = open(1, SqlitePreferenceRepository::new(&conn));
    first
        .dispatch(Action::SetDates {
            date_from: Some("-7d".to_string()),
            date_to: None,
        })
        .unwrap();
    drop(first);

    let second = open(1, SqlitePreferenceRepository::new(&conn));
    let store = second.store();
    assert_eq!(store.date_filter().date_from(), Some("-7d"));
    assert_eq!(store.date_filter().interval(), Interval::Day);
    assert_eq!(
        store.display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
}

#[test]
fn teams_do_not_share_preferences() {
    let conn = open_db_in_memory().unwrap();

    let mut team_one = open(1, SqlitePreferenceRepository::new(&conn));
    team_one
        .dispatch(Action::SetDates {
            date_from: Some("-30d".to_string()),
            date_to: None,
        })
        .unwrap();

    let team_two = open(2, SqlitePreferenceRepository::new(&conn));
    assert_eq!(team_two.store().date_filter().date_from(), Some("yStart"));
    assert_eq!(
        team_two.store().display_mode(DisplayTarget::TopCustomers),
        DisplayMode::Line
    );
}

#[test]
fn clearing_saved_preferences_resets_next_session() {
    let conn = open_db_in_memory().unwrap();

    let mut session = open(4, SqlitePreferenceRepository::new(&conn));
    session
        .dispatch(Action::SetDisplayMode {
            target: DisplayTarget::GrowthRate,
            mode: DisplayMode::Table,
        })
        .unwrap();
    assert!(session.clear_saved_preferences().unwrap());

    let next = open(4, SqlitePreferenceRepository::new(&conn));
    assert_eq!(
        next.store().display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Line
    );
}

#[derive(Default)]
struct CountingRepo {
    saves: Cell<u32>,
    fail_saves: bool,
}

impl PreferenceRepository for &CountingRepo {
    fn load(&self, _team_id: TeamId) -> PreferenceRepoResult<Option<PersistedPreferences>> {
        Ok(None)
    }

    fn save(&self, _team_id: TeamId, _record: &PersistedPreferences) -> PreferenceRepoResult<()> {
        self.saves.set(self.saves.get() + 1);
        if self.fail_saves {
            return Err(PreferenceRepoError::InvalidData("disk full".to_string()));
        }
        Ok(())
    }

    fn clear(&self, _team_id: TeamId) -> PreferenceRepoResult<bool> {
        Ok(false)
    }
}

#[test]
fn only_persisted_fields_trigger_saves() {
    let repo = CountingRepo::default();
    let mut service = open(1, &repo);

    service
        .dispatch(Action::SetBaseCurrency("EUR".to_string()))
        .unwrap();
    service
        .dispatch(Action::SourcesLoaded(Vec::new()))
        .unwrap();
    assert_eq!(repo.saves.get(), 0);

    service
        .dispatch(Action::SetDisplayMode {
            target: DisplayTarget::TopCustomers,
            mode: DisplayMode::Table,
        })
        .unwrap();
    assert_eq!(repo.saves.get(), 1);

    service
        .dispatch(Action::SetDisplayMode {
            target: DisplayTarget::TopCustomers,
            mode: DisplayMode::Table,
        })
        .unwrap();
    assert_eq!(repo.saves.get(), 1);
}

#[test]
fn save_failure_keeps_in_memory_state() {
    let repo = CountingRepo {
        fail_saves: true,
        ..CountingRepo::default()
    };
    let mut service = open(1, &repo);

    let err = service
        .dispatch(Action::SetDates {
            date_from: Some("-14d".to_string()),
            date_to: None,
        })
        .unwrap_err();

    assert!(matches!(err, DashboardServiceError::Repo(_)));
    assert_eq!(repo.saves.get(), 1);
    assert_eq!(service.store().date_filter().date_from(), Some("-14d"));
    assert_eq!(
        service.store().display_mode(DisplayTarget::GrowthRate),
        DisplayMode::Table
    );
}

#[test]
fn disabled_persistence_never_touches_the_repository() {
    let repo = CountingRepo::default();
    let feeds = LoadedFeeds::default();
    let config = DashboardConfig {
        persist_preferences: false,
        ..DashboardConfig::default()
    };
    let mut service = DashboardService::open(config, clock(), &feeds, &feeds, &repo).unwrap();

    service
        .dispatch(Action::SetDates {
            date_from: Some("-7d".to_string()),
            date_to: None,
        })
        .unwrap();
    assert_eq!(repo.saves.get(), 0);
}

#[test]
fn invalid_config_is_rejected_on_open() {
    let conn = open_db_in_memory().unwrap();
    let feeds = LoadedFeeds::default();
    let result = DashboardService::open(
        DashboardConfig::for_team(TeamId(0)),
        clock(),
        &feeds,
        &feeds,
        SqlitePreferenceRepository::new(&conn),
    );

    assert!(matches!(result, Err(DashboardServiceError::Config(_))));
}
