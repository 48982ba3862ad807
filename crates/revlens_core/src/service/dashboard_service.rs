//! Dashboard session service.
//!
//! # Responsibility
//! - Open a store for one team, restoring its persisted preferences.
//! - Save the preference record after every action that changes it.
//!
//! # Invariants
//! - The store is updated before any save is attempted.
//! - Actions that touch no persisted field never reach the repository.

use crate::config::{ConfigError, DashboardConfig};
use crate::engine::inputs::{Clock, RevenueSettingsReader, SchemaReader};
use crate::engine::store::{Action, DashboardStore, DispatchOutcome};
use crate::repo::preference_repo::{PreferenceRepoError, PreferenceRepository};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DashboardServiceResult<T> = Result<T, DashboardServiceError>;

#[derive(Debug)]
pub enum DashboardServiceError {
    Config(ConfigError),
    Repo(PreferenceRepoError),
}

impl Display for DashboardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DashboardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ConfigError> for DashboardServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<PreferenceRepoError> for DashboardServiceError {
    fn from(value: PreferenceRepoError) -> Self {
        Self::Repo(value)
    }
}

/// One team's dashboard session with preference persistence.
pub struct DashboardService<R: PreferenceRepository> {
    config: DashboardConfig,
    store: DashboardStore,
    repo: R,
}

impl<R: PreferenceRepository> DashboardService<R> {
    /// Mounts a store for `config.team_id` and restores its saved record.
    ///
    /// A missing record leaves the initial state in place. With
    /// `persist_preferences` off the repository is never read.
    pub fn open(
        config: DashboardConfig,
        clock: Box<dyn Clock>,
        settings: &dyn RevenueSettingsReader,
        schema: &dyn SchemaReader,
        repo: R,
    ) -> DashboardServiceResult<Self> {
        config.validate()?;
        let mut store = DashboardStore::mount(&config, clock, settings, schema);

        if config.persist_preferences {
            match repo.load(config.team_id) {
                Ok(Some(record)) => {
                    store.dispatch(Action::RestorePreferences(record));
                    info!(
                        "event=preferences_restore module=service status=ok team_id={}",
                        config.team_id
                    );
                }
                Ok(None) => info!(
                    "event=preferences_restore module=service status=ok team_id={} found=false",
                    config.team_id
                ),
                Err(err) => {
                    error!(
                        "event=preferences_restore module=service status=error team_id={} error={}",
                        config.team_id, err
                    );
                    return Err(err.into());
                }
            }
        }

        Ok(Self {
            config,
            store,
            repo,
        })
    }

    /// Read access for query/flag consumers.
    pub fn store(&self) -> &DashboardStore {
        &self.store
    }

    /// Applies an action and persists the record if it changed.
    ///
    /// On a save failure the in-memory state keeps the action's effect.
    pub fn dispatch(&mut self, action: Action) -> DashboardServiceResult<DispatchOutcome> {
        let outcome = self.store.dispatch(action);
        if self.config.persist_preferences && outcome.touches_persisted() {
            self.save()?;
        }
        Ok(outcome)
    }

    /// Removes the team's saved record. The live state is left as is.
    pub fn clear_saved_preferences(&self) -> DashboardServiceResult<bool> {
        Ok(self.repo.clear(self.config.team_id)?)
    }

    fn save(&self) -> DashboardServiceResult<()> {
        let record = self.store.persisted_record();
        match self.repo.save(self.config.team_id, &record) {
            Ok(()) => {
                info!(
                    "event=preferences_save module=service status=ok team_id={}",
                    self.config.team_id
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=preferences_save module=service status=error team_id={} error={}",
                    self.config.team_id, err
                );
                Err(err.into())
            }
        }
    }
}
