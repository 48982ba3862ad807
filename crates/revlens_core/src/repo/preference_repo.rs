//! Per-team dashboard preference storage.
//!
//! # Responsibility
//! - Load, upsert and clear one preference record per team.
//!
//! # Invariants
//! - At most one row exists per team id.
//! - Display modes are stored as `line` / `table`; anything else read back is
//!   reported as `InvalidData`.

use crate::db::DbError;
use crate::model::display::DisplayMode;
use crate::model::preferences::{PersistedPreferences, TeamId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PreferenceRepoResult<T> = Result<T, PreferenceRepoError>;

#[derive(Debug)]
pub enum PreferenceRepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for PreferenceRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted dashboard preference: {message}")
            }
        }
    }
}

impl Error for PreferenceRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for PreferenceRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PreferenceRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for persisted dashboard preferences.
pub trait PreferenceRepository {
    fn load(&self, team_id: TeamId) -> PreferenceRepoResult<Option<PersistedPreferences>>;
    fn save(&self, team_id: TeamId, record: &PersistedPreferences) -> PreferenceRepoResult<()>;
    /// Returns whether a record existed.
    fn clear(&self, team_id: TeamId) -> PreferenceRepoResult<bool>;
}

/// SQLite-backed preference repository.
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn load(&self, team_id: TeamId) -> PreferenceRepoResult<Option<PersistedPreferences>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                date_from,
                date_to,
                growth_rate_display_mode,
                top_customers_display_mode
             FROM dashboard_preferences
             WHERE team_id = ?1;",
        )?;

        let row = stmt
            .query_row([team_id.0], RawPreferenceRow::from_row)
            .optional()?;
        row.map(RawPreferenceRow::into_record).transpose()
    }

    fn save(&self, team_id: TeamId, record: &PersistedPreferences) -> PreferenceRepoResult<()> {
        self.conn.execute(
            "INSERT INTO dashboard_preferences (
                team_id,
                date_from,
                date_to,
                growth_rate_display_mode,
                top_customers_display_mode,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, (strftime('%s', 'now') * 1000))
            ON CONFLICT(team_id) DO UPDATE SET
                date_from = excluded.date_from,
                date_to = excluded.date_to,
                growth_rate_display_mode = excluded.growth_rate_display_mode,
                top_customers_display_mode = excluded.top_customers_display_mode,
                updated_at = excluded.updated_at;",
            params![
                team_id.0,
                record.date_from.as_deref(),
                record.date_to.as_deref(),
                record.growth_rate_display_mode.as_str(),
                record.top_customers_display_mode.as_str(),
            ],
        )?;
        Ok(())
    }

    fn clear(&self, team_id: TeamId) -> PreferenceRepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM dashboard_preferences WHERE team_id = ?1;",
            [team_id.0],
        )?;
        Ok(removed > 0)
    }
}

struct RawPreferenceRow {
    date_from: Option<String>,
    date_to: Option<String>,
    growth_rate_display_mode: String,
    top_customers_display_mode: String,
}

impl RawPreferenceRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            date_from: row.get("date_from")?,
            date_to: row.get("date_to")?,
            growth_rate_display_mode: row.get("growth_rate_display_mode")?,
            top_customers_display_mode: row.get("top_customers_display_mode")?,
        })
    }

    fn into_record(self) -> PreferenceRepoResult<PersistedPreferences> {
        Ok(PersistedPreferences {
            date_from: self.date_from,
            date_to: self.date_to,
            growth_rate_display_mode: parse_mode(
                &self.growth_rate_display_mode,
                "growth_rate_display_mode",
            )?,
            top_customers_display_mode: parse_mode(
                &self.top_customers_display_mode,
                "top_customers_display_mode",
            )?,
        })
    }
}

fn parse_mode(value: &str, column: &str) -> PreferenceRepoResult<DisplayMode> {
    DisplayMode::parse(value).ok_or_else(|| {
        PreferenceRepoError::InvalidData(format!(
            "invalid display mode `{value}` in dashboard_preferences.{column}"
        ))
    })
}
