//! Per-user settings persistence.
//!
//! # Invariants
//! - A user without a stored row reads back `Settings::default()`.
//! - `default_priorities` is stored as a JSON object.

use crate::model::priority::PriorityFlags;
use crate::model::settings::Settings;
use crate::model::user::UserId;
use crate::repo::row::{bool_to_int, int_to_bool};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};

pub trait SettingsRepository {
    fn get_settings(&self, user_id: UserId) -> RepoResult<Settings>;
    /// Inserts or replaces the row for `user_id`.
    fn save_settings(&self, user_id: UserId, settings: &Settings) -> RepoResult<()>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

/// Raw column values before decoding.
struct SettingsRow {
    notification_interval: i64,
    auto_archive: i64,
    archive_after_days: i64,
    auto_delete: i64,
    delete_after_days: i64,
    notifications_enabled: i64,
    default_priorities: String,
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_settings(&self, user_id: UserId) -> RepoResult<Settings> {
        let mut stmt = self.conn.prepare(
            "SELECT
                notification_interval,
                auto_archive,
                archive_after_days,
                auto_delete,
                delete_after_days,
                notifications_enabled,
                default_priorities
             FROM settings
             WHERE user_id = ?1;",
        )?;

        let mut rows = stmt.query([user_id])?;
        let Some(row) = rows.next()? else {
            return Ok(Settings::default());
        };

        let raw = SettingsRow {
            notification_interval: row.get(0)?,
            auto_archive: row.get(1)?,
            archive_after_days: row.get(2)?,
            auto_delete: row.get(3)?,
            delete_after_days: row.get(4)?,
            notifications_enabled: row.get(5)?,
            default_priorities: row.get(6)?,
        };
        decode(raw)
    }

    fn save_settings(&self, user_id: UserId, settings: &Settings) -> RepoResult<()> {
        settings.validate()?;
        let default_priorities = serde_json::to_string(&settings.default_priorities)
            .map_err(|err| RepoError::InvalidData(format!("default priorities: {err}")))?;

        self.conn.execute(
            "INSERT INTO settings (
                user_id,
                notification_interval,
                auto_archive,
                archive_after_days,
                auto_delete,
                delete_after_days,
                notifications_enabled,
                default_priorities
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                notification_interval = excluded.notification_interval,
                auto_archive = excluded.auto_archive,
                archive_after_days = excluded.archive_after_days,
                auto_delete = excluded.auto_delete,
                delete_after_days = excluded.delete_after_days,
                notifications_enabled = excluded.notifications_enabled,
                default_priorities = excluded.default_priorities;",
            params![
                user_id,
                settings.notification_interval_days,
                bool_to_int(settings.auto_archive),
                settings.archive_after_days,
                bool_to_int(settings.auto_delete),
                settings.delete_after_days,
                bool_to_int(settings.notifications_enabled),
                default_priorities,
            ],
        )?;
        Ok(())
    }
}

fn decode(raw: SettingsRow) -> RepoResult<Settings> {
    let default_priorities: PriorityFlags = serde_json::from_str(&raw.default_priorities)
        .map_err(|err| {
            RepoError::InvalidData(format!("invalid settings.default_priorities: {err}"))
        })?;

    let settings = Settings {
        notification_interval_days: raw.notification_interval,
        notifications_enabled: int_to_bool(
            raw.notifications_enabled,
            "settings.notifications_enabled",
        )?,
        auto_archive: int_to_bool(raw.auto_archive, "settings.auto_archive")?,
        archive_after_days: raw.archive_after_days,
        auto_delete: int_to_bool(raw.auto_delete, "settings.auto_delete")?,
        delete_after_days: raw.delete_after_days,
        default_priorities,
    };
    settings
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(settings)
}
