//! Account and session repository.
//!
//! # Responsibility
//! - Persist accounts in `users`.
//! - Track the single active session in the one-row `session` table.
//!
//! # Invariants
//! - Usernames are unique; duplicates surface as `RepoError::Conflict`.
//! - At most one user is active at a time.
//! - Deleting a user cascades to their tasks, archive, settings and session.

use crate::model::user::{User, UserId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

/// Repository interface for accounts and the active session.
pub trait UserRepository {
    /// Inserts `user` and returns the assigned id; `user.id` is ignored.
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    /// Replaces any existing session with `id`.
    fn set_active_user(&self, id: UserId) -> RepoResult<()>;
    fn active_user_id(&self) -> RepoResult<Option<UserId>>;
    fn clear_active_user(&self) -> RepoResult<()>;
}

/// SQLite-backed account repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        let inserted = self.conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2);",
            params![user.username.as_str(), user.password_hash.as_str()],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::Conflict(format!(
                    "username `{}` already exists",
                    user.username
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE id = ?1;",
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1;",
                [username],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2;",
            params![password_hash, id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }

        Ok(())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }

        Ok(())
    }

    fn set_active_user(&self, id: UserId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO session (id, user_id) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                started_at = (strftime('%s', 'now') * 1000);",
            [id],
        )?;
        Ok(())
    }

    fn active_user_id(&self) -> RepoResult<Option<UserId>> {
        let id = self
            .conn
            .query_row("SELECT user_id FROM session WHERE id = 1;", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    fn clear_active_user(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM session;", [])?;
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
    })
}
