//! Secondary profile store used for login auditing.
//!
//! Independent of the content store and never authoritative: sign-in mirrors
//! the author here best-effort, and any failure is logged and swallowed by
//! the caller.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::models::ProfileRow;

pub struct MirrorStore {
    conn: Mutex<Connection>,
}

impl MirrorStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrate(&conn)?;

        info!("Profile mirror opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Mirror lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Insert the profile on first sign-in, otherwise refresh name/image and
    /// bump `last_login`. Empty incoming fields never overwrite stored ones.
    pub fn record_login(
        &self,
        external_id: &str,
        name: &str,
        email: &str,
        username: &str,
        image: &str,
        bio: &str,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE profiles
                 SET name = CASE WHEN ?2 != '' THEN ?2 ELSE name END,
                     image = CASE WHEN ?3 != '' THEN ?3 ELSE image END,
                     updated_at = ?4,
                     last_login = ?4
                 WHERE external_id = ?1",
                rusqlite::params![external_id, name, image, now],
            )?;

            if updated == 0 {
                conn.execute(
                    "INSERT INTO profiles (external_id, name, email, username, image, bio,
                                           created_at, updated_at, last_login)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?7)",
                    rusqlite::params![external_id, name, email, username, image, bio, now],
                )?;
            }
            Ok(())
        })
    }

    pub fn count_all(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
            Ok(n)
        })
    }

    pub fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM profiles WHERE created_at >= ?1",
                [since.to_rfc3339()],
                |row| row.get(0),
            )?;
            Ok(n)
        })
    }

    pub fn recent(&self, limit: u32) -> Result<Vec<ProfileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{PROFILE_SELECT} ORDER BY created_at DESC LIMIT ?1"))?;
            let rows = stmt
                .query_map([limit], profile_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn all(&self) -> Result<Vec<ProfileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{PROFILE_SELECT} ORDER BY created_at DESC"))?;
            let rows = stmt
                .query_map([], profile_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

const PROFILE_SELECT: &str = "SELECT external_id, name, email, username, image, bio, created_at, updated_at, last_login
 FROM profiles";

fn profile_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<ProfileRow, rusqlite::Error> {
    Ok(ProfileRow {
        external_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        username: row.get(3)?,
        image: row.get(4)?,
        bio: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        last_login: row.get(8)?,
    })
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS profiles (
            external_id  TEXT PRIMARY KEY,
            name         TEXT NOT NULL DEFAULT '',
            email        TEXT NOT NULL DEFAULT '',
            username     TEXT NOT NULL DEFAULT '',
            image        TEXT NOT NULL DEFAULT '',
            bio          TEXT NOT NULL DEFAULT '',
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL,
            last_login   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_profiles_email
            ON profiles(email);
        ",
    )?;
    Ok(())
}
