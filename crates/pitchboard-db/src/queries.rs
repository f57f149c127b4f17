use crate::Database;
use crate::models::{AuthorRow, CommentRow, PitchOwnerRow, PitchRow};
use anyhow::Result;
use pitchboard_types::models::ReactionKind;
use rusqlite::Connection;

impl Database {
    // -- Authors --

    /// Create-if-not-exists keyed by the caller-supplied deterministic id.
    /// Safe to race: concurrent first-time sign-ins for the same external
    /// identity both succeed, and exactly one row exists afterwards.
    pub fn create_author_if_absent(
        &self,
        id: &str,
        external_id: &str,
        name: &str,
        username: &str,
        email: &str,
        image: &str,
        bio: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO authors (id, external_id, name, username, email, image, bio)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, external_id, name, username, email, image, bio],
            )?;
            Ok(())
        })
    }

    pub fn get_author_by_external_id(&self, external_id: &str) -> Result<Option<AuthorRow>> {
        self.with_conn(|conn| query_author_by_external_id(conn, external_id))
    }

    /// Best-effort fallback used when a session token carries no author id.
    pub fn get_author_id_by_email(&self, email: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT id FROM authors WHERE email = ?1", [email], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    // -- Pitches --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_pitch(
        &self,
        id: &str,
        title: &str,
        description: &str,
        category: &str,
        image: &str,
        slug: &str,
        body: &str,
        author_id: Option<&str>,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO pitches (id, title, description, category, image, slug, body, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![id, title, description, category, image, slug, body, author_id, created_at],
            )?;
            Ok(())
        })
    }

    /// Fetch only what the ownership check needs.
    pub fn get_pitch_owner(&self, id: &str) -> Result<Option<PitchOwnerRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, author_id FROM pitches WHERE id = ?1",
                [id],
                |row| {
                    Ok(PitchOwnerRow {
                        id: row.get(0)?,
                        author_id: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_pitch(
        &self,
        id: &str,
        title: &str,
        description: &str,
        category: &str,
        image: &str,
        slug: &str,
        body: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE pitches
                 SET title = ?2, description = ?3, category = ?4, image = ?5, slug = ?6, body = ?7
                 WHERE id = ?1",
                rusqlite::params![id, title, description, category, image, slug, body],
            )?;
            Ok(n > 0)
        })
    }

    /// Idempotent: deleting an already-deleted pitch reports `false` rather
    /// than failing, which makes bulk-delete retries safe.
    pub fn delete_pitch(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM reactions WHERE pitch_id = ?1", [id])?;
            conn.execute("DELETE FROM comments WHERE pitch_id = ?1", [id])?;
            let n = conn.execute("DELETE FROM pitches WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn get_pitch(&self, id: &str) -> Result<Option<PitchRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{PITCH_SELECT} WHERE p.id = ?1"))?;
            stmt.query_row([id], pitch_from_row).optional()
        })
    }

    pub fn list_pitches(&self) -> Result<Vec<PitchRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(PITCH_SELECT)?;
            let rows = stmt
                .query_map([], pitch_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn pitch_ids_by_author(&self, author_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM pitches WHERE author_id = ?1")?;
            let ids = stmt
                .query_map([author_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        content: &str,
        author_id: &str,
        pitch_id: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, content, author_id, pitch_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, content, author_id, pitch_id, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_comments(&self, pitch_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            // JOIN authors so comment rendering needs no follow-up lookups
            let mut stmt = conn.prepare(
                "SELECT c.id, c.content, c.author_id, c.pitch_id, c.created_at,
                        a.name, a.username, a.image
                 FROM comments c
                 JOIN authors a ON c.author_id = a.id
                 WHERE c.pitch_id = ?1
                 ORDER BY c.created_at DESC",
            )?;
            let rows = stmt
                .query_map([pitch_id], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        author_id: row.get(2)?,
                        pitch_id: row.get(3)?,
                        created_at: row.get(4)?,
                        author_name: row.get(5)?,
                        author_username: row.get(6)?,
                        author_image: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Reactions --

    /// Toggle a reaction as one logical operation and return the resulting
    /// state for this (author, pitch) pair:
    /// none -> kind (insert), kind -> none (delete), other -> kind (switch).
    pub fn toggle_reaction(
        &self,
        id: &str,
        pitch_id: &str,
        author_id: &str,
        kind: ReactionKind,
    ) -> Result<Option<ReactionKind>> {
        self.with_conn(|conn| {
            let existing: Option<(String, String)> = conn
                .query_row(
                    "SELECT id, kind FROM reactions WHERE pitch_id = ?1 AND author_id = ?2",
                    rusqlite::params![pitch_id, author_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            match existing {
                Some((existing_id, existing_kind)) if existing_kind == kind.as_str() => {
                    conn.execute("DELETE FROM reactions WHERE id = ?1", [&existing_id])?;
                    Ok(None)
                }
                Some((existing_id, _)) => {
                    conn.execute(
                        "UPDATE reactions SET kind = ?2 WHERE id = ?1",
                        rusqlite::params![existing_id, kind.as_str()],
                    )?;
                    Ok(Some(kind))
                }
                None => {
                    conn.execute(
                        "INSERT INTO reactions (id, kind, author_id, pitch_id, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        rusqlite::params![
                            id,
                            kind.as_str(),
                            author_id,
                            pitch_id,
                            chrono::Utc::now().to_rfc3339()
                        ],
                    )?;
                    Ok(Some(kind))
                }
            }
        })
    }

    pub fn reaction_counts(&self, pitch_id: &str) -> Result<(u64, u64)> {
        self.with_conn(|conn| {
            let (likes, dislikes) = conn.query_row(
                "SELECT
                    COUNT(CASE WHEN kind = 'like' THEN 1 END),
                    COUNT(CASE WHEN kind = 'dislike' THEN 1 END)
                 FROM reactions WHERE pitch_id = ?1",
                [pitch_id],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
            )?;
            Ok((likes, dislikes))
        })
    }

    pub fn user_reaction(&self, pitch_id: &str, author_id: &str) -> Result<Option<ReactionKind>> {
        self.with_conn(|conn| {
            let kind: Option<String> = conn
                .query_row(
                    "SELECT kind FROM reactions WHERE pitch_id = ?1 AND author_id = ?2",
                    rusqlite::params![pitch_id, author_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(kind.and_then(|k| match k.as_str() {
                "like" => Some(ReactionKind::Like),
                "dislike" => Some(ReactionKind::Dislike),
                _ => None,
            }))
        })
    }
}

const PITCH_SELECT: &str = "SELECT p.id, p.title, p.description, p.category, p.image, p.slug, p.body,
        p.author_id, p.created_at, a.name, a.username, a.image
 FROM pitches p
 LEFT JOIN authors a ON p.author_id = a.id";

fn pitch_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<PitchRow, rusqlite::Error> {
    Ok(PitchRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        image: row.get(4)?,
        slug: row.get(5)?,
        body: row.get(6)?,
        author_id: row.get(7)?,
        created_at: row.get(8)?,
        author_name: row.get(9)?,
        author_username: row.get(10)?,
        author_image: row.get(11)?,
    })
}

fn query_author_by_external_id(conn: &Connection, external_id: &str) -> Result<Option<AuthorRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, external_id, name, username, email, image, bio, created_at
         FROM authors WHERE external_id = ?1",
    )?;

    stmt.query_row([external_id], |row| {
        Ok(AuthorRow {
            id: row.get(0)?,
            external_id: row.get(1)?,
            name: row.get(2)?,
            username: row.get(3)?,
            email: row.get(4)?,
            image: row.get(5)?,
            bio: row.get(6)?,
            created_at: row.get(7)?,
        })
    })
    .optional()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
