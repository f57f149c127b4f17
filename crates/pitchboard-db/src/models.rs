//! Database row types — these map directly to SQLite rows.
//! Distinct from the pitchboard-types API models to keep the DB layer
//! independent.

use chrono::{DateTime, Utc};

pub struct AuthorRow {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub image: String,
    pub bio: String,
    pub created_at: String,
}

pub struct PitchRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub slug: String,
    pub body: String,
    pub author_id: Option<String>,
    pub created_at: String,
    // Joined author columns; absent on ownerless pitches.
    pub author_name: Option<String>,
    pub author_username: Option<String>,
    pub author_image: Option<String>,
}

/// Minimal projection used by the ownership check before update/delete.
pub struct PitchOwnerRow {
    pub id: String,
    pub author_id: Option<String>,
}

pub struct CommentRow {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub pitch_id: String,
    pub created_at: String,
    pub author_name: String,
    pub author_username: String,
    pub author_image: String,
}

pub struct ProfileRow {
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub image: String,
    pub bio: String,
    pub created_at: String,
    pub updated_at: String,
    pub last_login: String,
}

/// SQLite stores timestamps either as RFC 3339 (rows we write) or as
/// "YYYY-MM-DD HH:MM:SS" (column defaults). Accept both.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
                .ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_sqlite_default_formats() {
        assert!(parse_timestamp("2026-08-24T10:30:00+00:00").is_some());
        assert!(parse_timestamp("2026-08-24 10:30:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
