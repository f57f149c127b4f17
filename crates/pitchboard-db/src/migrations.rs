use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS authors (
            id           TEXT PRIMARY KEY,
            external_id  TEXT NOT NULL UNIQUE,
            name         TEXT NOT NULL DEFAULT '',
            username     TEXT NOT NULL DEFAULT '',
            email        TEXT NOT NULL DEFAULT '',
            image        TEXT NOT NULL DEFAULT '',
            bio          TEXT NOT NULL DEFAULT '',
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_authors_email
            ON authors(email);

        CREATE TABLE IF NOT EXISTS pitches (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            description  TEXT NOT NULL,
            category     TEXT NOT NULL,
            image        TEXT NOT NULL,
            slug         TEXT NOT NULL,
            body         TEXT NOT NULL,
            author_id    TEXT REFERENCES authors(id),
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pitches_author
            ON pitches(author_id);

        CREATE INDEX IF NOT EXISTS idx_pitches_created
            ON pitches(created_at);

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            author_id   TEXT NOT NULL REFERENCES authors(id),
            pitch_id    TEXT NOT NULL REFERENCES pitches(id),
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_pitch
            ON comments(pitch_id, created_at);

        CREATE TABLE IF NOT EXISTS reactions (
            id          TEXT PRIMARY KEY,
            kind        TEXT NOT NULL CHECK (kind IN ('like', 'dislike')),
            author_id   TEXT NOT NULL REFERENCES authors(id),
            pitch_id    TEXT NOT NULL REFERENCES pitches(id),
            created_at  TEXT NOT NULL,
            UNIQUE(pitch_id, author_id)
        );

        CREATE INDEX IF NOT EXISTS idx_reactions_pitch
            ON reactions(pitch_id);
        ",
    )?;

    info!("Content store migrations complete");
    Ok(())
}
