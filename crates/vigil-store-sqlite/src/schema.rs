//! SQL schema for the Vigil SQLite store.
//!
//! Executed once at connection startup. There are no migrations; the DDL is
//! idempotent thanks to `CREATE TABLE IF NOT EXISTS`.

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id      TEXT PRIMARY KEY,
    display_name    TEXT NOT NULL,
    contact_id      TEXT,
    last_checkin_at TEXT,                    -- RFC 3339 UTC, fixed width; NULL until first check-in
    enabled         INTEGER NOT NULL DEFAULT 1,
    registered_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subjects_enabled_idx ON subjects(enabled);

PRAGMA user_version = 1;
";
