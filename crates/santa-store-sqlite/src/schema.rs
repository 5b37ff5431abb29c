//! SQL schema for the Secret Santa SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    name_key    TEXT NOT NULL UNIQUE,   -- trimmed, lowercased name
    email       TEXT NOT NULL UNIQUE,   -- lowercased
    description TEXT NOT NULL,
    drive_link  TEXT NOT NULL,
    CHECK (name_key != '' AND email != '')
);

-- Assignments are append-only; the drawn person is a frozen snapshot.
-- No foreign keys: registry rows may be removed after being drawn.
CREATE TABLE IF NOT EXISTS assignments (
    assignment_id        TEXT PRIMARY KEY,
    registrant_id        TEXT NOT NULL,
    registrant_name      TEXT NOT NULL,
    registrant_email     TEXT NOT NULL UNIQUE,
    password_hash        TEXT NOT NULL,   -- argon2 PHC string
    assigned_id          TEXT NOT NULL,
    assigned_name        TEXT NOT NULL,
    assigned_name_key    TEXT NOT NULL UNIQUE,
    assigned_email       TEXT NOT NULL,
    assigned_description TEXT NOT NULL,
    assigned_drive_link  TEXT NOT NULL,
    created_at           TEXT NOT NULL,   -- RFC 3339 UTC
    CHECK (registrant_id != assigned_id)
);

PRAGMA user_version = 1;
";
