//! SQL schema for the CMDB SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS ci_types (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS environments (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Taxonomy rows cannot be deleted while a CI points at them.
CREATE TABLE IF NOT EXISTS cis (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    name                    TEXT NOT NULL,
    type_id                 INTEGER NOT NULL REFERENCES ci_types(id) ON DELETE RESTRICT,
    environment_id          INTEGER NOT NULL REFERENCES environments(id) ON DELETE RESTRICT,
    description             TEXT,
    serial_number           TEXT,
    version                 TEXT,
    acquisition_date        TEXT,   -- YYYY-MM-DD
    status                  TEXT,
    location                TEXT,
    owner                   TEXT,
    documentation_url       TEXT,
    incident_url            TEXT,
    security_level          TEXT,
    compliance              TEXT,
    config_state            TEXT,
    license_number          TEXT,
    license_expiration_date TEXT    -- YYYY-MM-DD
);

-- Edges go away with either endpoint.
CREATE TABLE IF NOT EXISTS ci_relationships (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    ci_id             INTEGER NOT NULL REFERENCES cis(id) ON DELETE CASCADE,
    related_ci_id     INTEGER NOT NULL REFERENCES cis(id) ON DELETE CASCADE,
    relationship_type TEXT NOT NULL
);

-- Strictly append-only. No foreign key: history outlives its CI.
CREATE TABLE IF NOT EXISTS ci_changes (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    ci_id              INTEGER NOT NULL,
    change_date        TEXT NOT NULL,   -- RFC 3339, UTC, microseconds
    change_description TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS cis_type_idx           ON cis(type_id);
CREATE INDEX IF NOT EXISTS cis_environment_idx    ON cis(environment_id);
CREATE INDEX IF NOT EXISTS relationships_ci_idx   ON ci_relationships(ci_id);
CREATE INDEX IF NOT EXISTS relationships_rel_idx  ON ci_relationships(related_ci_id);
CREATE INDEX IF NOT EXISTS changes_ci_date_idx    ON ci_changes(ci_id, change_date);

PRAGMA user_version = 1;
";
