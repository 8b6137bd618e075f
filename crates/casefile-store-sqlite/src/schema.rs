//! DDL for the casefile store: survivors, documents and their records.
//!
//! Run on every open; `user_version` records the layout revision.

/// Every statement is `IF NOT EXISTS`, so re-running is harmless.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS survivors (
    survivor_id TEXT PRIMARY KEY,
    number      INTEGER NOT NULL UNIQUE,
    name        TEXT NOT NULL
);

-- One row per document of any kind. Variant columns are NULL for kinds that
-- do not use them. Rows are never deleted; is_deleted marks logical deletion.
CREATE TABLE IF NOT EXISTS documents (
    document_id                    TEXT PRIMARY KEY,
    survivor_id                    TEXT NOT NULL REFERENCES survivors(survivor_id),
    kind                           TEXT NOT NULL,   -- 'inquiry'
    created_at                     TEXT NOT NULL,   -- ISO 8601 UTC
    last_edit_at                   TEXT NOT NULL,   -- ISO 8601 UTC
    is_deleted                     INTEGER NOT NULL DEFAULT 0,
    -- inquiry
    working_experience             TEXT,
    forwarded_by_organization      INTEGER,
    forwarded_by_organization_name TEXT,
    forwarded_by_person            INTEGER,
    forwarded_by_person_name       TEXT,
    forwarded_by_survivor          INTEGER,
    forwarded_by_survivor_name     TEXT,
    is_self_inquiry                INTEGER,
    self_inquiry_channels          INTEGER
);

-- Records are append-only.
CREATE TABLE IF NOT EXISTS records (
    record_id    TEXT PRIMARY KEY,
    document_id  TEXT NOT NULL REFERENCES documents(document_id),
    kind         TEXT NOT NULL,   -- discriminant of RecordKind
    content_json TEXT NOT NULL    -- JSON payload, PascalCase field names
);

CREATE INDEX IF NOT EXISTS documents_survivor_idx ON documents(survivor_id);
CREATE INDEX IF NOT EXISTS records_kind_idx       ON records(kind);
CREATE INDEX IF NOT EXISTS records_document_idx   ON records(document_id);

PRAGMA user_version = 1;
";
