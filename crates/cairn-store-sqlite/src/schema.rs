//! SQL schema for the Cairn SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Parent documents. The doc column is deliberately schema-less JSON: older
-- writers shipped different shapes, and the normalizer absorbs all of them.
CREATE TABLE IF NOT EXISTS students (
    student_id TEXT PRIMARY KEY,
    doc        TEXT NOT NULL    -- JSON document, inline arrays included
);

-- Per-record documents. On id conflict these win over the parent's inline
-- copies during reconciliation.
CREATE TABLE IF NOT EXISTS subrecords (
    student_id TEXT NOT NULL REFERENCES students(student_id),
    collection TEXT NOT NULL,   -- 'timeline' | 'communications' | 'notes' | 'reminders'
    record_id  TEXT NOT NULL,
    doc        TEXT NOT NULL,   -- JSON document
    PRIMARY KEY (student_id, collection, record_id)
);

CREATE INDEX IF NOT EXISTS subrecords_student_idx
    ON subrecords(student_id, collection);

PRAGMA user_version = 1;
";
