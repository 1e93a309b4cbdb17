//! SQL schema for the Campus SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS courses (
    course_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- One row per authorized person. The two UNIQUE constraints are what the
-- sign-in orchestrator leans on to resolve concurrent first sign-ins:
-- the losing writer fails with a constraint violation and retries as a
-- read-then-backfill.
CREATE TABLE IF NOT EXISTS directory_records (
    record_id           TEXT PRIMARY KEY,
    email               TEXT NOT NULL UNIQUE,  -- stored lower-cased
    external_subject_id TEXT UNIQUE,           -- NULL until first sign-in
    display_name        TEXT,
    avatar_url          TEXT,
    role                TEXT NOT NULL,         -- 'student' | 'faculty' | 'admin'
    join_date           TEXT NOT NULL,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS course_assignments (
    record_id TEXT NOT NULL REFERENCES directory_records(record_id) ON DELETE CASCADE,
    course_id TEXT NOT NULL REFERENCES courses(course_id),
    PRIMARY KEY (record_id, course_id)
);

CREATE INDEX IF NOT EXISTS records_role_idx       ON directory_records(role);
CREATE INDEX IF NOT EXISTS assignments_course_idx ON course_assignments(course_id);

PRAGMA user_version = 1;
";
